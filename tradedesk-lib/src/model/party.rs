//! Buyers, sellers and traders.

use std::ops::Deref;

use serde::Deserialize;
use serde::Serialize;

use super::Entity;

/// Fields shared by every counterparty record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Party {
    /// Backend identifier.
    #[serde(rename = "_id")]
    pub id: String,
    /// Display name.
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    /// Tax registration number.
    #[serde(default)]
    pub tax_id: Option<String>,
}

impl Party {
    /// Creates a party with only the required fields.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            email: None,
            phone: None,
            country: None,
            state: None,
            city: None,
            tax_id: None,
        }
    }

    /// `"City, State, Country"` with missing parts skipped.
    pub fn location(&self) -> String {
        [&self.city, &self.state, &self.country]
            .into_iter()
            .flatten()
            .filter(|part| !part.is_empty())
            .cloned()
            .collect::<Vec<_>>()
            .join(", ")
    }
}

const PARTY_SEARCH_FIELDS: &[&str] = &["name", "email", "phone", "tax_id"];

macro_rules! party_entity {
    ($(#[$meta:meta])* $name:ident, $path:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub Party);

        impl Deref for $name {
            type Target = Party;

            fn deref(&self) -> &Party {
                &self.0
            }
        }

        impl From<Party> for $name {
            fn from(party: Party) -> Self {
                Self(party)
            }
        }

        impl Entity for $name {
            const PATH: &'static str = $path;
            const SEARCH_FIELDS: &'static [&'static str] = PARTY_SEARCH_FIELDS;
        }
    };
}

party_entity!(
    /// A company that buys commodities.
    Buyer,
    "buyers"
);
party_entity!(
    /// A company that sells commodities.
    Seller,
    "sellers"
);
party_entity!(
    /// A trader who brokers contracts.
    Trader,
    "traders"
);

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_buyer() {
        let buyer: Buyer = serde_json::from_value(json!({
            "_id": "b1",
            "name": "Granos del Norte",
            "email": "ventas@gdn.mx",
            "country": "Mexico",
            "city": "Culiacan",
            "tax_id": "GDN010101AAA"
        }))
        .unwrap();

        assert_eq!(buyer.id, "b1");
        assert_eq!(buyer.tax_id.as_deref(), Some("GDN010101AAA"));
        assert_eq!(buyer.location(), "Culiacan, Mexico");
    }

    #[test]
    fn test_serialized_shape_is_flat() {
        let seller = Seller::from(Party::new("s1", "Acme"));
        let value = serde_json::to_value(&seller).unwrap();
        assert_eq!(value["_id"], "s1");
        assert_eq!(value["name"], "Acme");
    }

    #[test]
    fn test_missing_name_is_rejected() {
        let result: Result<Trader, _> = serde_json::from_value(json!({"_id": "t1"}));
        assert!(result.is_err());
    }
}
