//! Entity trait

use serde::Serialize;
use serde::de::DeserializeOwned;

/// A record type listed by a backend endpoint.
///
/// # Example
///
/// ```
/// use tradedesk_lib::model::{Buyer, Entity};
///
/// assert_eq!(Buyer::PATH, "buyers");
/// assert_eq!(Buyer::field("name"), "name");
/// ```
pub trait Entity: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// Endpoint path relative to the client's base URL.
    const PATH: &'static str;

    /// Backend fields a free-text search is matched against.
    const SEARCH_FIELDS: &'static [&'static str];

    /// Backend field for a column or filter key.
    ///
    /// Defaults to the key itself.
    fn field(key: &str) -> String {
        key.to_string()
    }
}
