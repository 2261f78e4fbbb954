//! Ordering for list queries.

use crate::table::SortDirection;

/// Specifies the ordering of query results.
///
/// Renders to the backend's `sort` parameter: a JSON object mapping each field
/// to `"1"` (ascending) or `"-1"` (descending), in the order the fields were
/// added.
///
/// # Example
///
/// ```
/// use tradedesk_lib::api::query::OrderBy;
///
/// let order = OrderBy::desc("created_at").then_asc("folio");
/// assert_eq!(order.to_query_value(), r#"{"created_at":"-1","folio":"1"}"#);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct OrderBy {
    pub(crate) fields: Vec<(String, SortDirection)>,
}

impl OrderBy {
    /// Creates an order on a single field.
    pub fn new(field: impl Into<String>, direction: SortDirection) -> Self {
        Self {
            fields: vec![(field.into(), direction)],
        }
    }

    /// Creates an ascending order on a field.
    pub fn asc(field: impl Into<String>) -> Self {
        Self::new(field, SortDirection::Asc)
    }

    /// Creates a descending order on a field.
    pub fn desc(field: impl Into<String>) -> Self {
        Self::new(field, SortDirection::Desc)
    }

    /// Adds a secondary ascending order on a field.
    pub fn then_asc(mut self, field: impl Into<String>) -> Self {
        self.fields.push((field.into(), SortDirection::Asc));
        self
    }

    /// Adds a secondary descending order on a field.
    pub fn then_desc(mut self, field: impl Into<String>) -> Self {
        self.fields.push((field.into(), SortDirection::Desc));
        self
    }

    /// Returns the ordered fields with their directions.
    pub fn fields(&self) -> &[(String, SortDirection)] {
        &self.fields
    }

    /// Renders the order as the JSON text sent in the `sort` parameter.
    pub fn to_query_value(&self) -> String {
        let entries: Vec<String> = self
            .fields
            .iter()
            .map(|(field, direction)| {
                let marker = match direction {
                    SortDirection::Asc => "1",
                    SortDirection::Desc => "-1",
                };
                format!("{}:\"{}\"", serde_json::Value::from(field.as_str()), marker)
            })
            .collect();
        format!("{{{}}}", entries.join(","))
    }
}
