//! Table configuration errors

/// Errors raised while assembling a table.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TableError {
    /// Two columns share the same key.
    #[error("Duplicate column key: {0}")]
    DuplicateColumn(String),

    /// A column key collides with the synthetic actions column.
    #[error("Column key '{0}' is reserved for the actions column")]
    ReservedColumn(String),

    /// Two filters share the same key.
    #[error("Duplicate filter key: {0}")]
    DuplicateFilter(String),
}
