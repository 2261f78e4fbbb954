//! Error types

mod api;
mod session;
mod table;

use std::time::Duration;

pub use api::*;
pub use session::*;
pub use table::*;

/// Top-level error returned by the client and by table sources.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The backend request failed.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// The session could not supply the credentials a request needs.
    #[error(transparent)]
    Session(#[from] SessionError),

    /// A table was configured inconsistently.
    #[error(transparent)]
    Table(#[from] TableError),

    /// The backend kept rejecting requests with HTTP 429.
    #[error("Rate limited{}", retry_after.map(|d| format!(", retry after {:?}", d)).unwrap_or_default())]
    RateLimit {
        /// Server-provided wait time, if any.
        retry_after: Option<Duration>,
    },

    /// Failure reported by a custom [`TableSource`](crate::table::TableSource).
    #[error("{0}")]
    Source(String),
}

impl Error {
    /// Creates a source error from any message.
    pub fn source(message: impl Into<String>) -> Self {
        Self::Source(message.into())
    }

    /// Returns `true` if retrying the same request could succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Api(e) => e.is_retryable(),
            Self::RateLimit { .. } => true,
            _ => false,
        }
    }
}
