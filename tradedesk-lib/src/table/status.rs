//! Load status of a table's data.

use thiserror::Error;

use crate::error::Error as CrateError;

/// Why the last fetch failed, in a form the presentation can show.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct LoadError {
    /// Error message.
    pub message: String,
    /// Whether retrying the same request could succeed.
    pub retryable: bool,
}

impl LoadError {
    /// Creates a retryable load error.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            retryable: true,
        }
    }
}

impl From<&CrateError> for LoadError {
    fn from(err: &CrateError) -> Self {
        Self {
            message: err.to_string(),
            // Configuration errors fail the same way on every attempt.
            retryable: !matches!(err, CrateError::Table(_)),
        }
    }
}

/// The state of a table's data.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum LoadStatus {
    /// Nothing requested yet.
    #[default]
    Idle,
    /// A request is in flight.
    Loading,
    /// The last request succeeded (possibly with zero rows).
    Ready,
    /// The last request failed.
    Failed(LoadError),
}

impl LoadStatus {
    /// Check if nothing was requested yet
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    /// Check if a request is in flight
    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    /// Check if the last request succeeded
    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready)
    }

    /// Check if the last request failed
    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }

    /// Get the error if present
    pub fn as_error(&self) -> Option<&LoadError> {
        match self {
            Self::Failed(e) => Some(e),
            _ => None,
        }
    }
}
