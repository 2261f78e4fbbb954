//! Session error types

/// Errors raised when the ambient session cannot authorize a request.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    /// No access token is available; the user has to sign in first.
    #[error("Not signed in: no access token available")]
    MissingToken,

    /// No partition key (organization) is selected for the session.
    #[error("No partition key selected")]
    MissingPartitionKey,
}
