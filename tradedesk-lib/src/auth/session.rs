//! SessionProvider trait and a static implementation

use std::sync::Arc;

/// Read access to the ambient authentication session.
///
/// Implementations are expected to be cheap: the client calls both methods
/// before every request instead of caching their results, so a sign-out or an
/// organization switch takes effect on the next fetch.
///
/// # Example
///
/// ```
/// use tradedesk_lib::auth::{SessionProvider, StaticSession};
///
/// let session = StaticSession::new("token").with_partition_key("org-1");
/// assert_eq!(session.token().as_deref(), Some("token"));
/// assert_eq!(session.partition_key().as_deref(), Some("org-1"));
/// ```
pub trait SessionProvider: Send + Sync {
    /// Returns the current access token, if the user is signed in.
    fn token(&self) -> Option<String>;

    /// Returns the partition key (tenant/organization id), if one is selected.
    fn partition_key(&self) -> Option<String>;
}

impl<S: SessionProvider + ?Sized> SessionProvider for Arc<S> {
    fn token(&self) -> Option<String> {
        (**self).token()
    }

    fn partition_key(&self) -> Option<String> {
        (**self).partition_key()
    }
}

/// A session that always returns the same values.
///
/// Useful for tests, scripts and the command line tool, where credentials come
/// from configuration rather than an interactive sign-in.
#[derive(Debug, Clone, Default)]
pub struct StaticSession {
    token: Option<String>,
    partition_key: Option<String>,
}

impl StaticSession {
    /// Creates a session with the given access token and no partition key.
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: Some(token.into()),
            partition_key: None,
        }
    }

    /// Creates a signed-out session.
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// Sets the partition key.
    pub fn with_partition_key(mut self, partition_key: impl Into<String>) -> Self {
        self.partition_key = Some(partition_key.into());
        self
    }
}

impl SessionProvider for StaticSession {
    fn token(&self) -> Option<String> {
        self.token.clone()
    }

    fn partition_key(&self) -> Option<String> {
        self.partition_key.clone()
    }
}
