//! Main CrmClient

use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;
use url::Url;

use crate::api::ListQuery;
use crate::auth::SessionProvider;
use crate::error::ApiError;
use crate::rate_limit::RetryConfig;

/// Client for the CRM and contract REST backends.
///
/// This client is cheap to clone (uses `Arc` internally) and can be shared
/// across threads safely.
///
/// # Example
///
/// ```ignore
/// use tradedesk_lib::{CrmClient, auth::StaticSession};
///
/// let session = StaticSession::new("my-token").with_partition_key("org-1");
/// let client = CrmClient::builder()
///     .url("https://crm.example.com/api/v1")
///     .session(session)
///     .build()?;
///
/// let page = client.list("contracts").limit(25).execute::<Contract>().await?;
/// ```
#[derive(Clone)]
pub struct CrmClient {
    pub(crate) inner: Arc<CrmClientInner>,
}

pub(crate) struct CrmClientInner {
    pub(crate) base_url: Url,
    pub(crate) session: Arc<dyn SessionProvider>,
    pub(crate) http_client: Client,
    pub(crate) timeout: Option<Duration>,
    pub(crate) retry_config: RetryConfig,
}

impl CrmClient {
    /// Creates a new builder for constructing a client.
    pub fn builder() -> CrmClientBuilder<Missing, Missing> {
        CrmClientBuilder::new()
    }

    /// Starts a list query against `path` (e.g. `"contracts"`).
    pub fn list(&self, path: impl Into<String>) -> ListQuery<'_> {
        ListQuery::new(self, path)
    }

    /// Returns the base URL of the backend.
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    /// Returns the retry configuration.
    pub fn retry_config(&self) -> &RetryConfig {
        &self.inner.retry_config
    }

    /// Resolves `path` relative to the base URL.
    pub fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        let base = self.inner.base_url.as_str().trim_end_matches('/');
        let path = path.trim_start_matches('/');
        Ok(Url::parse(&format!("{}/{}", base, path))?)
    }
}

impl std::fmt::Debug for CrmClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CrmClient")
            .field("base_url", &self.inner.base_url.as_str())
            .field("timeout", &self.inner.timeout)
            .field("retry_config", &self.inner.retry_config)
            .finish_non_exhaustive()
    }
}

// =============================================================================
// Typestate Builder
// =============================================================================

/// Marker type for missing required builder fields.
pub struct Missing;

/// Marker type for set builder fields.
pub struct Set<T>(T);

/// Builder for constructing a [`CrmClient`].
///
/// Uses the typestate pattern to ensure required fields are set at compile time.
///
/// # Required Fields
///
/// - `url` - The backend base URL
/// - `session` - A [`SessionProvider`] implementation
pub struct CrmClientBuilder<U, S> {
    url: U,
    session: S,
    timeout: Option<Duration>,
    connect_timeout: Option<Duration>,
    http_client: Option<Client>,
    retry_config: RetryConfig,
}

impl CrmClientBuilder<Missing, Missing> {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            url: Missing,
            session: Missing,
            timeout: None,
            connect_timeout: None,
            http_client: None,
            retry_config: RetryConfig::default(),
        }
    }
}

impl Default for CrmClientBuilder<Missing, Missing> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S> CrmClientBuilder<Missing, S> {
    /// Sets the backend base URL.
    pub fn url(self, url: impl Into<String>) -> CrmClientBuilder<Set<String>, S> {
        CrmClientBuilder {
            url: Set(url.into()),
            session: self.session,
            timeout: self.timeout,
            connect_timeout: self.connect_timeout,
            http_client: self.http_client,
            retry_config: self.retry_config,
        }
    }
}

impl<U> CrmClientBuilder<U, Missing> {
    /// Sets the session the client reads its token and partition key from.
    pub fn session<P: SessionProvider + 'static>(
        self,
        session: P,
    ) -> CrmClientBuilder<U, Set<Arc<dyn SessionProvider>>> {
        CrmClientBuilder {
            url: self.url,
            session: Set(Arc::new(session) as Arc<dyn SessionProvider>),
            timeout: self.timeout,
            connect_timeout: self.connect_timeout,
            http_client: self.http_client,
            retry_config: self.retry_config,
        }
    }
}

impl<U, S> CrmClientBuilder<U, S> {
    /// Sets the request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Sets the connection timeout.
    ///
    /// This is applied when building the HTTP client.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    /// Sets a custom HTTP client.
    ///
    /// If not set, a default client will be created.
    pub fn http_client(mut self, client: Client) -> Self {
        self.http_client = Some(client);
        self
    }

    /// Sets the retry behaviour for transient HTTP failures.
    pub fn retry(mut self, config: RetryConfig) -> Self {
        self.retry_config = config;
        self
    }
}

impl CrmClientBuilder<Set<String>, Set<Arc<dyn SessionProvider>>> {
    /// Builds the [`CrmClient`].
    ///
    /// This method is only available when both `url` and `session` have been set.
    ///
    /// # Errors
    ///
    /// Fails if the URL does not parse or the HTTP client cannot be created.
    pub fn build(self) -> Result<CrmClient, ApiError> {
        let base_url = Url::parse(&self.url.0)?;

        let http_client = match self.http_client {
            Some(client) => client,
            None => {
                let mut builder = Client::builder();
                if let Some(timeout) = self.connect_timeout {
                    builder = builder.connect_timeout(timeout);
                }
                builder.build()?
            }
        };

        Ok(CrmClient {
            inner: Arc::new(CrmClientInner {
                base_url,
                session: self.session.0,
                http_client,
                timeout: self.timeout,
                retry_config: self.retry_config,
            }),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::StaticSession;

    fn client(url: &str) -> CrmClient {
        CrmClient::builder()
            .url(url)
            .session(StaticSession::new("t"))
            .build()
            .unwrap()
    }

    #[test]
    fn test_endpoint_joins_paths() {
        let c = client("https://crm.example.com/api/v1/");
        assert_eq!(
            c.endpoint("/contracts").unwrap().as_str(),
            "https://crm.example.com/api/v1/contracts"
        );
        let c = client("https://crm.example.com/api/v1");
        assert_eq!(
            c.endpoint("buyers").unwrap().as_str(),
            "https://crm.example.com/api/v1/buyers"
        );
    }

    #[test]
    fn test_invalid_url_rejected() {
        let result = CrmClient::builder()
            .url("not a url")
            .session(StaticSession::new("t"))
            .build();
        assert!(matches!(result, Err(ApiError::InvalidUrl(_))));
    }
}
