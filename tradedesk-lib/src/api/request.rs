//! HTTP execution with session headers and retry.

use std::time::Duration;

use reqwest::Method;
use reqwest::Response;
use reqwest::header::ACCEPT;
use reqwest::header::HeaderValue;
use url::Url;

use crate::CrmClient;
use crate::error::ApiError;
use crate::error::Error;
use crate::error::SessionError;

/// Header carrying the tenant partition every request is scoped to.
pub const PARTITION_KEY_HEADER: &str = "X-Partition-Key";

impl CrmClient {
    /// Makes an HTTP request with session headers and retry logic.
    ///
    /// The session is read before every attempt so refreshed tokens are
    /// picked up between retries.
    pub(crate) async fn request(&self, method: Method, url: Url) -> Result<Response, Error> {
        let retry_config = &self.inner.retry_config;
        let mut attempts = 0;

        loop {
            let result = self.send_once(method.clone(), url.clone()).await;

            match result {
                Ok(response) => {
                    let status = response.status().as_u16();
                    if response.status().is_success() {
                        return Ok(response);
                    }

                    let can_retry =
                        retry_config.retries_status(status) && attempts < retry_config.max_retries;

                    if status == 429 {
                        let retry_after = parse_retry_after(&response);
                        if !can_retry {
                            return Err(Error::RateLimit { retry_after });
                        }
                        let wait = retry_after.unwrap_or_else(|| retry_config.backoff(attempts));
                        log::debug!("{} {} rate limited, retrying in {:?}", method, url.path(), wait);
                        tokio::time::sleep(wait).await;
                        attempts += 1;
                        continue;
                    }

                    if can_retry {
                        let wait = retry_config.backoff(attempts);
                        log::debug!("{} {} returned {}, retrying in {:?}", method, url.path(), status, wait);
                        tokio::time::sleep(wait).await;
                        attempts += 1;
                        continue;
                    }

                    let body = response.text().await.unwrap_or_default();
                    return Err(Error::Api(ApiError::http(status, error_message(&body))));
                }
                Err(Error::Api(e))
                    if e.is_retryable()
                        && retry_config.retry_on_network
                        && attempts < retry_config.max_retries =>
                {
                    let wait = retry_config.backoff(attempts);
                    log::debug!("{} {} failed ({}), retrying in {:?}", method, url.path(), e, wait);
                    tokio::time::sleep(wait).await;
                    attempts += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Inner request method without retry logic.
    async fn send_once(&self, method: Method, url: Url) -> Result<Response, Error> {
        let session = &self.inner.session;
        let token = session.token().ok_or(SessionError::MissingToken)?;
        let partition_key = session
            .partition_key()
            .ok_or(SessionError::MissingPartitionKey)?;
        let partition_key = HeaderValue::from_str(&partition_key)
            .map_err(|_| SessionError::MissingPartitionKey)?;

        let mut request = self
            .inner
            .http_client
            .request(method, url)
            .header(ACCEPT, HeaderValue::from_static("application/json"))
            .header(PARTITION_KEY_HEADER, partition_key)
            .bearer_auth(token);

        if let Some(timeout) = self.inner.timeout {
            request = request.timeout(timeout);
        }

        request.send().await.map_err(|e| {
            if e.is_timeout()
                && let Some(timeout) = self.inner.timeout
            {
                return Error::Api(ApiError::Timeout(timeout));
            }
            Error::Api(ApiError::Network(e))
        })
    }
}

/// Extracts the `message` field from an error body, falling back to the raw text.
fn error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|value| match value.get("message") {
            Some(serde_json::Value::String(message)) => Some(message.clone()),
            Some(serde_json::Value::Array(messages)) => Some(
                messages
                    .iter()
                    .filter_map(|m| m.as_str())
                    .collect::<Vec<_>>()
                    .join("; "),
            ),
            _ => None,
        })
        .unwrap_or_else(|| body.trim().to_string())
}

fn parse_retry_after(response: &Response) -> Option<Duration> {
    response
        .headers()
        .get("Retry-After")?
        .to_str()
        .ok()?
        .parse::<u64>()
        .ok()
        .map(Duration::from_secs)
}
