pub mod auth;
pub mod sse;

pub use auth::AuthStrategy;
pub use sse::SseParser;

use reqwest::Client;
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::RetryTransientMiddleware;
use reqwest_retry::policies::ExponentialBackoff;
use serde::Serialize;
use std::time::Duration;

use crate::providers::error::ProviderError;

const USER_AGENT: &str = concat!("vexa/", env!("CARGO_PKG_VERSION"));

/// Timeouts and retry bounds for one kind of remote call.
///
/// Retries only cover establishing the request; once a response body is
/// streaming, a failure surfaces to the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpConfig {
    pub connect_timeout: Duration,
    /// Whole-request limit. `None` for streamed replies, which are bounded by
    /// `read_timeout` between chunks instead.
    pub request_timeout: Option<Duration>,
    pub read_timeout: Duration,
    pub max_retries: u32,
    pub retry_min_delay: Duration,
    pub retry_max_delay: Duration,
}

impl HttpConfig {
    /// Chat completions: a long reply may legitimately take minutes.
    #[must_use]
    pub const fn streaming() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
            request_timeout: None,
            read_timeout: Duration::from_secs(60),
            max_retries: 2,
            retry_min_delay: Duration::from_millis(500),
            retry_max_delay: Duration::from_secs(8),
        }
    }

    /// Speech synthesis: one buffered response.
    #[must_use]
    pub const fn buffered() -> Self {
        Self {
            request_timeout: Some(Duration::from_secs(60)),
            ..Self::streaming()
        }
    }
}

#[derive(Clone)]
pub struct HttpClient {
    inner: ClientWithMiddleware,
}

impl HttpClient {
    pub fn with_config(config: &HttpConfig) -> Result<Self, ProviderError> {
        let retry_policy = ExponentialBackoff::builder()
            .retry_bounds(config.retry_min_delay, config.retry_max_delay)
            .build_with_max_retries(config.max_retries);

        let mut builder = Client::builder()
            .user_agent(USER_AGENT)
            .connect_timeout(config.connect_timeout)
            .read_timeout(config.read_timeout);
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }

        let client = builder.build().map_err(|e| {
            ProviderError::Configuration(format!("Failed to build HTTP client: {e}"))
        })?;

        Ok(Self {
            inner: ClientBuilder::new(client)
                .with(RetryTransientMiddleware::new_with_policy(retry_policy))
                .build(),
        })
    }

    /// POSTs `body` as JSON and returns the response once the status is a
    /// success; anything else is classified by [`ProviderError::from_status`].
    pub async fn post_json<T: Serialize + ?Sized>(
        &self,
        url: &str,
        auth: &AuthStrategy,
        accept: &str,
        body: &T,
    ) -> Result<reqwest::Response, ProviderError> {
        let body = serde_json::to_vec(body)
            .map_err(|e| ProviderError::InvalidRequest(format!("Failed to encode request: {e}")))?;

        let response = auth
            .apply(self.inner.post(url))
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .header(reqwest::header::ACCEPT, accept)
            .body(body)
            .send()
            .await
            .map_err(|e| ProviderError::from_reqwest(&e))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let text = response.text().await.unwrap_or_default();
        let err = ProviderError::from_status(status.as_u16(), &text, auth.key_env());
        tracing::warn!(
            %url,
            status = status.as_u16(),
            retryable = err.is_retryable(),
            anonymous = auth.is_anonymous(),
            "Request rejected"
        );
        Err(err)
    }
}

impl std::fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpClient").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::types::ApiKey;

    #[test]
    fn test_streaming_has_no_overall_deadline() {
        let streaming = HttpConfig::streaming();
        assert!(streaming.request_timeout.is_none());

        let buffered = HttpConfig::buffered();
        assert!(buffered.request_timeout.is_some());
        assert_eq!(buffered.max_retries, streaming.max_retries);
    }

    #[test]
    fn test_client_builds_for_both_profiles() {
        assert!(HttpClient::with_config(&HttpConfig::streaming()).is_ok());
        assert!(HttpClient::with_config(&HttpConfig::buffered()).is_ok());
    }

    #[tokio::test]
    async fn test_unreachable_host_is_a_connection_error() {
        let config = HttpConfig {
            connect_timeout: Duration::from_millis(200),
            max_retries: 0,
            ..HttpConfig::streaming()
        };
        let client = HttpClient::with_config(&config).unwrap();
        let auth = AuthStrategy::optional_bearer(ApiKey::new(""));

        let err = client
            .post_json("http://127.0.0.1:9/v1/chat/completions", &auth, "text/event-stream", &())
            .await
            .unwrap_err();

        assert!(matches!(err, ProviderError::Connection(_)));
        assert!(err.is_retryable());
    }
}
