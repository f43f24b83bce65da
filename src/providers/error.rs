use thiserror::Error;

/// Failure talking to a remote chat or speech service.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("Authentication failed: {message}")]
    Authentication {
        message: String,
        hint: Option<String>,
    },

    #[error("Rate limited: {0}")]
    RateLimit(String),

    #[error("Conversation exceeds the model context window: {0}")]
    ContextWindowExceeded(String),

    #[error("Connection failed: {0}")]
    Connection(String),

    #[error("Server error ({status}): {message}")]
    Server { status: u16, message: String },

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Stream error: {0}")]
    StreamError(String),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl ProviderError {
    /// Whether sending the same prompt again later could succeed.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::RateLimit(_) | Self::Connection(_) | Self::Server { .. } | Self::StreamError(_)
        )
    }

    #[must_use]
    pub fn from_reqwest(err: &reqwest_middleware::Error) -> Self {
        match err {
            reqwest_middleware::Error::Reqwest(e) if e.is_timeout() => {
                Self::Connection(format!("timed out: {e}"))
            }
            other => Self::Connection(other.to_string()),
        }
    }

    /// Classifies a non-success response. `key_env` names the variable the
    /// API key is read from, for the 401 hint.
    #[must_use]
    pub fn from_status(status: u16, body: &str, key_env: &str) -> Self {
        let message = error_message(body).unwrap_or_else(|| format!("HTTP {status}"));

        match status {
            401 | 403 => Self::Authentication {
                message,
                hint: (!key_env.is_empty()).then(|| format!("Check the {key_env} environment variable")),
            },
            429 => Self::RateLimit(message),
            400 | 413 if mentions_context(&message) => Self::ContextWindowExceeded(message),
            500..=599 => Self::Server { status, message },
            _ => Self::InvalidRequest(message),
        }
    }
}

/// `{"error": {"message": ...}}` or `{"error": "..."}` as sent by
/// OpenAI-compatible servers.
fn error_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    let error = value.get("error")?;
    error
        .get("message")
        .and_then(serde_json::Value::as_str)
        .or_else(|| error.as_str())
        .map(String::from)
}

fn mentions_context(message: &str) -> bool {
    let lower = message.to_lowercase();
    lower.contains("context") || (lower.contains("maximum") && lower.contains("token"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unauthorized_carries_env_hint() {
        let body = r#"{"error": {"message": "Invalid API key"}}"#;

        match ProviderError::from_status(401, body, "GROQ_API_KEY") {
            ProviderError::Authentication { message, hint } => {
                assert_eq!(message, "Invalid API key");
                assert!(hint.unwrap().contains("GROQ_API_KEY"));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_unauthorized_without_env_has_no_hint() {
        let err = ProviderError::from_status(401, "", "");
        assert!(matches!(err, ProviderError::Authentication { hint: None, .. }));
    }

    #[test]
    fn test_status_classes() {
        assert!(matches!(
            ProviderError::from_status(429, r#"{"error":"slow down"}"#, "K"),
            ProviderError::RateLimit(m) if m == "slow down"
        ));
        assert!(matches!(
            ProviderError::from_status(404, "", "K"),
            ProviderError::InvalidRequest(m) if m == "HTTP 404"
        ));
        assert!(matches!(
            ProviderError::from_status(502, "<html>bad gateway</html>", "K"),
            ProviderError::Server { status: 502, .. }
        ));
    }

    #[test]
    fn test_context_overflow_is_not_retryable() {
        let body = r#"{"error": {"message": "This model's maximum context length is 8192 tokens"}}"#;
        let err = ProviderError::from_status(400, body, "OPENAI_API_KEY");

        assert!(matches!(err, ProviderError::ContextWindowExceeded(_)));
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_retryable_failures() {
        assert!(ProviderError::RateLimit("busy".into()).is_retryable());
        assert!(ProviderError::Connection("reset".into()).is_retryable());
        assert!(ProviderError::from_status(503, "", "K").is_retryable());

        assert!(!ProviderError::InvalidRequest("bad".into()).is_retryable());
        assert!(!ProviderError::Configuration("missing key".into()).is_retryable());
    }

    #[test]
    fn test_display() {
        let err = ProviderError::StreamError("unexpected eof".into());
        assert_eq!(err.to_string(), "Stream error: unexpected eof");
    }
}
