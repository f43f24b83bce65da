use thiserror::Error;

#[derive(Error, Debug)]
pub enum ChatError {
    #[error("Provider error: {0}")]
    Provider(String),

    #[error("Stream error: {0}")]
    Stream(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Prompt is empty")]
    EmptyPrompt,

    #[error("Reply was cancelled")]
    Cancelled,

    #[error("Invalid conversation memory: {0}")]
    InvalidMemory(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Voice error: {0}")]
    Voice(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl ChatError {
    /// Whether the error came from talking to the remote model rather than
    /// from local input or state.
    #[must_use]
    pub const fn is_remote(&self) -> bool {
        matches!(
            self,
            Self::Provider(_) | Self::Stream(_) | Self::Transport(_)
        )
    }

    /// The message without the variant's prefix, for re-wrapping.
    #[must_use]
    pub fn detail(&self) -> String {
        match self {
            Self::Provider(m)
            | Self::Stream(m)
            | Self::Transport(m)
            | Self::InvalidMemory(m)
            | Self::Storage(m)
            | Self::Voice(m)
            | Self::Config(m) => m.clone(),
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ChatError>;

impl From<crate::providers::error::ProviderError> for ChatError {
    fn from(err: crate::providers::error::ProviderError) -> Self {
        use crate::providers::error::ProviderError;

        match err {
            ProviderError::StreamError(message) => Self::Stream(message),
            ProviderError::Configuration(message) => Self::Config(message),
            other => Self::Provider(other.to_string()),
        }
    }
}

impl From<crate::storage::StorageError> for ChatError {
    fn from(err: crate::storage::StorageError) -> Self {
        Self::Storage(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::error::ProviderError;

    #[test]
    fn test_error_display() {
        let err = ChatError::InvalidMemory("first entry must be system".to_string());
        assert_eq!(
            err.to_string(),
            "Invalid conversation memory: first entry must be system"
        );
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let chat_err: ChatError = io_err.into();
        assert!(matches!(chat_err, ChatError::Io(_)));
    }

    #[test]
    fn test_error_from_json() {
        let json_err = serde_json::from_str::<serde_json::Value>("invalid json").unwrap_err();
        let chat_err: ChatError = json_err.into();
        assert!(matches!(chat_err, ChatError::Json(_)));
    }

    #[test]
    fn test_provider_configuration_maps_to_config() {
        let err: ChatError = ProviderError::Configuration("missing key".into()).into();
        assert!(matches!(err, ChatError::Config(_)));
        assert!(!err.is_remote());
    }

    #[test]
    fn test_detail_drops_variant_prefix() {
        let err = ChatError::Transport("connection reset".into());
        assert_eq!(err.detail(), "connection reset");
        assert_eq!(ChatError::Cancelled.detail(), "Reply was cancelled");
    }

    #[test]
    fn test_stream_error_is_remote() {
        let err: ChatError = ProviderError::StreamError("connection reset".into()).into();
        assert!(matches!(err, ChatError::Stream(_)));
        assert!(err.is_remote());
    }
}
