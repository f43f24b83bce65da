use std::sync::Arc;
use std::time::Duration;

use crate::config::{AppConfig, Transport};
use crate::core::error::{ChatError, Result};
use crate::core::llm::ChatModel;

use super::mock::MockChatModel;
use super::openai::{self, OpenAIProvider};
use super::types::{ApiKey, BaseUrl};
use super::websocket::{WebSocketConfig, WebSocketTransport};

const OFFLINE_REPLY: &[&str] = &[
    "I'm running offline right now, ",
    "so I can only give you this canned reply.",
];

/// Builds the chat model selected by `config.transport`.
pub fn create_chat_model(config: &AppConfig) -> Result<Arc<dyn ChatModel>> {
    create_chat_model_for(config, &config.model)
}

/// Same as [`create_chat_model`] with the model id overridden.
pub fn create_chat_model_for(config: &AppConfig, model: &str) -> Result<Arc<dyn ChatModel>> {
    match config.transport {
        Transport::Http => create_http_model(config, model),
        Transport::Websocket => Ok(Arc::new(create_websocket_transport(config))),
        Transport::Mock => Ok(Arc::new(
            MockChatModel::new()
                .with_model(model)
                .with_reply(OFFLINE_REPLY.iter().copied()),
        )),
    }
}

fn create_http_model(config: &AppConfig, model: &str) -> Result<Arc<dyn ChatModel>> {
    let api_key = resolve_api_key(config)?;

    let provider = OpenAIProvider::new(api_key)
        .map_err(|e| ChatError::Config(e.to_string()))?
        .with_model(model)
        .with_base_url(config.base_url.as_str())
        .with_api_key_env(config.api_key_env.as_str());

    Ok(Arc::new(provider))
}

fn create_websocket_transport(config: &AppConfig) -> WebSocketTransport {
    WebSocketTransport::new(WebSocketConfig {
        url: config.websocket.url.clone(),
        reconnect_attempts: config.websocket.reconnect_attempts,
        reconnect_delay: Duration::from_millis(config.websocket.reconnect_delay_ms),
    })
}

/// The hosted OpenAI endpoint needs a key; self-hosted servers may not.
pub(crate) fn resolve_api_key(config: &AppConfig) -> Result<ApiKey> {
    if config.api_key_env.is_empty() {
        return Ok(ApiKey::default());
    }

    match ApiKey::from_env(&config.api_key_env) {
        Some(key) => Ok(key),
        None if !requires_key(&config.base_url) => Ok(ApiKey::default()),
        None => Err(ChatError::Config(format!(
            "API key not found. Set the {} environment variable.",
            config.api_key_env
        ))),
    }
}

fn requires_key(base_url: &str) -> bool {
    let endpoint = "/v1/chat/completions";
    BaseUrl::new(base_url).join(endpoint) == BaseUrl::new(openai::DEFAULT_BASE_URL).join(endpoint)
}
