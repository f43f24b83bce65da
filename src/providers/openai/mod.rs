pub mod convert;
pub mod types;

use async_trait::async_trait;
use futures::StreamExt;

use crate::core::error::Result;
use crate::core::llm::ChatModel;
use crate::core::types::{CompletionRequest, StreamEvent, StreamResponse};
use crate::providers::error::ProviderError;
use crate::providers::http::{AuthStrategy, HttpClient, HttpConfig, SseParser};
use crate::providers::types::{ApiKey, BaseUrl, ModelId};

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com";
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_API_KEY_ENV: &str = "OPENAI_API_KEY";

/// Streaming client for any OpenAI-compatible `/v1/chat/completions` server.
#[derive(Clone)]
pub struct OpenAIProvider {
    http: HttpClient,
    auth: AuthStrategy,
    model: ModelId,
    base_url: BaseUrl,
}

impl std::fmt::Debug for OpenAIProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAIProvider")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl OpenAIProvider {
    pub fn new(api_key: ApiKey) -> std::result::Result<Self, ProviderError> {
        Ok(Self {
            http: HttpClient::with_config(&HttpConfig::streaming())?,
            auth: AuthStrategy::optional_bearer(api_key).with_key_env(DEFAULT_API_KEY_ENV),
            model: ModelId::new(DEFAULT_MODEL),
            base_url: BaseUrl::new(DEFAULT_BASE_URL),
        })
    }

    #[must_use]
    pub fn with_model(mut self, model: impl Into<ModelId>) -> Self {
        self.model = model.into();
        self
    }

    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<BaseUrl>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Names the variable mentioned in authentication error hints.
    #[must_use]
    pub fn with_api_key_env(mut self, var: impl Into<String>) -> Self {
        self.auth = self.auth.with_key_env(var);
        self
    }

    fn endpoint(&self) -> String {
        self.base_url.join("/v1/chat/completions")
    }
}

#[async_trait]
impl ChatModel for OpenAIProvider {
    fn name(&self) -> &'static str {
        "openai"
    }

    fn model(&self) -> &str {
        self.model.as_str()
    }

    async fn stream(&self, request: CompletionRequest) -> Result<StreamResponse> {
        let mut api_request = convert::to_api_request(&self.model, &request);
        api_request.stream = Some(true);

        tracing::debug!(
            model = %self.model,
            messages = api_request.messages.len(),
            "Opening completion stream"
        );
        let response = self
            .http
            .post_json(&self.endpoint(), &self.auth, "text/event-stream", &api_request)
            .await?;

        let event_stream = SseParser::parse_stream(response.bytes_stream()).flat_map(|result| {
            let events: Vec<Result<StreamEvent>> = match result
                .and_then(|sse_event| convert::parse_stream_event(&sse_event.data))
            {
                Ok(events) => events.into_iter().map(Ok).collect(),
                Err(e) => vec![Err(e.into())],
            };
            futures::stream::iter(events)
        });

        Ok(Box::pin(event_stream))
    }
}
