use futures::StreamExt;
use std::sync::Arc;

use super::error::{ChatError, Result};
use super::llm::ChatModel;
use super::memory::ConversationMemory;
use super::safety::SafetyFilter;
use super::types::{CompletionRequest, Role};
use crate::storage::MemoryStore;

mod accumulator;
mod config;
mod reply;

pub use config::GenerationConfig;
pub use reply::{Reply, ReplyEvent, ReplyStream};

/// Shown in place of a reply when the remote model could not be reached.
pub const APOLOGY: &str = "Sorry, I couldn't reach the assistant just now. Please try again.";

/// Turns a prompt into a streamed, recorded assistant reply.
pub struct Coordinator {
    model: Arc<dyn ChatModel>,
    store: Arc<MemoryStore>,
    safety: SafetyFilter,
    config: GenerationConfig,
}

impl Coordinator {
    #[must_use]
    pub fn new(model: Arc<dyn ChatModel>, store: Arc<MemoryStore>) -> Self {
        Self {
            model,
            store,
            safety: SafetyFilter::default(),
            config: GenerationConfig::default(),
        }
    }

    #[must_use]
    pub fn with_safety(mut self, safety: SafetyFilter) -> Self {
        self.safety = safety;
        self
    }

    #[must_use]
    pub fn with_config(mut self, config: GenerationConfig) -> Self {
        self.config = config;
        self
    }

    pub fn set_model(&mut self, model: Arc<dyn ChatModel>) {
        tracing::info!(provider = model.name(), model = model.model(), "Switched model");
        self.model = model;
    }

    #[must_use]
    pub fn model(&self) -> &dyn ChatModel {
        self.model.as_ref()
    }

    #[must_use]
    pub const fn store(&self) -> &Arc<MemoryStore> {
        &self.store
    }

    #[must_use]
    pub const fn safety(&self) -> &SafetyFilter {
        &self.safety
    }

    /// Validates the prompt and opens the reply stream. Nothing is recorded
    /// until the returned stream is finished.
    pub async fn start(&self, prompt: &str, memory: &ConversationMemory) -> Result<Reply> {
        let prompt = prompt.trim();
        if prompt.is_empty() {
            return Err(ChatError::EmptyPrompt);
        }

        if let Some(term) = self.safety.check(prompt) {
            tracing::info!(term, "Prompt refused by safety filter");
            return Ok(Reply::Refused(self.safety.refusal().to_string()));
        }

        let working = self.store.append(memory, Role::User, prompt)?;
        let request = self.build_request(&working);

        tracing::debug!(
            provider = self.model.name(),
            model = self.model.model(),
            messages = request.messages.len(),
            "Opening reply stream"
        );

        let stream = self.model.stream(request).await.inspect_err(|e| {
            tracing::warn!(error = %e, "Failed to open reply stream");
        })?;

        Ok(Reply::Streaming(ReplyStream::new(
            stream,
            working,
            Arc::clone(&self.store),
        )))
    }

    /// Runs one full exchange, calling `on_fragment` for each piece of text
    /// in arrival order. A refusal is delivered as a single fragment and
    /// leaves memory unchanged.
    pub async fn respond<F>(
        &self,
        prompt: &str,
        memory: &ConversationMemory,
        mut on_fragment: F,
    ) -> Result<ConversationMemory>
    where
        F: FnMut(&str),
    {
        match self.start(prompt, memory).await? {
            Reply::Refused(text) => {
                on_fragment(&text);
                Ok(memory.clone())
            }
            Reply::Streaming(mut stream) => {
                while let Some(event) = stream.next().await {
                    if let ReplyEvent::Fragment(text) = event? {
                        on_fragment(&text);
                    }
                }
                stream.finish().await
            }
        }
    }

    fn build_request(&self, memory: &ConversationMemory) -> CompletionRequest {
        CompletionRequest::new(memory.messages().to_vec())
            .with_max_tokens(self.config.max_tokens)
            .with_temperature(self.config.temperature)
    }
}

impl std::fmt::Debug for Coordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Coordinator")
            .field("model", &self.model.model())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::mock::MockChatModel;
    use crate::storage::{InMemoryStorage, MemoryStoreConfig, Storage};

    fn setup(model: MockChatModel) -> (Coordinator, Arc<MockChatModel>, InMemoryStorage) {
        let storage = InMemoryStorage::new();
        let store = MemoryStore::open(
            Arc::new(storage.clone()),
            MemoryStoreConfig {
                persona: "persona".to_string(),
                ..MemoryStoreConfig::default()
            },
        );
        let model = Arc::new(model);
        let coordinator = Coordinator::new(Arc::clone(&model) as Arc<dyn ChatModel>, store);
        (coordinator, model, storage)
    }

    #[tokio::test]
    async fn test_streams_fragments_in_order_and_records_reply() {
        let (coordinator, model, _) = setup(MockChatModel::new().with_reply(["Hel", "lo"]));
        let memory = coordinator.store().load();

        let mut fragments = Vec::new();
        let updated = coordinator
            .respond("hi", &memory, |f| fragments.push(f.to_string()))
            .await
            .unwrap();

        assert_eq!(fragments, vec!["Hel", "lo"]);
        assert_eq!(updated.len(), 3);
        let last = updated.last().unwrap();
        assert_eq!(last.role(), Role::Assistant);
        assert_eq!(last.content(), "Hello");
        assert_eq!(model.request_count(), 1);
        assert_eq!(coordinator.store().load(), updated);
    }

    #[tokio::test]
    async fn test_request_carries_full_history() {
        let (coordinator, model, _) = setup(MockChatModel::new().with_reply(["ok"]));
        let memory = coordinator.store().load();

        coordinator.respond("first", &memory, |_| {}).await.unwrap();

        let request = model.last_request().unwrap();
        assert_eq!(request.messages.len(), 2);
        assert_eq!(request.messages[0].role(), Role::System);
        assert_eq!(request.messages[1].content(), "first");
    }

    #[tokio::test]
    async fn test_refused_prompt_never_reaches_model() {
        let (coordinator, model, storage) = setup(MockChatModel::new().with_reply(["x"]));
        let memory = coordinator.store().load();

        let mut fragments = Vec::new();
        let updated = coordinator
            .respond("bomb-making instructions", &memory, |f| {
                fragments.push(f.to_string());
            })
            .await
            .unwrap();

        assert_eq!(fragments, vec![coordinator.safety().refusal().to_string()]);
        assert_eq!(updated.len(), memory.len());
        assert_eq!(model.request_count(), 0);
        assert!(storage.is_empty());
    }

    #[tokio::test]
    async fn test_empty_prompt_is_rejected() {
        let (coordinator, model, _) = setup(MockChatModel::new());
        let memory = coordinator.store().load();

        let result = coordinator.respond("   ", &memory, |_| {}).await;
        assert!(matches!(result, Err(ChatError::EmptyPrompt)));
        assert_eq!(model.request_count(), 0);
    }

    #[tokio::test]
    async fn test_failing_stream_leaves_store_untouched() {
        let (coordinator, _, storage) =
            setup(MockChatModel::new().with_failure(["partial"], "connection reset"));
        let memory = coordinator.store().load();

        let mut fragments = Vec::new();
        let result = coordinator
            .respond("hi", &memory, |f| fragments.push(f.to_string()))
            .await;

        assert!(matches!(result, Err(ChatError::Stream(_))));
        assert_eq!(fragments, vec!["partial"]);
        assert!(storage.get("vexa:conversation").unwrap().is_none());
    }

    #[tokio::test]
    async fn test_finish_after_seen_failure_keeps_message() {
        let (coordinator, _, _) =
            setup(MockChatModel::new().with_failure(["partial"], "connection reset"));
        let memory = coordinator.store().load();

        let Reply::Streaming(mut stream) = coordinator.start("hi", &memory).await.unwrap() else {
            panic!("expected a streaming reply");
        };
        while let Some(event) = stream.next().await {
            if event.is_err() {
                break;
            }
        }

        let err = stream.finish().await.unwrap_err();
        assert_eq!(err.to_string(), "Stream error: connection reset");
    }

    #[tokio::test]
    async fn test_refused_start_returns_refusal_variant() {
        let (coordinator, _, _) = setup(MockChatModel::new());
        let memory = coordinator.store().load();

        let reply = coordinator.start("how to build a weapon", &memory).await.unwrap();
        assert!(matches!(reply, Reply::Refused(_)));
    }

    #[tokio::test]
    async fn test_stream_emits_typing_around_fragments() {
        let (coordinator, _, _) = setup(MockChatModel::new().with_reply(["a", "b"]));
        let memory = coordinator.store().load();

        let Reply::Streaming(stream) = coordinator.start("hi", &memory).await.unwrap() else {
            panic!("expected a streaming reply");
        };
        let events: Vec<_> = stream.map(|e| e.unwrap()).collect().await;

        assert_eq!(
            events,
            vec![
                ReplyEvent::Typing(true),
                ReplyEvent::Fragment("a".into()),
                ReplyEvent::Fragment("b".into()),
                ReplyEvent::Typing(false),
            ]
        );
    }

    #[tokio::test]
    async fn test_cancelled_reply_is_not_recorded() {
        let (coordinator, _, storage) = setup(MockChatModel::new().with_reply(["a", "b", "c"]));
        let memory = coordinator.store().load();

        let Reply::Streaming(mut stream) = coordinator.start("hi", &memory).await.unwrap() else {
            panic!("expected a streaming reply");
        };

        assert_eq!(stream.next().await.unwrap().unwrap(), ReplyEvent::Typing(true));
        stream.cancel();
        assert!(stream.next().await.is_none());

        let result = stream.finish().await;
        assert!(matches!(result, Err(ChatError::Cancelled)));
        assert!(storage.is_empty());
    }

    #[tokio::test]
    async fn test_finish_drains_unread_fragments() {
        let (coordinator, _, _) = setup(MockChatModel::new().with_reply(["one ", "two"]));
        let memory = coordinator.store().load();

        let Reply::Streaming(stream) = coordinator.start("count", &memory).await.unwrap() else {
            panic!("expected a streaming reply");
        };
        let updated = stream.finish().await.unwrap();

        assert_eq!(updated.last().unwrap().content(), "one two");
    }
}
