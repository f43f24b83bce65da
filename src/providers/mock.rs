use async_trait::async_trait;
use futures::StreamExt;
use futures::stream;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use crate::core::error::{ChatError, Result};
use crate::core::llm::ChatModel;
use crate::core::types::{CompletionRequest, StreamEvent, StreamResponse};

/// One scripted reply: the fragments to stream and an optional failure raised
/// after them.
#[derive(Debug, Clone, Default)]
pub struct MockReply {
    pub fragments: Vec<String>,
    pub failure: Option<String>,
    pub typing: bool,
}

impl MockReply {
    #[must_use]
    pub fn text<I, S>(fragments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            fragments: fragments.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn failing<I, S>(fragments: I, message: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            failure: Some(message.into()),
            ..Self::text(fragments)
        }
    }

    /// Wraps the fragments in transport typing start/stop events.
    #[must_use]
    pub const fn with_typing(mut self) -> Self {
        self.typing = true;
        self
    }

    fn into_events(self) -> Vec<Result<StreamEvent>> {
        let mut events = Vec::with_capacity(self.fragments.len() + 3);
        if self.typing {
            events.push(Ok(StreamEvent::TypingStarted));
        }
        events.extend(
            self.fragments
                .into_iter()
                .map(|text| Ok(StreamEvent::TextDelta { text })),
        );
        if let Some(message) = self.failure {
            events.push(Err(ChatError::Stream(message)));
            return events;
        }
        if self.typing {
            events.push(Ok(StreamEvent::TypingStopped));
        }
        events.push(Ok(StreamEvent::MessageStop));
        events
    }
}

/// Scripted [`ChatModel`] for tests and offline sessions. Replies are served
/// in queue order; the last one repeats once the queue would run dry.
#[derive(Clone)]
pub struct MockChatModel {
    name: String,
    model: String,
    replies: Arc<Mutex<VecDeque<MockReply>>>,
    request_history: Arc<Mutex<Vec<CompletionRequest>>>,
    fragment_delay: Option<Duration>,
}

impl MockChatModel {
    #[must_use]
    pub fn new() -> Self {
        Self {
            name: "mock".to_string(),
            model: "mock-model".to_string(),
            replies: Arc::new(Mutex::new(VecDeque::new())),
            request_history: Arc::new(Mutex::new(Vec::new())),
            fragment_delay: None,
        }
    }

    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    #[must_use]
    pub fn with_reply<I, S>(self, fragments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.with_script(MockReply::text(fragments))
    }

    #[must_use]
    pub fn with_failure<I, S>(self, fragments: I, message: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.with_script(MockReply::failing(fragments, message))
    }

    #[must_use]
    pub fn with_script(self, reply: MockReply) -> Self {
        self.replies.lock().push_back(reply);
        self
    }

    /// Pauses before every fragment, so tests can interleave with a stream.
    #[must_use]
    pub const fn with_fragment_delay(mut self, delay: Duration) -> Self {
        self.fragment_delay = Some(delay);
        self
    }

    #[must_use]
    pub fn request_history(&self) -> Vec<CompletionRequest> {
        self.request_history.lock().clone()
    }

    #[must_use]
    pub fn last_request(&self) -> Option<CompletionRequest> {
        self.request_history.lock().last().cloned()
    }

    #[must_use]
    pub fn request_count(&self) -> usize {
        self.request_history.lock().len()
    }

    pub fn clear_history(&self) {
        self.request_history.lock().clear();
    }

    fn next_reply(&self) -> Result<MockReply> {
        let mut replies = self.replies.lock();
        match replies.len() {
            0 => Err(ChatError::Provider(
                "MockChatModel: no replies queued".to_string(),
            )),
            1 => Ok(replies[0].clone()),
            _ => replies
                .pop_front()
                .ok_or_else(|| ChatError::Provider("MockChatModel: queue drained".to_string())),
        }
    }
}

impl Default for MockChatModel {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ChatModel for MockChatModel {
    fn name(&self) -> &str {
        &self.name
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn stream(&self, request: CompletionRequest) -> Result<StreamResponse> {
        self.request_history.lock().push(request);
        let events = self.next_reply()?.into_events();

        match self.fragment_delay {
            None => Ok(Box::pin(stream::iter(events))),
            Some(delay) => Ok(Box::pin(stream::iter(events).then(move |event| async move {
                tokio::time::sleep(delay).await;
                event
            }))),
        }
    }
}
