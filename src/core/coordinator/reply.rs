use futures::Stream;
use futures::StreamExt;
use futures::stream::{AbortHandle, Abortable};
use std::collections::VecDeque;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use super::accumulator::ReplyAccumulator;
use crate::core::error::{ChatError, Result};
use crate::core::memory::ConversationMemory;
use crate::core::types::{Role, StreamResponse};
use crate::storage::MemoryStore;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplyEvent {
    Typing(bool),
    Fragment(String),
}

/// Outcome of submitting a prompt.
pub enum Reply {
    /// The prompt was stopped locally; nothing was sent or recorded.
    Refused(String),
    Streaming(ReplyStream),
}

impl std::fmt::Debug for Reply {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Refused(text) => f.debug_tuple("Refused").field(text).finish(),
            Self::Streaming(_) => f.write_str("Streaming(..)"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Open,
    Complete,
    Failed,
    Cancelled,
}

/// The fragments of one reply. Finite and not restartable; memory is only
/// touched by [`ReplyStream::finish`] on a completed stream.
pub struct ReplyStream {
    inner: Abortable<StreamResponse>,
    abort: AbortHandle,
    pending: VecDeque<ReplyEvent>,
    accumulator: ReplyAccumulator,
    memory: ConversationMemory,
    store: Arc<MemoryStore>,
    state: State,
    failure: Option<String>,
}

impl ReplyStream {
    pub(super) fn new(
        stream: StreamResponse,
        memory: ConversationMemory,
        store: Arc<MemoryStore>,
    ) -> Self {
        let (abort, registration) = AbortHandle::new_pair();
        Self {
            inner: Abortable::new(stream, registration),
            abort,
            pending: VecDeque::new(),
            accumulator: ReplyAccumulator::default(),
            memory,
            store,
            state: State::Open,
            failure: None,
        }
    }

    /// Ends the stream early. Any partial text is discarded.
    pub fn cancel(&self) {
        self.abort.abort();
    }

    /// Handle that cancels this reply from another task.
    #[must_use]
    pub fn cancel_handle(&self) -> AbortHandle {
        self.abort.clone()
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.state == State::Cancelled || self.abort.is_aborted()
    }

    /// Text received so far.
    #[must_use]
    pub fn text(&self) -> &str {
        self.accumulator.text()
    }

    /// Memory including the submitted user entry, without the reply.
    #[must_use]
    pub const fn pending_memory(&self) -> &ConversationMemory {
        &self.memory
    }

    /// Drains anything left, then records the assistant entry and persists.
    pub async fn finish(mut self) -> Result<ConversationMemory> {
        while let Some(event) = self.next().await {
            event?;
        }

        match self.state {
            State::Cancelled => return Err(ChatError::Cancelled),
            State::Failed => {
                let message = self
                    .failure
                    .take()
                    .unwrap_or_else(|| "reply stream failed".to_string());
                return Err(ChatError::Stream(message));
            }
            State::Open | State::Complete => {}
        }

        let fragments = self.accumulator.fragments();
        let text = self.accumulator.into_text();
        let memory = self.store.append(&self.memory, Role::Assistant, text)?;
        self.store.save(&memory);

        tracing::debug!(fragments, entries = memory.len(), "Reply committed");
        Ok(memory)
    }

    fn close(&mut self) {
        self.accumulator.finish(&mut self.pending);
        self.state = State::Complete;
    }
}

impl Stream for ReplyStream {
    type Item = Result<ReplyEvent>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();

        loop {
            if this.abort.is_aborted() && this.state == State::Open {
                this.state = State::Cancelled;
                this.pending.clear();
            }

            if let Some(event) = this.pending.pop_front() {
                return Poll::Ready(Some(Ok(event)));
            }

            if this.state != State::Open {
                return Poll::Ready(None);
            }

            match this.inner.poll_next_unpin(cx) {
                Poll::Pending => return Poll::Pending,
                Poll::Ready(Some(Ok(event))) => {
                    if this.accumulator.handle(event, &mut this.pending) {
                        this.state = State::Complete;
                    }
                }
                Poll::Ready(Some(Err(e))) => {
                    tracing::warn!(error = %e, "Reply stream failed");
                    this.state = State::Failed;
                    this.failure = Some(e.detail());
                    this.pending.clear();
                    return Poll::Ready(Some(Err(e)));
                }
                Poll::Ready(None) => {
                    if this.abort.is_aborted() {
                        this.state = State::Cancelled;
                        this.pending.clear();
                        tracing::debug!("Reply cancelled");
                    } else {
                        this.close();
                    }
                }
            }
        }
    }
}

impl std::fmt::Debug for ReplyStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReplyStream")
            .field("state", &self.state)
            .field("text", &self.accumulator.text())
            .finish_non_exhaustive()
    }
}
