use crate::config::AppConfig;
use crate::core::{ChatError, ConversationMemory, Coordinator, Reply, ReplyEvent, ReplyStream};
use crate::providers::create_chat_model_for;
use crate::tui::events::AppEvent;
use futures::StreamExt;
use tokio::sync::mpsc;
use tracing::Instrument;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatCommand {
    Submit { prompt: String },
    Clear,
    SwitchModel { model: String },
    Cancel,
    Shutdown,
}

/// Owns the coordinator and the live conversation. One reply streams at a
/// time; any command other than a model switch that arrives mid-reply
/// cancels it first.
pub struct ChatRunner {
    coordinator: Coordinator,
    config: AppConfig,
    memory: ConversationMemory,
    cmd_rx: mpsc::UnboundedReceiver<ChatCommand>,
    event_tx: mpsc::UnboundedSender<AppEvent>,
}

impl ChatRunner {
    #[must_use]
    pub fn new(
        coordinator: Coordinator,
        config: AppConfig,
        event_tx: mpsc::UnboundedSender<AppEvent>,
    ) -> (Self, mpsc::UnboundedSender<ChatCommand>) {
        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
        let memory = coordinator.store().load();
        let runner = Self {
            coordinator,
            config,
            memory,
            cmd_rx,
            event_tx,
        };
        (runner, cmd_tx)
    }

    #[must_use]
    pub const fn memory(&self) -> &ConversationMemory {
        &self.memory
    }

    pub async fn run(mut self) {
        let mut next = None;
        loop {
            let cmd = match next.take() {
                Some(cmd) => cmd,
                None => match self.cmd_rx.recv().await {
                    Some(cmd) => cmd,
                    None => break,
                },
            };

            match cmd {
                ChatCommand::Submit { prompt } => {
                    let span = tracing::info_span!("reply", request_id = %uuid::Uuid::new_v4());
                    next = self.submit(prompt).instrument(span).await;
                }
                ChatCommand::Clear => self.clear(),
                ChatCommand::SwitchModel { model } => self.switch_model(&model),
                ChatCommand::Cancel => {}
                ChatCommand::Shutdown => {
                    tracing::info!("Chat runner shutting down");
                    break;
                }
            }
        }
        self.coordinator.store().dispose();
    }

    fn clear(&mut self) {
        self.memory = self.coordinator.store().clear();
        self.send(AppEvent::MemoryCleared);
    }

    fn switch_model(&mut self, model: &str) {
        match create_chat_model_for(&self.config, model) {
            Ok(chat_model) => {
                let model = chat_model.model().to_string();
                self.coordinator.set_model(chat_model);
                self.config.model.clone_from(&model);
                tracing::info!(%model, "Switched chat model");
                self.send(AppEvent::ModelChanged { model });
            }
            Err(e) => self.send(AppEvent::ModelSwitchError(e.to_string())),
        }
    }

    /// Streams one reply. Returns the command that interrupted it, if any.
    async fn submit(&mut self, prompt: String) -> Option<ChatCommand> {
        let mut stream = match self.coordinator.start(&prompt, &self.memory).await {
            Ok(Reply::Streaming(stream)) => stream,
            Ok(Reply::Refused(text)) => {
                self.send(AppEvent::ReplyRefused(text));
                return None;
            }
            Err(e) => {
                self.fail(&e);
                return None;
            }
        };

        loop {
            tokio::select! {
                event = stream.next() => match event {
                    Some(Ok(ReplyEvent::Typing(typing))) => self.send(AppEvent::Typing(typing)),
                    Some(Ok(ReplyEvent::Fragment(text))) => self.send(AppEvent::ReplyFragment(text)),
                    Some(Err(e)) => {
                        self.fail(&e);
                        return None;
                    }
                    None => break,
                },
                cmd = self.cmd_rx.recv() => match cmd {
                    Some(ChatCommand::SwitchModel { model }) => self.switch_model(&model),
                    Some(cmd) => {
                        Self::cancel(stream).await;
                        self.send(AppEvent::ReplyCancelled);
                        return Some(cmd);
                    }
                    None => {
                        Self::cancel(stream).await;
                        return Some(ChatCommand::Shutdown);
                    }
                },
            }
        }

        let text = stream.text().to_string();
        match stream.finish().await {
            Ok(memory) => {
                self.memory = memory;
                self.send(AppEvent::ReplyComplete { text });
            }
            Err(ChatError::Cancelled) => self.send(AppEvent::ReplyCancelled),
            Err(e) => self.fail(&e),
        }
        None
    }

    async fn cancel(stream: ReplyStream) {
        stream.cancel();
        let _ = stream.finish().await;
        tracing::info!("Reply cancelled");
    }

    fn fail(&self, error: &ChatError) {
        tracing::warn!(error = %error, "Reply failed");
        self.send(AppEvent::ReplyFailed {
            message: error.to_string(),
            remote: error.is_remote(),
        });
    }

    fn send(&self, event: AppEvent) {
        let _ = self.event_tx.send(event);
    }
}
