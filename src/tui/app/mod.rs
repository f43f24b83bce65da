mod commands;
mod render;
mod terminal;

pub use commands::SLASH_COMMANDS;

use crate::cli::Session;
use crate::config::{ConfigEvent, ConfigEventSender};
use crate::core::error::Result;
use crate::tui::chat_runner::{ChatCommand, ChatRunner};
use crate::tui::events::{
    AppEvent, forward_listening, speak_reply, terminal_event_loop, tick_loop, transcript_sender,
};
use crate::tui::layout::calculate_layout;
use crate::tui::state::AppState;
use crate::tui::widgets::{ChatWidget, InputAction, InputWidget, MessageLevel};
use crate::voice::{SpeechRecognizer, SpeechSynthesizer};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use commands::{HELP_TEXT, SlashCommand};
use render::{HeaderInfo, StatusInfo, render_header, render_status};
use terminal::{Tui, reset_terminal, restore_terminal, setup_terminal};

const SHUTDOWN_GRACE: Duration = Duration::from_secs(2);

/// Optional voice bridges available to the session.
#[derive(Default, Clone)]
pub struct VoiceBridges {
    pub recognizer: Option<Arc<dyn SpeechRecognizer>>,
    pub synthesizer: Option<Arc<dyn SpeechSynthesizer>>,
}

pub struct TuiApp {
    chat_cmd_tx: mpsc::UnboundedSender<ChatCommand>,
    runner_task: Option<JoinHandle<()>>,
    transport_name: String,
    model_name: String,
    state: AppState,
    input_widget: InputWidget<'static>,
    event_rx: mpsc::UnboundedReceiver<AppEvent>,
    event_tx: mpsc::UnboundedSender<AppEvent>,
    config_event_tx: Option<ConfigEventSender>,
    voice: VoiceBridges,
    speech_task: Option<JoinHandle<()>>,
    terminal: Tui,
}

impl TuiApp {
    pub(crate) fn with_event_channels(
        session: Session,
        voice: VoiceBridges,
        event_tx: mpsc::UnboundedSender<AppEvent>,
        event_rx: mpsc::UnboundedReceiver<AppEvent>,
        config_event_tx: Option<ConfigEventSender>,
    ) -> Result<Self> {
        let Session {
            config,
            coordinator,
            ..
        } = session;

        let transport_name = config.transport.to_string();
        let model_name = coordinator.model().model().to_string();

        let (runner, chat_cmd_tx) = ChatRunner::new(coordinator, config, event_tx.clone());
        let state = AppState::from_memory(runner.memory());
        let runner_task = tokio::spawn(runner.run());

        let terminal = setup_terminal()?;

        Ok(Self {
            chat_cmd_tx,
            runner_task: Some(runner_task),
            transport_name,
            model_name,
            state,
            input_widget: InputWidget::new(),
            event_rx,
            event_tx,
            config_event_tx,
            voice,
            speech_task: None,
            terminal,
        })
    }

    pub async fn run(&mut self) -> Result<()> {
        let tx1 = self.event_tx.clone();
        let tx2 = self.event_tx.clone();

        tokio::spawn(async move {
            if let Err(e) = terminal_event_loop(tx1).await {
                tracing::error!(error = %e, "Terminal event loop stopped");
            }
        });

        tokio::spawn(async move {
            tick_loop(tx2).await;
        });

        if let Some(recognizer) = &self.voice.recognizer {
            tokio::spawn(forward_listening(
                recognizer.subscribe(),
                self.event_tx.clone(),
            ));
        }

        while !self.state.should_quit {
            self.draw()?;

            if let Some(event) = self.event_rx.recv().await {
                self.handle_event(event);
            }
        }

        self.shutdown().await;
        restore_terminal(&mut self.terminal)?;

        Ok(())
    }

    fn draw(&mut self) -> Result<()> {
        let status = StatusInfo {
            is_processing: self.state.is_processing(),
            typing: self.state.is_typing(),
            elapsed: self.state.elapsed(),
            spinner_frame: self.state.spinner_frame(),
            listening: self.state.voice.listening,
            speaking: self.state.voice.speaking,
            auto_speak: self.state.voice.auto_speak,
        };

        let input_lines = self.input_widget.line_count();

        self.terminal.draw(|f| {
            let layout = calculate_layout(f.area(), input_lines);

            let voice = &self.state.voice;
            let meter_label = if voice.speaking {
                Some("speaking")
            } else if voice.listening {
                Some("listening")
            } else {
                None
            };
            let header = HeaderInfo {
                transport: &self.transport_name,
                model: &self.model_name,
                voice: meter_label.map(|label| (label, &voice.meter)),
            };
            render_header(f, layout.header, &header);

            let messages = self.state.messages_with_streaming();
            let chat_widget =
                ChatWidget::new(&messages, &mut self.state.scroll, status.spinner_frame);
            chat_widget.render(layout.chat, f.buffer_mut());

            self.input_widget.render(layout.input, f);

            render_status(f, layout.status, &status);
        })?;

        Ok(())
    }

    async fn shutdown(&mut self) {
        if let Some(recognizer) = &self.voice.recognizer {
            recognizer.stop_listening();
        }
        self.stop_speech();

        let _ = self.chat_cmd_tx.send(ChatCommand::Shutdown);
        if let Some(task) = self.runner_task.take()
            && tokio::time::timeout(SHUTDOWN_GRACE, task).await.is_err()
        {
            tracing::warn!("Chat runner did not stop in time");
        }
    }

    fn handle_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::Input(key) => self.handle_key_input(key),
            AppEvent::Paste(text) => {
                let action = self.input_widget.handle_paste(text);
                self.handle_input_action(action);
            }
            AppEvent::Resize(_w, _h) => {}
            AppEvent::MouseScroll(delta) => {
                if delta < 0 {
                    self.state.scroll.scroll_up(delta.unsigned_abs() as usize);
                } else {
                    self.state.scroll.scroll_down(delta.unsigned_abs() as usize);
                }
            }
            AppEvent::Tick => {}

            AppEvent::Typing(typing) if self.state.is_current_reply() => {
                self.state.set_typing(typing);
            }
            AppEvent::ReplyFragment(text) if self.state.is_current_reply() => {
                self.state.append_streaming(&text);
            }
            AppEvent::Typing(_) | AppEvent::ReplyFragment(_) => {}

            AppEvent::ReplyComplete { text } => {
                if let Some(text) = self.state.complete_reply(text)
                    && self.state.voice.auto_speak
                {
                    self.speak(text);
                }
            }
            AppEvent::ReplyRefused(text) => self.state.refuse_reply(text),
            AppEvent::ReplyFailed { message, remote } => {
                tracing::debug!(%message, remote, "Showing apology for failed reply");
                self.state.fail_reply();
            }
            AppEvent::ReplyCancelled => self.state.cancel_reply(),
            AppEvent::MemoryCleared => {
                self.state.add_system_message("Conversation cleared.");
            }
            AppEvent::ModelChanged { model } => {
                self.model_name.clone_from(&model);
                self.state.add_system_message(format!("Switched to {model}"));

                if let Some(tx) = &self.config_event_tx {
                    let _ = tx.send(ConfigEvent::ModelChanged { model });
                }
            }
            AppEvent::ModelSwitchError(error) => {
                self.state.add_system_message_with_level(
                    format!("Failed to switch model: {error}"),
                    MessageLevel::Error,
                );
            }

            AppEvent::Transcript(text) => {
                let text = text.trim().to_string();
                if !text.is_empty() {
                    self.submit_prompt(text);
                }
            }
            AppEvent::ListeningChanged(listening) => {
                self.state.voice.set_listening(listening);
                self.input_widget.set_listening(listening);
            }
            AppEvent::SpeechLevel(level) => {
                if self.state.voice.speaking {
                    self.state.voice.push_level(level);
                }
            }
            AppEvent::SpeechFinished(error) => {
                self.speech_task = None;
                self.state.voice.finish_speaking();
                if let Some(error) = error {
                    self.state.add_system_message_with_level(
                        format!("Could not speak reply: {error}"),
                        MessageLevel::Warning,
                    );
                }
            }
        }
    }

    fn handle_key_input(&mut self, key: KeyEvent) {
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            if self.input_widget.is_empty() {
                self.state.quit();
            } else {
                self.input_widget.clear();
            }
            return;
        }

        if key.code == KeyCode::Char('d') && key.modifiers.contains(KeyModifiers::CONTROL) {
            if self.input_widget.is_empty() {
                self.state.quit();
            }
            return;
        }

        if key.code == KeyCode::Char('l') && key.modifiers.contains(KeyModifiers::CONTROL) {
            self.state.clear_messages();
            return;
        }

        match key.code {
            KeyCode::PageUp => {
                self.state.scroll.scroll_up(10);
                return;
            }
            KeyCode::PageDown => {
                self.state.scroll.scroll_down(10);
                return;
            }
            KeyCode::Home if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.state.scroll.scroll_to_top();
                return;
            }
            KeyCode::End if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.state.scroll.scroll_to_bottom();
                return;
            }
            _ => {}
        }

        let action = self.input_widget.handle_key(key);
        self.handle_input_action(action);
    }

    fn handle_input_action(&mut self, action: InputAction) {
        match action {
            InputAction::Continue | InputAction::Clear => {}

            InputAction::Submit(text) => {
                if text.starts_with('/') {
                    self.handle_slash_command(&text);
                } else {
                    self.submit_prompt(text);
                }
            }

            InputAction::Cancel => {
                if self.state.is_processing() {
                    let _ = self.chat_cmd_tx.send(ChatCommand::Cancel);
                }
            }

            InputAction::HistoryPrev => {
                let current = self.input_widget.text();
                if let Some(text) = self.state.history.prev(&current) {
                    self.input_widget.set_text(&text);
                }
            }

            InputAction::HistoryNext => {
                if let Some(text) = self.state.history.next() {
                    self.input_widget.set_text(&text);
                } else {
                    self.input_widget.clear();
                }
            }
        }
    }

    fn submit_prompt(&mut self, text: String) {
        self.state.supersede_reply();
        self.state.history.push(text.clone());
        self.state.add_user_message(text.clone());
        self.state.begin_reply();

        let _ = self.chat_cmd_tx.send(ChatCommand::Submit { prompt: text });
    }

    fn handle_slash_command(&mut self, command: &str) {
        match SlashCommand::parse(command) {
            SlashCommand::Help => self.state.add_system_message(HELP_TEXT),
            SlashCommand::Exit => self.state.quit(),
            SlashCommand::Clear => {
                self.state.clear_conversation();
                let _ = self.chat_cmd_tx.send(ChatCommand::Clear);
            }
            SlashCommand::Model(None) => {
                self.state
                    .add_system_message(format!("Current model: {}", self.model_name));
            }
            SlashCommand::Model(Some(model)) => {
                let _ = self.chat_cmd_tx.send(ChatCommand::SwitchModel { model });
            }
            SlashCommand::Listen => self.toggle_listening(),
            SlashCommand::Speak => self.toggle_auto_speak(),
            SlashCommand::Unknown(cmd) => {
                self.state.add_system_message(format!(
                    "Unknown command: {cmd}. Type /help for available commands."
                ));
            }
        }
    }

    fn toggle_listening(&mut self) {
        let Some(recognizer) = self.voice.recognizer.clone() else {
            self.state.add_system_message_with_level(
                "Voice input is not configured. Set voice.recognizer_command in config.toml.",
                MessageLevel::Warning,
            );
            return;
        };

        if recognizer.is_listening() {
            recognizer.stop_listening();
            return;
        }

        if let Err(e) = recognizer.start_listening(transcript_sender(self.event_tx.clone())) {
            self.state
                .add_system_message_with_level(e.to_string(), MessageLevel::Error);
        }
    }

    fn toggle_auto_speak(&mut self) {
        if self.voice.synthesizer.is_none() {
            self.state.add_system_message_with_level(
                "Speech output is off. Set voice.synthesizer in config.toml.",
                MessageLevel::Warning,
            );
            return;
        }

        let voice = &mut self.state.voice;
        voice.auto_speak = !voice.auto_speak;
        let enabled = voice.auto_speak;
        if !enabled {
            self.stop_speech();
        }
        self.state.add_system_message(if enabled {
            "Replies will be read aloud."
        } else {
            "Replies will no longer be read aloud."
        });
    }

    fn speak(&mut self, text: String) {
        let Some(synthesizer) = self.voice.synthesizer.clone() else {
            return;
        };
        self.stop_speech();
        self.state.voice.start_speaking();
        self.speech_task = Some(tokio::spawn(speak_reply(
            synthesizer,
            text,
            self.event_tx.clone(),
        )));
    }

    fn stop_speech(&mut self) {
        if let Some(task) = self.speech_task.take() {
            task.abort();
            self.state.voice.finish_speaking();
        }
    }
}

impl Drop for TuiApp {
    fn drop(&mut self) {
        reset_terminal();
    }
}
