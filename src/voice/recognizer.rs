use parking_lot::Mutex;
use std::process::Stdio;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::core::error::{ChatError, Result};

/// Receives each final transcript.
pub type TranscriptCallback = Box<dyn Fn(String) + Send + Sync>;

const PARTIAL_PREFIX: &str = "partial:";
const FINAL_PREFIX: &str = "final:";

/// Source of user utterances. Only final transcripts reach the callback.
pub trait SpeechRecognizer: Send + Sync {
    fn start_listening(&self, on_final: TranscriptCallback) -> Result<()>;

    fn stop_listening(&self);

    fn is_listening(&self) -> bool;

    /// Follows the listening flag, including when the recognizer stops on its own.
    fn subscribe(&self) -> watch::Receiver<bool>;
}

/// Runs an external speech-to-text command and reads one transcript per
/// stdout line. Lines starting with `partial:` are interim hypotheses and
/// are dropped; a leading `final:` marker is stripped.
pub struct CommandRecognizer {
    command: String,
    state: watch::Sender<bool>,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl CommandRecognizer {
    #[must_use]
    pub fn new(command: impl Into<String>) -> Self {
        let (state, _) = watch::channel(false);
        Self {
            command: command.into(),
            state,
            task: Mutex::new(None),
        }
    }

    #[must_use]
    pub fn command(&self) -> &str {
        &self.command
    }

    async fn read_transcripts(
        mut child: tokio::process::Child,
        stdout: tokio::process::ChildStdout,
        on_final: TranscriptCallback,
        state: watch::Sender<bool>,
    ) {
        let mut lines = BufReader::new(stdout).lines();

        loop {
            match lines.next_line().await {
                Ok(Some(line)) => {
                    if let Some(text) = parse_transcript(&line) {
                        tracing::debug!(chars = text.len(), "Final transcript");
                        on_final(text.to_string());
                    }
                }
                Ok(None) => break,
                Err(e) => {
                    tracing::warn!(error = %e, "Recognizer output could not be read");
                    break;
                }
            }
        }

        match child.wait().await {
            Ok(status) if !status.success() => {
                tracing::warn!(%status, "Recognizer command exited with failure");
            }
            Ok(_) => tracing::debug!("Recognizer command finished"),
            Err(e) => tracing::warn!(error = %e, "Recognizer command could not be awaited"),
        }

        state.send_replace(false);
    }
}

fn parse_transcript(line: &str) -> Option<&str> {
    let line = line.trim();
    if line.is_empty() || line.starts_with(PARTIAL_PREFIX) {
        return None;
    }

    let text = line.strip_prefix(FINAL_PREFIX).map_or(line, str::trim_start);
    (!text.is_empty()).then_some(text)
}

impl SpeechRecognizer for CommandRecognizer {
    fn start_listening(&self, on_final: TranscriptCallback) -> Result<()> {
        let mut task = self.task.lock();
        if self.is_listening() {
            return Err(ChatError::Voice("Already listening".to_string()));
        }

        let mut child = Command::new("sh")
            .arg("-c")
            .arg(&self.command)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| ChatError::Voice(format!("Failed to start recognizer: {e}")))?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| ChatError::Voice("Failed to capture recognizer output".to_string()))?;

        self.state.send_replace(true);
        tracing::info!(command = %self.command, "Listening");

        let handle = tokio::spawn(Self::read_transcripts(
            child,
            stdout,
            on_final,
            self.state.clone(),
        ));
        if let Some(previous) = task.replace(handle) {
            previous.abort();
        }

        Ok(())
    }

    fn stop_listening(&self) {
        if let Some(handle) = self.task.lock().take() {
            handle.abort();
        }
        if self.state.send_replace(false) {
            tracing::info!("Stopped listening");
        }
    }

    fn is_listening(&self) -> bool {
        *self.state.borrow()
    }

    fn subscribe(&self) -> watch::Receiver<bool> {
        self.state.subscribe()
    }
}

impl Drop for CommandRecognizer {
    fn drop(&mut self) {
        if let Some(handle) = self.task.get_mut().take() {
            handle.abort();
        }
    }
}
