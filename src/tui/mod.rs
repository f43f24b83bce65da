pub mod app;
pub mod chat_runner;
pub mod events;
pub mod layout;
pub mod state;
pub mod widgets;

pub use app::{TuiApp, VoiceBridges};
pub use chat_runner::{ChatCommand, ChatRunner};

use crate::cli::Session;
use crate::config::{ConfigEventHandler, ConfigPersister};
use crate::core::error::Result;
use crate::voice::{create_recognizer, create_synthesizer};
use std::sync::Arc;
use tokio::sync::mpsc;

pub async fn run_tui(session: Session) -> Result<()> {
    let (event_tx, event_rx) = mpsc::unbounded_channel();

    let config_event_tx = match ConfigPersister::with_default_path() {
        Ok(persister) => {
            let (handler, tx) = ConfigEventHandler::new(Arc::new(persister));
            tokio::spawn(handler.run());
            Some(tx)
        }
        Err(e) => {
            tracing::warn!(error = %e, "Model selection will not be persisted");
            None
        }
    };

    let synthesizer = create_synthesizer(&session.config).unwrap_or_else(|e| {
        tracing::warn!(error = %e, "Speech output unavailable");
        None
    });
    let voice = VoiceBridges {
        recognizer: create_recognizer(&session.config),
        synthesizer,
    };

    let mut app = TuiApp::with_event_channels(session, voice, event_tx, event_rx, config_event_tx)?;
    app.run().await
}
