use crate::config::persistence::{ConfigError, ConfigPatch, ConfigPersister};
use std::sync::Arc;
use tokio::sync::mpsc;

/// Runtime settings changes that should outlive the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigEvent {
    ModelChanged { model: String },
}

pub type ConfigEventSender = mpsc::UnboundedSender<ConfigEvent>;

/// Background task writing [`ConfigEvent`]s to `config.toml`.
pub struct ConfigEventHandler {
    persister: Arc<ConfigPersister>,
    event_rx: mpsc::UnboundedReceiver<ConfigEvent>,
}

impl ConfigEventHandler {
    #[must_use]
    pub fn new(persister: Arc<ConfigPersister>) -> (Self, ConfigEventSender) {
        let (tx, event_rx) = mpsc::unbounded_channel();
        (Self { persister, event_rx }, tx)
    }

    /// Runs until every sender is dropped. Model switches queued while a
    /// write was in flight collapse into one write of the latest model.
    pub async fn run(mut self) {
        while let Some(first) = self.event_rx.recv().await {
            let mut latest = first;
            while let Ok(next) = self.event_rx.try_recv() {
                latest = next;
            }

            if let Err(e) = self.persist(&latest) {
                tracing::warn!(error = %e, ?latest, "Config change kept for this session only");
            }
        }
    }

    fn persist(&self, event: &ConfigEvent) -> Result<(), ConfigError> {
        match event {
            ConfigEvent::ModelChanged { model } => {
                self.persister.apply_patch(&ConfigPatch::model(model))?;
                tracing::info!(%model, path = %self.persister.path().display(), "Saved model choice");
            }
        }
        Ok(())
    }
}
