use super::AppEvent;
use crate::voice::{SpeechSynthesizer, TranscriptCallback};
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedSender;
use tokio::sync::watch;

/// Recognizer callback that posts each final transcript to the app loop.
#[must_use]
pub fn transcript_sender(sender: UnboundedSender<AppEvent>) -> TranscriptCallback {
    Box::new(move |text| {
        let _ = sender.send(AppEvent::Transcript(text));
    })
}

/// Mirrors recognizer state changes into app events until either side closes.
pub async fn forward_listening(mut state: watch::Receiver<bool>, sender: UnboundedSender<AppEvent>) {
    while state.changed().await.is_ok() {
        let listening = *state.borrow_and_update();
        if sender.send(AppEvent::ListeningChanged(listening)).is_err() {
            break;
        }
    }
}

pub async fn speak_reply(
    synthesizer: Arc<dyn SpeechSynthesizer>,
    text: String,
    sender: UnboundedSender<AppEvent>,
) {
    let level_sender = sender.clone();
    let on_level = move |level: f32| {
        let _ = level_sender.send(AppEvent::SpeechLevel(level));
    };

    let outcome = synthesizer.speak_with_levels(&text, &on_level).await;
    if let Err(e) = &outcome {
        tracing::warn!(error = %e, synthesizer = synthesizer.name(), "Speech playback failed");
    }
    let _ = sender.send(AppEvent::SpeechFinished(outcome.err().map(|e| e.to_string())));
}
