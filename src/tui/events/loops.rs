use super::{AppEvent, POLL_TIMEOUT, SCROLL_DELTA, TICK_INTERVAL};
use crate::core::error::Result;
use crossterm::event::{self, Event as CrosstermEvent, KeyEventKind, MouseEventKind};
use tokio::sync::mpsc::UnboundedSender;

/// Maps a raw terminal event onto the app's event set.
///
/// Key releases and repeats are dropped; some terminals report both and
/// every keystroke would otherwise be handled twice.
fn translate(event: CrosstermEvent) -> Option<AppEvent> {
    match event {
        CrosstermEvent::Key(key) if key.kind == KeyEventKind::Press => Some(AppEvent::Input(key)),
        CrosstermEvent::Paste(text) if !text.is_empty() => Some(AppEvent::Paste(text)),
        CrosstermEvent::Resize(w, h) => Some(AppEvent::Resize(w, h)),
        CrosstermEvent::Mouse(mouse) => match mouse.kind {
            MouseEventKind::ScrollUp => Some(AppEvent::MouseScroll(-SCROLL_DELTA)),
            MouseEventKind::ScrollDown => Some(AppEvent::MouseScroll(SCROLL_DELTA)),
            _ => None,
        },
        _ => None,
    }
}

pub async fn terminal_event_loop(tx: UnboundedSender<AppEvent>) -> Result<()> {
    loop {
        if !event::poll(POLL_TIMEOUT)? {
            continue;
        }
        let Some(app_event) = translate(event::read()?) else {
            continue;
        };
        if tx.send(app_event).is_err() {
            tracing::debug!("event receiver gone, stopping terminal loop");
            return Ok(());
        }
    }
}

pub async fn tick_loop(tx: UnboundedSender<AppEvent>) {
    let mut interval = tokio::time::interval(TICK_INTERVAL);
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
    while tx.send(AppEvent::Tick).is_ok() {
        interval.tick().await;
    }
}
