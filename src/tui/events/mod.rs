mod handler;
mod loops;

pub use handler::{forward_listening, speak_reply, transcript_sender};
pub use loops::{terminal_event_loop, tick_loop};

use crossterm::event::KeyEvent;
use std::time::Duration;

pub const POLL_TIMEOUT: Duration = Duration::from_millis(100);
pub const TICK_INTERVAL: Duration = Duration::from_millis(16);
pub const SCROLL_DELTA: i16 = 3;

#[derive(Debug)]
pub enum AppEvent {
    Input(KeyEvent),
    Paste(String),
    MouseScroll(i16),
    Resize(u16, u16),
    Tick,

    Typing(bool),
    ReplyFragment(String),
    ReplyComplete {
        text: String,
    },
    /// Stopped by the safety filter before reaching the model.
    ReplyRefused(String),
    ReplyFailed {
        message: String,
        remote: bool,
    },
    ReplyCancelled,
    MemoryCleared,
    ModelChanged {
        model: String,
    },
    ModelSwitchError(String),

    Transcript(String),
    ListeningChanged(bool),
    SpeechLevel(f32),
    /// Playback ended; carries the error text if it failed.
    SpeechFinished(Option<String>),
}
