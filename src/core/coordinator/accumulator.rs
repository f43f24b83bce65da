use std::collections::VecDeque;

use super::reply::ReplyEvent;
use crate::core::types::StreamEvent;

/// Folds transport events into reply events and the full reply text.
#[derive(Debug, Default)]
pub(super) struct ReplyAccumulator {
    text: String,
    typing: bool,
    saw_typing: bool,
    fragments: usize,
}

impl ReplyAccumulator {
    /// Returns `true` once the transport signalled the end of the reply.
    pub fn handle(&mut self, event: StreamEvent, out: &mut VecDeque<ReplyEvent>) -> bool {
        match event {
            StreamEvent::TypingStarted => self.set_typing(true, out),
            StreamEvent::TypingStopped => self.set_typing(false, out),
            StreamEvent::TextDelta { text } => self.push_fragment(text, out),
            StreamEvent::MessageStop => {
                self.finish(out);
                return true;
            }
        }
        false
    }

    pub fn finish(&mut self, out: &mut VecDeque<ReplyEvent>) {
        self.set_typing(false, out);
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn into_text(self) -> String {
        self.text
    }

    pub const fn fragments(&self) -> usize {
        self.fragments
    }

    fn push_fragment(&mut self, text: String, out: &mut VecDeque<ReplyEvent>) {
        if text.is_empty() {
            return;
        }
        if !self.saw_typing {
            self.set_typing(true, out);
        }
        self.text.push_str(&text);
        self.fragments += 1;
        out.push_back(ReplyEvent::Fragment(text));
    }

    fn set_typing(&mut self, typing: bool, out: &mut VecDeque<ReplyEvent>) {
        if typing {
            self.saw_typing = true;
        }
        if self.typing != typing {
            self.typing = typing;
            out.push_back(ReplyEvent::Typing(typing));
        }
    }
}
