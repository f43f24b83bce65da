use serde::{Deserialize, Serialize};

use crate::core::types::{Role, StreamEvent};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientFrame {
    Message { content: String, role: Role },
}

impl ClientFrame {
    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self::Message {
            content: content.into(),
            role: Role::User,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerFrame {
    Typing,
    TypingStop,
    Message { role: Role, content: String },
}

impl ServerFrame {
    /// Parses a text frame. Unknown or malformed frames yield `None`.
    #[must_use]
    pub fn decode(text: &str) -> Option<Self> {
        match serde_json::from_str(text) {
            Ok(frame) => Some(frame),
            Err(e) => {
                tracing::debug!(error = %e, frame = %text, "Ignoring unknown server frame");
                None
            }
        }
    }

    /// Stream events for this frame. An assistant message completes the reply.
    #[must_use]
    pub fn into_events(self) -> Vec<StreamEvent> {
        match self {
            Self::Typing => vec![StreamEvent::TypingStarted],
            Self::TypingStop => vec![StreamEvent::TypingStopped],
            Self::Message {
                role: Role::Assistant,
                content,
            } => vec![StreamEvent::TextDelta { text: content }, StreamEvent::MessageStop],
            Self::Message { role, .. } => {
                tracing::debug!(%role, "Ignoring non-assistant message frame");
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_frame_wire_shape() {
        let json = serde_json::to_string(&ClientFrame::user("hello")).unwrap();
        assert_eq!(json, r#"{"type":"message","content":"hello","role":"user"}"#);
    }

    #[test]
    fn test_decodes_server_frames() {
        assert_eq!(ServerFrame::decode(r#"{"type":"typing"}"#), Some(ServerFrame::Typing));
        assert_eq!(
            ServerFrame::decode(r#"{"type":"typing_stop"}"#),
            Some(ServerFrame::TypingStop)
        );
        assert_eq!(
            ServerFrame::decode(r#"{"type":"message","role":"assistant","content":"hi"}"#),
            Some(ServerFrame::Message {
                role: Role::Assistant,
                content: "hi".into()
            })
        );
    }

    #[test]
    fn test_unknown_frames_are_ignored() {
        assert!(ServerFrame::decode(r#"{"type":"presence","count":3}"#).is_none());
        assert!(ServerFrame::decode("not json").is_none());
        assert!(ServerFrame::decode(r#"{"type":"message","role":"tool","content":"x"}"#).is_none());
    }

    #[test]
    fn test_assistant_message_completes_reply() {
        let events = ServerFrame::Message {
            role: Role::Assistant,
            content: "done".into(),
        }
        .into_events();

        assert_eq!(
            events,
            vec![
                StreamEvent::TextDelta {
                    text: "done".into()
                },
                StreamEvent::MessageStop
            ]
        );
    }

    #[test]
    fn test_user_echo_produces_nothing() {
        let events = ServerFrame::Message {
            role: Role::User,
            content: "echo".into(),
        }
        .into_events();
        assert!(events.is_empty());
    }
}
