use bytes::{Buf, Bytes, BytesMut};
use futures::stream::{self, Stream, StreamExt};

use crate::providers::error::ProviderError;

/// One dispatched server-sent event. `data` is the `data:` lines joined by
/// `\n`; the `[DONE]` sentinel is passed through untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SseEvent {
    pub event_type: Option<String>,
    pub data: String,
}

/// Incremental `text/event-stream` decoder.
///
/// Bytes are buffered until a full line is available, so a multi-byte
/// character split across two network reads is decoded intact.
#[derive(Debug, Default)]
pub struct SseParser {
    pending: BytesMut,
    event_type: Option<String>,
    data: Option<String>,
}

impl SseParser {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn process_chunk(&mut self, chunk: &[u8]) -> Vec<SseEvent> {
        self.pending.extend_from_slice(chunk);

        let mut events = Vec::new();
        while let Some(end) = self.pending.iter().position(|&b| b == b'\n') {
            let raw = self.pending.split_to(end);
            self.pending.advance(1);

            let line = String::from_utf8_lossy(&raw);
            if let Some(event) = self.feed_line(line.trim_end_matches('\r')) {
                events.push(event);
            }
        }
        events
    }

    /// Dispatches an event left open by a stream that ended without the
    /// closing blank line.
    pub fn finish(&mut self) -> Option<SseEvent> {
        self.pending.clear();
        self.dispatch()
    }

    fn feed_line(&mut self, line: &str) -> Option<SseEvent> {
        if line.is_empty() {
            return self.dispatch();
        }
        if line.starts_with(':') {
            return None;
        }

        let (field, value) = line.split_once(':').unwrap_or((line, ""));
        let value = value.strip_prefix(' ').unwrap_or(value);

        match field {
            "event" => self.event_type = Some(value.to_string()),
            "data" => match &mut self.data {
                Some(data) => {
                    data.push('\n');
                    data.push_str(value);
                }
                None => self.data = Some(value.to_string()),
            },
            _ => {}
        }
        None
    }

    fn dispatch(&mut self) -> Option<SseEvent> {
        let event_type = self.event_type.take();
        self.data.take().map(|data| SseEvent { event_type, data })
    }

    pub fn parse_stream<S>(byte_stream: S) -> impl Stream<Item = Result<SseEvent, ProviderError>>
    where
        S: Stream<Item = Result<Bytes, reqwest::Error>> + Unpin,
    {
        stream::unfold(
            Some((byte_stream, Self::new())),
            |state| async move {
                let (mut bytes, mut parser) = state?;
                match bytes.next().await {
                    Some(Ok(chunk)) => {
                        let events = parser.process_chunk(&chunk).into_iter().map(Ok);
                        Some((events.collect::<Vec<_>>(), Some((bytes, parser))))
                    }
                    Some(Err(e)) => Some((vec![Err(ProviderError::StreamError(e.to_string()))], None)),
                    None => Some((parser.finish().into_iter().map(Ok).collect(), None)),
                }
            },
        )
        .flat_map(stream::iter)
    }
}
