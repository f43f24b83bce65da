use crate::core::types::{CompletionRequest, ConversationMessage, StreamEvent};
use crate::providers::error::ProviderError;
use crate::providers::types::ModelId;

use super::types::{ApiError, ChatCompletionChunk, ChatCompletionRequest, ChatMessage};

pub fn to_api_request(model: &ModelId, request: &CompletionRequest) -> ChatCompletionRequest {
    ChatCompletionRequest {
        model: model.as_str().to_string(),
        messages: request.messages.iter().map(to_chat_message).collect(),
        temperature: Some(request.temperature),
        max_tokens: Some(request.max_tokens),
        stream: None,
    }
}

fn to_chat_message(message: &ConversationMessage) -> ChatMessage {
    ChatMessage {
        role: message.role().as_str().to_string(),
        content: message.content().to_string(),
    }
}

/// Maps one SSE `data:` payload to zero or more stream events.
pub fn parse_stream_event(data: &str) -> Result<Vec<StreamEvent>, ProviderError> {
    let data = data.trim();
    if data == "[DONE]" {
        return Ok(vec![StreamEvent::MessageStop]);
    }

    if let Ok(api_error) = serde_json::from_str::<ApiError>(data) {
        return Err(ProviderError::StreamError(api_error.error.message));
    }

    let chunk: ChatCompletionChunk = match serde_json::from_str(data) {
        Ok(chunk) => chunk,
        Err(e) => {
            tracing::debug!(error = %e, "Skipping unparseable stream chunk");
            return Ok(Vec::new());
        }
    };

    let Some(choice) = chunk.choices.into_iter().next() else {
        return Ok(Vec::new());
    };

    let mut events = Vec::new();

    if let Some(text) = choice.delta.content.filter(|t| !t.is_empty()) {
        events.push(StreamEvent::TextDelta { text });
    }
    if let Some(text) = choice.delta.refusal.filter(|t| !t.is_empty()) {
        events.push(StreamEvent::TextDelta { text });
    }

    if let Some(reason) = choice.finish_reason {
        tracing::debug!(finish_reason = %reason, "Completion finished");
        events.push(StreamEvent::MessageStop);
    }

    Ok(events)
}
