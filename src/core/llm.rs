use async_trait::async_trait;

use super::error::Result;
use super::types::{CompletionRequest, StreamResponse};

/// A remote model that answers a dialogue with a stream of events.
#[async_trait]
pub trait ChatModel: Send + Sync {
    fn name(&self) -> &str;
    fn model(&self) -> &str;
    async fn stream(&self, request: CompletionRequest) -> Result<StreamResponse>;
}
