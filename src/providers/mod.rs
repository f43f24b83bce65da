pub mod error;
pub mod factory;
pub mod http;
pub mod types;

pub mod mock;
pub mod openai;
pub mod websocket;

pub use factory::{create_chat_model, create_chat_model_for};
pub use mock::{MockChatModel, MockReply};
pub use openai::OpenAIProvider;
pub use types::ApiKey;
pub use websocket::{WebSocketConfig, WebSocketTransport};
