pub mod coordinator;
pub mod error;
pub mod llm;
pub mod memory;
pub mod safety;
pub mod types;

pub use coordinator::{APOLOGY, Coordinator, GenerationConfig, Reply, ReplyEvent, ReplyStream};
pub use error::{ChatError, Result};
pub use llm::ChatModel;
pub use memory::ConversationMemory;
pub use safety::SafetyFilter;
pub use types::{ConversationMessage, Role};
