//! External collaborator contracts (§6) plus in-memory reference
//! implementations usable in tests and single-process deployments.
//!
//! Each contract is an async trait returning a crate-local error, one
//! trait per concern; the channel manager's recorded-sends test double
//! follows the same notifier/observer pattern used elsewhere for
//! execution events.

mod channel;
mod chat_memory;
mod clock;
mod error;
mod id;
mod llm;
mod workflow_store;

pub use channel::{ChannelManager, InMemoryChannelManager, OutgoingMessage};
pub use chat_memory::{ChatMemoryStore, ChatMessage, ChatRole, CreateMessageRequest, InMemoryChatMemoryStore};
pub use clock::{Clock, FrozenClock, SystemClock};
pub use error::CollabError;
pub use id::{IdGenerator, UuidGenerator};
pub use llm::{ChatOptions, ChatResponse, LlmClient, LlmMessage, StubLlmClient, TokenUsage};
pub use workflow_store::{InMemoryWorkflowStore, WorkflowStore};
