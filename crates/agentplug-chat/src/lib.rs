//! agentplug-chat
//!
//! Chat orchestration: a chat-completions client, the message history, and
//! the [`Agent`] loop that lets the model call registered functions.
pub mod agent;
pub mod client;
pub mod error;
pub mod message;

pub use agent::Agent;
pub use client::{tool_definition, ChatBackend, ChatClient};
pub use error::ChatError;
pub use message::{ChatMessage, Conversation, Role, ToolCall};
