use std::sync::Arc;

use serde_json::Value;
use tracing::{info, warn};

use agentplug_core::FunctionRegistry;

use crate::client::ChatBackend;
use crate::error::ChatError;
use crate::message::{ChatMessage, Conversation, ToolCall};

/// Drives one user turn: completion, tool calls, completion, until the model
/// answers in text.
pub struct Agent {
    backend: Arc<dyn ChatBackend>,
    registry: Arc<FunctionRegistry>,
    max_tool_rounds: usize,
}

impl Agent {
    pub fn new(backend: Arc<dyn ChatBackend>, registry: Arc<FunctionRegistry>, max_tool_rounds: usize) -> Self {
        Self { backend, registry, max_tool_rounds }
    }

    pub fn registry(&self) -> &FunctionRegistry { &self.registry }

    /// Append `user_text`, run the completion loop and return the assistant's
    /// reply. Tool calls are executed one at a time in the order requested.
    pub async fn run_turn(&self, conversation: &mut Conversation, user_text: &str) -> Result<String, ChatError> {
        conversation.push(ChatMessage::user(user_text));
        let functions = self.registry.descriptors();
        let mut rounds = 0;

        loop {
            let reply = self.backend.complete(conversation.messages(), &functions).await?;
            if reply.tool_calls.is_empty() {
                let text = reply.content.clone().unwrap_or_default();
                conversation.push(reply);
                return Ok(text);
            }
            if rounds == self.max_tool_rounds {
                return Err(ChatError::ToolLoopExceeded(rounds));
            }
            rounds += 1;

            let calls = reply.tool_calls.clone();
            conversation.push(reply);
            for call in &calls {
                let output = self.call_tool(call).await;
                conversation.push(ChatMessage::tool(&call.id, output));
            }
        }
    }

    /// Run one tool call. Failures become text for the model to read.
    async fn call_tool(&self, call: &ToolCall) -> String {
        let name = &call.function.name;
        let args = match parse_arguments(&call.function.arguments) {
            Ok(args) => args,
            Err(e) => {
                warn!(function = %name, "undecodable tool arguments: {e}");
                return format!("Error: invalid JSON arguments: {e}");
            }
        };
        info!(function = %name, "calling function");
        match self.registry.invoke(name, args).await {
            Ok(Value::String(s)) => s,
            Ok(value) => value.to_string(),
            Err(e) => {
                warn!(function = %name, "function failed: {e:#}");
                format!("Error: {e:#}")
            }
        }
    }
}

fn parse_arguments(raw: &str) -> Result<Value, serde_json::Error> {
    if raw.trim().is_empty() {
        return Ok(Value::Object(serde_json::Map::new()));
    }
    serde_json::from_str(raw)
}
