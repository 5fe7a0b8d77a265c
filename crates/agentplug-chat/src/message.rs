use serde::{Deserialize, Deserializer, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
    Tool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionCall {
    pub name: String,
    /// JSON-encoded argument object, exactly as the model produced it.
    #[serde(default)]
    pub arguments: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    pub id: String,
    #[serde(rename = "type", default = "function_kind")]
    pub kind: String,
    pub function: FunctionCall,
}

fn function_kind() -> String {
    "function".to_string()
}

impl ToolCall {
    pub fn new(id: impl Into<String>, name: impl Into<String>, arguments: impl Into<String>) -> Self {
        Self { id: id.into(), kind: function_kind(), function: FunctionCall { name: name.into(), arguments: arguments.into() } }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty", deserialize_with = "null_as_empty")]
    pub tool_calls: Vec<ToolCall>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<ToolCall>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<ToolCall>>::deserialize(deserializer)?.unwrap_or_default())
}

impl ChatMessage {
    fn text(role: Role, content: impl Into<String>) -> Self {
        Self { role, content: Some(content.into()), tool_calls: vec![], tool_call_id: None }
    }

    pub fn system(content: impl Into<String>) -> Self { Self::text(Role::System, content) }

    pub fn user(content: impl Into<String>) -> Self { Self::text(Role::User, content) }

    pub fn assistant(content: impl Into<String>) -> Self { Self::text(Role::Assistant, content) }

    pub fn assistant_with_tools(content: Option<String>, tool_calls: Vec<ToolCall>) -> Self {
        Self { role: Role::Assistant, content, tool_calls, tool_call_id: None }
    }

    pub fn tool(tool_call_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self { role: Role::Tool, content: Some(content.into()), tool_calls: vec![], tool_call_id: Some(tool_call_id.into()) }
    }
}

/// Ordered message history for one chat session.
#[derive(Debug, Clone, Default)]
pub struct Conversation {
    messages: Vec<ChatMessage>,
}

impl Conversation {
    pub fn new(system_prompt: Option<&str>) -> Self {
        let messages = system_prompt
            .filter(|p| !p.trim().is_empty())
            .map(|p| vec![ChatMessage::system(p)])
            .unwrap_or_default();
        Self { messages }
    }

    pub fn push(&mut self, message: ChatMessage) { self.messages.push(message); }

    pub fn messages(&self) -> &[ChatMessage] { &self.messages }

    pub fn len(&self) -> usize { self.messages.len() }

    pub fn is_empty(&self) -> bool { self.messages.is_empty() }

    /// Drop everything except the system prompt.
    pub fn clear(&mut self) {
        self.messages.retain(|m| m.role == Role::System);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn tool_messages_serialize_in_wire_shape() {
        let call = ChatMessage::assistant_with_tools(None, vec![ToolCall::new("call_1", "contoso_search", "{\"query\":\"x\"}")]);
        assert_eq!(
            serde_json::to_value(&call).unwrap(),
            json!({"role": "assistant", "tool_calls": [{"id": "call_1", "type": "function", "function": {"name": "contoso_search", "arguments": "{\"query\":\"x\"}"}}]})
        );
        assert_eq!(
            serde_json::to_value(ChatMessage::tool("call_1", "[]")).unwrap(),
            json!({"role": "tool", "content": "[]", "tool_call_id": "call_1"})
        );
    }

    #[test]
    fn null_tool_calls_decode_as_empty() {
        let msg: ChatMessage = serde_json::from_value(json!({"role": "assistant", "content": "hi", "tool_calls": null})).unwrap();
        assert_eq!(msg, ChatMessage::assistant("hi"));
    }

    #[test]
    fn clear_keeps_system_prompt() {
        let mut conv = Conversation::new(Some("be brief"));
        conv.push(ChatMessage::user("hi"));
        conv.clear();
        assert_eq!(conv.messages(), &[ChatMessage::system("be brief")]);
        assert!(Conversation::new(Some("  ")).is_empty());
    }
}
