//! Azure OpenAI chat-completions client.

use std::time::Duration;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::debug;

use agentplug_core::config::ChatConfig;
use agentplug_core::types::FunctionDescriptor;

use crate::error::ChatError;
use crate::message::ChatMessage;

/// One completion step: history and available functions in, assistant message out.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    async fn complete(&self, messages: &[ChatMessage], functions: &[&FunctionDescriptor]) -> Result<ChatMessage, ChatError>;
}

pub struct ChatClient {
    client: reqwest::Client,
    url: String,
    api_key: String,
    temperature: f32,
}

#[derive(Serialize)]
struct CompletionRequest<'a> {
    messages: &'a [ChatMessage],
    temperature: f32,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_choice: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    parallel_tool_calls: Option<bool>,
}

#[derive(Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChatMessage,
}

impl ChatClient {
    pub fn new(config: &ChatConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Self::with_client(client, config)
    }

    pub fn with_client(client: reqwest::Client, config: &ChatConfig) -> Result<Self> {
        if config.endpoint.trim().is_empty() { return Err(anyhow!("chat.endpoint is not configured")); }
        if config.deployment.trim().is_empty() { return Err(anyhow!("chat.deployment is not configured")); }
        let url = format!(
            "{}/openai/deployments/{}/chat/completions?api-version={}",
            config.endpoint.trim_end_matches('/'),
            config.deployment,
            config.api_version
        );
        Ok(Self { client, url, api_key: config.api_key.clone(), temperature: config.temperature })
    }
}

/// Tool definition advertised to the model for a registered function.
pub fn tool_definition(descriptor: &FunctionDescriptor) -> Value {
    let description = match &descriptor.returns {
        Some(returns) => format!("{} {}", descriptor.description, returns),
        None => descriptor.description.clone(),
    };
    json!({
        "type": "function",
        "function": {
            "name": descriptor.name,
            "description": description,
            "parameters": descriptor.parameters,
        }
    })
}

#[async_trait]
impl ChatBackend for ChatClient {
    async fn complete(&self, messages: &[ChatMessage], functions: &[&FunctionDescriptor]) -> Result<ChatMessage, ChatError> {
        let has_tools = !functions.is_empty();
        let request = CompletionRequest {
            messages,
            temperature: self.temperature,
            tools: functions.iter().map(|d| tool_definition(d)).collect(),
            tool_choice: has_tools.then_some("auto"),
            parallel_tool_calls: has_tools.then_some(false),
        };
        debug!(messages = messages.len(), tools = functions.len(), "requesting chat completion");

        let response = self
            .client
            .post(&self.url)
            .header("api-key", &self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| ChatError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ChatError::Status { status: status.as_u16(), body });
        }
        let body = response.text().await.map_err(|e| ChatError::Transport(e.to_string()))?;
        let parsed: CompletionResponse = serde_json::from_str(&body).map_err(|e| ChatError::Malformed(e.to_string()))?;
        parsed
            .choices
            .into_iter()
            .next()
            .map(|c| c.message)
            .ok_or_else(|| ChatError::Malformed("no choices in response".into()))
    }
}
