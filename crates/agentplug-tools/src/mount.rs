use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tracing::{info, warn};

use agentplug_core::error::ToolError;
use agentplug_core::traits::{FunctionHandler, ToolServer};
use agentplug_core::types::FunctionDescriptor;
use agentplug_core::FunctionRegistry;

use crate::output::call_output;

/// Registry entry forwarding to one tool on a remote server.
struct RemoteFunction {
    server: Arc<dyn ToolServer>,
    tool: String,
}

#[async_trait]
impl FunctionHandler for RemoteFunction {
    async fn invoke(&self, args: Value) -> anyhow::Result<Value> {
        let args = if args.is_null() { Value::Object(serde_json::Map::new()) } else { args };
        let result = self.server.call_tool(&self.tool, args).await.inspect_err(|e| {
            warn!(server = self.server.name(), tool = %self.tool, "tool call failed: {e}");
        })?;
        Ok(call_output(&self.tool, result)?)
    }
}

/// Name under which a remote tool is registered.
///
/// Characters outside `[A-Za-z0-9_-]` are replaced with `_` so the name is
/// accepted as a chat function name.
pub fn mounted_name(prefix: &str, tool: &str) -> String {
    format!("{prefix}-{tool}")
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' || c == '-' { c } else { '_' })
        .collect()
}

/// List the server's tools and register each as `{prefix}-{tool}`.
/// Returns how many functions were added.
pub async fn mount_server(registry: &mut FunctionRegistry, prefix: &str, server: Arc<dyn ToolServer>) -> Result<usize, ToolError> {
    let tools = server.list_tools().await?;
    for tool in &tools {
        let descriptor = FunctionDescriptor::new(
            mounted_name(prefix, &tool.name),
            tool.description.clone().unwrap_or_default(),
            tool.input_schema.clone(),
        );
        registry.register(descriptor, Arc::new(RemoteFunction { server: server.clone(), tool: tool.name.clone() }))?;
    }
    info!(server = server.name(), prefix, count = tools.len(), "mounted tool server");
    Ok(tools.len())
}
