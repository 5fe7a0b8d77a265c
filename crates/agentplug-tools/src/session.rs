//! A connected MCP client session, whichever transport carried the handshake.

use std::future::Future;
use std::time::Duration;

use rmcp::model::{CallToolRequestParam, Tool};
use rmcp::service::RunningService;
use rmcp::RoleClient;
use serde_json::Value;
use tracing::debug;

use agentplug_core::error::ToolError;
use agentplug_core::types::RemoteTool;

pub(crate) struct Session {
    name: String,
    service: RunningService<RoleClient, ()>,
    timeout: Duration,
}

/// Run `fut` under the server's deadline, mapping both failure kinds to
/// [`ToolError::Server`].
pub(crate) async fn within<T, E, F>(server: &str, timeout: Duration, what: &str, fut: F) -> Result<T, ToolError>
where
    E: std::fmt::Display,
    F: Future<Output = Result<T, E>>,
{
    match tokio::time::timeout(timeout, fut).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(e)) => Err(ToolError::Server { server: server.to_string(), reason: format!("{what} failed: {e}") }),
        Err(_) => Err(ToolError::Server {
            server: server.to_string(),
            reason: format!("{what} timed out after {}s", timeout.as_secs_f32()),
        }),
    }
}

impl Session {
    pub(crate) fn new(name: &str, service: RunningService<RoleClient, ()>, timeout: Duration) -> Self {
        if let Some(info) = service.peer_info() {
            debug!(server = name, peer = %info.server_info.name, "tool server initialized");
        }
        Self { name: name.to_string(), service, timeout }
    }

    pub(crate) fn name(&self) -> &str { &self.name }

    pub(crate) async fn list_tools(&self) -> Result<Vec<RemoteTool>, ToolError> {
        let listed = within(&self.name, self.timeout, "tools/list", self.service.list_tools(Default::default())).await?;
        Ok(listed.tools.into_iter().map(remote_tool).collect())
    }

    pub(crate) async fn call_tool(&self, tool: &str, args: Value) -> Result<Value, ToolError> {
        let params = CallToolRequestParam {
            name: tool.to_string().into(),
            arguments: args.as_object().cloned(),
            task: None,
        };
        let result = within(&self.name, self.timeout, "tools/call", self.service.call_tool(params)).await?;
        serde_json::to_value(result)
            .map_err(|e| ToolError::Server { server: self.name.clone(), reason: format!("unencodable tool result: {e}") })
    }
}

fn remote_tool(tool: Tool) -> RemoteTool {
    RemoteTool {
        name: tool.name.to_string(),
        description: tool.description.map(|d| d.to_string()),
        input_schema: Value::Object(tool.input_schema.as_ref().clone()),
    }
}
