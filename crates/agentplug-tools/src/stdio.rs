//! Tool server spawned as a child process, speaking MCP over its
//! stdin/stdout.

use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use rmcp::service::ServiceExt;
use rmcp::transport::{ConfigureCommandExt, TokioChildProcess};
use serde_json::Value;
use tokio::process::Command;
use tracing::info;

use agentplug_core::config::{expand_path, expand_str};
use agentplug_core::error::ToolError;
use agentplug_core::traits::ToolServer;
use agentplug_core::types::RemoteTool;

use crate::session::{within, Session};

pub struct StdioToolServer {
    session: Session,
}

/// How to launch a stdio tool server.
#[derive(Debug, Clone)]
pub struct StdioLaunch {
    pub command: String,
    pub args: Vec<String>,
    pub env: BTreeMap<String, String>,
    pub require_dir: Option<String>,
    /// Deadline for the handshake and for each request.
    pub timeout_secs: u64,
}

impl Default for StdioLaunch {
    fn default() -> Self {
        Self { command: String::new(), args: Vec::new(), env: BTreeMap::new(), require_dir: None, timeout_secs: 60 }
    }
}

impl StdioToolServer {
    /// Spawn the server and run the `initialize` handshake.
    pub async fn spawn(name: &str, launch: &StdioLaunch) -> Result<Self, ToolError> {
        let fail = |reason: String| ToolError::Server { server: name.to_string(), reason };

        if let Some(dir) = &launch.require_dir {
            let path = expand_path(dir).map_err(|e| fail(e.to_string()))?;
            if !path.is_dir() {
                return Err(ToolError::NotFound(format!("target path does not exist: {}", path.display())));
            }
        }

        let program = expand_str(&launch.command).map_err(|e| fail(e.to_string()))?;
        let args = launch
            .args
            .iter()
            .map(expand_str)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| fail(e.to_string()))?;

        info!(server = name, command = %program, "starting tool server");
        let transport = TokioChildProcess::new(Command::new(&program).configure(|cmd| {
            cmd.args(&args).envs(&launch.env);
        }))
        .map_err(|e| fail(format!("failed to start '{program}': {e}")))?;

        let timeout = Duration::from_secs(launch.timeout_secs.max(1));
        let service = within(name, timeout, "initialize", ().serve(transport)).await?;
        Ok(Self { session: Session::new(name, service, timeout) })
    }
}

#[async_trait]
impl ToolServer for StdioToolServer {
    fn name(&self) -> &str { self.session.name() }

    async fn list_tools(&self) -> Result<Vec<RemoteTool>, ToolError> {
        self.session.list_tools().await
    }

    async fn call_tool(&self, tool: &str, args: Value) -> Result<Value, ToolError> {
        self.session.call_tool(tool, args).await
    }
}
