//! agentplug-tools
//!
//! MCP tool servers, either a child process on stdio or a streamable HTTP
//! endpoint, and the glue that mounts their tools into a
//! [`FunctionRegistry`].
use std::sync::Arc;

use tracing::info;

use agentplug_core::config::{expand_str, ToolServerConfig, ToolTransport};
use agentplug_core::error::ToolError;
use agentplug_core::traits::ToolServer;
use agentplug_core::FunctionRegistry;

pub mod http;
pub mod mount;
pub mod output;
mod session;
pub mod stdio;

pub use http::{HttpLaunch, HttpToolServer};
pub use mount::{mount_server, mounted_name};
pub use output::call_output;
pub use stdio::{StdioLaunch, StdioToolServer};

/// Start or connect to the server described by `cfg`.
pub async fn connect(cfg: &ToolServerConfig) -> Result<Arc<dyn ToolServer>, ToolError> {
    let expand = |s: &str| expand_str(s).map_err(|e| ToolError::Server { server: cfg.name.clone(), reason: e.to_string() });
    match &cfg.transport {
        ToolTransport::Stdio { command, args, env, require_dir, timeout_secs } => {
            let launch = StdioLaunch {
                command: command.clone(),
                args: args.clone(),
                env: env.iter().map(|(k, v)| Ok((k.clone(), expand(v)?))).collect::<Result<_, ToolError>>()?,
                require_dir: require_dir.clone(),
                timeout_secs: *timeout_secs,
            };
            Ok(Arc::new(StdioToolServer::spawn(&cfg.name, &launch).await?))
        }
        ToolTransport::Http { endpoint, bearer_token, headers, timeout_secs } => {
            let launch = HttpLaunch {
                endpoint: expand(endpoint)?,
                bearer_token: bearer_token.as_deref().map(expand).transpose()?,
                headers: headers.iter().map(|(k, v)| Ok((k.clone(), expand(v)?))).collect::<Result<_, ToolError>>()?,
                timeout_secs: *timeout_secs,
            };
            Ok(Arc::new(HttpToolServer::connect(&cfg.name, &launch).await?))
        }
    }
}

/// Connect every enabled server and mount its tools. Returns the servers so
/// callers keep child processes alive for the session.
pub async fn mount_configured(registry: &mut FunctionRegistry, servers: &[ToolServerConfig]) -> Result<Vec<Arc<dyn ToolServer>>, ToolError> {
    let mut mounted = Vec::new();
    for cfg in servers {
        if !cfg.enabled {
            info!(server = %cfg.name, "tool server disabled, skipping");
            continue;
        }
        let server = connect(cfg).await?;
        mount_server(registry, &cfg.prefix, server.clone()).await?;
        mounted.push(server);
    }
    Ok(mounted)
}
