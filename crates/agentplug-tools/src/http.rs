//! Tool server reached over MCP streamable HTTP.
//!
//! The bearer token and extra headers ride on the HTTP client as defaults,
//! so every request of the session carries them.

use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION};
use reqwest::Client;
use rmcp::service::ServiceExt;
use rmcp::transport::streamable_http_client::StreamableHttpClientTransportConfig;
use rmcp::transport::StreamableHttpClientTransport;
use serde_json::Value;
use tracing::info;

use agentplug_core::error::ToolError;
use agentplug_core::traits::ToolServer;
use agentplug_core::types::RemoteTool;

use crate::session::{within, Session};

pub struct HttpToolServer {
    session: Session,
}

/// Connection settings for an HTTP tool server.
#[derive(Debug, Clone, Default)]
pub struct HttpLaunch {
    pub endpoint: String,
    pub bearer_token: Option<String>,
    pub headers: BTreeMap<String, String>,
    pub timeout_secs: u64,
}

impl HttpToolServer {
    /// Build the client and run the `initialize` handshake.
    pub async fn connect(name: &str, launch: &HttpLaunch) -> Result<Self, ToolError> {
        let fail = |reason: String| ToolError::Server { server: name.to_string(), reason };

        let mut headers = HeaderMap::new();
        if let Some(token) = launch.bearer_token.as_deref().filter(|t| !t.is_empty()) {
            let value = HeaderValue::from_str(&format!("Bearer {token}")).map_err(|e| fail(format!("bad bearer token: {e}")))?;
            headers.insert(AUTHORIZATION, value);
        }
        for (key, value) in &launch.headers {
            let key = HeaderName::from_bytes(key.as_bytes()).map_err(|e| fail(format!("bad header name '{key}': {e}")))?;
            let value = HeaderValue::from_str(value).map_err(|e| fail(format!("bad header value: {e}")))?;
            headers.insert(key, value);
        }

        let timeout = Duration::from_secs(launch.timeout_secs.max(1));
        let client = Client::builder()
            .default_headers(headers)
            .build()
            .map_err(|e| fail(e.to_string()))?;

        info!(server = name, endpoint = %launch.endpoint, "connecting to tool server");
        let transport = StreamableHttpClientTransport::with_client(
            client,
            StreamableHttpClientTransportConfig::with_uri(launch.endpoint.as_str()),
        );
        let service = within(name, timeout, "initialize", ().serve(transport)).await?;
        Ok(Self { session: Session::new(name, service, timeout) })
    }
}

#[async_trait]
impl ToolServer for HttpToolServer {
    fn name(&self) -> &str { self.session.name() }

    async fn list_tools(&self) -> Result<Vec<RemoteTool>, ToolError> {
        self.session.list_tools().await
    }

    async fn call_tool(&self, tool: &str, args: Value) -> Result<Value, ToolError> {
        self.session.call_tool(tool, args).await
    }
}
