//! Startup wiring shared by the `agentplug` binaries.
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;
use tracing_subscriber::EnvFilter;

use agentplug_core::config::AppConfig;
use agentplug_core::traits::ToolServer;
use agentplug_core::types::SearchResult;
use agentplug_core::FunctionRegistry;
use agentplug_embed::get_default_embedder;
use agentplug_plugins::{register_builtin, ContosoSearch};
use agentplug_vector::AzureSearchIndex;

/// Log to stderr, filtered by `RUST_LOG` (default `info`).
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    // Fails harmlessly when a subscriber is already installed (tests, repeated calls).
    let _ = tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).try_init();
}

/// Registered functions plus the tool servers backing any mounted ones.
/// Dropping this stops stdio tool servers.
pub struct Runtime {
    pub registry: FunctionRegistry,
    pub servers: Vec<Arc<dyn ToolServer>>,
}

/// Retrieval plugin built from configuration.
pub fn contoso_search(app: &AppConfig) -> Result<ContosoSearch> {
    let embedder = get_default_embedder(&app.embedding)?;
    let index = AzureSearchIndex::new(&app.search).context("building search index client")?;
    Ok(ContosoSearch::new(embedder, Arc::new(index)))
}

/// Register built-in plugins and, when `with_tool_servers` is set, mount the
/// configured external tool servers.
pub async fn bootstrap(app: &AppConfig, with_tool_servers: bool) -> Result<Runtime> {
    let mut registry = FunctionRegistry::new();
    let embedder = get_default_embedder(&app.embedding)?;
    let index = AzureSearchIndex::new(&app.search).context("building search index client")?;
    register_builtin(&mut registry, app, embedder, Arc::new(index))?;

    let servers = if with_tool_servers {
        agentplug_tools::mount_configured(&mut registry, &app.tool_servers)
            .await
            .context("mounting tool servers")?
    } else {
        Vec::new()
    };
    info!(functions = registry.len(), servers = servers.len(), "registry ready");
    Ok(Runtime { registry, servers })
}

/// One line per result: `[citation] (score) content`.
pub fn format_citations(results: &[SearchResult]) -> String {
    results
        .iter()
        .enumerate()
        .map(|(i, r)| {
            format!(
                "{}. [{}] ({:.3}) {}",
                i + 1,
                r.citation.as_deref().unwrap_or("unknown source"),
                r.score.unwrap_or_default(),
                r.content.as_deref().unwrap_or("").trim()
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}
