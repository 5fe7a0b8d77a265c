use std::time::Duration;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use tracing::debug;

use agentplug_core::config::SearchConfig;
use agentplug_core::error::IndexError;
use agentplug_core::traits::VectorIndex;
use agentplug_core::types::{SearchHit, VectorQuery};

use crate::schema::{SearchRequest, SearchResponse};

/// Client for an Azure AI Search compatible index service.
pub struct AzureSearchIndex {
	client: reqwest::Client,
	endpoint: String,
	api_key: String,
	api_version: String,
}

impl AzureSearchIndex {
	pub fn new(config: &SearchConfig) -> Result<Self> {
		let client = reqwest::Client::builder().timeout(Duration::from_secs(config.timeout_secs)).build()?;
		Self::with_client(client, config)
	}

	pub fn with_client(client: reqwest::Client, config: &SearchConfig) -> Result<Self> {
		if config.endpoint.trim().is_empty() { return Err(anyhow!("search.endpoint is not configured")); }
		Ok(Self {
			client,
			endpoint: config.endpoint.trim_end_matches('/').to_string(),
			api_key: config.api_key.clone(),
			api_version: config.api_version.clone(),
		})
	}

	fn search_url(&self, index_name: &str) -> String {
		format!("{}/indexes/{}/docs/search?api-version={}", self.endpoint, index_name, self.api_version)
	}
}

#[async_trait]
impl VectorIndex for AzureSearchIndex {
	async fn vector_search(&self, query: &VectorQuery) -> Result<Vec<SearchHit>, IndexError> {
		debug!(index = %query.index_name, field = %query.target_field, top = query.top, "vector search");
		let response = self
			.client
			.post(self.search_url(&query.index_name))
			.header("api-key", &self.api_key)
			.json(&SearchRequest::from_query(query))
			.send()
			.await
			.map_err(|e| IndexError::Transport(e.to_string()))?;

		let status = response.status();
		if !status.is_success() {
			let body = response.text().await.unwrap_or_default();
			return Err(IndexError::Status { status: status.as_u16(), body });
		}
		let body = response.text().await.map_err(|e| IndexError::Transport(e.to_string()))?;
		let parsed: SearchResponse = serde_json::from_str(&body).map_err(|e| IndexError::Malformed(e.to_string()))?;
		debug!(hits = parsed.value.len(), "vector search returned");
		Ok(parsed.value.into_iter().map(SearchHit::from).collect())
	}
}
