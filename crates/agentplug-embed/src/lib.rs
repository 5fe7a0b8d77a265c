//! agentplug-embed
//!
//! Embedding service clients. [`AzureOpenAiEmbedder`] talks to an Azure OpenAI
//! compatible `/embeddings` deployment; [`FakeEmbedder`] produces deterministic
//! vectors for tests and offline development.
//!
//! Respects `APP_USE_FAKE_EMBEDDINGS=1` (or `embedding.use_fake`) to switch to
//! the fake embedder.
use std::hash::{Hash, Hasher};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use twox_hash::XxHash64;

use agentplug_core::config::EmbeddingConfig;
use agentplug_core::error::EmbedError;
pub use agentplug_core::traits::Embedder;

pub struct AzureOpenAiEmbedder {
    client: reqwest::Client,
    url: String,
    api_key: String,
    dim: usize,
}

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    input: &'a [String],
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Deserialize)]
struct EmbeddingData {
    #[serde(default)]
    index: usize,
    embedding: Vec<f32>,
}

impl AzureOpenAiEmbedder {
    pub fn new(config: &EmbeddingConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Self::with_client(client, config)
    }

    pub fn with_client(client: reqwest::Client, config: &EmbeddingConfig) -> Result<Self> {
        if config.endpoint.trim().is_empty() { return Err(anyhow!("embedding.endpoint is not configured")); }
        if config.deployment.trim().is_empty() { return Err(anyhow!("embedding.deployment is not configured")); }
        let url = format!(
            "{}/openai/deployments/{}/embeddings?api-version={}",
            config.endpoint.trim_end_matches('/'),
            config.deployment,
            config.api_version
        );
        Ok(Self { client, url, api_key: config.api_key.clone(), dim: config.dimension })
    }
}

#[async_trait]
impl Embedder for AzureOpenAiEmbedder {
    fn dim(&self) -> usize { self.dim }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbedError> {
        if texts.is_empty() { return Ok(vec![]); }
        debug!(count = texts.len(), "requesting embeddings");
        let response = self
            .client
            .post(&self.url)
            .header("api-key", &self.api_key)
            .json(&EmbeddingRequest { input: texts })
            .send()
            .await
            .map_err(|e| EmbedError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(EmbedError::Status { status: status.as_u16(), body });
        }
        let body = response.text().await.map_err(|e| EmbedError::Transport(e.to_string()))?;
        let parsed: EmbeddingResponse = serde_json::from_str(&body).map_err(|e| EmbedError::Malformed(e.to_string()))?;
        if parsed.data.len() != texts.len() {
            return Err(EmbedError::Malformed(format!("expected {} embeddings, got {}", texts.len(), parsed.data.len())));
        }
        let mut data = parsed.data;
        data.sort_by_key(|d| d.index);
        Ok(data.into_iter().map(|d| d.embedding).collect())
    }
}

/// Deterministic token-hash embedder, L2-normalised.
pub struct FakeEmbedder { dim: usize }

impl FakeEmbedder {
    pub fn new(dim: usize) -> Self { Self { dim: dim.max(1) } }

    fn embed_text(&self, text: &str) -> Vec<f32> {
        let mut v = vec![0f32; self.dim];
        for (i, token) in text.split_whitespace().enumerate() {
            let mut hasher = XxHash64::with_seed(0);
            token.hash(&mut hasher);
            let h = hasher.finish();
            let idx = (h as usize) % self.dim;
            let val = (((h >> 32) as u32) as f32) / (u32::MAX as f32);
            v[idx] += val + (i as f32 % 3.0) * 0.01;
        }
        let norm = v.iter().map(|x| x * x).sum::<f32>().sqrt().max(1e-6);
        for x in &mut v {
            *x /= norm;
        }
        v
    }
}

#[async_trait]
impl Embedder for FakeEmbedder {
    fn dim(&self) -> usize { self.dim }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbedError> {
        Ok(texts.iter().map(|t| self.embed_text(t)).collect())
    }
}

fn fake_requested() -> bool {
    std::env::var("APP_USE_FAKE_EMBEDDINGS").ok().map(|v| v == "1" || v.eq_ignore_ascii_case("true")).unwrap_or(false)
}

pub fn get_default_embedder(config: &EmbeddingConfig) -> Result<Arc<dyn Embedder>> {
    if config.use_fake || fake_requested() {
        info!(dim = config.dimension, "using FakeEmbedder");
        return Ok(Arc::new(FakeEmbedder::new(config.dimension)));
    }
    info!(deployment = %config.deployment, "using Azure OpenAI embeddings");
    Ok(Arc::new(AzureOpenAiEmbedder::new(config)?))
}
