use async_trait::async_trait;
use serde_json::Value;

use crate::error::{EmbedError, IndexError, ToolError};
use crate::types::{RemoteTool, SearchHit, VectorQuery};

#[async_trait]
pub trait Embedder: Send + Sync {
    /// Dimensionality of the vectors this embedder produces.
    fn dim(&self) -> usize;

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbedError>;

    /// Embed a single text. The text is passed through as-is, empty included.
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbedError> {
        let texts = [text.to_string()];
        let mut vectors = self.embed_batch(&texts).await?;
        if vectors.len() != 1 {
            return Err(EmbedError::Malformed(format!("expected 1 embedding, got {}", vectors.len())));
        }
        Ok(vectors.remove(0))
    }
}

#[async_trait]
pub trait VectorIndex: Send + Sync {
    /// Hits come back in the order the index ranked them.
    async fn vector_search(&self, query: &VectorQuery) -> Result<Vec<SearchHit>, IndexError>;
}

/// A callable function exposed to the chat orchestration.
#[async_trait]
pub trait FunctionHandler: Send + Sync {
    async fn invoke(&self, args: Value) -> anyhow::Result<Value>;
}

/// Uniform "list tools / invoke tool" contract for external tool servers.
#[async_trait]
pub trait ToolServer: Send + Sync {
    fn name(&self) -> &str;
    async fn list_tools(&self) -> Result<Vec<RemoteTool>, ToolError>;
    async fn call_tool(&self, tool: &str, args: Value) -> Result<Value, ToolError>;
}
