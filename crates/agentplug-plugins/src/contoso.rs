//! Retrieval plugin over the Contoso document index.
//!
//! `search` is a three-step pipeline: embed the query, run one vector query
//! against [`INDEX_NAME`]/[`VECTOR_FIELD`], then keep hits scoring at least
//! [`MIN_SCORE`] in the order the index returned them. Errors from either
//! downstream call are returned unchanged and nothing partial is produced.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use thiserror::Error;
use tracing::{debug, warn};

use agentplug_core::error::{EmbedError, IndexError};
use agentplug_core::parse_args;
use agentplug_core::traits::{Embedder, FunctionHandler, VectorIndex};
use agentplug_core::types::{FunctionDescriptor, SearchHit, SearchResult, VectorQuery};

pub const FUNCTION_NAME: &str = "contoso_search";
pub const INDEX_NAME: &str = "search1";
pub const VECTOR_FIELD: &str = "contentVector";
pub const MAX_RESULTS: usize = 5;
pub const MIN_SCORE: f64 = 0.8;

#[derive(Debug, Error)]
pub enum RetrievalError {
    #[error(transparent)]
    Embedding(#[from] EmbedError),

    #[error(transparent)]
    Index(#[from] IndexError),
}

pub struct ContosoSearch {
    embedder: Arc<dyn Embedder>,
    index: Arc<dyn VectorIndex>,
}

#[derive(Deserialize)]
struct SearchArgs {
    query: String,
}

impl ContosoSearch {
    pub fn new(embedder: Arc<dyn Embedder>, index: Arc<dyn VectorIndex>) -> Self {
        Self { embedder, index }
    }

    pub async fn search(&self, query: &str) -> Result<Vec<SearchResult>, RetrievalError> {
        let vector = self.embedder.embed(query).await?;
        if vector.len() != self.embedder.dim() {
            warn!(expected = self.embedder.dim(), got = vector.len(), "embedding dimension mismatch");
        }
        let request = VectorQuery {
            index_name: INDEX_NAME.to_string(),
            target_field: VECTOR_FIELD.to_string(),
            vector,
            top: MAX_RESULTS,
        };
        let hits = self.index.vector_search(&request).await?;
        let raw = hits.len();
        let results = filter_hits(hits);
        debug!(raw, kept = results.len(), "contoso search");
        Ok(results)
    }

    pub fn descriptor() -> FunctionDescriptor {
        FunctionDescriptor::new(
            FUNCTION_NAME,
            "use to search Contoso company documents for the given query.",
            json!({
                "type": "object",
                "properties": {
                    "query": {
                        "type": "string",
                        "description": "the original prompt optimized for a vector search"
                    }
                },
                "required": ["query"]
            }),
        )
        .with_returns(
            "returns a list of results where the Content is the data found from the search, \
             Citation is the name of the document where the result was found and Score is the \
             decimal percentage of how confident the result matches the query",
        )
    }
}

/// Keep hits with `score >= MIN_SCORE`, in received order, capped at `MAX_RESULTS`.
pub fn filter_hits(hits: Vec<SearchHit>) -> Vec<SearchResult> {
    hits.into_iter()
        .filter(|hit| hit.score >= MIN_SCORE)
        .take(MAX_RESULTS)
        .map(|hit| SearchResult {
            content: hit.document.content,
            citation: hit.document.filepath,
            score: Some(hit.score),
        })
        .collect()
}

#[async_trait]
impl FunctionHandler for ContosoSearch {
    async fn invoke(&self, args: Value) -> anyhow::Result<Value> {
        let args: SearchArgs = parse_args(FUNCTION_NAME, args)?;
        let results = self.search(&args.query).await?;
        Ok(serde_json::to_value(results)?)
    }
}
