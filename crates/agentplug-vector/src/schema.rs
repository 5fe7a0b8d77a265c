//! Wire shapes of the search index REST API.
use serde::{Deserialize, Serialize};

use agentplug_core::types::{IndexDocument, SearchHit, VectorQuery};

#[derive(Debug, Serialize)]
pub struct SearchRequest<'a> {
	pub top: usize,
	#[serde(rename = "vectorQueries")]
	pub vector_queries: Vec<VectorQueryBody<'a>>,
}

#[derive(Debug, Serialize)]
pub struct VectorQueryBody<'a> {
	pub kind: &'static str,
	pub vector: &'a [f32],
	pub fields: &'a str,
	pub k: usize,
}

impl<'a> SearchRequest<'a> {
	pub fn from_query(query: &'a VectorQuery) -> Self {
		Self {
			top: query.top,
			vector_queries: vec![VectorQueryBody { kind: "vector", vector: &query.vector, fields: &query.target_field, k: query.top }],
		}
	}
}

#[derive(Debug, Deserialize)]
pub struct SearchResponse {
	#[serde(default)]
	pub value: Vec<RawHit>,
}

#[derive(Debug, Deserialize)]
pub struct RawHit {
	#[serde(rename = "@search.score")]
	pub score: f64,
	#[serde(flatten)]
	pub document: IndexDocument,
}

impl From<RawHit> for SearchHit {
	fn from(raw: RawHit) -> Self { SearchHit { document: raw.document, score: raw.score } }
}
