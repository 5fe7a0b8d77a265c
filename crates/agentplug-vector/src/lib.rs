//! agentplug-vector
//!
//! Vector similarity search against a remote index. See `search` for the
//! client and `schema` for the request/response wire shapes.
pub mod schema;
pub mod search;

pub use search::AzureSearchIndex;
