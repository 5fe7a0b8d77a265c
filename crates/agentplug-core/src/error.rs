use thiserror::Error;

/// Failures from the embedding service boundary.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EmbedError {
    #[error("embedding request failed: {0}")]
    Transport(String),

    #[error("embedding service returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("malformed embedding response: {0}")]
    Malformed(String),
}

/// Failures from the vector index boundary.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IndexError {
    #[error("vector search request failed: {0}")]
    Transport(String),

    #[error("vector index returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("malformed vector search response: {0}")]
    Malformed(String),
}

#[derive(Debug, Error)]
pub enum ToolError {
    #[error("unknown function: {0}")]
    UnknownFunction(String),

    #[error("function already registered: {0}")]
    Duplicate(String),

    #[error("invalid arguments for {function}: {reason}")]
    InvalidArguments { function: String, reason: String },

    #[error("tool server '{server}' failed: {reason}")]
    Server { server: String, reason: String },

    #[error("tool '{tool}' reported an error: {message}")]
    Reported { tool: String, message: String },

    #[error("not found: {0}")]
    NotFound(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required setting '{key}' for environment '{env}'")]
    Missing { key: String, env: String },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}
