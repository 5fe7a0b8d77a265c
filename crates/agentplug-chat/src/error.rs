use thiserror::Error;

#[derive(Debug, Error)]
pub enum ChatError {
    #[error("chat request failed: {0}")]
    Transport(String),

    #[error("chat service returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("malformed chat response: {0}")]
    Malformed(String),

    #[error("model kept calling tools after {0} rounds")]
    ToolLoopExceeded(usize),
}
