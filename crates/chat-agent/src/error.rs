use thiserror::Error;

/// Failures talking to the completion API.
///
/// Every variant is an upstream failure from the caller's point of view:
/// pipeline code propagates these unchanged so the enclosing run can be
/// marked failed.
#[derive(Debug, Error)]
pub enum ChatAgentError {
    #[error("completion request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("completion API returned status {status}: {body}")]
    Api { status: u16, body: String },

    #[error("completion response contained no assistant text")]
    EmptyCompletion,

    #[error("completion request timed out after {0}s")]
    Timeout(u64),
}
