//! `chat-agent` — transcript-keeping agents over an OpenAI-compatible
//! chat-completion API.
//!
//! # Architecture
//!
//! ```text
//! Planner / Developer   ← role wrappers: fixed instruction + prompt templates
//!     │
//!     ▼
//! Agent                 ← owns one Transcript, appends a user/assistant pair
//!     │                   per respond() call
//!     ▼
//! CompletionClient      ← trait; HttpCompletionClient POSTs the role-tagged
//!                         message list to /v1/chat/completions
//! ```
//!
//! Each role operation is exactly one completion round trip: the caller's
//! text is interpolated into a fixed template, sent with the full transcript,
//! and the returned assistant text is appended and handed back verbatim. No
//! retries, no parsing of the model's free text.

pub mod agent;
pub mod client;
pub mod developer;
pub mod error;
pub mod planner;
pub mod types;

pub use agent::Agent;
pub use client::{ClientConfig, CompletionClient, HttpCompletionClient, DEFAULT_BASE_URL};
pub use developer::{Developer, ExecutionReport};
pub use error::ChatAgentError;
pub use planner::Planner;
pub use types::{ModelParams, Role, Transcript, Turn};

/// Convenience `Result` alias for this crate.
pub type Result<T> = std::result::Result<T, ChatAgentError>;
