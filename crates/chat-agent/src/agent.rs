use std::sync::Arc;

use crate::client::CompletionClient;
use crate::types::{ModelParams, Transcript, Turn};
use crate::Result;

// ─── Agent ────────────────────────────────────────────────────────────────

/// A role instruction plus the conversation it has accumulated.
///
/// Each [`Agent::respond`] call appends one user/assistant turn pair; the
/// transcript is owned exclusively by this instance and never shared.
pub struct Agent {
    params: ModelParams,
    transcript: Transcript,
    client: Arc<dyn CompletionClient>,
    max_turns: Option<usize>,
}

impl Agent {
    pub fn new(
        client: Arc<dyn CompletionClient>,
        instruction: impl Into<String>,
        params: ModelParams,
    ) -> Self {
        Self {
            params,
            transcript: Transcript::new(instruction),
            client,
            max_turns: None,
        }
    }

    /// Cap the transcript at `max_turns` entries; the oldest non-system turns
    /// are evicted after each exchange.
    pub fn with_max_turns(mut self, max_turns: Option<usize>) -> Self {
        self.max_turns = max_turns;
        self
    }

    /// Send `prompt` with the full transcript and return the assistant text.
    ///
    /// The user turn is appended before the call, so a failed completion
    /// leaves it in the transcript. Errors propagate to the caller unchanged.
    pub async fn respond(&mut self, prompt: impl Into<String>) -> Result<String> {
        self.transcript.push_user(prompt);
        let reply = self
            .client
            .complete(&self.params, self.transcript.turns())
            .await?;
        self.transcript.push_assistant(reply.clone());
        if let Some(max) = self.max_turns {
            self.transcript.evict_to(max);
        }
        Ok(reply)
    }

    /// Read-only view of the full ordered transcript.
    pub fn history(&self) -> &[Turn] {
        self.transcript.turns()
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────
