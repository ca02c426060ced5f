use serde::{Deserialize, Serialize};
use std::fmt;

// ─── Role ─────────────────────────────────────────────────────────────────

/// Speaker of a transcript turn, matching the wire roles of the
/// chat-completion API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ─── Turn ─────────────────────────────────────────────────────────────────

/// One entry in a conversation transcript.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub text: String,
}

impl Turn {
    pub fn system(text: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            text: text.into(),
        }
    }

    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            text: text.into(),
        }
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            text: text.into(),
        }
    }
}

// ─── Transcript ───────────────────────────────────────────────────────────

/// Ordered conversation history owned by exactly one [`Agent`](crate::Agent).
///
/// Invariant: the first turn is always the role's system instruction; turns
/// alternate user/assistant after that. Growth is unbounded unless the owner
/// enforces a cap via [`Transcript::evict_to`].
#[derive(Debug, Clone)]
pub struct Transcript {
    turns: Vec<Turn>,
}

impl Transcript {
    /// Start a transcript with the given system instruction as turn zero.
    pub fn new(instruction: impl Into<String>) -> Self {
        Self {
            turns: vec![Turn::system(instruction)],
        }
    }

    pub fn push_user(&mut self, text: impl Into<String>) {
        self.turns.push(Turn::user(text));
    }

    pub fn push_assistant(&mut self, text: impl Into<String>) {
        self.turns.push(Turn::assistant(text));
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// Drop the oldest non-system turns until at most `max` turns remain.
    ///
    /// The system instruction at index zero is never evicted, so the smallest
    /// effective cap is one.
    pub fn evict_to(&mut self, max: usize) {
        while self.turns.len() > max.max(1) {
            self.turns.remove(1);
        }
    }
}

// ─── ModelParams ──────────────────────────────────────────────────────────

/// Opaque per-role model configuration forwarded to the completion API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelParams {
    pub model: String,
    pub temperature: f32,
}

impl ModelParams {
    pub fn new(model: impl Into<String>, temperature: f32) -> Self {
        Self {
            model: model.into(),
            temperature,
        }
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_serializes_snake_case() {
        assert_eq!(serde_json::to_string(&Role::Assistant).unwrap(), "\"assistant\"");
        assert_eq!(Role::System.to_string(), "system");
    }

    #[test]
    fn new_transcript_starts_with_system_turn() {
        let transcript = Transcript::new("You are a planner.");
        assert_eq!(transcript.len(), 1);
        assert_eq!(transcript.turns()[0].role, Role::System);
        assert_eq!(transcript.turns()[0].text, "You are a planner.");
    }

    #[test]
    fn turns_alternate_after_system() {
        let mut transcript = Transcript::new("instruction");
        transcript.push_user("question");
        transcript.push_assistant("answer");
        let roles: Vec<Role> = transcript.turns().iter().map(|t| t.role).collect();
        assert_eq!(roles, vec![Role::System, Role::User, Role::Assistant]);
    }

    #[test]
    fn evict_drops_oldest_non_system_turns() {
        let mut transcript = Transcript::new("instruction");
        for n in 0..4 {
            transcript.push_user(format!("q{n}"));
            transcript.push_assistant(format!("a{n}"));
        }
        transcript.evict_to(5);
        assert_eq!(transcript.len(), 5);
        assert_eq!(transcript.turns()[0].role, Role::System);
        // The most recent exchanges survive.
        assert_eq!(transcript.turns()[3].text, "q3");
        assert_eq!(transcript.turns()[4].text, "a3");
    }

    #[test]
    fn evict_never_removes_system_instruction() {
        let mut transcript = Transcript::new("instruction");
        transcript.push_user("q");
        transcript.push_assistant("a");
        transcript.evict_to(0);
        assert_eq!(transcript.len(), 1);
        assert_eq!(transcript.turns()[0].role, Role::System);
    }

    #[test]
    fn evict_is_noop_under_cap() {
        let mut transcript = Transcript::new("instruction");
        transcript.push_user("q");
        transcript.evict_to(10);
        assert_eq!(transcript.len(), 2);
    }
}
