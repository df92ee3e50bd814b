//! Debate transcript: an append-only log replayed into every later prompt.
//!
//! Values are immutable. `with_turn` returns a new transcript, so each
//! state transition sees exactly the history it was given.

use serde::{Deserialize, Serialize};

/// Heading that opens the rendered history
pub const HISTORY_HEADER: &str = "Debate History:\n";

/// Debating side
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Pro,
    Con,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pro => write!(f, "Pro"),
            Self::Con => write!(f, "Con"),
        }
    }
}

/// One utterance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Turn {
    /// 1-based round number
    pub round: u32,
    pub role: Role,
    pub text: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DebateTranscript {
    turns: Vec<Turn>,
}

impl DebateTranscript {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of this transcript with one more turn
    pub fn with_turn(&self, round: u32, role: Role, text: impl Into<String>) -> Self {
        let mut turns = self.turns.clone();
        turns.push(Turn {
            round,
            role,
            text: text.into(),
        });
        Self { turns }
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

    /// Prompt form: header, then one `Round N (Role): text` line per turn
    pub fn render(&self) -> String {
        let mut history = String::from(HISTORY_HEADER);
        for turn in &self.turns {
            history.push_str(&format!("Round {} ({}): {}\n", turn.round, turn.role, turn.text));
        }
        history
    }
}
