//! Conversation transcript
//!
//! Ordered, append-only record of the turns exchanged with the completion
//! provider. Only the conversation engine appends to it.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::llm::{Message, Role};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Speaker {
    System,
    User,
    Assistant,
}

impl Speaker {
    /// Lowercase name used when flattening a transcript into prose
    pub fn label(&self) -> &'static str {
        self.role().as_str()
    }

    pub fn role(&self) -> Role {
        match self {
            Speaker::System => Role::System,
            Speaker::User => Role::User,
            Speaker::Assistant => Role::Assistant,
        }
    }
}

impl std::fmt::Display for Speaker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub speaker: Speaker,
    pub text: String,
}

impl ConversationTurn {
    pub fn system(text: impl Into<String>) -> Self {
        Self {
            speaker: Speaker::System,
            text: text.into(),
        }
    }

    pub fn user(text: impl Into<String>) -> Self {
        Self {
            speaker: Speaker::User,
            text: text.into(),
        }
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            speaker: Speaker::Assistant,
            text: text.into(),
        }
    }

    pub fn to_message(&self) -> Message {
        Message {
            role: self.speaker.role(),
            content: self.text.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Transcript {
    turns: Vec<ConversationTurn>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn turns(&self) -> &[ConversationTurn] {
        &self.turns
    }

    pub fn iter(&self) -> impl Iterator<Item = &ConversationTurn> {
        self.turns.iter()
    }

    pub fn last(&self) -> Option<&ConversationTurn> {
        self.turns.last()
    }

    pub(crate) fn push(&mut self, turn: ConversationTurn) {
        debug!(speaker = %turn.speaker, len = self.turns.len(), "Transcript::push: called");
        self.turns.push(turn);
    }

    /// Drop every turn from `len` onwards; used to undo a failed seed
    pub(crate) fn truncate(&mut self, len: usize) {
        self.turns.truncate(len);
    }

    /// Full ordered history as provider messages
    pub fn to_messages(&self) -> Vec<Message> {
        self.turns.iter().map(ConversationTurn::to_message).collect()
    }

    /// One `speaker: text` block per turn, newline-joined
    pub fn flatten(&self) -> String {
        self.turns
            .iter()
            .map(|t| format!("{}: {}", t.speaker.label(), t.text))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl From<Vec<ConversationTurn>> for Transcript {
    fn from(turns: Vec<ConversationTurn>) -> Self {
        Self { turns }
    }
}
