//! Conversation module
//!
//! The state machine that seeds the briefing and exchanges turns with the
//! completion provider.

mod engine;

pub use engine::{ConversationEngine, ConversationState};
