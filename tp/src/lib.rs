//! Trip Planner - conversational travel planning
//!
//! Trip parameters and participant profiles are compiled into a briefing,
//! an LLM travel agent refines the plan over a conversation, and the session
//! ends with a day-by-day itinerary or a multi-chapter travel guide.
//!
//! # Modules
//!
//! - [`domain`] - Trip, participants, transcript and deliverable types
//! - [`context`] - Briefing compiler
//! - [`conversation`] - Conversation state machine
//! - [`synth`] - Itinerary and guide synthesis
//! - [`session`] - The object that owns one planning run
//! - [`llm`] - LLM client trait and OpenAI implementation
//! - [`config`] - Configuration types and loading
//! - [`cli`] / [`repl`] - Command-line interface

pub mod cli;
pub mod config;
pub mod context;
pub mod conversation;
pub mod domain;
pub mod error;
pub mod export;
pub mod llm;
pub mod prompts;
pub mod provider;
pub mod reference;
pub mod repl;
pub mod session;
pub mod synth;
pub mod tripfile;

// Re-export commonly used types
pub use config::{Config, LlmConfig};
pub use context::{ContextCompiler, compile_context};
pub use conversation::{ConversationEngine, ConversationState};
pub use domain::{
    ConversationTurn, Deliverable, Guide, ModelChoice, ParticipantProfile, ParticipantRoster, Speaker, Transcript,
    TripConfiguration,
};
pub use error::PlannerError;
pub use llm::{LlmClient, LlmError};
pub use session::{Opening, PlanningSession};
pub use synth::Synthesizer;
