//! ConversationEngine - owns the transcript and drives the assistant turns

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::config::LlmConfig;
use crate::context::ContextCompiler;
use crate::domain::{ConversationTurn, ParticipantRoster, Transcript, TripConfiguration};
use crate::error::PlannerError;
use crate::llm::CompletionRequest;
use crate::prompts::PromptLoader;
use crate::provider::Provider;

/// Where the conversation stands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConversationState {
    /// No briefing seeded yet
    Uninitialized,
    /// The last turn still needs an assistant reply
    AwaitingAssistant,
    /// Waiting for the traveller to say something
    AwaitingUser,
    /// The interactive page was left; nothing more is accepted
    Closed,
}

impl std::fmt::Display for ConversationState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Uninitialized => write!(f, "uninitialized"),
            Self::AwaitingAssistant => write!(f, "awaiting_assistant"),
            Self::AwaitingUser => write!(f, "awaiting_user"),
            Self::Closed => write!(f, "closed"),
        }
    }
}

/// Conversation state machine
///
/// Every request carries the full transcript; the provider keeps no state.
/// A failed call never appends an assistant turn.
pub struct ConversationEngine {
    provider: Provider,
    prompts: Arc<PromptLoader>,
    compiler: Arc<ContextCompiler>,
    llm_config: LlmConfig,

    /// Model resolved from the trip at initialization
    model: Option<String>,

    transcript: Transcript,
    state: ConversationState,
}

impl ConversationEngine {
    pub fn new(
        provider: Provider,
        prompts: Arc<PromptLoader>,
        compiler: Arc<ContextCompiler>,
        llm_config: LlmConfig,
    ) -> Self {
        debug!("ConversationEngine::new: called");
        Self {
            provider,
            prompts,
            compiler,
            llm_config,
            model: None,
            transcript: Transcript::new(),
            state: ConversationState::Uninitialized,
        }
    }

    pub fn state(&self) -> ConversationState {
        self.state
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn model(&self) -> Option<&str> {
        self.model.as_deref()
    }

    /// Seed the briefing and fetch the opening question
    ///
    /// On failure the seeded SYSTEM turn is withdrawn and the engine returns
    /// to `Uninitialized`, so calling this again repeats the same request.
    pub async fn initialize(
        &mut self,
        trip: &TripConfiguration,
        roster: &ParticipantRoster,
    ) -> Result<String, PlannerError> {
        debug!(state = %self.state, "ConversationEngine::initialize: called");
        self.expect_state("initialize", ConversationState::Uninitialized)?;

        let briefing = self.compiler.compile(trip, roster);
        let instruction = self
            .prompts
            .conversation_instruction(&briefing)
            .map_err(|e| PlannerError::Prompt(e.to_string()))?;

        let model = self.llm_config.model_for(trip.model_choice).to_string();
        info!(%model, participants = roster.len(), "Initializing conversation");
        self.model = Some(model);
        self.transcript.push(ConversationTurn::system(instruction));
        self.state = ConversationState::AwaitingAssistant;

        match self.request_reply().await {
            Ok(reply) => Ok(reply),
            Err(e) => {
                warn!(error = %e, "Conversation initialization failed, withdrawing briefing");
                self.transcript.truncate(0);
                self.model = None;
                self.state = ConversationState::Uninitialized;
                Err(e)
            }
        }
    }

    /// Append the traveller's message and fetch the next assistant turn
    ///
    /// On failure the USER turn stays in the transcript and the engine waits
    /// in `AwaitingAssistant` until [`retry`](Self::retry) succeeds.
    pub async fn submit_user_input(&mut self, text: &str) -> Result<String, PlannerError> {
        debug!(state = %self.state, text_len = text.len(), "ConversationEngine::submit_user_input: called");
        self.expect_state("submit user input", ConversationState::AwaitingUser)?;

        self.transcript.push(ConversationTurn::user(text));
        self.state = ConversationState::AwaitingAssistant;
        self.request_reply().await
    }

    /// Repeat the request for the pending assistant turn
    pub async fn retry(&mut self) -> Result<String, PlannerError> {
        debug!(state = %self.state, "ConversationEngine::retry: called");
        self.expect_state("retry", ConversationState::AwaitingAssistant)?;
        self.request_reply().await
    }

    /// Leave the conversation; later transitions are rejected
    pub fn close(&mut self) {
        info!(turns = self.transcript.len(), "Closing conversation");
        self.state = ConversationState::Closed;
    }

    fn expect_state(&self, action: &'static str, expected: ConversationState) -> Result<(), PlannerError> {
        if self.state == expected {
            Ok(())
        } else {
            debug!(%action, state = %self.state, %expected, "ConversationEngine::expect_state: rejected");
            Err(PlannerError::InvalidTransition {
                action,
                state: self.state.to_string(),
            })
        }
    }

    /// Build the request from the whole transcript
    fn build_request(&self) -> Result<CompletionRequest, PlannerError> {
        let model = self
            .model
            .clone()
            .ok_or_else(|| PlannerError::invalid("conversation has no model selected"))?;
        let mut request = CompletionRequest::new(model, self.transcript.to_messages());
        if let Some(max_tokens) = self.llm_config.max_tokens {
            request = request.with_max_tokens(max_tokens);
        }
        Ok(request)
    }

    async fn request_reply(&mut self) -> Result<String, PlannerError> {
        let request = self.build_request()?;
        let reply = self.provider.complete_text(request).await?;

        self.transcript.push(ConversationTurn::assistant(reply.clone()));
        self.state = ConversationState::AwaitingUser;
        info!(turns = self.transcript.len(), "Assistant turn appended");
        Ok(reply)
    }
}
