//! Planner error kinds
//!
//! Every failure is scoped to the single action that triggered it; none of
//! these are fatal to the process.

use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

use crate::llm::LlmError;

/// Errors surfaced by the planning core
#[derive(Debug, Error)]
pub enum PlannerError {
    /// Trip or participant data failed validation
    #[error("Invalid configuration: {0}")]
    ConfigurationInvalid(String),

    /// Credential missing, network failure or error status from the provider
    #[error("Completion provider unavailable: {0}")]
    ProviderUnavailable(String),

    /// The explicit per-call timeout expired
    #[error("Completion provider timed out after {0:?}")]
    ProviderTimeout(Duration),

    /// The provider answered with empty or unparsable content
    #[error("Malformed provider response: {0}")]
    MalformedProviderResponse(String),

    /// Fewer saved participants than the configured headcount
    #[error("Roster incomplete: {saved} of {expected} participants saved")]
    RosterIncomplete { saved: usize, expected: u32 },

    /// Operation not accepted in the engine's current state
    #[error("Cannot {action} while conversation is {state}")]
    InvalidTransition { action: &'static str, state: String },

    /// A prompt template could not be loaded or rendered
    #[error("Prompt template error: {0}")]
    Prompt(String),
}

impl PlannerError {
    /// True for failures of a provider call, which the user may retry
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            PlannerError::ProviderUnavailable(_)
                | PlannerError::ProviderTimeout(_)
                | PlannerError::MalformedProviderResponse(_)
        )
    }

    /// True for soft warnings that must not block progression
    pub fn is_warning(&self) -> bool {
        matches!(self, PlannerError::RosterIncomplete { .. })
    }

    pub fn invalid(msg: impl Into<String>) -> Self {
        PlannerError::ConfigurationInvalid(msg.into())
    }
}

impl From<LlmError> for PlannerError {
    fn from(e: LlmError) -> Self {
        debug!(error = %e, "PlannerError::from: converting LlmError");
        if e.is_malformed() {
            warn!(error = %e, "provider returned a malformed response");
            return PlannerError::MalformedProviderResponse(e.to_string());
        }
        match e {
            LlmError::UnknownProvider(_) => PlannerError::ConfigurationInvalid(e.to_string()),
            LlmError::Timeout(after) => PlannerError::ProviderTimeout(after),
            other if other.is_timeout() => PlannerError::ProviderTimeout(Duration::ZERO),
            other => {
                warn!(error = %other, "provider unavailable");
                PlannerError::ProviderUnavailable(other.to_string())
            }
        }
    }
}
