//! Completion calls as seen by the planning core
//!
//! Wraps an [`LlmClient`] with the explicit per-call timeout and turns the
//! response into usable text or a [`PlannerError`].

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use crate::error::PlannerError;
use crate::llm::{CompletionRequest, LlmClient, StopReason};

#[derive(Clone)]
pub struct Provider {
    llm: Arc<dyn LlmClient>,
    timeout: Duration,
}

impl Provider {
    pub fn new(llm: Arc<dyn LlmClient>, timeout: Duration) -> Self {
        Self { llm, timeout }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Send one request and return its text
    ///
    /// Blank content is `MalformedProviderResponse`; an expired timeout is
    /// `ProviderTimeout`. Nothing is retried.
    pub async fn complete_text(&self, request: CompletionRequest) -> Result<String, PlannerError> {
        debug!(model = %request.model, message_count = request.messages.len(), timeout = ?self.timeout, "Provider::complete_text: called");
        match tokio::time::timeout(self.timeout, self.llm.complete(request)).await {
            Err(_) => {
                warn!(timeout = ?self.timeout, "completion call timed out");
                Err(PlannerError::ProviderTimeout(self.timeout))
            }
            Ok(Err(e)) => Err(e.into()),
            Ok(Ok(response)) => {
                debug!(
                    input_tokens = response.usage.input_tokens,
                    output_tokens = response.usage.output_tokens,
                    total_tokens = response.usage.total(),
                    stop_reason = ?response.stop_reason,
                    "Provider::complete_text: response received"
                );
                match response.stop_reason {
                    StopReason::MaxTokens => warn!("completion hit the token limit, reply may be cut short"),
                    StopReason::ContentFilter => warn!("completion was stopped by the content filter"),
                    StopReason::EndTurn => {}
                }
                response.into_text().map_err(PlannerError::from)
            }
        }
    }
}
