//! Itinerary / Guide Synthesizer
//!
//! Post-conversation batch step. The itinerary compresses the whole
//! transcript into a single system message; the guide asks for a table of
//! contents and then one chapter per title.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::{GuideConfig, LlmConfig};
use crate::domain::{Deliverable, Guide, ModelChoice, ParticipantRoster, Transcript, TripConfiguration};
use crate::error::PlannerError;
use crate::llm::{CompletionRequest, Message};
use crate::prompts::{GuideTocContext, PromptLoader};
use crate::provider::Provider;

/// What happens when one chapter request fails
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum ChapterFailurePolicy {
    /// Keep going; the chapter body becomes an error note
    #[default]
    ErrorBody,
    /// Stop and surface the error
    Abort,
}

pub struct Synthesizer {
    provider: Provider,
    prompts: Arc<PromptLoader>,
    llm_config: LlmConfig,
    guide_config: GuideConfig,
}

impl Synthesizer {
    pub fn new(provider: Provider, prompts: Arc<PromptLoader>, llm_config: LlmConfig, guide_config: GuideConfig) -> Self {
        debug!(chapter_failure = ?guide_config.chapter_failure, "Synthesizer::new: called");
        Self {
            provider,
            prompts,
            llm_config,
            guide_config,
        }
    }

    /// Turn the conversation into a day-by-day itinerary
    ///
    /// Returns the raw response text; its structure is not checked.
    pub async fn synthesize_itinerary(
        &self,
        transcript: &Transcript,
        model_choice: ModelChoice,
    ) -> Result<String, PlannerError> {
        debug!(turns = transcript.len(), %model_choice, "synthesize_itinerary: called");
        if transcript.is_empty() {
            return Err(PlannerError::invalid("no conversation to build an itinerary from"));
        }

        let prompt = self.itinerary_prompt(transcript)?;
        let model = self.llm_config.model_for(model_choice);
        let mut request = CompletionRequest::new(model, vec![Message::system(prompt)]);
        if let Some(max_tokens) = self.llm_config.max_tokens {
            request = request.with_max_tokens(max_tokens);
        }

        let itinerary = self.provider.complete_text(request).await?;
        info!(chars = itinerary.len(), "Itinerary synthesized");
        Ok(itinerary)
    }

    /// Flattened transcript followed by the closing instruction
    pub fn itinerary_prompt(&self, transcript: &Transcript) -> Result<String, PlannerError> {
        let instruction = self
            .prompts
            .itinerary_instruction()
            .map_err(|e| PlannerError::Prompt(e.to_string()))?;
        Ok(format!("{}\n\n{}", transcript.flatten(), instruction))
    }

    /// Build a multi-chapter travel guide
    ///
    /// One table-of-contents request, then one request per non-empty line of
    /// it. A failed table of contents always aborts; failed chapters follow
    /// the configured [`ChapterFailurePolicy`].
    pub async fn synthesize_guide(
        &self,
        trip: &TripConfiguration,
        roster: &ParticipantRoster,
    ) -> Result<Deliverable, PlannerError> {
        debug!(destinations = trip.destinations.len(), travellers = roster.len(), "synthesize_guide: called");
        let prompt_err = |e: eyre::Report| PlannerError::Prompt(e.to_string());

        let writer = self.prompts.guide_writer().map_err(prompt_err)?;
        let toc_prompt = self
            .prompts
            .guide_toc(&GuideTocContext::new(trip, roster))
            .map_err(prompt_err)?;

        let toc = self.provider.complete_text(self.guide_request(&writer, toc_prompt)).await?;
        let titles = parse_table_of_contents(&toc);
        if titles.is_empty() {
            warn!("Table of contents had no usable lines");
            return Err(PlannerError::MalformedProviderResponse(
                "table of contents is empty".to_string(),
            ));
        }
        info!(chapters = titles.len(), "Table of contents received");

        let mut guide = Guide::new();
        for (idx, title) in titles.into_iter().enumerate() {
            let chapter_prompt = self.prompts.guide_chapter(&title).map_err(prompt_err)?;
            match self
                .provider
                .complete_text(self.guide_request(&writer, chapter_prompt))
                .await
            {
                Ok(body) => {
                    debug!(idx, %title, "synthesize_guide: chapter written");
                    guide.push_chapter(title, body.trim());
                }
                Err(e) => match self.guide_config.chapter_failure {
                    ChapterFailurePolicy::ErrorBody => {
                        warn!(idx, %title, error = %e, "Chapter failed, keeping error body");
                        guide.push_failed_chapter(title, format!("This chapter could not be generated: {}", e));
                    }
                    ChapterFailurePolicy::Abort => {
                        warn!(idx, %title, error = %e, "Chapter failed, aborting guide");
                        return Err(e);
                    }
                },
            }
        }

        info!(
            chapters = guide.len(),
            failed = guide.failed_chapters().len(),
            "Guide synthesized"
        );
        Ok(Deliverable::Guide(guide))
    }

    /// Persona as an assistant message, then the ask as a user message
    fn guide_request(&self, writer: &str, prompt: String) -> CompletionRequest {
        CompletionRequest::new(
            self.llm_config.model_for(self.guide_config.tier),
            vec![Message::assistant(writer), Message::user(prompt)],
        )
        .with_temperature(self.guide_config.temperature)
        .with_max_tokens(self.guide_config.max_tokens)
    }
}

/// Chapter titles: one per non-blank line, trimmed
pub fn parse_table_of_contents(toc: &str) -> Vec<String> {
    toc.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(String::from)
        .collect()
}
