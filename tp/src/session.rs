//! PlanningSession - the one object that owns a planning run
//!
//! Trip configuration, roster, conversation engine and the final deliverable
//! all live here and are only changed through the methods below.

use std::sync::Arc;

use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::{Config, LlmConfig, RosterConfig};
use crate::context::ContextCompiler;
use crate::conversation::{ConversationEngine, ConversationState};
use crate::domain::{Deliverable, ParticipantProfile, ParticipantRoster, Transcript, TripConfiguration};
use crate::error::PlannerError;
use crate::llm::LlmClient;
use crate::prompts::PromptLoader;
use crate::provider::Provider;
use crate::synth::Synthesizer;

/// Result of opening the conversation
#[derive(Debug)]
pub struct Opening {
    /// The assistant's first question
    pub reply: String,
    /// `RosterIncomplete` when fewer participants than headcount were saved
    pub roster_warning: Option<PlannerError>,
}

pub struct PlanningSession {
    id: Uuid,
    roster_config: RosterConfig,

    trip: Option<TripConfiguration>,
    roster: ParticipantRoster,
    deliverable: Option<Deliverable>,

    engine: ConversationEngine,
    synth: Synthesizer,

    // Kept to rebuild the engine when setup is resubmitted
    provider: Provider,
    prompts: Arc<PromptLoader>,
    compiler: Arc<ContextCompiler>,
    llm_config: LlmConfig,
}

impl PlanningSession {
    pub fn new(llm: Arc<dyn LlmClient>, prompts: Arc<PromptLoader>, config: &Config) -> Self {
        let id = Uuid::now_v7();
        debug!(%id, "PlanningSession::new: called");

        let provider = Provider::new(llm, config.llm.timeout());
        let compiler = Arc::new(ContextCompiler::from_config(&config.context));
        let engine = ConversationEngine::new(
            provider.clone(),
            prompts.clone(),
            compiler.clone(),
            config.llm.clone(),
        );
        let synth = Synthesizer::new(
            provider.clone(),
            prompts.clone(),
            config.llm.clone(),
            config.guide.clone(),
        );

        Self {
            id,
            roster_config: config.roster.clone(),
            trip: None,
            roster: ParticipantRoster::new(),
            deliverable: None,
            engine,
            synth,
            provider,
            prompts,
            compiler,
            llm_config: config.llm.clone(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn trip(&self) -> Option<&TripConfiguration> {
        self.trip.as_ref()
    }

    pub fn roster(&self) -> &ParticipantRoster {
        &self.roster
    }

    pub fn transcript(&self) -> &Transcript {
        self.engine.transcript()
    }

    pub fn state(&self) -> ConversationState {
        self.engine.state()
    }

    pub fn deliverable(&self) -> Option<&Deliverable> {
        self.deliverable.as_ref()
    }

    /// Submit the setup page
    ///
    /// Replaces the trip wholesale. Any conversation or deliverable built on
    /// the old trip is discarded, and under the cap policy the roster is cut
    /// down to the new headcount.
    pub fn configure_trip(&mut self, mut trip: TripConfiguration) -> Result<(), PlannerError> {
        debug!(session = %self.id, headcount = trip.headcount, "configure_trip: called");
        trip.normalize();
        trip.validate()?;

        self.roster.enforce_headcount(trip.headcount, self.roster_config.policy);
        if self.engine.state() != ConversationState::Uninitialized {
            info!(session = %self.id, "Trip reconfigured, discarding conversation");
            self.engine = ConversationEngine::new(
                self.provider.clone(),
                self.prompts.clone(),
                self.compiler.clone(),
                self.llm_config.clone(),
            );
        }
        self.deliverable = None;

        info!(
            session = %self.id,
            destinations = ?trip.destinations,
            days = trip.duration_days(),
            model = %trip.model_choice,
            "Trip configured"
        );
        self.trip = Some(trip);
        Ok(())
    }

    /// Enter the participant step; the roster starts over
    pub fn begin_roster(&mut self) {
        debug!(session = %self.id, "begin_roster: called");
        self.roster.clear();
    }

    pub fn save_participant(&mut self, profile: ParticipantProfile) -> Result<(), PlannerError> {
        let trip = self.require_trip()?;
        let headcount = trip.headcount;
        self.roster.save(
            profile,
            headcount,
            self.roster_config.policy,
            self.roster_config.preference_mode,
        )?;
        info!(session = %self.id, saved = self.roster.len(), headcount, "Participant saved");
        Ok(())
    }

    /// Soft check; `RosterIncomplete` is logged and returned, never enforced
    pub fn check_roster(&self) -> Result<(), PlannerError> {
        let trip = self.require_trip()?;
        let result = self.roster.check_complete(trip.headcount);
        if let Err(e) = &result {
            warn!(session = %self.id, error = %e, "Roster incomplete");
        }
        result
    }

    /// Compile the briefing and fetch the first assistant question
    ///
    /// An incomplete roster never blocks; it comes back as
    /// [`Opening::roster_warning`] next to the reply.
    pub async fn start_conversation(&mut self) -> Result<Opening, PlannerError> {
        debug!(session = %self.id, "start_conversation: called");
        let trip = self.require_trip()?.clone();
        let roster_warning = self.check_roster().err();
        let reply = self.engine.initialize(&trip, &self.roster).await?;
        Ok(Opening { reply, roster_warning })
    }

    pub async fn send(&mut self, text: &str) -> Result<String, PlannerError> {
        self.engine.submit_user_input(text).await
    }

    pub async fn retry(&mut self) -> Result<String, PlannerError> {
        self.engine.retry().await
    }

    /// Synthesize the itinerary from the conversation so far
    ///
    /// Replaces any earlier deliverable.
    pub async fn generate_itinerary(&mut self) -> Result<&Deliverable, PlannerError> {
        debug!(session = %self.id, turns = self.engine.transcript().len(), "generate_itinerary: called");
        let model_choice = self.require_trip()?.model_choice;
        let text = self
            .synth
            .synthesize_itinerary(self.engine.transcript(), model_choice)
            .await?;
        Ok(&*self.deliverable.insert(Deliverable::Itinerary { text }))
    }

    /// Build the travel guide from trip and roster
    ///
    /// Replaces any earlier deliverable.
    pub async fn generate_guide(&mut self) -> Result<&Deliverable, PlannerError> {
        debug!(session = %self.id, "generate_guide: called");
        let trip = self.require_trip()?;
        let guide = self.synth.synthesize_guide(trip, &self.roster).await?;
        Ok(&*self.deliverable.insert(guide))
    }

    pub fn close(&mut self) {
        debug!(session = %self.id, "close: called");
        self.engine.close();
    }

    fn require_trip(&self) -> Result<&TripConfiguration, PlannerError> {
        self.trip
            .as_ref()
            .ok_or_else(|| PlannerError::invalid("trip setup has not been submitted"))
    }
}
