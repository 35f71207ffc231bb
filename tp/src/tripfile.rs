//! Trip files: the YAML form of a filled-in setup page and participant list
//!
//! ```yaml
//! trip:
//!   model: basic
//!   start-date: 2024-06-01
//!   end-date: 2024-06-10
//!   destinations: [Thailand, Laos]
//!   headcount: 1
//! participants:
//!   - name: Ana
//!     age: 29
//!     gender: female
//!     preference: adventure
//!     notes: likes hiking
//! ```

use std::path::Path;

use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::RosterConfig;
use crate::domain::{ParticipantProfile, ParticipantRoster, TripConfiguration};
use crate::error::PlannerError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TripFile {
    pub trip: TripConfiguration,

    #[serde(default)]
    pub participants: Vec<ParticipantProfile>,
}

impl TripFile {
    pub fn load(path: &Path) -> Result<Self> {
        debug!(path = %path.display(), "TripFile::load: called");
        let content = std::fs::read_to_string(path).context(format!("Failed to read trip file {}", path.display()))?;
        Self::parse(&content).context(format!("Invalid trip file {}", path.display()))
    }

    pub fn parse(content: &str) -> Result<Self> {
        let file: Self = serde_yaml::from_str(content).context("Failed to parse trip file")?;
        Ok(file)
    }

    /// Validate the trip and save every participant under the roster rules
    ///
    /// Applies the same checks as submitting setup to a planning session, so
    /// anything accepted here is accepted there.
    pub fn into_setup(self, rules: &RosterConfig) -> Result<(TripConfiguration, ParticipantRoster), PlannerError> {
        debug!(participants = self.participants.len(), ?rules, "TripFile::into_setup: called");
        let mut trip = self.trip;
        trip.normalize();
        trip.validate()?;

        let mut roster = ParticipantRoster::new();
        for profile in self.participants {
            roster.save(profile, trip.headcount, rules.policy, rules.preference_mode)?;
        }
        Ok((trip, roster))
    }
}
