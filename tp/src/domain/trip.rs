//! Trip configuration
//!
//! The per-session trip parameters. Replaced wholesale each time setup is
//! submitted.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::PlannerError;

/// Largest party the setup form accepts
pub const MAX_HEADCOUNT: u32 = 100;

/// Model tier chosen for the session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum ModelChoice {
    /// Fast, cheap tier
    #[default]
    #[serde(alias = "3.5")]
    Basic,
    /// Capable tier
    #[serde(alias = "4")]
    Advanced,
}

impl std::fmt::Display for ModelChoice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Basic => write!(f, "basic"),
            Self::Advanced => write!(f, "advanced"),
        }
    }
}

/// Trip parameters collected at setup
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct TripConfiguration {
    #[serde(rename = "model", default)]
    pub model_choice: ModelChoice,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    /// Destination names, order preserved
    pub destinations: Vec<String>,
    pub headcount: u32,
}

impl TripConfiguration {
    /// Build a validated configuration
    pub fn new(
        model_choice: ModelChoice,
        start_date: NaiveDate,
        end_date: NaiveDate,
        destinations: impl IntoIterator<Item = impl Into<String>>,
        headcount: u32,
    ) -> Result<Self, PlannerError> {
        let mut trip = Self {
            model_choice,
            start_date,
            end_date,
            destinations: destinations.into_iter().map(Into::into).collect(),
            headcount,
        };
        trip.normalize();
        trip.validate()?;
        Ok(trip)
    }

    /// Trim destination names, drop blanks and repeats (first occurrence wins)
    pub fn normalize(&mut self) {
        let mut seen = Vec::with_capacity(self.destinations.len());
        for name in self.destinations.drain(..) {
            let name = name.trim().to_string();
            if !name.is_empty() && !seen.contains(&name) {
                seen.push(name);
            }
        }
        self.destinations = seen;
    }

    /// Check the form-level invariants
    pub fn validate(&self) -> Result<(), PlannerError> {
        debug!(start = %self.start_date, end = %self.end_date, destinations = self.destinations.len(), headcount = self.headcount, "TripConfiguration::validate: called");
        if self.end_date < self.start_date {
            return Err(PlannerError::invalid(format!(
                "end date {} is before start date {}",
                self.end_date, self.start_date
            )));
        }
        if self.destinations.is_empty() {
            return Err(PlannerError::invalid("at least one destination is required"));
        }
        if self.headcount == 0 || self.headcount > MAX_HEADCOUNT {
            return Err(PlannerError::invalid(format!(
                "headcount must be between 1 and {}, got {}",
                MAX_HEADCOUNT, self.headcount
            )));
        }
        Ok(())
    }

    /// Trip length in days, both ends inclusive
    pub fn duration_days(&self) -> i64 {
        (self.end_date - self.start_date).num_days() + 1
    }
}
