//! Participant profiles and the roster that holds them

use serde::{Deserialize, Deserializer, Serialize};
use tracing::{debug, info};

use crate::error::PlannerError;

/// Oldest age the participant form accepts
pub const MAX_AGE: u8 = 120;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    #[serde(alias = "Male")]
    Male,
    #[serde(alias = "Female")]
    Female,
    #[serde(alias = "Other")]
    Other,
}

impl std::fmt::Display for Gender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Male => write!(f, "Male"),
            Self::Female => write!(f, "Female"),
            Self::Other => write!(f, "Other"),
        }
    }
}

/// Vacation style a participant prefers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Preference {
    #[serde(alias = "Adventure")]
    Adventure,
    #[serde(alias = "Relax")]
    Relax,
    #[serde(alias = "Culture")]
    Culture,
}

impl std::fmt::Display for Preference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Adventure => write!(f, "Adventure"),
            Self::Relax => write!(f, "Relax"),
            Self::Culture => write!(f, "Culture"),
        }
    }
}

/// How many preferences a profile carries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum PreferenceMode {
    /// Exactly one preference per participant
    #[default]
    Single,
    /// One or more preferences per participant
    Multi,
}

/// Whether the roster may grow past the trip headcount
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum RosterPolicy {
    /// Reject saves beyond headcount and truncate when headcount shrinks
    #[default]
    Cap,
    /// Accept any number of participants
    Overflow,
}

/// One traveller
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParticipantProfile {
    pub name: String,
    pub age: u8,
    pub gender: Gender,
    /// Accepts a single value or a list (`preference: adventure`)
    #[serde(alias = "preference", deserialize_with = "one_or_many")]
    pub preferences: Vec<Preference>,
    /// Free text, interpolated into prompts as-is
    #[serde(default, alias = "additional-preferences")]
    pub notes: String,
}

impl ParticipantProfile {
    pub fn new(
        name: impl Into<String>,
        age: u8,
        gender: Gender,
        preference: Preference,
        notes: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            age,
            gender,
            preferences: vec![preference],
            notes: notes.into(),
        }
    }

    /// Add another preference (only meaningful in multi mode)
    pub fn with_preference(mut self, preference: Preference) -> Self {
        if !self.preferences.contains(&preference) {
            self.preferences.push(preference);
        }
        self
    }

    pub fn validate(&self, mode: PreferenceMode) -> Result<(), PlannerError> {
        debug!(name = %self.name, age = self.age, ?mode, "ParticipantProfile::validate: called");
        if self.age > MAX_AGE {
            return Err(PlannerError::invalid(format!(
                "age of {} must be between 0 and {}, got {}",
                self.name, MAX_AGE, self.age
            )));
        }
        match (mode, self.preferences.len()) {
            (_, 0) => Err(PlannerError::invalid(format!("{} needs a vacation preference", self.name))),
            (PreferenceMode::Single, n) if n > 1 => Err(PlannerError::invalid(format!(
                "{} has {} preferences but only one is allowed",
                self.name, n
            ))),
            _ => Ok(()),
        }
    }

    /// Preferences joined for display, e.g. "Adventure, Culture"
    pub fn preference_label(&self) -> String {
        self.preferences
            .iter()
            .map(|p| p.to_string())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

fn one_or_many<'de, D>(deserializer: D) -> Result<Vec<Preference>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(Preference),
        Many(Vec<Preference>),
    }

    Ok(match OneOrMany::deserialize(deserializer)? {
        OneOrMany::One(p) => vec![p],
        OneOrMany::Many(ps) => ps,
    })
}

/// Whether enough participants have been saved
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RosterStatus {
    Complete,
    Incomplete { saved: usize, expected: u32 },
    Overfull { saved: usize, expected: u32 },
}

/// Ordered participant profiles for the session
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParticipantRoster {
    profiles: Vec<ParticipantProfile>,
}

impl ParticipantRoster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a roster without applying any policy (e.g. from a trip file)
    pub fn from_profiles(profiles: Vec<ParticipantProfile>) -> Self {
        Self { profiles }
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ParticipantProfile> {
        self.profiles.iter()
    }

    pub fn profiles(&self) -> &[ParticipantProfile] {
        &self.profiles
    }

    /// Empty the roster; done whenever the participant step is re-entered
    pub fn clear(&mut self) {
        debug!(previous = self.profiles.len(), "ParticipantRoster::clear: called");
        self.profiles.clear();
    }

    /// Validate and append a profile under the given rules
    pub fn save(
        &mut self,
        profile: ParticipantProfile,
        headcount: u32,
        policy: RosterPolicy,
        mode: PreferenceMode,
    ) -> Result<(), PlannerError> {
        debug!(name = %profile.name, headcount, ?policy, "ParticipantRoster::save: called");
        profile.validate(mode)?;
        if policy == RosterPolicy::Cap && self.profiles.len() >= headcount as usize {
            return Err(PlannerError::invalid(format!(
                "roster already holds {} participant(s), the configured headcount",
                headcount
            )));
        }
        self.profiles.push(profile);
        Ok(())
    }

    /// Drop trailing profiles beyond headcount under the cap policy
    pub fn enforce_headcount(&mut self, headcount: u32, policy: RosterPolicy) {
        if policy == RosterPolicy::Cap && self.profiles.len() > headcount as usize {
            info!(
                from = self.profiles.len(),
                to = headcount,
                "Truncating roster to new headcount"
            );
            self.profiles.truncate(headcount as usize);
        }
    }

    pub fn status(&self, headcount: u32) -> RosterStatus {
        let saved = self.profiles.len();
        match saved.cmp(&(headcount as usize)) {
            std::cmp::Ordering::Less => RosterStatus::Incomplete {
                saved,
                expected: headcount,
            },
            std::cmp::Ordering::Equal => RosterStatus::Complete,
            std::cmp::Ordering::Greater => RosterStatus::Overfull {
                saved,
                expected: headcount,
            },
        }
    }

    /// `RosterIncomplete` when fewer profiles than headcount are saved
    ///
    /// This is a soft warning; callers log it and carry on.
    pub fn check_complete(&self, headcount: u32) -> Result<(), PlannerError> {
        match self.status(headcount) {
            RosterStatus::Incomplete { saved, expected } => Err(PlannerError::RosterIncomplete { saved, expected }),
            RosterStatus::Overfull { saved, expected } => {
                info!(saved, expected, "Roster has more participants than the headcount");
                Ok(())
            }
            RosterStatus::Complete => Ok(()),
        }
    }
}
