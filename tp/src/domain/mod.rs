//! Domain types for TripPlanner
//!
//! Trip configuration, participant roster, conversation transcript and the
//! final deliverable. Everything here is owned by a single planning session.

mod deliverable;
mod participant;
mod transcript;
mod trip;

pub use deliverable::{Deliverable, Guide};
pub use participant::{
    Gender, MAX_AGE, ParticipantProfile, ParticipantRoster, Preference, PreferenceMode, RosterPolicy, RosterStatus,
};
pub use transcript::{ConversationTurn, Speaker, Transcript};
pub use trip::{MAX_HEADCOUNT, ModelChoice, TripConfiguration};
