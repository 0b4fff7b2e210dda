//! Resolution session type definitions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ErrorCategory;
use crate::Error;

/// Unique identifier for one in-progress hearing submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(pub Uuid);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Return first 8 characters of the UUID for display.
    pub fn short(&self) -> String {
        self.0.to_string()[..8].to_string()
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for SessionId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// Where a submission stands from the user's point of view.
///
/// ```text
/// Idle -> Submitting -> { Accepted, ConflictPresented }
/// ConflictPresented -> { Idle, EditingTime, OverrideSubmitting }
/// EditingTime -> Submitting
/// OverrideSubmitting -> { Submitting, Accepted, ConflictPresented }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionState {
    /// Form open, nothing in flight.
    #[default]
    Idle,
    /// Waiting on the gateway.
    Submitting,
    /// Committed. Terminal.
    Accepted,
    /// The gateway rejected with conflicts; waiting on the user.
    ConflictPresented,
    /// The user is changing the time field.
    EditingTime,
    /// The user chose to override and gave a reason.
    OverrideSubmitting,
}

impl ResolutionState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, ResolutionState::Accepted)
    }

    /// A gateway call is (or is about to be) in flight.
    pub fn is_in_flight(&self) -> bool {
        matches!(
            self,
            ResolutionState::Submitting | ResolutionState::OverrideSubmitting
        )
    }
}

impl std::fmt::Display for ResolutionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResolutionState::Idle => write!(f, "idle"),
            ResolutionState::Submitting => write!(f, "submitting"),
            ResolutionState::Accepted => write!(f, "accepted"),
            ResolutionState::ConflictPresented => write!(f, "conflict_presented"),
            ResolutionState::EditingTime => write!(f, "editing_time"),
            ResolutionState::OverrideSubmitting => write!(f, "override_submitting"),
        }
    }
}

/// A state the session entered, with timestamp.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateHistoryEntry {
    pub state: ResolutionState,
    pub entered_at: DateTime<Utc>,
}

/// The last failure reported to the user. `Error` itself is not `Clone`,
/// so the session keeps this summary instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionError {
    pub category: ErrorCategory,
    pub message: String,
}

impl SessionError {
    pub fn is_retryable(&self) -> bool {
        self.category == ErrorCategory::Transport
    }
}

impl From<&Error> for SessionError {
    fn from(err: &Error) -> Self {
        Self {
            category: err.category(),
            message: err.to_string(),
        }
    }
}
