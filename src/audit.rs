//! Override audit records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::conflict::Conflict;
use crate::hearing::CaseId;
use crate::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OverrideId(pub Uuid);

impl OverrideId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// First 8 characters, for log lines and CLI output.
    pub fn short(&self) -> String {
        self.0.to_string()[..8].to_string()
    }
}

impl Default for OverrideId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for OverrideId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for OverrideId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// Who is performing an action. Authentication happens upstream.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Actor {
    pub id: String,
    #[serde(default)]
    pub display_name: String,
}

impl Actor {
    pub fn new(id: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
        }
    }
}

impl std::fmt::Display for Actor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.display_name.is_empty() {
            write!(f, "{}", self.id)
        } else {
            write!(f, "{} ({})", self.display_name, self.id)
        }
    }
}

/// The justification stored when a user forces a hearing through detected
/// conflicts. Immutable: fields are only readable after construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "StoredOverride")]
pub struct OverrideRecord {
    id: OverrideId,
    case_id: CaseId,
    reason: String,
    actor: Actor,
    recorded_at: DateTime<Utc>,
    conflicts: Vec<Conflict>,
}

/// A record as read back from storage, before the constructor's checks.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredOverride {
    id: OverrideId,
    case_id: CaseId,
    reason: String,
    actor: Actor,
    recorded_at: DateTime<Utc>,
    conflicts: Vec<Conflict>,
}

impl TryFrom<StoredOverride> for OverrideRecord {
    type Error = Error;

    fn try_from(stored: StoredOverride) -> Result<Self> {
        let mut record = OverrideRecord::new(
            stored.case_id,
            &stored.reason,
            stored.actor,
            stored.recorded_at,
            stored.conflicts,
        )?;
        record.id = stored.id;
        Ok(record)
    }
}

impl OverrideRecord {
    /// Fails on a blank reason or an empty conflict set: an override with
    /// nothing to override, or no justification, is never recorded.
    pub fn new(
        case_id: CaseId,
        reason: &str,
        actor: Actor,
        recorded_at: DateTime<Utc>,
        conflicts: Vec<Conflict>,
    ) -> Result<Self> {
        let reason = reason.trim();
        if reason.is_empty() {
            return Err(Error::OverrideReasonRequired);
        }
        if conflicts.is_empty() {
            return Err(Error::Validation(
                "An override record needs at least one conflict".to_string(),
            ));
        }
        if actor.id.trim().is_empty() {
            return Err(Error::Validation("Override actor id is required".to_string()));
        }
        Ok(Self {
            id: OverrideId::new(),
            case_id,
            reason: reason.to_string(),
            actor,
            recorded_at,
            conflicts,
        })
    }

    pub fn id(&self) -> OverrideId {
        self.id
    }

    pub fn case_id(&self) -> &CaseId {
        &self.case_id
    }

    pub fn reason(&self) -> &str {
        &self.reason
    }

    pub fn actor(&self) -> &Actor {
        &self.actor
    }

    pub fn recorded_at(&self) -> DateTime<Utc> {
        self.recorded_at
    }

    pub fn conflicts(&self) -> &[Conflict] {
        &self.conflicts
    }
}
