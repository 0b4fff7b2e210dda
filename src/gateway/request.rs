//! Wire shapes at the commit boundary.

use serde::{Deserialize, Serialize};

use crate::audit::{Actor, OverrideId};
use crate::conflict::Conflict;
use crate::error::ErrorCategory;
use crate::hearing::{CaseId, HearingForm};
use crate::Error;

use super::SubmitOutcome;

/// A create-or-update hearing payload, optionally carrying an override.
///
/// The form fields are flattened so the JSON looks like the hearing form
/// with `override` / `overrideReason` / `actor` alongside.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HearingRequest {
    #[serde(flatten)]
    pub form: HearingForm,
    #[serde(rename = "override", default)]
    pub override_requested: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub override_reason: Option<String>,
    #[serde(default)]
    pub actor: Actor,
    /// Conflicts the user saw when choosing to override. When present, an
    /// override only covers these; anything new sends the request back.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub acknowledged_conflicts: Option<Vec<Conflict>>,
}

impl HearingRequest {
    pub fn new(form: HearingForm, actor: Actor) -> Self {
        Self {
            form,
            override_requested: false,
            override_reason: None,
            actor,
            acknowledged_conflicts: None,
        }
    }

    pub fn with_override(mut self, reason: impl Into<String>) -> Self {
        self.override_requested = true;
        self.override_reason = Some(reason.into());
        self
    }

    pub fn acknowledging(mut self, conflicts: Vec<Conflict>) -> Self {
        self.acknowledged_conflicts = Some(conflicts);
        self
    }

    /// Detected conflicts the override does not cover. Without an
    /// acknowledged list the override covers everything.
    pub fn unacknowledged<'a>(&self, detected: &'a [Conflict]) -> Vec<&'a Conflict> {
        match &self.acknowledged_conflicts {
            None => Vec::new(),
            Some(seen) => detected
                .iter()
                .filter(|c| !seen.iter().any(|s| s.same_finding(c)))
                .collect(),
        }
    }

    /// The override reason, trimmed, if one was given and is non-blank.
    pub fn reason(&self) -> Option<&str> {
        self.override_reason
            .as_deref()
            .map(str::trim)
            .filter(|r| !r.is_empty())
    }
}

/// What the commit boundary answers.
///
/// `Conflict` is the "understood but needs explicit confirmation" outcome
/// and is kept apart from `Invalid` and `Unavailable` so callers can branch
/// to the resolution workflow instead of a failure path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum GatewayResponse {
    Accepted {
        #[serde(rename = "caseId")]
        case_id: CaseId,
        #[serde(rename = "overrideId", default, skip_serializing_if = "Option::is_none")]
        override_id: Option<OverrideId>,
    },
    Conflict {
        conflicts: Vec<Conflict>,
    },
    Invalid {
        message: String,
    },
    Unavailable {
        message: String,
    },
    Error {
        message: String,
    },
}

impl GatewayResponse {
    pub fn from_result(result: crate::Result<SubmitOutcome>) -> Self {
        match result {
            Ok(SubmitOutcome::Accepted(receipt)) => GatewayResponse::Accepted {
                case_id: receipt.case_id,
                override_id: receipt.override_id,
            },
            Ok(SubmitOutcome::Rejected { conflicts }) => GatewayResponse::Conflict { conflicts },
            Err(err) => Self::from_error(&err),
        }
    }

    pub fn from_error(err: &Error) -> Self {
        let message = err.to_string();
        match err.category() {
            ErrorCategory::Validation => GatewayResponse::Invalid { message },
            ErrorCategory::Transport => GatewayResponse::Unavailable { message },
            ErrorCategory::Internal => GatewayResponse::Error { message },
        }
    }

    /// Process exit code for the CLI: 0 accepted, 2 conflict, 1 otherwise.
    pub fn exit_code(&self) -> i32 {
        match self {
            GatewayResponse::Accepted { .. } => 0,
            GatewayResponse::Conflict { .. } => 2,
            _ => 1,
        }
    }

    pub fn is_accepted(&self) -> bool {
        matches!(self, GatewayResponse::Accepted { .. })
    }
}
