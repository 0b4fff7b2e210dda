//! Conflict record types.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::hearing::CaseId;

/// The rule that produced a conflict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ConflictType {
    /// Two hearings on the same date whose start times are too close.
    TimeOverlap,
    /// The same client has two active hearings (workload, not collision).
    ClientDoubleBooking,
    /// The same opposing party appears in two hearings (conflict of interest).
    OpposingPartyConflict,
}

impl ConflictType {
    /// Only time overlaps are scoped to a calendar date.
    pub fn is_date_scoped(&self) -> bool {
        matches!(self, ConflictType::TimeOverlap)
    }
}

impl std::fmt::Display for ConflictType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConflictType::TimeOverlap => write!(f, "time_overlap"),
            ConflictType::ClientDoubleBooking => write!(f, "client_double_booking"),
            ConflictType::OpposingPartyConflict => write!(f, "opposing_party_conflict"),
        }
    }
}

/// How blocking a conflict is expected to be. Ordered `Low < Medium < High`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Low => write!(f, "low"),
            Severity::Medium => write!(f, "medium"),
            Severity::High => write!(f, "high"),
        }
    }
}

/// A detected collision between a candidate hearing and an existing one.
///
/// Derived and transient: recomputed on every detection call and only ever
/// persisted inside an `OverrideRecord`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Conflict {
    #[serde(rename = "type")]
    pub conflict_type: ConflictType,
    pub severity: Severity,
    pub message: String,
    pub affected_case_id: CaseId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
}

impl Conflict {
    pub fn new(
        conflict_type: ConflictType,
        severity: Severity,
        message: impl Into<String>,
        affected_case_id: CaseId,
    ) -> Self {
        Self {
            conflict_type,
            severity,
            message: message.into(),
            affected_case_id,
            date: None,
        }
    }

    pub fn on_date(mut self, date: NaiveDate) -> Self {
        self.date = Some(date);
        self
    }

    /// Same rule, same other case, same severity. Messages are ignored.
    pub fn same_finding(&self, other: &Conflict) -> bool {
        self.conflict_type == other.conflict_type
            && self.severity == other.severity
            && self.affected_case_id == other.affected_case_id
    }

    /// Presentation order: most severe first, then by case, then by rule.
    pub(crate) fn sort_key(&self) -> (std::cmp::Reverse<Severity>, &CaseId, ConflictType) {
        (
            std::cmp::Reverse(self.severity),
            &self.affected_case_id,
            self.conflict_type,
        )
    }
}

/// Conflicts split the way the conflict panel shows them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConflictGroups {
    /// Date-scoped conflicts keyed by the shared date.
    pub dated: BTreeMap<NaiveDate, Vec<Conflict>>,
    /// Everything without a date.
    pub general: Vec<Conflict>,
}

impl ConflictGroups {
    pub fn is_empty(&self) -> bool {
        self.dated.is_empty() && self.general.is_empty()
    }

    pub fn len(&self) -> usize {
        self.dated.values().map(Vec::len).sum::<usize>() + self.general.len()
    }
}

pub fn group_by_date(conflicts: &[Conflict]) -> ConflictGroups {
    let mut groups = ConflictGroups::default();
    for conflict in conflicts {
        match conflict.date.filter(|_| conflict.conflict_type.is_date_scoped()) {
            Some(date) => groups.dated.entry(date).or_default().push(conflict.clone()),
            None => groups.general.push(conflict.clone()),
        }
    }
    groups
}

/// Highest severity in a set, if any.
pub fn max_severity(conflicts: &[Conflict]) -> Option<Severity> {
    conflicts.iter().map(|c| c.severity).max()
}
