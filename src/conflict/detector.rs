//! Pure conflict detection over an explicit schedule.
//!
//! Each rule looks at one (candidate, existing) pair and is evaluated
//! independently; the detector unions their output. Adding a rule means
//! adding a `ConflictRule` impl, not editing the existing ones.

use crate::dlog_trace;
use crate::hearing::Hearing;

use super::{Classifier, Conflict, ConflictType};

/// One independent detection rule.
pub trait ConflictRule: Send + Sync {
    fn kind(&self) -> ConflictType;

    /// Evaluate a single pair. `other` is never the candidate itself.
    fn evaluate(
        &self,
        candidate: &Hearing,
        other: &Hearing,
        classifier: &Classifier,
    ) -> Option<Conflict>;
}

/// Same calendar date, start times closer than the classifier's thresholds.
#[derive(Debug, Clone, Copy, Default)]
pub struct TimeOverlapRule;

impl ConflictRule for TimeOverlapRule {
    fn kind(&self) -> ConflictType {
        ConflictType::TimeOverlap
    }

    fn evaluate(
        &self,
        candidate: &Hearing,
        other: &Hearing,
        classifier: &Classifier,
    ) -> Option<Conflict> {
        if candidate.date != other.date {
            return None;
        }
        let delta = Classifier::time_delta(candidate.time, other.time);
        let severity = classifier.classify_time_delta(delta)?;
        Some(classifier.time_overlap(&other.case_id, other.date, other.time, severity))
    }
}

/// Same client on two active hearings, regardless of date or time.
#[derive(Debug, Clone, Copy, Default)]
pub struct ClientDoubleBookingRule;

impl ConflictRule for ClientDoubleBookingRule {
    fn kind(&self) -> ConflictType {
        ConflictType::ClientDoubleBooking
    }

    fn evaluate(
        &self,
        candidate: &Hearing,
        other: &Hearing,
        classifier: &Classifier,
    ) -> Option<Conflict> {
        if !(candidate.is_active() && other.is_active()) {
            return None;
        }
        if !Classifier::names_match(&candidate.client_name, &other.client_name) {
            return None;
        }
        Some(classifier.client_double_booking(&other.case_id, &other.client_name))
    }
}

/// Same non-empty opposing party on any two hearings.
#[derive(Debug, Clone, Copy, Default)]
pub struct OpposingPartyRule;

impl ConflictRule for OpposingPartyRule {
    fn kind(&self) -> ConflictType {
        ConflictType::OpposingPartyConflict
    }

    fn evaluate(
        &self,
        candidate: &Hearing,
        other: &Hearing,
        classifier: &Classifier,
    ) -> Option<Conflict> {
        let ours = candidate.opposing_party.as_deref()?;
        let theirs = other.opposing_party.as_deref()?;
        if !Classifier::names_match(ours, theirs) {
            return None;
        }
        Some(classifier.opposing_party_conflict(&other.case_id, theirs))
    }
}

/// Runs every registered rule against every other hearing.
pub struct Detector {
    classifier: Classifier,
    rules: Vec<Box<dyn ConflictRule>>,
}

impl Default for Detector {
    fn default() -> Self {
        Self::new(Classifier::default())
    }
}

impl std::fmt::Debug for Detector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Detector")
            .field("classifier", &self.classifier)
            .field("rules", &self.rule_kinds())
            .finish()
    }
}

impl Detector {
    /// Detector with the three standard rules.
    pub fn new(classifier: Classifier) -> Self {
        Self {
            classifier,
            rules: vec![
                Box::new(TimeOverlapRule),
                Box::new(ClientDoubleBookingRule),
                Box::new(OpposingPartyRule),
            ],
        }
    }

    /// Detector with no rules; add them with `with_rule`.
    pub fn empty(classifier: Classifier) -> Self {
        Self {
            classifier,
            rules: Vec::new(),
        }
    }

    pub fn with_rule(mut self, rule: Box<dyn ConflictRule>) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn classifier(&self) -> &Classifier {
        &self.classifier
    }

    pub fn rule_kinds(&self) -> Vec<ConflictType> {
        self.rules.iter().map(|r| r.kind()).collect()
    }

    /// All conflicts between `candidate` and `existing`.
    ///
    /// Hearings sharing the candidate's case id are the candidate itself
    /// (e.g. an update) and are skipped. Output is sorted most severe first.
    pub fn detect(&self, candidate: &Hearing, existing: &[Hearing]) -> Vec<Conflict> {
        let mut conflicts: Vec<Conflict> = existing
            .iter()
            .filter(|other| other.case_id != candidate.case_id)
            .flat_map(|other| {
                self.rules
                    .iter()
                    .filter_map(move |rule| rule.evaluate(candidate, other, &self.classifier))
            })
            .collect();

        conflicts.sort_by(|a, b| a.sort_key().cmp(&b.sort_key()));

        dlog_trace!(
            "detect case={} against={} conflicts={}",
            candidate.case_id,
            existing.len(),
            conflicts.len()
        );
        conflicts
    }
}

/// Detection with the default rules and thresholds.
pub fn detect_conflicts(candidate: &Hearing, existing: &[Hearing]) -> Vec<Conflict> {
    Detector::default().detect(candidate, existing)
}
