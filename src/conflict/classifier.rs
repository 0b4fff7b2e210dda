//! Threshold and message policy for conflict classification.
//!
//! The detector only walks hearing pairs; every decision about "how close is
//! too close" and "do these names match" lives here so the advisory and the
//! authoritative call sites share one set of thresholds.

use chrono::{NaiveDate, NaiveTime, TimeDelta};
use serde::{Deserialize, Serialize};

use crate::hearing::CaseId;
use crate::{Error, Result};

use super::{Conflict, ConflictType, Severity};

const DEFAULT_HIGH_WITHIN_MINUTES: u32 = 60;
const DEFAULT_MEDIUM_WITHIN_MINUTES: u32 = 180;
const DEFAULT_DENSITY_WINDOW_MINUTES: u32 = 120;

/// Tunable thresholds, loaded from the `[thresholds]` table of the config.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    /// Start times closer than this are a High time overlap.
    pub high_within_minutes: u32,
    /// Start times closer than this (but not High) are a Medium time overlap.
    pub medium_within_minutes: u32,
    /// Same-courtroom window for calendar density warnings. Advisory only.
    pub density_window_minutes: u32,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            high_within_minutes: DEFAULT_HIGH_WITHIN_MINUTES,
            medium_within_minutes: DEFAULT_MEDIUM_WITHIN_MINUTES,
            density_window_minutes: DEFAULT_DENSITY_WINDOW_MINUTES,
        }
    }
}

impl ClassifierConfig {
    pub fn validate(&self) -> Result<()> {
        if self.high_within_minutes == 0 {
            return Err(Error::Validation(
                "thresholds.high_within_minutes must be greater than zero".to_string(),
            ));
        }
        if self.high_within_minutes >= self.medium_within_minutes {
            return Err(Error::Validation(format!(
                "thresholds.high_within_minutes ({}) must be less than medium_within_minutes ({})",
                self.high_within_minutes, self.medium_within_minutes
            )));
        }
        if self.density_window_minutes == 0 {
            return Err(Error::Validation(
                "thresholds.density_window_minutes must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default)]
pub struct Classifier {
    config: ClassifierConfig,
}

impl Classifier {
    pub fn new(config: ClassifierConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &ClassifierConfig {
        &self.config
    }

    /// Absolute difference between two times of day, ignoring dates.
    pub fn time_delta(a: NaiveTime, b: NaiveTime) -> TimeDelta {
        (a - b).abs()
    }

    /// `None` when the two start times are far enough apart.
    pub fn classify_time_delta(&self, delta: TimeDelta) -> Option<Severity> {
        let seconds = delta.num_seconds().abs();
        if seconds < i64::from(self.config.high_within_minutes) * 60 {
            Some(Severity::High)
        } else if seconds < i64::from(self.config.medium_within_minutes) * 60 {
            Some(Severity::Medium)
        } else {
            None
        }
    }

    /// Within the advisory courtroom density window.
    pub fn within_density_window(&self, a: NaiveTime, b: NaiveTime) -> bool {
        Self::time_delta(a, b).num_seconds() < i64::from(self.config.density_window_minutes) * 60
    }

    /// Exact match after trimming, ignoring case. Blank names never match.
    pub fn names_match(a: &str, b: &str) -> bool {
        let (a, b) = (a.trim(), b.trim());
        !a.is_empty() && a.to_lowercase() == b.to_lowercase()
    }

    pub(crate) fn name_key(name: &str) -> String {
        name.trim().to_lowercase()
    }

    pub fn time_overlap(
        &self,
        other: &CaseId,
        date: NaiveDate,
        other_time: NaiveTime,
        severity: Severity,
    ) -> Conflict {
        Conflict::new(
            ConflictType::TimeOverlap,
            severity,
            format!(
                "Scheduling conflict with {} on {} at {}",
                other,
                date,
                other_time.format("%H:%M")
            ),
            other.clone(),
        )
        .on_date(date)
    }

    pub fn client_double_booking(&self, other: &CaseId, client: &str) -> Conflict {
        Conflict::new(
            ConflictType::ClientDoubleBooking,
            Severity::Medium,
            format!("Client {} also has active case {}", client.trim(), other),
            other.clone(),
        )
    }

    pub fn opposing_party_conflict(&self, other: &CaseId, party: &str) -> Conflict {
        Conflict::new(
            ConflictType::OpposingPartyConflict,
            Severity::High,
            format!("Opposing party {} also appears in case {}", party.trim(), other),
            other.clone(),
        )
    }
}
