//! Conflict detection for hearing scheduling.
//!
//! - `types`: conflict records and presentation grouping
//! - `classifier`: thresholds, name matching and message templates
//! - `detector`: the pure multi-rule detector
//! - `density`: advisory same-courtroom warnings for the calendar view

mod classifier;
mod density;
mod detector;
mod types;

pub use classifier::{Classifier, ClassifierConfig};
pub use density::{courtroom_density, DensityWarning};
pub use detector::{
    detect_conflicts, ClientDoubleBookingRule, ConflictRule, Detector, OpposingPartyRule,
    TimeOverlapRule,
};
pub use types::{group_by_date, max_severity, Conflict, ConflictGroups, ConflictType, Severity};
