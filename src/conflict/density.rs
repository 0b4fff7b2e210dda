//! Courtroom density warnings for calendar highlighting.
//!
//! This is a separate, advisory notion from `Conflict`: several hearings in
//! the same courtroom within a short window is worth highlighting on the
//! calendar, but it never blocks a booking and never reaches the gateway.

use std::collections::BTreeMap;

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::hearing::{CaseId, Hearing};

use super::Classifier;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DensityWarning {
    pub court_name: String,
    pub date: NaiveDate,
    pub first_start: NaiveTime,
    pub last_start: NaiveTime,
    pub case_ids: Vec<CaseId>,
}

/// Clusters same-court hearings on `date` whose consecutive start times fall
/// within the density window. Clusters of one are not reported.
pub fn courtroom_density(
    classifier: &Classifier,
    hearings: &[Hearing],
    date: NaiveDate,
) -> Vec<DensityWarning> {
    let mut by_court: BTreeMap<String, Vec<&Hearing>> = BTreeMap::new();
    for hearing in hearings.iter().filter(|h| h.date == date) {
        let key = Classifier::name_key(&hearing.court_name);
        if key.is_empty() {
            continue;
        }
        by_court.entry(key).or_default().push(hearing);
    }

    let mut warnings = Vec::new();
    for mut sitting in by_court.into_values() {
        sitting.sort_by(|a, b| a.time.cmp(&b.time).then_with(|| a.case_id.cmp(&b.case_id)));

        let mut cluster: Vec<&Hearing> = Vec::new();
        for hearing in sitting {
            let joins = cluster
                .last()
                .is_some_and(|prev| classifier.within_density_window(prev.time, hearing.time));
            if !joins {
                flush(&mut cluster, date, &mut warnings);
            }
            cluster.push(hearing);
        }
        flush(&mut cluster, date, &mut warnings);
    }
    warnings
}

fn flush(cluster: &mut Vec<&Hearing>, date: NaiveDate, warnings: &mut Vec<DensityWarning>) {
    if cluster.len() > 1 {
        warnings.push(DensityWarning {
            court_name: cluster[0].court_name.trim().to_string(),
            date,
            first_start: cluster[0].time,
            last_start: cluster[cluster.len() - 1].time,
            case_ids: cluster.iter().map(|h| h.case_id.clone()).collect(),
        });
    }
    cluster.clear();
}
