//! Property tests for the detector thresholds, symmetry and the gateway's
//! refusal to write past an unresolved conflict.

use chrono::{NaiveDate, NaiveTime};
use proptest::prelude::*;

use docketgate::conflict::detect_conflicts;
use docketgate::{
    CaseId, Conflict, ConflictType, Hearing, HearingRequest, HearingStatus, HearingStore,
    Severity,
};

use crate::fixtures::{actor, form, hearing_day, TestDocket};

fn time_from_minutes(minutes: u32) -> NaiveTime {
    NaiveTime::from_num_seconds_from_midnight_opt(minutes * 60, 0).expect("within a day")
}

fn hearing_at(case: &str, client: &str, minutes: u32) -> Hearing {
    Hearing::new(
        CaseId::new(case).expect("valid case id"),
        client,
        "Room 1",
        hearing_day(),
        time_from_minutes(minutes),
    )
}

fn time_overlaps(conflicts: &[Conflict]) -> Vec<&Conflict> {
    conflicts
        .iter()
        .filter(|c| c.conflict_type == ConflictType::TimeOverlap)
        .collect()
}

/// A pair of start times (in minutes after midnight) `delta` apart.
fn pair_with_delta(delta: std::ops::Range<u32>) -> impl Strategy<Value = (u32, u32)> {
    delta.prop_flat_map(|d| (0..(24 * 60 - d)).prop_map(move |start| (start, start + d)))
}

const CLIENTS: &[&str] = &["Acme Ltd", "acme ltd", "Beta Corp", " Sharma Textiles "];
const PARTIES: &[&str] = &["State", "state ", "Union of India", ""];

fn arb_hearing(case: &'static str) -> impl Strategy<Value = Hearing> {
    (
        0..CLIENTS.len(),
        proptest::option::of(0..PARTIES.len()),
        0u32..3,
        0u32..(24 * 60),
        any::<bool>(),
    )
        .prop_map(move |(client, party, day, minutes, active)| {
            let date = NaiveDate::from_ymd_opt(2026, 6, 10 + day).expect("valid date");
            let mut h = Hearing::new(
                CaseId::new(case).expect("valid case id"),
                CLIENTS[client],
                "Room 1",
                date,
                time_from_minutes(minutes),
            );
            if let Some(p) = party {
                h = h.with_opposing_party(PARTIES[p]);
            }
            if !active {
                h = h.with_status(HearingStatus::Adjourned);
            }
            h
        })
}

proptest! {
    #[test]
    fn prop_under_one_hour_is_high((a, b) in pair_with_delta(0..60)) {
        let conflicts = detect_conflicts(&hearing_at("A", "One", a), &[hearing_at("B", "Two", b)]);
        let overlaps = time_overlaps(&conflicts);
        prop_assert_eq!(overlaps.len(), 1);
        prop_assert_eq!(overlaps[0].severity, Severity::High);
    }

    #[test]
    fn prop_one_to_three_hours_is_medium((a, b) in pair_with_delta(60..180)) {
        let conflicts = detect_conflicts(&hearing_at("A", "One", a), &[hearing_at("B", "Two", b)]);
        let overlaps = time_overlaps(&conflicts);
        prop_assert_eq!(overlaps.len(), 1);
        prop_assert_eq!(overlaps[0].severity, Severity::Medium);
    }

    #[test]
    fn prop_three_hours_or_more_is_clear((a, b) in pair_with_delta(180..(24 * 60))) {
        let conflicts = detect_conflicts(&hearing_at("A", "One", a), &[hearing_at("B", "Two", b)]);
        prop_assert!(time_overlaps(&conflicts).is_empty());
    }

    #[test]
    fn prop_different_dates_never_overlap(a in 0u32..(24 * 60), b in 0u32..(24 * 60)) {
        let x = hearing_at("A", "One", a);
        let mut y = hearing_at("B", "Two", b);
        y.date = hearing_day().succ_opt().expect("valid date");
        prop_assert!(time_overlaps(&detect_conflicts(&x, &[y])).is_empty());
    }

    #[test]
    fn prop_detection_is_symmetric(a in arb_hearing("A"), b in arb_hearing("B")) {
        let forward = detect_conflicts(&a, std::slice::from_ref(&b));
        let backward = detect_conflicts(&b, std::slice::from_ref(&a));

        let summary = |found: &[Conflict]| {
            let mut kinds: Vec<_> =
                found.iter().map(|c| (c.conflict_type, c.severity, c.date)).collect();
            kinds.sort();
            kinds
        };
        let (f, r) = (summary(forward.as_slice()), summary(backward.as_slice()));
        prop_assert_eq!(f, r);
        prop_assert!(forward.iter().all(|c| c.affected_case_id.as_str() == "B"));
        prop_assert!(backward.iter().all(|c| c.affected_case_id.as_str() == "A"));
    }

    #[test]
    fn prop_same_client_both_active_double_books(
        a in arb_hearing("A"),
        b in arb_hearing("B"),
    ) {
        let conflicts = detect_conflicts(&a, std::slice::from_ref(&b));
        let flagged = conflicts
            .iter()
            .any(|c| c.conflict_type == ConflictType::ClientDoubleBooking);
        let expected = a.is_active()
            && b.is_active()
            && a.client_name.trim().eq_ignore_ascii_case(b.client_name.trim());
        prop_assert_eq!(flagged, expected);
    }

    #[test]
    fn prop_gateway_never_persists_unresolved_conflict(
        (a, b) in pair_with_delta(0..180),
        override_with_blank_reason in any::<bool>(),
    ) {
        let docket = TestDocket::new();
        let existing = time_from_minutes(a).format("%H:%M").to_string();
        let candidate = time_from_minutes(b).format("%H:%M").to_string();

        tokio_test::block_on(async {
            let first = docket
                .gateway
                .submit(HearingRequest::new(form("A", "One", &existing), actor()))
                .await
                .expect("gateway answers");
            assert!(first.is_accepted());

            let mut request = HearingRequest::new(form("B", "Two", &candidate), actor());
            if override_with_blank_reason {
                request = request.with_override("   ");
            }
            match docket.gateway.submit(request).await {
                Ok(outcome) => assert!(outcome.is_rejected()),
                Err(err) => assert!(matches!(err, docketgate::Error::OverrideReasonRequired)),
            }
            assert_eq!(docket.store.schedule().await.expect("store up").len(), 1);
            assert!(docket.store.override_records(None).await.expect("store up").is_empty());
        });
        prop_assert_eq!(docket.store.commit_count(), 1);
    }
}
