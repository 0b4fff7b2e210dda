//! Reference booking scenarios.

use docketgate::conflict::{detect_conflicts, group_by_date};
use docketgate::{ConflictType, HearingRequest, HearingStore, Severity};

use crate::fixtures::{actor, form, form_on, hearing, hearing_day, TestDocket};

// ============================================================================
// Detector scenarios
// ============================================================================

#[test]
fn test_scenario_a_close_hearings_are_high_overlap() {
    let x = hearing("X", "Acme Ltd", "10:00");
    let y = hearing("Y", "Beta Corp", "10:45");

    let from_y = detect_conflicts(&y, std::slice::from_ref(&x));
    assert_eq!(from_y.len(), 1);
    assert_eq!(from_y[0].conflict_type, ConflictType::TimeOverlap);
    assert_eq!(from_y[0].severity, Severity::High);
    assert_eq!(from_y[0].affected_case_id.as_str(), "X");
    assert_eq!(from_y[0].date, Some(hearing_day()));

    let from_x = detect_conflicts(&x, std::slice::from_ref(&y));
    assert_eq!(from_x.len(), 1);
    assert_eq!(from_x[0].affected_case_id.as_str(), "Y");
}

#[test]
fn test_scenario_b_three_hours_apart_is_clear() {
    let x = hearing("X", "Acme Ltd", "10:00");
    let z = hearing("Z", "Beta Corp", "13:00");
    assert!(detect_conflicts(&z, &[x]).is_empty());
}

#[test]
fn test_scenario_c_client_double_booking_across_dates() {
    let first = hearing("C-1", "Sharma Textiles", "10:00");
    let mut second = hearing("C-2", "sharma textiles ", "10:00");
    second.date = hearing_day().succ_opt().expect("valid date");

    let conflicts = detect_conflicts(&second, &[first]);
    assert_eq!(conflicts.len(), 1);
    assert_eq!(conflicts[0].conflict_type, ConflictType::ClientDoubleBooking);
    assert_eq!(conflicts[0].severity, Severity::Medium);
    assert!(conflicts[0].date.is_none());

    let groups = group_by_date(&conflicts);
    assert!(groups.dated.is_empty());
    assert_eq!(groups.general.len(), 1);
}

#[test]
fn test_all_three_rules_union() {
    let x = hearing("X", "Acme Ltd", "10:00").with_opposing_party("State of Goa");
    let y = hearing("Y", "ACME LTD", "11:30").with_opposing_party("state of goa");

    let conflicts = detect_conflicts(&y, &[x]);
    let kinds: Vec<(ConflictType, Severity)> = conflicts
        .iter()
        .map(|c| (c.conflict_type, c.severity))
        .collect();
    assert_eq!(
        kinds,
        vec![
            (ConflictType::OpposingPartyConflict, Severity::High),
            (ConflictType::TimeOverlap, Severity::Medium),
            (ConflictType::ClientDoubleBooking, Severity::Medium),
        ]
    );
}

// ============================================================================
// Gateway scenarios
// ============================================================================

#[tokio::test]
async fn test_scenario_d_reject_then_override() {
    let docket = TestDocket::seeded(vec![hearing("X", "Acme Ltd", "10:00")]);

    let first = docket
        .gateway
        .submit(HearingRequest::new(form("Y", "Beta Corp", "10:45"), actor()))
        .await
        .expect("gateway answers");
    assert!(first.is_rejected());
    assert_eq!(first.conflicts().len(), 1);
    let presented = first.conflicts()[0].clone();
    assert!(docket.store.find(&presented.affected_case_id).await.unwrap().is_some());
    assert_eq!(docket.store.commit_count(), 0);

    let second = docket
        .gateway
        .submit(
            HearingRequest::new(form("Y", "Beta Corp", "10:45"), actor())
                .with_override("client-requested despite conflict"),
        )
        .await
        .expect("gateway answers");
    let receipt = second.receipt().expect("accepted");
    let override_id = receipt.override_id.expect("override recorded");

    let records = docket
        .store
        .override_records(Some(&receipt.case_id))
        .await
        .unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].id(), override_id);
    assert_eq!(records[0].reason(), "client-requested despite conflict");
    assert_eq!(records[0].conflicts(), std::slice::from_ref(&presented));
    assert_eq!(records[0].actor(), &actor());
}

#[tokio::test]
async fn test_unrelated_booking_is_accepted_without_record() {
    let docket = TestDocket::seeded(vec![hearing("X", "Acme Ltd", "10:00")]);

    let outcome = docket
        .gateway
        .submit(HearingRequest::new(
            form_on("Z", "Beta Corp", "2026-06-11", "10:00"),
            actor(),
        ))
        .await
        .unwrap();
    assert!(outcome.is_accepted());
    assert!(docket.store.override_records(None).await.unwrap().is_empty());
    assert_eq!(docket.store.schedule().await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_closed_hearing_does_not_double_book_client() {
    let closed = hearing("OLD", "Sharma Textiles", "09:00")
        .with_status(docketgate::HearingStatus::Closed);
    let docket = TestDocket::seeded(vec![closed]);

    let outcome = docket
        .gateway
        .submit(HearingRequest::new(
            form_on("NEW", "Sharma Textiles", "2026-07-01", "09:00"),
            actor(),
        ))
        .await
        .unwrap();
    assert!(outcome.is_accepted());
}

#[tokio::test]
async fn test_validation_failure_is_not_a_conflict() {
    let docket = TestDocket::seeded(vec![hearing("X", "Acme Ltd", "10:00")]);

    let mut bad = form("Y", "Beta Corp", "10:45");
    bad.hearing_date = "tomorrow".to_string();
    let err = docket
        .gateway
        .submit(HearingRequest::new(bad, actor()))
        .await
        .unwrap_err();
    assert_eq!(err.category(), docketgate::ErrorCategory::Validation);
    assert_eq!(docket.store.commit_count(), 0);
}
