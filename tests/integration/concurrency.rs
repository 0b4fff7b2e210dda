//! Racing submissions against one schedule.
//!
//! The store stalls every read so that, without the gateway's per-key
//! locks, every submission would see an empty schedule and all would be
//! accepted.

use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::future::join_all;

use docketgate::{Gateway, HearingForm, HearingRequest, HearingStore, SubmitOutcome};

use crate::fixtures::{actor, form, form_on, TestDocket};

const READ_DELAY: Duration = Duration::from_millis(40);

async fn race(gateway: &Arc<Gateway>, forms: Vec<HearingForm>) -> Vec<SubmitOutcome> {
    let handles = forms.into_iter().map(|form| {
        let gateway = Arc::clone(gateway);
        tokio::spawn(async move { gateway.submit(HearingRequest::new(form, actor())).await })
    });
    join_all(handles)
        .await
        .into_iter()
        .map(|joined| joined.expect("task completes").expect("gateway answers"))
        .collect()
}

fn accepted(outcomes: &[SubmitOutcome]) -> usize {
    outcomes.iter().filter(|o| o.is_accepted()).count()
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_same_slot_race_accepts_exactly_one() {
    let docket = TestDocket::slow(READ_DELAY);
    let forms = (0..8)
        .map(|i| form(&format!("C-{}", i), &format!("Client {}", i), "10:00"))
        .collect();

    let outcomes = race(&docket.gateway, forms).await;

    assert_eq!(accepted(&outcomes), 1);
    assert_eq!(docket.store.commit_count(), 1);
    for rejected in outcomes.iter().filter(|o| o.is_rejected()) {
        assert_eq!(rejected.conflicts().len(), 1);
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_same_client_on_different_dates_accepts_exactly_one() {
    let docket = TestDocket::slow(READ_DELAY);
    let forms = (0..6)
        .map(|i| {
            form_on(
                &format!("S-{}", i),
                "Sharma Textiles",
                &format!("2026-06-{:02}", 10 + i),
                "10:00",
            )
        })
        .collect();

    let outcomes = race(&docket.gateway, forms).await;

    assert_eq!(accepted(&outcomes), 1);
    assert_eq!(docket.store.schedule().await.unwrap().len(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_same_opposing_party_accepts_exactly_one() {
    let docket = TestDocket::slow(READ_DELAY);
    let forms = (0..6)
        .map(|i| {
            let mut f = form_on(
                &format!("P-{}", i),
                &format!("Client {}", i),
                &format!("2026-07-{:02}", 1 + i),
                "10:00",
            );
            f.opposing_party = Some("Municipal Corporation".to_string());
            f
        })
        .collect();

    let outcomes = race(&docket.gateway, forms).await;

    assert_eq!(accepted(&outcomes), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_unrelated_submissions_all_succeed_in_parallel() {
    let docket = TestDocket::slow(READ_DELAY);
    let forms: Vec<HearingForm> = (0..6)
        .map(|i| {
            form_on(
                &format!("U-{}", i),
                &format!("Client {}", i),
                &format!("2026-08-{:02}", 1 + i),
                "10:00",
            )
        })
        .collect();

    let started = Instant::now();
    let outcomes = race(&docket.gateway, forms).await;
    let elapsed = started.elapsed();

    assert_eq!(accepted(&outcomes), 6);
    assert_eq!(docket.store.commit_count(), 6);
    // Disjoint keys do not queue behind each other.
    assert!(
        elapsed < READ_DELAY * 4,
        "six disjoint submissions took {:?}",
        elapsed
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_race_with_overrides_records_each_override() {
    let docket = TestDocket::slow(READ_DELAY);
    let handles = (0..4).map(|i| {
        let gateway = Arc::clone(&docket.gateway);
        tokio::spawn(async move {
            let request = HearingRequest::new(
                form(&format!("O-{}", i), &format!("Client {}", i), "10:00"),
                actor(),
            )
            .with_override("court fixed the slot");
            gateway.submit(request).await
        })
    });
    let outcomes: Vec<SubmitOutcome> = join_all(handles)
        .await
        .into_iter()
        .map(|joined| joined.expect("task completes").expect("gateway answers"))
        .collect();

    assert_eq!(accepted(&outcomes), 4);
    let with_record = outcomes
        .iter()
        .filter(|o| o.receipt().and_then(|r| r.override_id).is_some())
        .count();
    // The first one in saw an empty day; the rest each overrode.
    assert_eq!(with_record, 3);
    assert_eq!(docket.store.override_records(None).await.unwrap().len(), 3);
}
