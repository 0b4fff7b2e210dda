//! The gateway over the JSON file backend.

use std::sync::Arc;

use tempfile::TempDir;

use docketgate::clock::FixedClock;
use docketgate::config::Config;
use docketgate::registry::PassthroughRegistry;
use docketgate::{CaseId, Detector, Gateway, HearingRequest, HearingStore, JsonFileStore};

use crate::fixtures::{actor, form, today};

fn gateway_over(store: Arc<JsonFileStore>) -> Gateway {
    Gateway::new(
        store,
        Detector::default(),
        Arc::new(PassthroughRegistry),
        Arc::new(FixedClock::on(today())),
    )
}

#[tokio::test]
async fn test_override_survives_reopen() {
    let dir = TempDir::new().expect("temp dir");
    let path = dir.path().join("schedule.json");

    {
        let gateway = gateway_over(Arc::new(JsonFileStore::new(&path)));
        gateway
            .submit(HearingRequest::new(form("X", "Acme Ltd", "10:00"), actor()))
            .await
            .unwrap();
        let outcome = gateway
            .submit(
                HearingRequest::new(form("Y", "Beta Corp", "10:45"), actor())
                    .with_override("client-requested despite conflict"),
            )
            .await
            .unwrap();
        assert!(outcome.receipt().unwrap().override_id.is_some());
    }

    let reopened = JsonFileStore::new(&path);
    assert_eq!(reopened.schedule().await.unwrap().len(), 2);
    let records = reopened
        .override_records(Some(&CaseId::new("Y").unwrap()))
        .await
        .unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].conflicts()[0].affected_case_id.as_str(), "X");

    // A fresh gateway over the same file still sees X.
    let gateway = gateway_over(Arc::new(reopened));
    let outcome = gateway
        .submit(HearingRequest::new(form("Z", "Gamma", "09:30"), actor()))
        .await
        .unwrap();
    assert!(outcome.is_rejected());
}

#[tokio::test]
async fn test_rejection_leaves_file_unchanged() {
    let dir = TempDir::new().expect("temp dir");
    let path = dir.path().join("schedule.json");
    let gateway = gateway_over(Arc::new(JsonFileStore::new(&path)));

    gateway
        .submit(HearingRequest::new(form("X", "Acme Ltd", "10:00"), actor()))
        .await
        .unwrap();
    let before = std::fs::read_to_string(&path).unwrap();

    let outcome = gateway
        .submit(HearingRequest::new(form("Y", "Beta Corp", "10:45"), actor()))
        .await
        .unwrap();
    assert!(outcome.is_rejected());
    assert_eq!(std::fs::read_to_string(&path).unwrap(), before);
}

#[tokio::test]
async fn test_config_thresholds_drive_the_gateway() {
    let dir = TempDir::new().expect("temp dir");
    let config_path = dir.path().join("docketgate.toml");
    std::fs::write(
        &config_path,
        "[thresholds]\nhigh_within_minutes = 15\nmedium_within_minutes = 30\n",
    )
    .unwrap();
    let config = Config::load_from(&config_path).unwrap();

    let store = Arc::new(config.open_store(Some(&dir.path().join("schedule.json"))).unwrap());
    let gateway = Gateway::new(
        store,
        config.detector().unwrap(),
        Arc::new(config.registry()),
        Arc::new(FixedClock::on(today())),
    );

    gateway
        .submit(HearingRequest::new(form("X", "Acme Ltd", "10:00"), actor()))
        .await
        .unwrap();
    // 45 minutes is outside a 30 minute medium band.
    let outcome = gateway
        .submit(HearingRequest::new(form("Y", "Beta Corp", "10:45"), actor()))
        .await
        .unwrap();
    assert!(outcome.is_accepted());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_two_stores_sharing_a_file_accept_one_of_an_overlapping_pair() {
    for round in 0..20 {
        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join("schedule.json");
        // Separate store instances share nothing but the path, like two CLI runs.
        let left = Arc::new(gateway_over(Arc::new(JsonFileStore::new(&path))));
        let right = Arc::new(gateway_over(Arc::new(JsonFileStore::new(&path))));

        let first = tokio::spawn(async move {
            left.submit(HearingRequest::new(form("A", "Acme Ltd", "10:00"), actor()))
                .await
        });
        let second = tokio::spawn(async move {
            right
                .submit(HearingRequest::new(form("B", "Beta Corp", "10:15"), actor()))
                .await
        });
        let first = first.await.expect("task completes").expect("gateway answers");
        let second = second.await.expect("task completes").expect("gateway answers");

        assert!(
            first.is_accepted() != second.is_accepted(),
            "round {}: exactly one of the overlapping hearings is accepted",
            round
        );
        let winner = if first.is_accepted() { "A" } else { "B" };
        let stored = JsonFileStore::new(&path).schedule().await.unwrap();
        assert_eq!(stored.len(), 1, "round {}", round);
        assert_eq!(stored[0].case_id.as_str(), winner);
    }
}
