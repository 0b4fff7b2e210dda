//! Test fixtures for integration tests.
//!
//! Provides helpers for:
//! - Building hearing forms and stored hearings on a fixed calendar
//! - A gateway wired to an in-memory store and a pinned clock

use std::sync::Arc;
use std::time::Duration;

use chrono::{NaiveDate, NaiveTime};

use docketgate::clock::FixedClock;
use docketgate::registry::PassthroughRegistry;
use docketgate::{Actor, CaseId, Detector, Gateway, Hearing, HearingForm, MemoryStore};

/// The date every test runs on.
pub fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 6, 1).expect("valid date")
}

/// The default hearing date, a week and a bit after `today`.
pub fn hearing_day() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 6, 10).expect("valid date")
}

pub fn at(time: &str) -> NaiveTime {
    NaiveTime::parse_from_str(time, "%H:%M").expect("valid time")
}

pub fn actor() -> Actor {
    Actor::new("adv-42", "M. Fernandes")
}

/// A form on `hearing_day` in the City Civil Court.
pub fn form(case: &str, client: &str, time: &str) -> HearingForm {
    HearingForm {
        case_number: case.to_string(),
        client_name: client.to_string(),
        court_name: "City Civil Court, Room 3".to_string(),
        hearing_date: hearing_day().format("%Y-%m-%d").to_string(),
        hearing_time: time.to_string(),
        ..HearingForm::default()
    }
}

pub fn form_on(case: &str, client: &str, date: &str, time: &str) -> HearingForm {
    HearingForm {
        hearing_date: date.to_string(),
        ..form(case, client, time)
    }
}

/// A stored hearing on `hearing_day`.
pub fn hearing(case: &str, client: &str, time: &str) -> Hearing {
    Hearing::new(
        CaseId::new(case).expect("valid case id"),
        client,
        "City Civil Court, Room 3",
        hearing_day(),
        at(time),
    )
}

/// A gateway over an in-memory store, with the store kept for inspection.
pub struct TestDocket {
    pub store: Arc<MemoryStore>,
    pub gateway: Arc<Gateway>,
}

impl TestDocket {
    pub fn new() -> Self {
        Self::with_store(MemoryStore::new())
    }

    pub fn seeded(hearings: Vec<Hearing>) -> Self {
        Self::with_store(MemoryStore::with_hearings(hearings))
    }

    /// Reads stall for `delay`, so concurrent submissions overlap.
    pub fn slow(delay: Duration) -> Self {
        Self::with_store(MemoryStore::new().with_read_delay(delay))
    }

    pub fn with_store(store: MemoryStore) -> Self {
        let store = Arc::new(store);
        let gateway = Gateway::new(
            store.clone(),
            Detector::default(),
            Arc::new(PassthroughRegistry),
            Arc::new(FixedClock::on(today())),
        );
        Self {
            store,
            gateway: Arc::new(gateway),
        }
    }
}
