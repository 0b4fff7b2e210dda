//! Per-key commit locks.
//!
//! Detect-then-write must be atomic with respect to every hearing that could
//! conflict with the candidate. Each candidate maps to a small set of keys
//! (its date, its client, its opposing party, its case) and two hearings that
//! any default rule could flag always share at least one key. Guards are
//! taken in sorted key order so two submissions can never wait on each other
//! in a cycle.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use chrono::NaiveDate;
use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::conflict::Classifier;
use crate::dlog_trace;
use crate::hearing::{CaseId, Hearing};

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LockKey {
    /// Same-day time overlap.
    Date(NaiveDate),
    /// Canonical client name, lowercased.
    Client(String),
    /// Opposing party name, lowercased.
    OpposingParty(String),
    /// Serialises updates to one case.
    Case(CaseId),
}

impl LockKey {
    /// Every key `hearing` needs. The client name must already be canonical.
    pub fn for_hearing(hearing: &Hearing) -> BTreeSet<LockKey> {
        let mut keys = BTreeSet::new();
        keys.insert(LockKey::Date(hearing.date));
        keys.insert(LockKey::Case(hearing.case_id.clone()));

        let client = Classifier::name_key(&hearing.client_name);
        if !client.is_empty() {
            keys.insert(LockKey::Client(client));
        }
        if let Some(party) = hearing.opposing_party.as_deref() {
            let party = Classifier::name_key(party);
            if !party.is_empty() {
                keys.insert(LockKey::OpposingParty(party));
            }
        }
        keys
    }
}

impl std::fmt::Display for LockKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LockKey::Date(date) => write!(f, "date:{}", date),
            LockKey::Client(name) => write!(f, "client:{}", name),
            LockKey::OpposingParty(name) => write!(f, "party:{}", name),
            LockKey::Case(id) => write!(f, "case:{}", id),
        }
    }
}

/// Guards held for one commit. Dropping it releases every key.
#[derive(Debug)]
pub struct LockSet {
    keys: Vec<LockKey>,
    _guards: Vec<OwnedMutexGuard<()>>,
}

impl LockSet {
    pub fn keys(&self) -> &[LockKey] {
        &self.keys
    }
}

/// Lazily populated table of key mutexes.
#[derive(Debug, Default)]
pub struct LockTable {
    entries: Mutex<HashMap<LockKey, Arc<Mutex<()>>>>,
}

impl LockTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquire all `keys`, smallest first.
    pub async fn acquire(&self, keys: BTreeSet<LockKey>) -> LockSet {
        let (mutexes, tracked): (Vec<Arc<Mutex<()>>>, usize) = {
            let mut entries = self.entries.lock().await;
            // Entries only the table references are idle.
            entries.retain(|_, m| Arc::strong_count(m) > 1);
            let mutexes = keys
                .iter()
                .map(|key| Arc::clone(entries.entry(key.clone()).or_default()))
                .collect();
            (mutexes, entries.len())
        };

        let mut guards = Vec::with_capacity(mutexes.len());
        for mutex in mutexes {
            guards.push(mutex.lock_owned().await);
        }

        let keys: Vec<LockKey> = keys.into_iter().collect();
        dlog_trace!(
            "locks acquired: {} ({} key(s) tracked)",
            keys.iter().map(ToString::to_string).collect::<Vec<_>>().join(", "),
            tracked
        );
        LockSet {
            keys,
            _guards: guards,
        }
    }
}
