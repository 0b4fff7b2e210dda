use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::audit::OverrideRecord;
use crate::hearing::{CaseId, Hearing};
use crate::{Error, Result};

use super::{HearingStore, ScheduleDocument};

/// In-process store for tests and for embedding the engine.
///
/// `set_offline` simulates an unreachable backend and `with_read_delay`
/// widens the window between reading the schedule and committing, which is
/// what concurrency tests need to provoke a race.
#[derive(Debug, Default)]
pub struct MemoryStore {
    document: Mutex<ScheduleDocument>,
    offline: AtomicBool,
    read_delay: Duration,
    commits: AtomicU64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_hearings(hearings: Vec<Hearing>) -> Self {
        let mut document = ScheduleDocument::new();
        document.hearings = hearings;
        Self {
            document: Mutex::new(document),
            ..Self::default()
        }
    }

    pub fn with_read_delay(mut self, delay: Duration) -> Self {
        self.read_delay = delay;
        self
    }

    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Number of successful commits.
    pub fn commit_count(&self) -> u64 {
        self.commits.load(Ordering::SeqCst)
    }

    fn ensure_online(&self) -> Result<()> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(Error::StoreUnavailable("memory store is offline".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl HearingStore for MemoryStore {
    fn backend_tag(&self) -> &'static str {
        "memory"
    }

    async fn schedule(&self) -> Result<Vec<Hearing>> {
        self.ensure_online()?;
        let hearings = self.document.lock().await.hearings.clone();
        if !self.read_delay.is_zero() {
            tokio::time::sleep(self.read_delay).await;
        }
        Ok(hearings)
    }

    async fn find(&self, case_id: &CaseId) -> Result<Option<Hearing>> {
        self.ensure_online()?;
        Ok(self.document.lock().await.find(case_id).cloned())
    }

    async fn commit(&self, hearing: Hearing, record: Option<OverrideRecord>) -> Result<()> {
        self.ensure_online()?;
        self.document.lock().await.apply_commit(hearing, record)?;
        self.commits.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn override_records(&self, case_id: Option<&CaseId>) -> Result<Vec<OverrideRecord>> {
        self.ensure_online()?;
        Ok(self.document.lock().await.overrides_for(case_id))
    }
}
