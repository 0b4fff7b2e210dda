//! Hearing store contract and backends.
//!
//! The store is an external collaborator: it serves the current schedule and
//! writes a hearing together with its optional override record. The gateway
//! owns the per-key locking that makes detect-then-write atomic inside one
//! process. A backend shared between processes also hands out a
//! `ScheduleGuard` that the gateway holds from the read through the commit.

mod file;
mod memory;

pub use file::JsonFileStore;
pub use memory::MemoryStore;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::audit::OverrideRecord;
use crate::hearing::{CaseId, Hearing};
use crate::{Error, Result};

const DOCUMENT_VERSION: u32 = 1;

/// Exclusive hold on a stored schedule. Released on drop.
#[derive(Debug, Default)]
pub struct ScheduleGuard {
    file: Option<std::fs::File>,
}

impl ScheduleGuard {
    /// A guard over an open file whose OS lock is held until the file closes.
    pub fn holding(file: std::fs::File) -> Self {
        Self { file: Some(file) }
    }

    pub fn is_held(&self) -> bool {
        self.file.is_some()
    }
}

#[async_trait]
pub trait HearingStore: Send + Sync {
    /// Short backend name for log lines.
    fn backend_tag(&self) -> &'static str;

    /// Excludes other processes from the schedule while the guard lives.
    ///
    /// Backends that only live inside one process return an empty guard;
    /// the gateway's key locks already cover them.
    async fn lock_schedule(&self) -> Result<ScheduleGuard> {
        Ok(ScheduleGuard::default())
    }

    /// Every stored hearing.
    async fn schedule(&self) -> Result<Vec<Hearing>>;

    async fn find(&self, case_id: &CaseId) -> Result<Option<Hearing>>;

    /// Insert or replace the hearing for its case id, and append `record` if
    /// given. Both are written or neither is.
    async fn commit(&self, hearing: Hearing, record: Option<OverrideRecord>) -> Result<()>;

    /// Override records, optionally restricted to one case, oldest first.
    async fn override_records(&self, case_id: Option<&CaseId>) -> Result<Vec<OverrideRecord>>;
}

/// The persisted shape shared by the backends.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleDocument {
    pub version: u32,
    #[serde(default)]
    pub hearings: Vec<Hearing>,
    #[serde(default)]
    pub overrides: Vec<OverrideRecord>,
}

impl Default for ScheduleDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl ScheduleDocument {
    pub fn new() -> Self {
        Self {
            version: DOCUMENT_VERSION,
            hearings: Vec::new(),
            overrides: Vec::new(),
        }
    }

    pub fn find(&self, case_id: &CaseId) -> Option<&Hearing> {
        self.hearings.iter().find(|h| &h.case_id == case_id)
    }

    /// Upsert by case id. Checks everything before mutating anything.
    pub fn apply_commit(&mut self, hearing: Hearing, record: Option<OverrideRecord>) -> Result<()> {
        if let Some(record) = &record {
            if record.case_id() != &hearing.case_id {
                return Err(Error::Validation(format!(
                    "Override record for {} cannot be attached to {}",
                    record.case_id(),
                    hearing.case_id
                )));
            }
        }

        match self.hearings.iter_mut().find(|h| h.case_id == hearing.case_id) {
            Some(existing) => *existing = hearing,
            None => self.hearings.push(hearing),
        }
        if let Some(record) = record {
            self.overrides.push(record);
        }
        Ok(())
    }

    pub fn overrides_for(&self, case_id: Option<&CaseId>) -> Vec<OverrideRecord> {
        self.overrides
            .iter()
            .filter(|r| case_id.map_or(true, |id| r.case_id() == id))
            .cloned()
            .collect()
    }
}
