//! The authoritative commit path.
//!
//! `Gateway::submit` is the only place a hearing is written. It validates
//! the request, locks every key the candidate could conflict on, takes the
//! store's schedule lock, re-reads the live schedule, re-runs detection and
//! then either writes or rejects.
//! Nothing a caller says about conflicts is trusted.

mod locks;
mod request;

pub use locks::{LockKey, LockSet, LockTable};
pub use request::{GatewayResponse, HearingRequest};

use std::sync::Arc;

use crate::audit::{OverrideId, OverrideRecord};
use crate::clock::Clock;
use crate::conflict::{Conflict, Detector};
use crate::hearing::{CaseId, Hearing, HearingForm};
use crate::registry::ClientRegistry;
use crate::store::HearingStore;
use crate::{dlog, dlog_debug, dlog_warn, Error, Result};

/// Proof of a committed hearing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Receipt {
    pub case_id: CaseId,
    /// Set when the hearing went through on an override.
    pub override_id: Option<OverrideId>,
}

/// The binding decision for one submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    Accepted(Receipt),
    /// Nothing was written.
    Rejected { conflicts: Vec<Conflict> },
}

impl SubmitOutcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self, SubmitOutcome::Accepted(_))
    }

    pub fn is_rejected(&self) -> bool {
        matches!(self, SubmitOutcome::Rejected { .. })
    }

    pub fn receipt(&self) -> Option<&Receipt> {
        match self {
            SubmitOutcome::Accepted(receipt) => Some(receipt),
            SubmitOutcome::Rejected { .. } => None,
        }
    }

    /// Conflicts that blocked the submission; empty when accepted.
    pub fn conflicts(&self) -> &[Conflict] {
        match self {
            SubmitOutcome::Accepted(_) => &[],
            SubmitOutcome::Rejected { conflicts } => conflicts,
        }
    }
}

pub struct Gateway {
    store: Arc<dyn HearingStore>,
    detector: Detector,
    registry: Arc<dyn ClientRegistry>,
    clock: Arc<dyn Clock>,
    locks: LockTable,
    allow_past_dates: bool,
}

impl std::fmt::Debug for Gateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Gateway")
            .field("store", &self.store.backend_tag())
            .field("detector", &self.detector)
            .field("allow_past_dates", &self.allow_past_dates)
            .finish()
    }
}

impl Gateway {
    pub fn new(
        store: Arc<dyn HearingStore>,
        detector: Detector,
        registry: Arc<dyn ClientRegistry>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            store,
            detector,
            registry,
            clock,
            locks: LockTable::new(),
            allow_past_dates: false,
        }
    }

    pub fn with_allow_past_dates(mut self, allow: bool) -> Self {
        self.allow_past_dates = allow;
        self
    }

    pub fn store(&self) -> &Arc<dyn HearingStore> {
        &self.store
    }

    pub fn detector(&self) -> &Detector {
        &self.detector
    }

    /// Commit `request` or reject it with the conflicts found.
    ///
    /// Validation failures (including an override without a reason) return
    /// `Err` before any lock is taken or the store is read. Store failures
    /// return `Err` too and never produce `Accepted`.
    pub async fn submit(&self, request: HearingRequest) -> Result<SubmitOutcome> {
        let candidate = self.prepare(&request.form).inspect_err(|e| {
            dlog_warn!("Submission rejected by validation: {}", e);
        })?;

        if request.override_requested {
            if request.reason().is_none() {
                dlog_warn!(
                    "Override for {} rejected: no reason given",
                    candidate.case_id
                );
                return Err(Error::OverrideReasonRequired);
            }
            if request.actor.id.trim().is_empty() {
                return Err(Error::Validation(
                    "An override needs an actor id".to_string(),
                ));
            }
        }

        let _locks = self.locks.acquire(LockKey::for_hearing(&candidate)).await;
        let _schedule = self.store.lock_schedule().await?;

        let existing = self.current_schedule().await?;
        let conflicts = self.detector.detect(&candidate, &existing);
        let case_id = candidate.case_id.clone();

        if conflicts.is_empty() {
            self.store.commit(candidate, None).await?;
            dlog!("Hearing {} accepted", case_id);
            return Ok(SubmitOutcome::Accepted(Receipt {
                case_id,
                override_id: None,
            }));
        }

        let reason = match (request.override_requested, request.reason()) {
            (true, Some(reason)) => reason,
            _ => {
                dlog_warn!(
                    "Hearing {} rejected: {} conflict(s)",
                    case_id,
                    conflicts.len()
                );
                return Ok(SubmitOutcome::Rejected { conflicts });
            }
        };

        let unacknowledged = request.unacknowledged(&conflicts).len();
        if unacknowledged > 0 {
            dlog_warn!(
                "Override for {} rejected: {} conflict(s) appeared since they were presented",
                case_id,
                unacknowledged
            );
            return Ok(SubmitOutcome::Rejected { conflicts });
        }

        let record = OverrideRecord::new(
            case_id.clone(),
            reason,
            request.actor.clone(),
            self.clock.now(),
            conflicts,
        )?;
        let override_id = record.id();
        let overridden = record.conflicts().len();
        self.store.commit(candidate, Some(record)).await?;

        dlog!(
            "Hearing {} accepted on override {} by {} ({} conflict(s) overridden)",
            case_id,
            override_id.short(),
            request.actor,
            overridden
        );
        Ok(SubmitOutcome::Accepted(Receipt {
            case_id,
            override_id: Some(override_id),
        }))
    }

    /// Advisory detection against the live schedule. Takes no lock and
    /// writes nothing; the answer may be stale by the time it is shown.
    pub async fn check(&self, form: &HearingForm) -> Result<Vec<Conflict>> {
        let candidate = self.prepare(form)?;
        let existing = self.current_schedule().await?;
        let conflicts = self.detector.detect(&candidate, &existing);
        dlog_debug!(
            "Advisory check for {}: {} conflict(s)",
            candidate.case_id,
            conflicts.len()
        );
        Ok(conflicts)
    }

    fn prepare(&self, form: &HearingForm) -> Result<Hearing> {
        let mut hearing = form.parse(self.clock.today(), self.allow_past_dates)?;
        hearing.client_name = self.registry.canonical_name(&hearing.client_name);
        Ok(hearing)
    }

    async fn current_schedule(&self) -> Result<Vec<Hearing>> {
        let mut hearings = self.store.schedule().await?;
        for hearing in &mut hearings {
            hearing.client_name = self.registry.canonical_name(&hearing.client_name);
        }
        Ok(hearings)
    }
}
