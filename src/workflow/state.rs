//! The override resolution session.
//!
//! `ResolutionSession` drives one hearing submission through the gateway and
//! the user's response to any conflicts. It is UI-side state only: it holds
//! no lock and abandoning it at any point has no side effects.

use chrono::Utc;

use crate::audit::Actor;
use crate::conflict::{group_by_date, Conflict, ConflictGroups};
use crate::error::{Error, Result};
use crate::gateway::{Gateway, HearingRequest, Receipt, SubmitOutcome};
use crate::hearing::{parse_time, HearingForm};
use crate::dlog_debug;

use super::{ResolutionState, SessionError, SessionId, StateHistoryEntry};

#[derive(Debug, Clone)]
pub struct ResolutionSession {
    id: SessionId,
    actor: Actor,
    form: HearingForm,
    state: ResolutionState,
    conflicts: Vec<Conflict>,
    /// Survives re-rejection so the user never has to retype it.
    override_reason: Option<String>,
    /// Whether the submission in flight carries the override.
    override_in_flight: bool,
    receipt: Option<Receipt>,
    last_error: Option<SessionError>,
    history: Vec<StateHistoryEntry>,
}

impl ResolutionSession {
    pub fn new(actor: Actor) -> Self {
        Self {
            id: SessionId::new(),
            actor,
            form: HearingForm::default(),
            state: ResolutionState::Idle,
            conflicts: Vec::new(),
            override_reason: None,
            override_in_flight: false,
            receipt: None,
            last_error: None,
            history: vec![StateHistoryEntry {
                state: ResolutionState::Idle,
                entered_at: Utc::now(),
            }],
        }
    }

    /// Check if a transition to `target` is valid from the current state.
    pub fn can_transition(&self, target: ResolutionState) -> bool {
        use ResolutionState::*;
        matches!(
            (self.state, target),
            (Idle, Submitting)
                | (Submitting, Accepted)
                | (Submitting, ConflictPresented)
                | (Submitting, Idle)
                | (ConflictPresented, Idle)
                | (ConflictPresented, EditingTime)
                | (ConflictPresented, OverrideSubmitting)
                | (EditingTime, Submitting)
                | (OverrideSubmitting, Submitting)
                | (OverrideSubmitting, Accepted)
                | (OverrideSubmitting, ConflictPresented)
        )
    }

    fn transition(&mut self, target: ResolutionState) -> Result<()> {
        if !self.can_transition(target) {
            return Err(Error::InvalidTransition {
                from: self.state.to_string(),
                to: target.to_string(),
            });
        }

        dlog_debug!("session {} {} -> {}", self.id.short(), self.state, target);
        self.state = target;
        self.history.push(StateHistoryEntry {
            state: target,
            entered_at: Utc::now(),
        });
        Ok(())
    }

    /// `Idle -> Submitting` with a freshly filled form.
    pub fn submit(&mut self, form: HearingForm) -> Result<()> {
        self.transition(ResolutionState::Submitting)?;
        self.form = form;
        self.override_in_flight = false;
        self.last_error = None;
        Ok(())
    }

    /// Apply the gateway's decision.
    pub fn resolve(&mut self, outcome: SubmitOutcome) -> Result<()> {
        match outcome {
            SubmitOutcome::Accepted(receipt) => {
                self.transition(ResolutionState::Accepted)?;
                self.conflicts.clear();
                self.receipt = Some(receipt);
            }
            SubmitOutcome::Rejected { conflicts } => {
                self.transition(ResolutionState::ConflictPresented)?;
                self.conflicts = conflicts;
            }
        }
        self.override_in_flight = false;
        self.last_error = None;
        Ok(())
    }

    /// The gateway call failed without a decision.
    ///
    /// A failed override goes back to the conflicts it was overriding, with
    /// the reason intact. Anything else goes back to `Idle` with the form
    /// kept. Never `Accepted`.
    pub fn fail(&mut self, error: &Error) -> Result<()> {
        let target = if self.override_in_flight && !self.conflicts.is_empty() {
            ResolutionState::ConflictPresented
        } else {
            ResolutionState::Idle
        };
        if !self.state.is_in_flight() {
            return Err(Error::InvalidTransition {
                from: self.state.to_string(),
                to: target.to_string(),
            });
        }
        // OverrideSubmitting -> Idle is not an edge; an in-flight override
        // always has conflicts to return to.
        self.transition(target)?;
        if target == ResolutionState::Idle {
            self.conflicts.clear();
        }
        self.override_in_flight = false;
        self.last_error = Some(SessionError::from(error));
        Ok(())
    }

    /// Drop the conflicts and go back to the form. Nothing was written.
    pub fn cancel(&mut self) -> Result<()> {
        self.transition(ResolutionState::Idle)?;
        self.conflicts.clear();
        self.override_reason = None;
        Ok(())
    }

    pub fn edit_time(&mut self) -> Result<()> {
        self.transition(ResolutionState::EditingTime)
    }

    /// Change the time field while editing. Checked locally so a typo does
    /// not cost a round trip.
    pub fn update_time(&mut self, new_time: &str) -> Result<()> {
        if self.state != ResolutionState::EditingTime {
            return Err(Error::InvalidTransition {
                from: self.state.to_string(),
                to: ResolutionState::EditingTime.to_string(),
            });
        }
        parse_time(new_time)?;
        self.form.hearing_time = new_time.trim().to_string();
        Ok(())
    }

    /// Send the (possibly edited) form again. From `OverrideSubmitting` the
    /// override travels with it.
    pub fn resubmit(&mut self) -> Result<()> {
        let carries_override = self.state == ResolutionState::OverrideSubmitting;
        self.transition(ResolutionState::Submitting)?;
        self.override_in_flight = carries_override;
        Ok(())
    }

    /// Choose to override the presented conflicts. A blank reason is refused
    /// here and the state does not change.
    pub fn begin_override(&mut self, reason: &str) -> Result<()> {
        if reason.trim().is_empty() {
            return Err(Error::OverrideReasonRequired);
        }
        self.transition(ResolutionState::OverrideSubmitting)?;
        self.override_reason = Some(reason.trim().to_string());
        self.override_in_flight = true;
        Ok(())
    }

    /// The request the gateway should receive for the current submission.
    pub fn next_request(&self) -> Result<HearingRequest> {
        if !self.state.is_in_flight() {
            return Err(Error::InvalidTransition {
                from: self.state.to_string(),
                to: ResolutionState::Submitting.to_string(),
            });
        }
        let request = HearingRequest::new(self.form.clone(), self.actor.clone());
        match (&self.override_reason, self.override_in_flight) {
            (Some(reason), true) => Ok(request
                .with_override(reason.clone())
                .acknowledging(self.conflicts.clone())),
            _ => Ok(request),
        }
    }

    /// Run the in-flight submission through `gateway` and apply the result.
    ///
    /// Gateway errors are absorbed into the session (see `last_error`);
    /// `Err` here means the session was not in a state to submit.
    pub async fn drive(&mut self, gateway: &Gateway) -> Result<ResolutionState> {
        let request = self.next_request()?;
        match gateway.submit(request).await {
            Ok(outcome) => self.resolve(outcome)?,
            Err(err) => self.fail(&err)?,
        }
        Ok(self.state)
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn state(&self) -> ResolutionState {
        self.state
    }

    pub fn form(&self) -> &HearingForm {
        &self.form
    }

    pub fn actor(&self) -> &Actor {
        &self.actor
    }

    /// Conflicts last presented to the user.
    pub fn conflicts(&self) -> &[Conflict] {
        &self.conflicts
    }

    /// Presented conflicts grouped the way the panel shows them.
    pub fn conflict_groups(&self) -> ConflictGroups {
        group_by_date(&self.conflicts)
    }

    pub fn override_reason(&self) -> Option<&str> {
        self.override_reason.as_deref()
    }

    pub fn receipt(&self) -> Option<&Receipt> {
        self.receipt.as_ref()
    }

    pub fn last_error(&self) -> Option<&SessionError> {
        self.last_error.as_ref()
    }

    pub fn history(&self) -> &[StateHistoryEntry] {
        &self.history
    }
}
