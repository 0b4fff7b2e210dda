//! Override resolution workflow.
//!
//! The client-facing protocol around the gateway: present conflicts, take
//! the user's decision (cancel, edit the time, or override with a reason)
//! and resubmit.

mod state;
mod types;

pub use state::ResolutionSession;
pub use types::{ResolutionState, SessionError, SessionId, StateHistoryEntry};
