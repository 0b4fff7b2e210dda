pub mod audit;
pub mod clock;
pub mod config;
pub mod conflict;
pub mod error;
pub mod gateway;
pub mod hearing;
pub mod log;
pub mod registry;
pub mod store;
pub mod util;
pub mod workflow;

pub use audit::{Actor, OverrideId, OverrideRecord};
pub use conflict::{Conflict, ConflictType, Detector, Severity};
pub use error::{Error, ErrorCategory, Result};
pub use gateway::{Gateway, GatewayResponse, HearingRequest, Receipt, SubmitOutcome};
pub use hearing::{CaseId, Hearing, HearingForm, HearingStatus, Priority};
pub use store::{HearingStore, JsonFileStore, MemoryStore};
pub use workflow::{ResolutionSession, ResolutionState};
