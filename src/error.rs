use thiserror::Error;

/// Coarse grouping of failures so callers can branch without matching on
/// every variant. Conflict outcomes are not errors and never appear here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Bad input, rejected before any detection ran. Nothing was written.
    Validation,
    /// The store or its transport failed. Safe to retry.
    Transport,
    /// Programming or local environment errors.
    Internal,
}

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Override requires a non-empty reason")]
    OverrideReasonRequired,

    #[error("Hearing store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("Hearing not found: {0}")]
    HearingNotFound(String),

    #[error("No home directory")]
    NoHomeDir,

    #[error("Operation timed out after {0:?}")]
    Timeout(std::time::Duration),

    #[error("Task join error: {0}")]
    TaskJoin(String),

    #[error("Invalid transition from {from} to {to}")]
    InvalidTransition { from: String, to: String },
}

impl Error {
    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::Validation(_) | Error::OverrideReasonRequired => ErrorCategory::Validation,
            Error::StoreUnavailable(_) | Error::Io(_) | Error::Timeout(_) | Error::TaskJoin(_) => {
                ErrorCategory::Transport
            }
            Error::Json(_)
            | Error::TomlParse(_)
            | Error::TomlSerialize(_)
            | Error::HearingNotFound(_)
            | Error::NoHomeDir
            | Error::InvalidTransition { .. } => ErrorCategory::Internal,
        }
    }

    pub fn is_retryable(&self) -> bool {
        self.category() == ErrorCategory::Transport
    }
}

pub type Result<T> = std::result::Result<T, Error>;
