// src/error.rs
use thiserror::Error;

/// Classified failure of a client operation.
///
/// `Auth` is the only kind that changes gate state; every other kind is
/// surfaced to the user as-is and needs a new user action to recover.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClientError {
    #[error("{0}")]
    Validation(String),

    #[error("Invalid or missing Access Code")]
    Auth,

    #[error("{0}")]
    Analysis(String),

    #[error("{0}")]
    Rewrite(String),

    #[error("{0}")]
    Export(String),

    #[error("A submission is already in progress")]
    Busy,

    #[error("Access is locked, enter an access code first")]
    Locked,

    #[error("Credential storage error: {0}")]
    Storage(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl ClientError {
    pub fn is_auth(&self) -> bool {
        matches!(self, ClientError::Auth)
    }
}

pub type Result<T> = std::result::Result<T, ClientError>;
