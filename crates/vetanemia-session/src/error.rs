use thiserror::Error;

/// Failures of the persisted key/value store
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Session storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Session storage is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),
}

/// Why the backend refused to confirm the current user.
///
/// All variants end the session the same way; the distinction is kept for
/// logging only.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdentityError {
    #[error("Session rejected by server (HTTP {0})")]
    Rejected(u16),

    #[error("Identity request failed: {0}")]
    Transport(String),

    #[error("Malformed identity response: {0}")]
    Malformed(String),
}

/// Session manager errors
#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Failed to encode session data: {0}")]
    Encode(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, SessionError>;
