use thiserror::Error;

/// Failures reported by a [`PasskeyUserStore`](super::PasskeyUserStore).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Not found error: {0}")]
    NotFound(String),

    #[error("Conflict error: {0}")]
    Conflict(String),
}
