//! Care tracker error types.

use sheet_core::StoreError;
use thiserror::Error;

/// Errors that can occur in care operations.
#[derive(Debug, Error)]
pub enum CareError {
    /// The backing store failed.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// An animal, document or row could not be found.
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// Required configuration is missing.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The caller supplied an unusable value.
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

impl CareError {
    pub(crate) fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity,
            id: id.into(),
        }
    }
}

/// Result type for care operations.
pub type Result<T> = std::result::Result<T, CareError>;
