//! Error types for store operations.

use thiserror::Error;

/// Errors that can occur when talking to a tabular store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The document does not exist or is not shared with the caller.
    #[error("document not found: {0}")]
    DocumentNotFound(String),

    /// A row handle no longer refers to a live row.
    #[error("row not found in {document}: {handle}")]
    RowNotFound { document: String, handle: String },

    /// The backend rejected the request.
    #[error("store API error {status}: {message}")]
    Api { status: u16, message: String },

    /// Transport failure (network, timeout, TLS).
    #[error("transport error: {0}")]
    Transport(String),

    /// A response could not be decoded.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The store is missing credentials or other configuration.
    #[error("store configuration error: {0}")]
    Config(String),
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
