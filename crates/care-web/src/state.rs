//! Application state shared across handlers.

use std::sync::Arc;

use care_core::Session;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Store handles and the once-loaded care configuration.
    pub session: Arc<Session>,
    /// Strip error detail from responses.
    pub production: bool,
}

impl AppState {
    /// Create new application state.
    pub fn new(session: Arc<Session>, production: bool) -> Self {
        Self {
            session,
            production,
        }
    }
}
