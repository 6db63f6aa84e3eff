//! Application state shared across all handlers and middleware.

use std::sync::Arc;

use gatekeeper_service::{AuthFlow, SnapshotStore};

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Request flow controller
    pub flow: Arc<AuthFlow>,
}

impl AppState {
    /// Creates the state from its parts.
    pub fn new(flow: Arc<AuthFlow>) -> Self {
        Self { flow }
    }

    /// Live snapshot store.
    pub fn store(&self) -> &Arc<SnapshotStore> {
        self.flow.store()
    }
}
