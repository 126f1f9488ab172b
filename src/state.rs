//! Application state management
//!
//! Shared state accessible across all handlers. Nothing here is persisted:
//! the service is stateless between runs apart from the in-memory connection
//! registry.

use crate::advisory::{AdvisoryReviewer, DisabledReviewer};
use crate::config::Settings;
use crate::connection::ConnectionManager;
use std::sync::Arc;

/// Application state shared across all handlers
pub struct AppState {
    /// Registered target databases
    pub connections: ConnectionManager,

    /// Optional second-opinion reviewer; disabled by default
    pub reviewer: Arc<dyn AdvisoryReviewer>,

    /// Hard cap on scripts per batch request
    pub batch_limit: usize,
}

impl AppState {
    pub fn new(settings: &Settings) -> Self {
        Self {
            connections: ConnectionManager::new(settings.validation.max_pool_size),
            reviewer: Arc::new(DisabledReviewer),
            batch_limit: settings.validation.batch_limit,
        }
    }

    /// Swap in a configured advisory reviewer.
    #[allow(dead_code)]
    pub fn with_reviewer(mut self, reviewer: Arc<dyn AdvisoryReviewer>) -> Self {
        self.reviewer = reviewer;
        self
    }
}

/// Type alias for shared state
pub type SharedState = Arc<AppState>;
