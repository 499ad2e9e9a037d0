//! Application state management

use std::sync::Arc;

use crate::service::{LocalBackend, TrainingBackend};

/// Application state shared across handlers
pub struct AppState {
    pub backend: Arc<dyn TrainingBackend>,
    pub started_at: chrono::DateTime<chrono::Utc>,
}

impl AppState {
    pub fn new(backend: Arc<dyn TrainingBackend>) -> Self {
        Self {
            backend,
            started_at: chrono::Utc::now(),
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(Arc::new(LocalBackend::default()))
    }
}
