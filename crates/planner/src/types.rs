/// Shared application state
use std::sync::Arc;

use crate::planner::{Catalog, PlannerConfig};
use crate::sessions::SessionStore;

pub struct AppState {
    /// Read-only catalog shared by every session
    pub catalog: Arc<Catalog>,
    pub sessions: SessionStore,
    pub config: PlannerConfig,
}

impl AppState {
    pub fn new(catalog: Catalog, config: PlannerConfig) -> Self {
        Self {
            catalog: Arc::new(catalog),
            sessions: SessionStore::new(config.session_ttl(), config.max_sessions),
            config,
        }
    }
}
