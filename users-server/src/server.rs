use std::sync::Arc;
use std::time::Instant;

use auth_fga::{AuthorizationService, FgaClientHandle, TupleLifecycleManager};

use crate::store::{InMemoryUserStore, UserStore};

/// Shared state handed to every route
#[derive(Clone)]
pub struct AppState {
    /// User records
    pub store: Arc<dyn UserStore>,
    /// Permission decisions
    pub authz: AuthorizationService,
    /// Relationship upkeep on create and delete
    pub lifecycle: TupleLifecycleManager,
    /// Outcome of the startup connectivity probe
    pub connected: bool,
    pub started_at: Instant,
}

impl AppState {
    /// Wire the authorization components around one client handle
    pub fn new(store: Arc<dyn UserStore>, handle: Arc<FgaClientHandle>) -> Self {
        Self {
            store,
            authz: AuthorizationService::new(handle.clone()),
            lifecycle: TupleLifecycleManager::new(handle),
            connected: false,
            started_at: Instant::now(),
        }
    }

    /// State with an empty in-memory store
    pub fn in_memory(handle: Arc<FgaClientHandle>) -> Self {
        Self::new(Arc::new(InMemoryUserStore::new()), handle)
    }

    /// Record whether the relationship store answered at startup
    pub fn with_connectivity(mut self, connected: bool) -> Self {
        self.connected = connected;
        self
    }

    pub fn handle(&self) -> &Arc<FgaClientHandle> {
        self.authz.handle()
    }

    pub fn uptime_secs(&self) -> f64 {
        self.started_at.elapsed().as_secs_f64()
    }
}
