//! Business logic service layer

mod connect_flow_service;
mod reconciliation_service;

pub use connect_flow_service::ConnectFlowService;
pub use reconciliation_service::ReconciliationService;

use std::sync::Arc;

use crate::config::ReconcileConfig;
use crate::local_cache::LocalAccountCache;
use crate::traits::{LocalStore, RemoteAccountRepository, TokenRefresher};

/// Service context - holds all dependencies
///
/// The host creates this context and injects its own storage implementations.
pub struct ServiceContext {
    /// Remote account table
    remote_repository: Arc<dyn RemoteAccountRepository>,
    /// Local cache, the only owner of the local account blob
    local_cache: LocalAccountCache,
    /// Optional token refresh collaborator
    token_refresher: Option<Arc<dyn TokenRefresher>>,
    config: ReconcileConfig,
}

impl ServiceContext {
    /// Create service context
    #[must_use]
    pub fn new(
        local_store: Arc<dyn LocalStore>,
        remote_repository: Arc<dyn RemoteAccountRepository>,
        config: ReconcileConfig,
    ) -> Self {
        let local_cache = LocalAccountCache::new(local_store, &config);
        Self {
            remote_repository,
            local_cache,
            token_refresher: None,
            config,
        }
    }

    /// Attach a token refresher
    #[must_use]
    pub fn with_token_refresher(mut self, refresher: Arc<dyn TokenRefresher>) -> Self {
        self.token_refresher = Some(refresher);
        self
    }

    #[must_use]
    pub fn remote_repository(&self) -> &Arc<dyn RemoteAccountRepository> {
        &self.remote_repository
    }

    #[must_use]
    pub fn local_cache(&self) -> &LocalAccountCache {
        &self.local_cache
    }

    #[must_use]
    pub fn token_refresher(&self) -> Option<&Arc<dyn TokenRefresher>> {
        self.token_refresher.as_ref()
    }

    #[must_use]
    pub fn config(&self) -> &ReconcileConfig {
        &self.config
    }
}
