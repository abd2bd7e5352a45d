use std::sync::Arc;

use crate::config::AppConfig;
use crate::database::DatabaseManager;
use crate::services::tenant_router::{DomainTenantRouter, TenantRouter};

/// Shared application state handed to every handler and middleware
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub db: Arc<DatabaseManager>,
    pub tenants: Arc<dyn TenantRouter>,
}

impl AppState {
    /// State backed by the registry `domains` table for host resolution
    pub fn new(config: AppConfig) -> Self {
        let db = Arc::new(DatabaseManager::new(config.database.clone()));
        let tenants = Arc::new(DomainTenantRouter::new(db.clone()));
        Self {
            config: Arc::new(config),
            db,
            tenants,
        }
    }

    pub fn with_router(mut self, tenants: Arc<dyn TenantRouter>) -> Self {
        self.tenants = tenants;
        self
    }
}
