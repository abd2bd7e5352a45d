use axum::{async_trait, extract::FromRequestParts, http::request::Parts};

use crate::database::schema::{Entity, EntitySchema, Partition};
use crate::database::Repository;
use crate::error::ApiError;
use crate::middleware::AuthUser;
use crate::services::tenant_router::TenantPartition;
use crate::state::AppState;

/// Everything a handler needs to reach data: the caller, the resolved partition (tenant
/// routes only) and the shared state.
pub struct RequestContext {
    pub state: AppState,
    pub user: AuthUser,
    pub tenant: Option<TenantPartition>,
}

impl RequestContext {
    /// Repository for `E`, bound to the partition its table lives in
    pub async fn repo<E: Entity>(&self) -> Result<Repository, ApiError> {
        self.repo_for(E::schema()).await
    }

    pub async fn repo_for(&self, schema: &'static EntitySchema) -> Result<Repository, ApiError> {
        let pool = match schema.partition {
            Partition::Registry => self.state.db.registry_pool().await?,
            Partition::Tenant => self
                .tenant
                .as_ref()
                .map(|t| t.pool.clone())
                .ok_or_else(|| ApiError::internal_server_error("No tenant resolved for this route"))?,
        };
        Ok(Repository::new(schema, pool).with_max_limit(self.state.config.filter.max_limit))
    }
}

#[async_trait]
impl FromRequestParts<AppState> for RequestContext {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let user = parts
            .extensions
            .get::<AuthUser>()
            .cloned()
            .ok_or_else(|| ApiError::unauthorized("Authentication required"))?;

        Ok(Self {
            state: state.clone(),
            user,
            tenant: parts.extensions.get::<TenantPartition>().cloned(),
        })
    }
}
