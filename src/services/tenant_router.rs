use std::sync::Arc;

use async_trait::async_trait;
use sqlx::{Row, SqlitePool};
use thiserror::Error;
use tracing::{debug, warn};

use crate::database::{DatabaseError, DatabaseManager};

#[derive(Debug, Error)]
pub enum TenantError {
    #[error("No tenant for host '{0}'")]
    NoTenantForHost(String),
    #[error("Tenant already exists: {0}")]
    AlreadyExists(String),
    #[error(transparent)]
    Database(#[from] DatabaseError),
    #[error("Seed error: {0}")]
    Seed(String),
}

impl From<sqlx::Error> for TenantError {
    fn from(err: sqlx::Error) -> Self {
        TenantError::Database(err.into())
    }
}

/// The partition a request is scoped to
#[derive(Clone, Debug)]
pub struct TenantPartition {
    pub tenant_id: String,
    pub name: String,
    pub schema_name: String,
    pub pool: SqlitePool,
}

/// Resolves the request host to a tenant partition
#[async_trait]
pub trait TenantRouter: Send + Sync {
    async fn resolve(&self, host: &str) -> Result<TenantPartition, TenantError>;
}

/// Looks hosts up in the registry `domains` table, active tenants only
pub struct DomainTenantRouter {
    db: Arc<DatabaseManager>,
}

impl DomainTenantRouter {
    pub fn new(db: Arc<DatabaseManager>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl TenantRouter for DomainTenantRouter {
    async fn resolve(&self, host: &str) -> Result<TenantPartition, TenantError> {
        let host = normalize_host(host);
        let registry = self.db.registry_pool().await?;

        let row = sqlx::query(
            r#"
            SELECT t."id", t."name", t."schema_name"
            FROM "domains" d
            JOIN "tenants" t ON t."id" = d."tenant"
            WHERE d."domain" = ? AND t."is_active" = 1
            "#,
        )
        .bind(&host)
        .fetch_optional(&registry)
        .await?;

        let Some(row) = row else {
            warn!("No active tenant for host: {}", host);
            return Err(TenantError::NoTenantForHost(host));
        };

        let schema_name: String = row.try_get("schema_name")?;
        let pool = self.db.tenant_pool(&schema_name).await?;
        debug!("Resolved host {} to partition {}", host, schema_name);

        Ok(TenantPartition {
            tenant_id: row.try_get("id")?,
            name: row.try_get("name")?,
            schema_name,
            pool,
        })
    }
}

/// Lower-cased host with any port removed
pub fn normalize_host(host: &str) -> String {
    let host = host.trim();
    let bare = if let Some(rest) = host.strip_prefix('[') {
        // IPv6 literal
        rest.split(']').next().unwrap_or(rest)
    } else {
        match host.rsplit_once(':') {
            Some((name, port)) if port.chars().all(|c| c.is_ascii_digit()) => name,
            _ => host,
        }
    };
    bare.trim_end_matches('.').to_ascii_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn host_normalization() {
        assert_eq!(normalize_host("YPU.localhost:8000"), "ypu.localhost");
        assert_eq!(normalize_host("localhost"), "localhost");
        assert_eq!(normalize_host("aiu.example.edu."), "aiu.example.edu");
        assert_eq!(normalize_host("[::1]:3000"), "::1");
    }
}
