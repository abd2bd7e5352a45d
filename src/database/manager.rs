use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::collections::{HashMap, HashSet};
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::info;

use crate::config::DatabaseConfig;
use crate::database::migrations;
use crate::filter::FilterError;

/// Errors from the storage layer
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Invalid partition name: {0}")]
    InvalidPartitionName(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation failed: {0:?}")]
    Validation(HashMap<String, String>),

    #[error("Query error: {0}")]
    QueryError(String),

    #[error(transparent)]
    Filter(#[from] FilterError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

impl DatabaseError {
    pub fn field(field: impl Into<String>, message: impl Into<String>) -> Self {
        let mut errors = HashMap::new();
        errors.insert(field.into(), message.into());
        DatabaseError::Validation(errors)
    }
}

#[derive(Default)]
struct Pools {
    pools: HashMap<String, SqlitePool>,
    /// Partitions whose tenant tables have been created
    provisioned: HashSet<String>,
}

/// Connection pool manager for the registry and every tenant partition.
///
/// One SQLite database per partition: `<data_dir>/<name>.db`, or a private in-memory
/// database per partition when `in_memory` is set. Pools are opened lazily and cached by name.
pub struct DatabaseManager {
    config: DatabaseConfig,
    state: RwLock<Pools>,
}

impl DatabaseManager {
    pub fn new(config: DatabaseConfig) -> Self {
        Self {
            config,
            state: RwLock::new(Pools::default()),
        }
    }

    pub fn registry_name(&self) -> &str {
        &self.config.registry_name
    }

    /// Registry pool holding tenants and domains
    pub async fn registry_pool(&self) -> Result<SqlitePool, DatabaseError> {
        let name = self.config.registry_name.clone();
        let key = format!("registry:{}", name);
        {
            let state = self.state.read().await;
            if state.provisioned.contains(&key) {
                if let Some(pool) = state.pools.get(&name) {
                    return Ok(pool.clone());
                }
            }
        }

        let mut state = self.state.write().await;
        let pool = self.open(&mut state, &name).await?;
        if state.provisioned.insert(key) {
            migrations::create_registry_tables(&pool).await?;
            info!("Provisioned registry tables in: {}", name);
        }
        Ok(pool)
    }

    /// Tenant partition pool (validated name), provisioning its tables on first use
    pub async fn tenant_pool(&self, schema_name: &str) -> Result<SqlitePool, DatabaseError> {
        if !Self::is_valid_partition_name(schema_name) {
            return Err(DatabaseError::InvalidPartitionName(schema_name.to_string()));
        }

        // Fast path: try read lock
        {
            let state = self.state.read().await;
            if state.provisioned.contains(schema_name) {
                if let Some(pool) = state.pools.get(schema_name) {
                    return Ok(pool.clone());
                }
            }
        }

        let mut state = self.state.write().await;
        let pool = self.open(&mut state, schema_name).await?;
        if !state.provisioned.contains(schema_name) {
            migrations::create_tenant_tables(&pool).await?;
            state.provisioned.insert(schema_name.to_string());
            info!("Provisioned tenant partition: {}", schema_name);
        }
        Ok(pool)
    }

    /// Get existing pool or create a new one. Caller holds the write lock.
    async fn open(&self, state: &mut Pools, name: &str) -> Result<SqlitePool, DatabaseError> {
        if let Some(pool) = state.pools.get(name) {
            return Ok(pool.clone());
        }

        let pool = if self.config.in_memory {
            // A memory database lives as long as its single connection
            let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);
            SqlitePoolOptions::new()
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
                .acquire_timeout(Duration::from_secs(self.config.connection_timeout))
                .connect_with(options)
                .await?
        } else {
            tokio::fs::create_dir_all(&self.config.data_dir).await?;
            let options = SqliteConnectOptions::new()
                .filename(self.config.data_dir.join(format!("{}.db", name)))
                .create_if_missing(true)
                .foreign_keys(true)
                .journal_mode(SqliteJournalMode::Wal)
                .busy_timeout(Duration::from_secs(self.config.connection_timeout));
            SqlitePoolOptions::new()
                .max_connections(self.config.max_connections)
                .acquire_timeout(Duration::from_secs(self.config.connection_timeout))
                .connect_with(options)
                .await?
        };

        state.pools.insert(name.to_string(), pool.clone());
        info!("Created database pool for: {}", name);
        Ok(pool)
    }

    /// Pings the registry pool to ensure connectivity
    pub async fn health_check(&self) -> Result<(), DatabaseError> {
        let pool = self.registry_pool().await?;
        sqlx::query("SELECT 1").execute(&pool).await?;
        Ok(())
    }

    /// Close and forget a partition's pool. Its data file is left in place.
    pub async fn evict(&self, schema_name: &str) {
        if schema_name == self.config.registry_name {
            return;
        }
        let mut state = self.state.write().await;
        state.provisioned.remove(schema_name);
        if let Some(pool) = state.pools.remove(schema_name) {
            pool.close().await;
            info!("Evicted database pool: {}", schema_name);
        }
    }

    /// Close and remove all pools (e.g., on shutdown)
    pub async fn close_all(&self) {
        let mut state = self.state.write().await;
        state.provisioned.clear();
        for (name, pool) in state.pools.drain() {
            pool.close().await;
            info!("Closed database pool: {}", name);
        }
    }

    /// Partition names become file names; accept lower-case identifiers only
    pub fn is_valid_partition_name(name: &str) -> bool {
        !name.is_empty()
            && name.len() <= 63
            && name.starts_with(|c: char| c.is_ascii_lowercase())
            && name.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
    }
}
