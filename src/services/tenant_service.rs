use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::info;

use crate::database::models::tenancy::{Domains, Tenants};
use crate::database::{DatabaseManager, Record, Repository};
use crate::filter::FilterData;
use crate::services::tenant_router::TenantError;

/// One university to register, with its primary host
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TenantSeed {
    pub name: String,
    pub schema_name: String,
    pub university_code: String,
    #[serde(default = "default_university_type")]
    pub university_type: String,
    #[serde(default)]
    pub description: String,
    pub domain: String,
}

fn default_university_type() -> String {
    "public".to_string()
}

#[derive(Debug, Deserialize)]
struct SeedFile {
    tenants: Vec<TenantSeed>,
}

#[derive(Debug, Default, Serialize)]
pub struct SeedReport {
    pub created: Vec<String>,
    pub skipped: Vec<String>,
}

/// Registry-level tenant administration for the operator CLI
pub struct TenantService {
    db: Arc<DatabaseManager>,
}

impl TenantService {
    pub fn new(db: Arc<DatabaseManager>) -> Self {
        Self { db }
    }

    /// The shared public tenant plus two sample universities
    pub fn default_seeds() -> Vec<TenantSeed> {
        let seed = |name: &str, code: &str, domain: &str, description: &str| TenantSeed {
            name: name.to_string(),
            schema_name: code.to_ascii_lowercase(),
            university_code: code.to_string(),
            university_type: default_university_type(),
            description: description.to_string(),
            domain: domain.to_string(),
        };
        vec![
            seed("Public", "PUBLIC", "localhost", "Public tenant for shared data"),
            seed("Yemen Public University", "YPU", "ypu.localhost", "Yemen Public University tenant"),
            seed("Amran Islamic University", "AIU", "aiu.localhost", "Amran Islamic University tenant"),
        ]
    }

    /// Read seeds from a YAML file of the form `tenants: [{name, schema_name, ...}]`
    pub fn load_seeds(path: &Path) -> Result<Vec<TenantSeed>, TenantError> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| TenantError::Seed(format!("cannot read {}: {}", path.display(), e)))?;
        let file: SeedFile = serde_yaml::from_str(&text)
            .map_err(|e| TenantError::Seed(format!("invalid seed file {}: {}", path.display(), e)))?;
        Ok(file.tenants)
    }

    /// Register each seed that is not already present (matched by university code)
    pub async fn seed(&self, seeds: &[TenantSeed]) -> Result<SeedReport, TenantError> {
        let mut report = SeedReport::default();
        for seed in seeds {
            match self.create_tenant(seed).await {
                Ok(_) => report.created.push(seed.university_code.clone()),
                Err(TenantError::AlreadyExists(code)) => {
                    info!("Tenant {} already registered, skipping", code);
                    report.skipped.push(code);
                }
                Err(e) => return Err(e),
            }
        }
        Ok(report)
    }

    /// Create the tenant row and its primary domain, then provision the partition
    pub async fn create_tenant(&self, seed: &TenantSeed) -> Result<Record, TenantError> {
        let registry = self.db.registry_pool().await?;
        let tenants = Repository::of::<Tenants>(registry.clone());

        let existing = tenants
            .count(FilterData::new().where_eq("university_code", seed.university_code.as_str()))
            .await?;
        if existing > 0 {
            return Err(TenantError::AlreadyExists(seed.university_code.clone()));
        }

        let tenant = tenants
            .create(&Record::from_json(json!({
                "name": seed.name,
                "schema_name": seed.schema_name,
                "university_code": seed.university_code,
                "university_type": seed.university_type,
                "description": seed.description,
            }))
            .map_err(|e| TenantError::Seed(e.to_string()))?)
            .await?;

        let tenant_id = tenant
            .id()
            .ok_or_else(|| TenantError::Seed("created tenant has no id".to_string()))?;
        Repository::of::<Domains>(registry)
            .create(&Record::from_json(json!({
                "domain": seed.domain,
                "tenant": tenant_id,
                "is_primary": true,
            }))
            .map_err(|e| TenantError::Seed(e.to_string()))?)
            .await?;

        self.db.tenant_pool(&seed.schema_name).await?;
        info!("Created tenant {} ({}) at {}", seed.name, seed.schema_name, seed.domain);
        Ok(tenant)
    }

    /// Every tenant with a `domains` array of its host names
    pub async fn list(&self) -> Result<Vec<Value>, TenantError> {
        let registry = self.db.registry_pool().await?;
        let tenants = Repository::of::<Tenants>(registry.clone())
            .select_any(FilterData::new())
            .await?;
        let domains = Repository::of::<Domains>(registry);

        let mut listed = Vec::with_capacity(tenants.len());
        for mut tenant in tenants {
            let id = tenant.id().unwrap_or_default().to_string();
            let hosts: Vec<Value> = domains
                .select_any(FilterData::new().where_eq("tenant", id))
                .await?
                .into_iter()
                .filter_map(|d| d.get("domain").cloned())
                .collect();
            tenant.set("domains", Value::Array(hosts));
            listed.push(tenant.to_api_output());
        }
        Ok(listed)
    }
}
