pub mod tenant_router;
pub mod tenant_service;

pub use tenant_router::{DomainTenantRouter, TenantError, TenantPartition, TenantRouter};
pub use tenant_service::{TenantSeed, TenantService};
