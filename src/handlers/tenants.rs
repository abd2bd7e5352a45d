// Registry resources: tenants and their domains
use std::collections::HashMap;

use axum::extract::rejection::QueryRejection;
use axum::extract::{Path, Query};
use serde_json::{json, Value};
use tracing::info;

use crate::database::models::tenancy::{Domains, Tenants};
use crate::database::Record;
use crate::error::ApiError;
use crate::filter::FilterData;
use crate::middleware::{ApiResponse, ApiResult};

use super::{action_success, RequestContext};

/// GET /api/tenants/active_tenants
pub async fn active_tenants(ctx: RequestContext) -> ApiResult<Value> {
    let records = ctx
        .repo::<Tenants>()
        .await?
        .select_any(FilterData::new().where_eq("is_active", true))
        .await?;
    Ok(ApiResponse::success(Record::to_api_output_array(records)))
}

/// POST /api/tenants/{id}/toggle_status
pub async fn toggle_status(ctx: RequestContext, Path(id): Path<String>) -> ApiResult<Value> {
    let repo = ctx.repo::<Tenants>().await?;
    let tenant = repo.select_404(&id).await?;
    let is_active = !matches!(tenant.get("is_active"), Some(Value::Bool(true)));

    let updated = repo.set_fields(&id, vec![("is_active", json!(is_active))]).await?;
    let is_active = matches!(updated.get("is_active"), Some(Value::Bool(true)));
    info!("Tenant {} is now {}", id, if is_active { "active" } else { "inactive" });

    let mut body = action_success(if is_active { "Tenant activated" } else { "Tenant deactivated" });
    body.insert("is_active".to_string(), json!(is_active));
    Ok(ApiResponse::success(Value::Object(body)))
}

/// DELETE /api/tenants/{id} - removes the registry row and its domains, then drops the
/// cached partition pool. The partition's data file stays on disk.
pub async fn delete(ctx: RequestContext, Path(id): Path<String>) -> Result<ApiResponse<()>, ApiError> {
    let removed = ctx.repo::<Tenants>().await?.delete(&id).await?;
    if let Some(schema_name) = removed.get_str("schema_name") {
        ctx.state.db.evict(schema_name).await;
        info!("Deleted tenant {} (partition {} left on disk)", id, schema_name);
    }
    Ok(ApiResponse::<()>::no_content())
}

/// GET /api/domains/by_tenant?tenant_id=
pub async fn domains_by_tenant(
    ctx: RequestContext,
    query: Result<Query<HashMap<String, String>>, QueryRejection>,
) -> ApiResult<Value> {
    let Query(params) = query?;
    let tenant_id = params
        .get("tenant_id")
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ApiError::bad_request("tenant_id parameter required"))?;

    let records = ctx
        .repo::<Domains>()
        .await?
        .select_any(FilterData::new().where_eq("tenant", tenant_id))
        .await?;
    Ok(ApiResponse::success(Record::to_api_output_array(records)))
}
