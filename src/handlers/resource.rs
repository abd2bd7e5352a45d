// Generic list/retrieve/create/update/delete for every entity
use std::collections::HashMap;

use axum::body::Bytes;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query};
use axum::Json;
use serde_json::Value;
use tracing::debug;

use crate::database::schema::Entity;
use crate::database::Record;
use crate::error::ApiError;
use crate::filter::{FilterData, FilterParams};
use crate::middleware::{ApiResponse, ApiResult};

use super::context::RequestContext;

/// GET /api/<resource> - filtered list in the entity's default order
pub async fn list<E: Entity>(
    ctx: RequestContext,
    query: Result<Query<HashMap<String, String>>, QueryRejection>,
) -> ApiResult<Value> {
    let Query(params) = query?;
    let schema = E::schema();
    let filter_data = FilterParams::parse(schema.filters, &params)?;

    if ctx.state.config.filter.debug_logging {
        debug!("List {} with {:?}", schema.table, filter_data);
    }

    let records = ctx.repo::<E>().await?.select_any(filter_data).await?;
    Ok(ApiResponse::success(Record::to_api_output_array(records)))
}

/// GET /api/<resource>/{id}
pub async fn get<E: Entity>(ctx: RequestContext, Path(id): Path<String>) -> ApiResult<Value> {
    let record = ctx.repo::<E>().await?.select_404(&id).await?;
    Ok(ApiResponse::success(record.to_api_output()))
}

/// POST /api/<resource> - 201 with the stored record
pub async fn create<E: Entity>(
    ctx: RequestContext,
    payload: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Value> {
    let Json(body) = payload?;
    let input = Record::from_json(body)?;
    let record = ctx.repo::<E>().await?.create(&input).await?;
    Ok(ApiResponse::created(record.to_api_output()))
}

/// PUT /api/<resource>/{id} - full update, required fields must be present
pub async fn update<E: Entity>(
    ctx: RequestContext,
    Path(id): Path<String>,
    payload: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Value> {
    write::<E>(ctx, id, payload, false).await
}

/// PATCH /api/<resource>/{id}
pub async fn patch<E: Entity>(
    ctx: RequestContext,
    Path(id): Path<String>,
    payload: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Value> {
    write::<E>(ctx, id, payload, true).await
}

async fn write<E: Entity>(
    ctx: RequestContext,
    id: String,
    payload: Result<Json<Value>, JsonRejection>,
    partial: bool,
) -> ApiResult<Value> {
    let Json(body) = payload?;
    let input = Record::from_json(body)?;
    let record = ctx.repo::<E>().await?.update(&id, &input, partial).await?;
    Ok(ApiResponse::success(record.to_api_output()))
}

/// DELETE /api/<resource>/{id} - 204; dependents follow their delete policy
pub async fn delete<E: Entity>(ctx: RequestContext, Path(id): Path<String>) -> Result<ApiResponse<()>, ApiError> {
    ctx.repo::<E>().await?.delete(&id).await?;
    Ok(ApiResponse::<()>::no_content())
}

/// Rows of `C` whose `column` points at the `P` identified by `id`, in `C`'s default order.
/// 404 when the parent does not exist.
pub(crate) async fn related<P: Entity, C: Entity>(
    ctx: &RequestContext,
    id: &str,
    column: &str,
) -> ApiResult<Value> {
    ctx.repo::<P>().await?.select_404(id).await?;
    let records = ctx
        .repo::<C>()
        .await?
        .select_any(FilterData::new().where_eq(column, id))
        .await?;
    Ok(ApiResponse::success(Record::to_api_output_array(records)))
}

/// Action input: an empty body means `{}`, anything but a JSON object is rejected
pub(crate) fn action_body(bytes: &Bytes) -> Result<Value, ApiError> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Object(Default::default()));
    }
    let body: Value = serde_json::from_slice(bytes).map_err(|e| ApiError::invalid_json(e.to_string()))?;
    if body.is_object() {
        Ok(body)
    } else {
        Err(ApiError::invalid_json("Request body must be a JSON object"))
    }
}
