use axum::{extract::Request, middleware::Next, response::Response};
use uuid::Uuid;

use crate::database::schema::now_timestamp;
use crate::database::DatabaseError;
use crate::error::ApiError;
use crate::services::tenant_router::TenantPartition;

use super::auth::AuthUser;

/// Materialises the authenticated caller as a `users` row of the resolved partition, so
/// actions can record who graded or approved something.
///
/// Usernames are unique within a partition. A caller whose username already belongs to a row
/// with another id acts as that row for the rest of the request.
pub async fn validate_user_middleware(mut request: Request, next: Next) -> Result<Response, ApiError> {
    let auth_user = request
        .extensions()
        .get::<AuthUser>()
        .cloned()
        .ok_or_else(|| ApiError::unauthorized("JWT authentication required before user validation"))?;

    let partition = request
        .extensions()
        .get::<TenantPartition>()
        .cloned()
        .ok_or_else(|| ApiError::internal_server_error("Tenant must be resolved before user validation"))?;

    let user_id = auth_user.user_id.to_string();
    let inserted = sqlx::query(
        r#"INSERT OR IGNORE INTO "users" ("id", "username", "email", "first_name", "last_name", "created_at")
           VALUES (?, ?, '', '', '', ?)"#,
    )
    .bind(&user_id)
    .bind(&auth_user.username)
    .bind(now_timestamp())
    .execute(&partition.pool)
    .await
    .map_err(DatabaseError::from)?;

    if inserted.rows_affected() > 0 {
        tracing::info!(
            "Registered user {} ({}) in partition {}",
            auth_user.username,
            auth_user.user_id,
            partition.schema_name
        );
        return Ok(next.run(request).await);
    }

    // Either the id is already known, or the username is held by another id
    let (resolved,): (String,) = sqlx::query_as(
        r#"SELECT "id" FROM "users" WHERE "id" = ? OR "username" = ?
           ORDER BY ("id" = ?) DESC LIMIT 1"#,
    )
    .bind(&user_id)
    .bind(&auth_user.username)
    .bind(&user_id)
    .fetch_optional(&partition.pool)
    .await
    .map_err(DatabaseError::from)?
    .ok_or_else(|| ApiError::internal_server_error("Caller could not be registered in the partition"))?;

    if resolved != user_id {
        let resolved = Uuid::parse_str(&resolved)
            .map_err(|_| ApiError::internal_server_error("Stored user id is not a UUID"))?;
        tracing::debug!(
            "User {} ({}) resolved to existing row {} in partition {}",
            auth_user.username,
            auth_user.user_id,
            resolved,
            partition.schema_name
        );
        request.extensions_mut().insert(AuthUser {
            user_id: resolved,
            username: auth_user.username,
        });
    }

    Ok(next.run(request).await)
}
