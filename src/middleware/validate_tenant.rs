use axum::{
    extract::{Request, State},
    http::header::HOST,
    middleware::Next,
    response::Response,
};

use crate::error::ApiError;
use crate::state::AppState;

/// Resolves the request's `Host` to a tenant partition and injects it into the request.
/// Unknown hosts and inactive tenants get a 404.
pub async fn validate_tenant_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let host = request
        .headers()
        .get(HOST)
        .and_then(|h| h.to_str().ok())
        .map(str::to_string)
        .or_else(|| request.uri().authority().map(|a| a.to_string()))
        .ok_or_else(|| ApiError::bad_request("Missing Host header"))?;

    let partition = state.tenants.resolve(&host).await?;
    request.extensions_mut().insert(partition);

    Ok(next.run(request).await)
}
