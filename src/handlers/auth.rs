use axum::{extract::Extension, Json};
use serde_json::{json, Value};

use crate::error::ApiError;
use crate::middleware::RequestContext;

/// GET /v1/auth/context - echo the identity the proxy forwarded.
///
/// The raw token is never echoed back. When authentication is disabled no
/// context exists, which reports as 404 rather than an error.
pub async fn context_get(
    context: Option<Extension<RequestContext>>,
) -> Result<Json<Value>, ApiError> {
    let Extension(ctx) = context
        .ok_or_else(|| ApiError::not_found("No identity context attached to this request"))?;

    Ok(Json(json!({
        "user_id": ctx.user_id,
        "user_name": ctx.user_name,
        "project_id": ctx.project_id,
        "domain_name": ctx.domain_name,
        "user_domain_id": ctx.user_domain_id,
        "project_domain_id": ctx.project_domain_id,
        "roles": ctx.roles,
        "auth_url": ctx.auth_url,
        "has_token": ctx.auth_token.is_some(),
    })))
}
