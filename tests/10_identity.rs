use anyhow::Result;
use axum::{
    body::Body,
    extract::Extension,
    http::{Request, StatusCode},
    routing::get,
    Json, Router,
};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use armada_api::config::AuthConfig;
use armada_api::middleware::{identity_middleware, IdentityResolver, RequestContext};

/// Echoes whether a context was attached and what it contains, so tests can
/// observe the resolver's effect from inside the router.
async fn probe(context: Option<Extension<RequestContext>>) -> Json<Value> {
    let body = match context {
        Some(Extension(ctx)) => json!({
            "has_context": true,
            "user_id": ctx.user_id,
            "roles": ctx.roles,
            "auth_url": ctx.auth_url,
        }),
        None => json!({ "has_context": false }),
    };
    Json(body)
}

fn probe_app(config: AuthConfig) -> Router {
    let resolver = IdentityResolver::from_config(&config).expect("resolver config");
    Router::new()
        .route("/v1/probe", get(probe))
        .route("/v1/public", get(probe))
        .layer(axum::middleware::from_fn_with_state(
            resolver,
            identity_middleware,
        ))
}

fn auth_config(enabled: bool, public_routes: Vec<String>) -> AuthConfig {
    AuthConfig {
        enable_authentication: enabled,
        auth_url: "http://localhost:5000/v3".to_string(),
        public_routes,
    }
}

async fn body_json(response: axum::response::Response) -> Result<Value> {
    let bytes = response.into_body().collect().await?.to_bytes();
    Ok(serde_json::from_slice(&bytes)?)
}

#[tokio::test]
async fn disabled_auth_passes_everything_through_without_context() -> Result<()> {
    let app = probe_app(auth_config(false, vec![]));

    // No headers at all, still passes, and no context is attached
    let response = app
        .oneshot(Request::builder().uri("/v1/probe").body(Body::empty())?)
        .await?;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await?;
    assert_eq!(body["has_context"], false);
    Ok(())
}

#[tokio::test]
async fn disabled_auth_ignores_bad_identity_headers() -> Result<()> {
    let app = probe_app(auth_config(false, vec![]));

    let response = app
        .oneshot(
            Request::builder()
                .uri("/v1/probe")
                .header("X-User-Id", "u1")
                .header("X-Identity-Status", "Invalid")
                .body(Body::empty())?,
        )
        .await?;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await?;
    assert_eq!(body["has_context"], false);
    Ok(())
}

#[tokio::test]
async fn public_path_passes_without_headers() -> Result<()> {
    let app = probe_app(auth_config(true, vec!["/v1/public$".to_string()]));

    let response = app
        .oneshot(Request::builder().uri("/v1/public").body(Body::empty())?)
        .await?;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await?;
    assert_eq!(body["has_context"], false);
    Ok(())
}

#[tokio::test]
async fn non_public_path_still_requires_identity() -> Result<()> {
    let app = probe_app(auth_config(true, vec!["/v1/public$".to_string()]));

    let response = app
        .oneshot(Request::builder().uri("/v1/probe").body(Body::empty())?)
        .await?;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn missing_user_id_is_rejected() -> Result<()> {
    let app = probe_app(auth_config(true, vec![]));

    let response = app
        .oneshot(
            Request::builder()
                .uri("/v1/probe")
                .header("X-Identity-Status", "Confirmed")
                .body(Body::empty())?,
        )
        .await?;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let body = body_json(response).await?;
    assert_eq!(body["code"], "UNAUTHORIZED");
    Ok(())
}

#[tokio::test]
async fn unconfirmed_identity_is_rejected() -> Result<()> {
    let app = probe_app(auth_config(true, vec![]));

    let response = app
        .oneshot(
            Request::builder()
                .uri("/v1/probe")
                .header("X-User-Id", "u1")
                .header("X-Identity-Status", "Invalid")
                .body(Body::empty())?,
        )
        .await?;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn absent_identity_status_is_rejected() -> Result<()> {
    let app = probe_app(auth_config(true, vec![]));

    let response = app
        .oneshot(
            Request::builder()
                .uri("/v1/probe")
                .header("X-User-Id", "u1")
                .body(Body::empty())?,
        )
        .await?;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn confirmed_identity_attaches_context() -> Result<()> {
    let app = probe_app(auth_config(true, vec![]));

    let response = app
        .oneshot(
            Request::builder()
                .uri("/v1/probe")
                .header("X-User-Id", "u1")
                .header("X-Identity-Status", "Confirmed")
                .header("X-Roles", "admin, member")
                .body(Body::empty())?,
        )
        .await?;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await?;
    assert_eq!(body["has_context"], true);
    assert_eq!(body["user_id"], "u1");
    assert_eq!(body["roles"], json!(["admin", "member"]));
    // No X-Auth-Url forwarded, so the configured default applies
    assert_eq!(body["auth_url"], "http://localhost:5000/v3");
    Ok(())
}

#[tokio::test]
async fn deprecated_role_header_is_functionally_equivalent() -> Result<()> {
    let app = probe_app(auth_config(true, vec![]));

    let response = app
        .oneshot(
            Request::builder()
                .uri("/v1/probe")
                .header("X-User-Id", "u1")
                .header("X-Identity-Status", "Confirmed")
                .header("X-Role", "admin, member")
                .body(Body::empty())?,
        )
        .await?;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await?;
    assert_eq!(body["roles"], json!(["admin", "member"]));
    Ok(())
}

#[tokio::test]
async fn identity_echo_endpoint_reports_forwarded_identity() -> Result<()> {
    let resolver =
        IdentityResolver::from_config(&auth_config(true, vec![])).expect("resolver config");
    let app = armada_api::app(resolver);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/v1/auth/context")
                .header("X-User-Id", "u1")
                .header("X-User-Name", "alice")
                .header("X-Project-Id", "p1")
                .header("X-Identity-Status", "Confirmed")
                .header("X-Roles", "admin")
                .header("X-Auth-Token", "secret-token")
                .body(Body::empty())?,
        )
        .await?;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await?;
    assert_eq!(body["user_id"], "u1");
    assert_eq!(body["user_name"], "alice");
    assert_eq!(body["project_id"], "p1");
    assert_eq!(body["roles"], json!(["admin"]));
    // The raw token itself is never echoed back
    assert_eq!(body["has_token"], true);
    assert!(body.get("auth_token").is_none());
    Ok(())
}

#[tokio::test]
async fn identity_echo_without_context_is_not_found() -> Result<()> {
    let resolver =
        IdentityResolver::from_config(&auth_config(false, vec![])).expect("resolver config");
    let app = armada_api::app(resolver);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/v1/auth/context")
                .body(Body::empty())?,
        )
        .await?;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn root_endpoint_is_public() -> Result<()> {
    let resolver =
        IdentityResolver::from_config(&auth_config(true, vec![])).expect("resolver config");
    let app = armada_api::app(resolver);

    let response = app
        .oneshot(Request::builder().uri("/").body(Body::empty())?)
        .await?;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await?;
    assert_eq!(body["name"], "Armada API");
    Ok(())
}

#[tokio::test]
async fn protected_pod_routes_reject_unauthenticated_requests() -> Result<()> {
    let resolver =
        IdentityResolver::from_config(&auth_config(true, vec![])).expect("resolver config");
    let app = armada_api::app(resolver);

    let response = app
        .oneshot(Request::builder().uri("/v1/pods").body(Body::empty())?)
        .await?;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    Ok(())
}
