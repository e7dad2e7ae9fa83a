pub mod api;
pub mod config;
pub mod database;
pub mod error;
pub mod handlers;
pub mod middleware;

use axum::{routing::get, Router};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::middleware::{identity_middleware, IdentityResolver};

/// Build the full router. The resolver is constructed by the caller so that
/// startup can fail fast on bad auth configuration.
pub fn app(resolver: IdentityResolver) -> Router {
    Router::new()
        // Public
        .route("/", get(handlers::public::root))
        .route("/health", get(handlers::public::health))
        // Versioned API behind the identity resolver
        .merge(v1_routes(resolver))
        // Global middleware
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

fn v1_routes(resolver: IdentityResolver) -> Router {
    use axum::routing::get;
    use handlers::{auth, pods};

    Router::new()
        .route("/v1/pods", get(pods::pods_list).post(pods::pod_create))
        .route("/v1/pods/detail", get(pods::pods_detail))
        .route(
            "/v1/pods/:pod_uuid",
            get(pods::pod_get)
                .patch(pods::pod_patch)
                .delete(pods::pod_delete),
        )
        .route("/v1/auth/context", get(auth::context_get))
        .layer(axum::middleware::from_fn_with_state(
            resolver,
            identity_middleware,
        ))
}
