use armada_api::middleware::IdentityResolver;

#[tokio::main]
async fn main() {
    // Load .env if present so cargo run picks up DATABASE_URL etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt::init();

    let config = armada_api::config::config();
    tracing::info!("Starting Armada API in {:?} mode", config.environment);

    if !config.auth.enable_authentication {
        tracing::warn!(
            "Authentication is disabled by the enable_authentication configuration \
             parameter. Incoming requests will not be authenticated. In order to \
             enable authentication set enable_authentication to true."
        );
    }

    // Bad auth configuration is fatal at startup, never per-request
    let resolver = IdentityResolver::from_config(&config.auth)
        .unwrap_or_else(|e| panic!("invalid auth configuration: {}", e));

    let app = armada_api::app(resolver);

    // Allow tests or deployments to override port via env
    let port = std::env::var("ARMADA_API_PORT")
        .ok()
        .or_else(|| std::env::var("PORT").ok())
        .and_then(|s| s.parse::<u16>().ok())
        .unwrap_or(9511);

    let bind_addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .unwrap_or_else(|e| panic!("failed to bind {}: {}", bind_addr, e));

    tracing::info!("Armada API server listening on http://{}", bind_addr);

    axum::serve(listener, app).await.expect("server");
}
