use axum::Router;
use tokio::net::TcpListener;

use anyhow::anyhow;

use shadowread::{ServerConfig, routes, state::AppState};
use tower_http::cors::CorsLayer;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    // Load configuration
    let config = ServerConfig::from_env().map_err(|e| anyhow!(e.to_string()))?;
    let address = config.address();
    println!("Starting server on {address}");

    // Create application state
    let app_state = AppState::new(config).map_err(|e| anyhow!(e.to_string()))?;

    // API routes
    let api_routes = routes::api::create_api_router();

    // Public health check route
    let public_routes = Router::new().route(
        "/",
        axum::routing::get(shadowread::handlers::api::health_check),
    );

    // Combine routes
    let app = public_routes
        .merge(api_routes)
        .layer(CorsLayer::permissive())
        .with_state(app_state);

    // Create listener
    let listener = TcpListener::bind(&address).await?;

    println!("Server listening on {address}");

    // Start server
    axum::serve(listener, app).await?;

    Ok(())
}
