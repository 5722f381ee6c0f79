use axum::http::{HeaderValue, Method};
use log::*;
use service::config::Config;
use service::AppState;
use tokio::net::TcpListener;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

mod controller;
mod error;
pub mod router;
mod stream;

pub use error::{Error, Result};

const DEFAULT_INTERFACE: &str = "127.0.0.1";

/// Binds the configured address and serves until `app_state.shutdown` fires.
///
/// Shutdown also cancels every open stream, so in-flight responses finish
/// instead of holding the server open.
pub async fn init_server(app_state: AppState) -> std::io::Result<()> {
    let interface = app_state
        .config
        .interface
        .as_deref()
        .unwrap_or(DEFAULT_INTERFACE);
    let server_url = format!("{}:{}", interface, app_state.config.port);
    let listener = TcpListener::bind(&server_url).await?;

    info!(
        "Server starting... listening for connections on http://{} ({})",
        server_url,
        app_state.config.runtime_env()
    );

    let shutdown = app_state.shutdown.clone();
    let cors = cors_layer(&app_state.config);
    let app = router::define_routes(app_state).layer(cors);

    axum::serve(listener, app)
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await?;

    info!("Server stopped");
    Ok(())
}

fn cors_layer(config: &Config) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers(Any);

    if config.allows_any_origin() {
        return layer.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = config
        .allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(e) => {
                warn!("Ignoring invalid CORS origin {origin}: {e}");
                None
            }
        })
        .collect();

    layer.allow_origin(AllowOrigin::list(origins))
}
