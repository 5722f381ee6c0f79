use log::{error, info, warn};
use service::{config::Config, logging::Logger, AppState};
use tokio_util::sync::CancellationToken;

#[tokio::main]
async fn main() {
    let config = Config::new();
    if let Err(e) = Logger::init_logger(&config) {
        eprintln!("Failed to start logger: {e}");
        std::process::exit(1);
    }

    info!(
        "Starting event stream server [{}]...",
        config.runtime_env()
    );

    let shutdown = CancellationToken::new();
    tokio::spawn(cancel_on_ctrl_c(shutdown.clone()));

    let app_state = AppState::new(config, shutdown);

    if let Err(e) = web::init_server(app_state).await {
        error!("Server failed: {e}");
        std::process::exit(1);
    }
}

async fn cancel_on_ctrl_c(shutdown: CancellationToken) {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Shutdown requested, closing open streams"),
        Err(e) => {
            warn!("Unable to listen for shutdown signal: {e}");
            return;
        }
    }
    shutdown.cancel();
}
