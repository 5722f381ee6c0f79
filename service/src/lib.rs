use config::Config;
use sse::{Manager, StreamConfig};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

pub mod config;
pub mod logging;

/// Stream profiles resolved once from configuration and shared by all requests.
#[derive(Clone, Debug)]
pub struct StreamProfiles {
    pub counter: Arc<StreamConfig>,
    pub test: Arc<StreamConfig>,
    pub postman: Arc<StreamConfig>,
}

impl StreamProfiles {
    pub fn from_config(config: &Config) -> Self {
        Self {
            counter: Arc::new(config.counter_stream()),
            test: Arc::new(config.test_stream()),
            postman: Arc::new(config.postman_stream()),
        }
    }
}

// Service-level state containing only infrastructure concerns
// Needs to implement Clone to be able to be passed into Router as State
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub sse_manager: Arc<Manager>,
    pub profiles: StreamProfiles,
    pub shutdown: CancellationToken,
}

impl AppState {
    /// Cancelling `shutdown` stops the server and every open stream.
    pub fn new(app_config: Config, shutdown: CancellationToken) -> Self {
        Self {
            sse_manager: Arc::new(Manager::new(shutdown.clone())),
            profiles: StreamProfiles::from_config(&app_config),
            config: app_config,
            shutdown,
        }
    }
}
