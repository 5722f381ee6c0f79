use crate::config::StreamConfig;
use crate::connection::{ConnectionId, ConnectionRegistry};
use crate::error::Result;
use crate::frame::Frame;
use crate::monitor::ConnectionMonitor;
use crate::scheduler::Scheduler;
use crate::session::StreamSession;
use async_stream::stream;
use chrono::Utc;
use futures::Stream;
use log::*;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_util::sync::{CancellationToken, DropGuard};

/// Frames handed from a session task to the transport at a time.
const IN_FLIGHT_FRAMES: usize = 1;

/// Starts stream sessions and keeps the registry of open streams current.
pub struct Manager {
    registry: Arc<ConnectionRegistry>,
    shutdown: CancellationToken,
}

impl Manager {
    /// Every session opened by this manager is cancelled when `shutdown` is.
    pub fn new(shutdown: CancellationToken) -> Self {
        Self {
            registry: Arc::new(ConnectionRegistry::new()),
            shutdown,
        }
    }

    pub fn registry(&self) -> &ConnectionRegistry {
        &self.registry
    }

    /// Spawns a session for `config` and returns the byte stream it feeds.
    ///
    /// Dropping the returned stream cancels the session, which is how a
    /// client disconnect reaches it. Must be called inside a tokio runtime.
    pub fn open(&self, config: Arc<StreamConfig>) -> Result<EventStream> {
        let mut session = StreamSession::new(Arc::clone(&config))?;

        let (tx, rx) = mpsc::channel(IN_FLIGHT_FRAMES);
        let cancel = self.shutdown.child_token();
        let connection_id = self.registry.register(config.name.clone());
        info!("Opened {} stream {}", config.name, connection_id);

        let registry = Arc::clone(&self.registry);
        let monitor = ConnectionMonitor::new(tx.clone());
        let scheduler = Scheduler::new(cancel.clone());
        let id = connection_id.clone();

        tokio::spawn(async move {
            match session.run(&tx, &monitor, &scheduler).await {
                Ok(termination) => info!(
                    "Closed {} stream {} after {} events: {}",
                    config.name,
                    id,
                    session.emitted(),
                    termination
                ),
                Err(e) => error!("{} stream {} aborted: {e}", config.name, id),
            }
            if let Some(info) = registry.unregister(&id) {
                let open_for = Utc::now() - info.opened_at;
                debug!(
                    "Stream {} was open for {}ms",
                    id,
                    open_for.num_milliseconds()
                );
            }
        });

        Ok(EventStream {
            connection_id,
            frames: rx,
            _cancel_on_drop: cancel.drop_guard(),
        })
    }
}

/// Handle on the frames produced by one session.
///
/// Dropping it, or the stream returned by [`EventStream::frames`], cancels
/// the session.
pub struct EventStream {
    connection_id: ConnectionId,
    frames: mpsc::Receiver<Frame>,
    _cancel_on_drop: DropGuard,
}

impl EventStream {
    pub fn connection_id(&self) -> &ConnectionId {
        &self.connection_id
    }

    /// Frames in emission order. Ends once the session reaches a terminal state.
    pub fn frames(self) -> impl Stream<Item = Frame> + Send + 'static {
        let EventStream {
            connection_id,
            mut frames,
            _cancel_on_drop,
        } = self;

        stream! {
            let _cancel_on_drop = _cancel_on_drop;
            while let Some(frame) = frames.recv().await {
                yield frame;
            }
            trace!("Stream {} drained", connection_id);
        }
    }
}
