//! Server-Sent Events (SSE) streaming core.
//!
//! This crate owns everything that happens on one open event stream: when an
//! event is emitted, how a vanished client is noticed, how the stream ends and
//! how each event is framed on the wire. The HTTP layer only routes a request
//! to [`Manager::open`] and copies the returned [`EventStream`] into a chunked
//! response body.
//!
//! # Architecture
//!
//! - **One task per stream**: every accepted request gets its own
//!   [`StreamSession`] running on its own tokio task. Sessions share no
//!   mutable state.
//! - **Explicit state machine**: a session moves `Init → Streaming →
//!   Closed(..)` and never leaves a closed state. Peer disconnects, reaching
//!   the event cap and cancellation are all ordinary terminations. A contract
//!   violation leaves the session `Aborted` instead.
//! - **Fail-closed liveness**: the [`DisconnectMonitor`] reports a connection
//!   dead as soon as the response body is dropped or a write fails, and keeps
//!   reporting it dead.
//! - **Cancellable cadence**: the [`Scheduler`] sleeps between events but
//!   wakes immediately when the session's cancellation token fires.
//! - **Configuration over copies**: endpoint variants differ only in their
//!   [`StreamConfig`] (preamble, payload format, padding, notices, limits).
//!
//! # Message Flow
//!
//! 1. Client opens a stream endpoint
//! 2. Web layer calls `manager.open(profile)`
//! 3. Manager registers the connection and spawns the session task
//! 4. Session checks the monitor, encodes the next event and hands the frame
//!    to the response body through a single-slot channel
//! 5. Session suspends for the configured interval and repeats
//! 6. On termination the channel closes, the body ends and the connection is
//!    unregistered
//!
//! # Modules
//!
//! - `config`: `StreamConfig` and payload formats
//! - `connection`: ConnectionRegistry of open streams (observability only)
//! - `frame`: events and their wire encoding
//! - `manager`: spawns sessions and exposes their frames as a `Stream`
//! - `monitor`: `DisconnectMonitor` and the channel-backed implementation
//! - `scheduler`: cancellable suspension between events
//! - `session`: the per-connection state machine

pub mod config;
pub mod connection;
pub mod error;
pub mod frame;
pub mod manager;
pub mod monitor;
pub mod scheduler;
pub mod session;

pub use config::{PayloadFormat, StreamConfig};
pub use error::Error;
pub use frame::{encode, Event, Frame, Payload};
pub use manager::{EventStream, Manager};
pub use monitor::{ConnectionMonitor, DisconnectMonitor};
pub use scheduler::{Scheduler, Wake};
pub use session::{SessionState, StreamSession, Termination};
