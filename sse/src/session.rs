//! The per-connection streaming state machine.
//!
//! ```text
//! Init ──preamble──▶ Streaming ──┬─ monitor says dead / write failed ─▶ Closed(PeerGone)
//!                      ▲   │     ├─ max_events reached ───────────────▶ Closed(LimitReached)
//!                      └───┘     └─ cancellation fired ───────────────▶ Closed(Cancelled)
//!                    suspend
//! ```
//!
//! A contract violation while streaming (an unencodable payload, a counter
//! with no next value) moves the session to `Aborted` and surfaces as an error.
//!
//! A session owns its counter and nothing else; it borrows the sink, the
//! monitor and the scheduler from whoever drives it.

use crate::config::StreamConfig;
use crate::error::{Error, Result};
use crate::frame::{self, Event, Frame, Payload};
use crate::monitor::DisconnectMonitor;
use crate::scheduler::{Scheduler, Wake};
use log::*;
use std::fmt;
use std::sync::Arc;
use tokio::sync::mpsc::Sender;

/// How a session ended. None of these are errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    PeerGone,
    LimitReached,
    Cancelled,
}

impl fmt::Display for Termination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Termination::PeerGone => write!(f, "peer disconnected"),
            Termination::LimitReached => write!(f, "event limit reached"),
            Termination::Cancelled => write!(f, "cancelled"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Init,
    Streaming,
    Closed(Termination),
    Aborted,
}

impl SessionState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, SessionState::Closed(_) | SessionState::Aborted)
    }
}

enum Emit {
    Sent,
    PeerGone,
    Cancelled,
}

pub struct StreamSession {
    config: Arc<StreamConfig>,
    state: SessionState,
    counter: i64,
    // Set once `counter` was emitted and adding the increment overflowed.
    exhausted: bool,
    emitted: u64,
}

impl StreamSession {
    pub fn new(config: Arc<StreamConfig>) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            counter: config.initial_counter,
            config,
            state: SessionState::Init,
            exhausted: false,
            emitted: 0,
        })
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Number of data events emitted so far (preamble, padding and notices excluded).
    pub fn emitted(&self) -> u64 {
        self.emitted
    }

    /// Counter value the next data event will carry, `None` once the
    /// counter cannot advance any further.
    pub fn next_value(&self) -> Option<i64> {
        (!self.exhausted).then_some(self.counter)
    }

    /// Drives the session until it reaches a terminal state.
    ///
    /// Frames are written to `sink` one at a time and in order. Returns how the
    /// session terminated; an `Err` means a contract violation such as a
    /// payload that cannot be encoded. After an `Err` the session stays
    /// aborted and every further call fails.
    pub async fn run<M>(
        &mut self,
        sink: &Sender<Frame>,
        monitor: &M,
        scheduler: &Scheduler,
    ) -> Result<Termination>
    where
        M: DisconnectMonitor + ?Sized,
    {
        loop {
            let next = match self.state {
                SessionState::Init => self.send_preamble(sink, monitor, scheduler).await,
                SessionState::Streaming => {
                    match self.stream_once(sink, monitor, scheduler).await {
                        Ok(next) => next,
                        Err(e) => {
                            self.transition(SessionState::Aborted);
                            return Err(e);
                        }
                    }
                }
                SessionState::Closed(termination) => return Ok(termination),
                SessionState::Aborted => {
                    return Err(Error::Aborted(self.config.name.clone()));
                }
            };
            self.transition(next);
        }
    }

    fn transition(&mut self, next: SessionState) {
        if self.state.is_terminal() {
            warn!(
                "Ignoring transition {:?} -> {:?} on closed stream {}",
                self.state, next, self.config.name
            );
            return;
        }
        trace!("Stream {}: {:?} -> {:?}", self.config.name, self.state, next);
        self.state = next;
    }

    async fn send_preamble<M>(
        &self,
        sink: &Sender<Frame>,
        monitor: &M,
        scheduler: &Scheduler,
    ) -> SessionState
    where
        M: DisconnectMonitor + ?Sized,
    {
        if self.config.send_preamble {
            for event in &self.config.preamble_events {
                if !monitor.is_alive() {
                    return SessionState::Closed(Termination::PeerGone);
                }
                match self.emit(event, sink, monitor, scheduler).await {
                    Emit::Sent => {}
                    Emit::PeerGone => return SessionState::Closed(Termination::PeerGone),
                    Emit::Cancelled => return self.on_cancel(sink, monitor),
                }
            }
        }
        SessionState::Streaming
    }

    async fn stream_once<M>(
        &mut self,
        sink: &Sender<Frame>,
        monitor: &M,
        scheduler: &Scheduler,
    ) -> Result<SessionState>
    where
        M: DisconnectMonitor + ?Sized,
    {
        if !monitor.is_alive() {
            return Ok(SessionState::Closed(Termination::PeerGone));
        }
        if self.exhausted {
            return Err(Error::CounterOverflow {
                value: self.counter,
            });
        }

        let value = self.counter;
        let event = Event::Data(self.config.payload.render(value)?);
        match self.emit(&event, sink, monitor, scheduler).await {
            Emit::Sent => {}
            Emit::PeerGone => return Ok(SessionState::Closed(Termination::PeerGone)),
            Emit::Cancelled => return Ok(self.on_cancel(sink, monitor)),
        }
        self.emitted += 1;
        match value.checked_add(self.config.increment) {
            Some(next) => self.counter = next,
            None => self.exhausted = true,
        }

        if let Some(len) = self.config.padding {
            let filler = Event::Data(Payload::Text(".".repeat(len)));
            match self.emit(&filler, sink, monitor, scheduler).await {
                Emit::Sent => {}
                Emit::PeerGone => return Ok(SessionState::Closed(Termination::PeerGone)),
                Emit::Cancelled => return Ok(self.on_cancel(sink, monitor)),
            }
        }

        if self
            .config
            .max_events
            .is_some_and(|max| self.emitted >= max)
        {
            if self.config.emit_terminal_notice && monitor.is_alive() {
                let notice = Event::TerminalNotice(self.config.terminal_notice.clone());
                if let Emit::PeerGone = self.emit(&notice, sink, monitor, scheduler).await {
                    debug!("Stream {} closed before its terminal notice", self.config.name);
                }
            }
            return Ok(SessionState::Closed(Termination::LimitReached));
        }

        Ok(match scheduler.suspend(self.config.interval).await {
            Wake::Elapsed => SessionState::Streaming,
            Wake::Cancelled => self.on_cancel(sink, monitor),
        })
    }

    async fn emit<M>(
        &self,
        event: &Event,
        sink: &Sender<Frame>,
        monitor: &M,
        scheduler: &Scheduler,
    ) -> Emit
    where
        M: DisconnectMonitor + ?Sized,
    {
        match scheduler.interruptible(sink.send(frame::encode(event))).await {
            Some(Ok(())) => Emit::Sent,
            Some(Err(_)) => {
                debug!("Write to stream {} failed, closing", self.config.name);
                monitor.mark_closed();
                Emit::PeerGone
            }
            None => Emit::Cancelled,
        }
    }

    // A cancelled session whose peer is already gone closed because of the
    // peer; only a live peer can receive the cancel notice.
    fn on_cancel<M>(&self, sink: &Sender<Frame>, monitor: &M) -> SessionState
    where
        M: DisconnectMonitor + ?Sized,
    {
        if !monitor.is_alive() {
            return SessionState::Closed(Termination::PeerGone);
        }
        if let Some(text) = &self.config.cancel_notice {
            let notice = frame::encode(&Event::TerminalNotice(text.clone()));
            if sink.try_send(notice).is_err() {
                debug!("Dropped cancel notice for stream {}", self.config.name);
            }
        }
        SessionState::Closed(Termination::Cancelled)
    }
}
