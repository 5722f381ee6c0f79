use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::mpsc::Sender;

/// Answers whether the peer on the other end of a stream is still there.
///
/// Implementations must be cheap to call repeatedly and must never report a
/// connection alive again once they have reported it dead. When liveness
/// cannot be determined, report dead.
pub trait DisconnectMonitor: Send + Sync {
    fn is_alive(&self) -> bool;

    /// Records that a write to the transport failed.
    fn mark_closed(&self) {}
}

/// Watches the channel that feeds a response body.
///
/// The HTTP layer drops the receiving half when the client goes away, which
/// closes the channel. A failed write latches the monitor as well.
#[derive(Debug)]
pub struct ConnectionMonitor<T> {
    sender: Sender<T>,
    closed: AtomicBool,
}

impl<T> ConnectionMonitor<T> {
    pub fn new(sender: Sender<T>) -> Self {
        Self {
            sender,
            closed: AtomicBool::new(false),
        }
    }
}

impl<T: Send> DisconnectMonitor for ConnectionMonitor<T> {
    fn is_alive(&self) -> bool {
        if self.closed.load(Ordering::Acquire) {
            return false;
        }
        if self.sender.is_closed() {
            self.closed.store(true, Ordering::Release);
            return false;
        }
        true
    }

    fn mark_closed(&self) {
        self.closed.store(true, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    #[test]
    fn test_alive_while_receiver_is_held() {
        let (tx, _rx) = mpsc::channel::<u8>(1);
        let monitor = ConnectionMonitor::new(tx);
        assert!(monitor.is_alive());
        assert!(monitor.is_alive());
    }

    #[test]
    fn test_dead_once_receiver_is_dropped() {
        let (tx, rx) = mpsc::channel::<u8>(1);
        let monitor = ConnectionMonitor::new(tx);
        drop(rx);
        assert!(!monitor.is_alive());
    }

    #[test]
    fn test_mark_closed_never_flips_back() {
        let (tx, _rx) = mpsc::channel::<u8>(1);
        let monitor = ConnectionMonitor::new(tx);
        monitor.mark_closed();

        for _ in 0..3 {
            assert!(!monitor.is_alive());
        }
    }
}
