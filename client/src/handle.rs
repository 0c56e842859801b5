//! Control handle shared by the connection manager and the consumer.
//!
//! # Design
//! The handle never owns the session. It carries a stop flag the session
//! checks before dispatching every event, a `bound` flag set once the first
//! transport connects, and a completion signal set when the manager exits.
//! Both signals are `watch` channels so a pending connect, read or backoff
//! sleep can be interrupted.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use feedstream_core::StreamError;
use tokio::sync::watch;

#[derive(Debug)]
struct Shared {
    bound: AtomicBool,
    stop: watch::Sender<bool>,
    done: watch::Sender<bool>,
}

/// Clonable handle used to stop a stream.
#[derive(Debug, Clone)]
pub struct StreamHandle {
    shared: Arc<Shared>,
}

impl Default for StreamHandle {
    fn default() -> Self {
        Self::new()
    }
}

impl StreamHandle {
    pub fn new() -> Self {
        Self {
            shared: Arc::new(Shared {
                bound: AtomicBool::new(false),
                stop: watch::Sender::new(false),
                done: watch::Sender::new(false),
            }),
        }
    }

    /// Stop the stream for good: close the transport and never reconnect.
    ///
    /// Fails with `StreamError::NotConnected` until a transport has been
    /// established for this stream. Calling it again is harmless.
    pub fn disconnect(&self) -> Result<(), StreamError> {
        if !self.is_bound() {
            return Err(StreamError::NotConnected);
        }
        self.stop();
        Ok(())
    }

    pub fn is_stopped(&self) -> bool {
        *self.shared.stop.borrow()
    }

    pub fn is_bound(&self) -> bool {
        self.shared.bound.load(Ordering::SeqCst)
    }

    pub fn is_closed(&self) -> bool {
        *self.shared.done.borrow()
    }

    /// Wait until the connection manager has exited.
    pub async fn closed(&self) {
        let mut rx = self.shared.done.subscribe();
        // The sender lives in `shared`, which we hold, so this cannot fail.
        let _ = rx.wait_for(|done| *done).await;
    }

    /// Wait until a stop has been requested.
    pub(crate) async fn stopped(&self) {
        let mut rx = self.shared.stop.subscribe();
        let _ = rx.wait_for(|stopped| *stopped).await;
    }

    /// Disable reconnection without the bound check; used on rejection.
    pub(crate) fn stop(&self) {
        self.shared.stop.send_replace(true);
    }

    pub(crate) fn bind(&self) {
        self.shared.bound.store(true, Ordering::SeqCst);
    }

    pub(crate) fn finish(&self) {
        self.shared.done.send_replace(true);
    }
}
