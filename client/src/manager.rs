//! Reconnect loop for one logical stream.
//!
//! # Design
//! The manager owns the `Backoff` and at most one `StreamSession` at a time.
//! A rejected handshake or a consumer disconnect ends the loop; every other
//! termination waits out the backoff delay and opens a fresh session. A
//! session that saw a 200 response resets the delay before the next wait.

use feedstream_core::{Backoff, HttpRequest};
use tracing::{info, warn};

use crate::connector::Connector;
use crate::consumer::Consumer;
use crate::handle::StreamHandle;
use crate::session::{SessionOutcome, StreamSession};

pub struct ConnectionManager<N, C> {
    connector: N,
    request: HttpRequest,
    consumer: C,
    backoff: Backoff,
    handle: StreamHandle,
}

impl<N, C> ConnectionManager<N, C>
where
    N: Connector,
    C: Consumer,
{
    pub fn new(connector: N, request: HttpRequest, consumer: C, backoff: Backoff) -> Self {
        Self {
            connector,
            request,
            consumer,
            backoff,
            handle: StreamHandle::new(),
        }
    }

    pub fn handle(&self) -> StreamHandle {
        self.handle.clone()
    }

    /// Connect, stream and reconnect until the stream is stopped or
    /// rejected. Returns the consumer so callers can inspect it.
    pub async fn run(mut self) -> C {
        let mut attempt: u32 = 0;

        loop {
            if self.handle.is_stopped() {
                break;
            }
            attempt = attempt.saturating_add(1);
            info!(host = %self.request.host, path = %self.request.path, attempt, "connecting");

            let connected = tokio::select! {
                biased;
                _ = self.handle.stopped() => break,
                res = self.connector.connect() => res,
            };

            match connected {
                Ok(transport) => {
                    self.handle.bind();
                    self.consumer.session_bound(self.handle.clone());
                    let session = StreamSession::new(transport, self.request.encode());
                    match session.run(&mut self.consumer, &self.handle).await {
                        SessionOutcome::Rejected | SessionOutcome::Disconnected => break,
                        SessionOutcome::Dropped { connected } => {
                            if connected {
                                self.backoff.reset();
                                attempt = 0;
                            }
                        }
                    }
                }
                Err(err) => warn!(error = %err, attempt, "connect failed"),
            }

            if self.handle.is_stopped() {
                break;
            }
            let Some(delay) = self.backoff.next_delay() else {
                break;
            };
            warn!(attempt, delay_ms = delay.as_millis() as u64, "reconnecting after backoff");

            tokio::select! {
                biased;
                _ = self.handle.stopped() => break,
                _ = tokio::time::sleep(delay) => {}
            }
        }

        self.backoff.deactivate();
        info!("stream closed");
        self.handle.finish();
        self.consumer
    }
}
