//! One streaming connection attempt.
//!
//! # Design
//! A `StreamSession` owns one transport and one `ChunkParser` and is
//! consumed by `run`, so it can never be reused across reconnects. Events
//! are pulled from the parser one at a time and the stop flag is checked
//! before each dispatch: once the consumer disconnects, bytes already
//! buffered are never examined.

use feedstream_core::{ChunkParser, ParseEvent};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, error, info, info_span, trace, warn, Instrument};
use uuid::Uuid;

use crate::consumer::Consumer;
use crate::handle::StreamHandle;

const READ_BUFFER_SIZE: usize = 8 * 1024;

/// Why a session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionOutcome {
    /// The server refused the handshake; reconnecting is pointless.
    Rejected,
    /// The consumer asked to stop.
    Disconnected,
    /// Transport closed or failed, or the byte stream was unusable.
    /// `connected` is true if a 200 response had been seen.
    Dropped { connected: bool },
}

pub struct StreamSession<S> {
    id: Uuid,
    transport: S,
    parser: ChunkParser,
    request: Vec<u8>,
    connected: bool,
}

enum Step {
    Stop,
    Read(std::io::Result<usize>),
}

impl<S> StreamSession<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    pub fn new(transport: S, request: Vec<u8>) -> Self {
        Self {
            id: Uuid::new_v4(),
            transport,
            parser: ChunkParser::new(),
            request,
            connected: false,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Write the request, then feed the response to the parser until the
    /// session ends.
    pub async fn run<C: Consumer>(self, consumer: &mut C, handle: &StreamHandle) -> SessionOutcome {
        let span = info_span!("session", id = %self.id);
        self.drive(consumer, handle).instrument(span).await
    }

    async fn drive<C: Consumer>(mut self, consumer: &mut C, handle: &StreamHandle) -> SessionOutcome {
        let written = tokio::select! {
            biased;
            _ = handle.stopped() => None,
            res = self.transport.write_all(&self.request) => Some(res),
        };
        match written {
            None => return self.close(SessionOutcome::Disconnected).await,
            Some(Err(err)) => {
                warn!(error = %err, "failed to write request");
                return SessionOutcome::Dropped { connected: false };
            }
            Some(Ok(())) => debug!(bytes = self.request.len(), "request written"),
        }

        let mut buf = vec![0u8; READ_BUFFER_SIZE];
        loop {
            if let Some(outcome) = self.dispatch(consumer, handle) {
                return self.close(outcome).await;
            }

            let step = tokio::select! {
                biased;
                _ = handle.stopped() => Step::Stop,
                res = self.transport.read(&mut buf) => Step::Read(res),
            };
            match step {
                Step::Stop => return self.close(SessionOutcome::Disconnected).await,
                Step::Read(Ok(0)) => {
                    warn!(connected = self.connected, "connection closed by peer");
                    return self.dropped();
                }
                Step::Read(Ok(n)) => self.parser.push(&buf[..n]),
                Step::Read(Err(err)) => {
                    warn!(error = %err, "read failed");
                    return self.dropped();
                }
            }
        }
    }

    /// Deliver every event the buffered bytes yield. Returns an outcome when
    /// the session must end.
    fn dispatch<C: Consumer>(&mut self, consumer: &mut C, handle: &StreamHandle) -> Option<SessionOutcome> {
        loop {
            if handle.is_stopped() {
                info!("disconnect requested");
                return Some(SessionOutcome::Disconnected);
            }
            match self.parser.next_event() {
                Ok(None) => return None,
                Ok(Some(ParseEvent::Connected(head))) => {
                    info!(status = head.status, "stream connected");
                    self.connected = true;
                    consumer.connection_made();
                }
                Ok(Some(ParseEvent::Rejected(rejection))) => {
                    error!(status = rejection.status, message = %rejection.message, "stream rejected");
                    handle.stop();
                    consumer.connection_failed(&rejection);
                    return Some(SessionOutcome::Rejected);
                }
                Ok(Some(ParseEvent::Record(record))) => {
                    trace!("record received");
                    consumer.record_received(record);
                }
                Err(err) => {
                    warn!(error = %err, "malformed stream");
                    return Some(self.dropped());
                }
            }
        }
    }

    fn dropped(&self) -> SessionOutcome {
        SessionOutcome::Dropped {
            connected: self.connected,
        }
    }

    async fn close(mut self, outcome: SessionOutcome) -> SessionOutcome {
        if let Err(err) = self.transport.shutdown().await {
            debug!(error = %err, "shutdown failed");
        }
        outcome
    }
}
