//! Tokio host for the streaming feed client.
//!
//! # Overview
//! Opens the TCP connection, writes the request built by `feedstream-core`,
//! pushes received bytes through its `ChunkParser` and hands each decoded
//! record to a `Consumer`. Dropped connections are re-established with
//! capped exponential backoff until the consumer disconnects or the server
//! rejects the credentials.
//!
//! # Design
//! - One Tokio task per stream runs the `ConnectionManager`; parser and
//!   backoff state never leave that task.
//! - `StreamHandle` is the only thing shared with the application.
//! - `Connector` abstracts transport establishment so tests can use
//!   in-memory pipes.
//!
//! The entry points spawn onto the current Tokio runtime and must be called
//! from within one.

pub mod config;
pub mod connector;
pub mod consumer;
pub mod handle;
pub mod manager;
pub mod session;

pub use config::StreamConfig;
pub use connector::{Connector, TcpConnector};
pub use consumer::Consumer;
pub use feedstream_core::{Credentials, FeedClient, FilterParams, HttpRequest, Rejection, StreamError};
pub use handle::StreamHandle;
pub use manager::ConnectionManager;
pub use session::{SessionOutcome, StreamSession};

/// Stream every public record.
pub fn firehose<C: Consumer>(config: &StreamConfig, credentials: Credentials, consumer: C) -> StreamHandle {
    let request = FeedClient::new(&config.host, credentials).build_firehose();
    spawn(config, request, consumer)
}

/// Stream retweets.
pub fn retweet<C: Consumer>(config: &StreamConfig, credentials: Credentials, consumer: C) -> StreamHandle {
    let request = FeedClient::new(&config.host, credentials).build_retweet();
    spawn(config, request, consumer)
}

/// Stream a random sample of public records.
pub fn sample<C: Consumer>(config: &StreamConfig, credentials: Credentials, consumer: C) -> StreamHandle {
    let request = FeedClient::new(&config.host, credentials).build_sample();
    spawn(config, request, consumer)
}

/// Stream records matching `params`. Fails before connecting if neither
/// `track` nor `follow` is given.
pub fn filter<C: Consumer>(
    config: &StreamConfig,
    credentials: Credentials,
    params: &FilterParams,
    consumer: C,
) -> Result<StreamHandle, StreamError> {
    let request = FeedClient::new(&config.host, credentials).build_filter(params)?;
    Ok(spawn(config, request, consumer))
}

/// Run `request` against `config`'s host on a new task.
pub fn spawn<C: Consumer>(config: &StreamConfig, request: HttpRequest, consumer: C) -> StreamHandle {
    let connector = TcpConnector::new(&config.host, config.port, config.connect_timeout);
    let manager = ConnectionManager::new(connector, request, consumer, config.backoff());
    let handle = manager.handle();
    tokio::spawn(manager.run());
    handle
}
