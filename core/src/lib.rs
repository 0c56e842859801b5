//! Sans-IO core of the streaming feed client.
//!
//! # Overview
//! Builds the raw streaming request and turns the response byte stream into
//! decoded JSON records without touching the network. The host crate owns
//! the socket, writes `HttpRequest::encode()` on connect and pushes every
//! received byte into a `ChunkParser`.
//!
//! # Design
//! - `FeedClient` is stateless: host plus credentials.
//! - `ChunkParser` is an explicit phase machine (`Header`, `ChunkSize`,
//!   `ChunkData`, `Failed`) with pull-based event delivery.
//! - `Backoff` holds the reconnect delay policy so it can be tested without
//!   a clock.

pub mod backoff;
pub mod client;
pub mod error;
pub mod http;
pub mod parser;
pub mod types;

pub use backoff::Backoff;
pub use client::FeedClient;
pub use error::{ParseError, Rejection, StreamError};
pub use http::{Credentials, HttpMethod, HttpRequest};
pub use parser::{ChunkParser, ParseEvent, Phase, ResponseHead};
pub use types::FilterParams;
