//! Error types for the streaming client.
//!
//! # Design
//! Only two kinds of failure cross the library boundary: configuration
//! mistakes caught before any connection attempt (`StreamError`) and a
//! server refusing the stream (`Rejection`). Framing problems inside the byte
//! stream are `ParseError`s; the host treats them like a dropped connection
//! and reconnects, so they never reach the consumer.

use thiserror::Error;

/// Errors returned synchronously to the embedding application.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StreamError {
    /// The request could not be built from the supplied parameters.
    #[error("configuration error: {message}")]
    Config { message: String },

    /// `disconnect()` was called before any transport was established.
    #[error("not connected")]
    NotConnected,
}

impl StreamError {
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }
}

/// The server answered the handshake with a status other than 200.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("stream rejected: {status} {message}")]
pub struct Rejection {
    pub status: u16,
    pub message: String,
}

/// Byte-stream framing the parser cannot recover from.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("line exceeds {limit} bytes without a CRLF")]
    LineTooLong { limit: usize },

    #[error("invalid status line: {0:?}")]
    InvalidStatusLine(String),
}
