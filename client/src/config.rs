//! Connection settings for a stream.
//!
//! # Design
//! Defaults match the public streaming endpoint. `from_env` overlays
//! `FEEDSTREAM_*` variables; a variable that is missing or fails to parse
//! leaves the default in place.

use std::time::Duration;

use feedstream_core::Backoff;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamConfig {
    pub host: String,
    pub port: u16,
    /// First reconnect delay, and the delay after a connected session drops.
    pub initial_delay: Duration,
    pub max_delay: Duration,
    /// Upper bound for establishing the TCP connection.
    pub connect_timeout: Duration,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            host: "stream.twitter.com".to_string(),
            port: 80,
            initial_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(120),
            connect_timeout: Duration::from_secs(30),
        }
    }
}

impl StreamConfig {
    pub fn new(host: &str, port: u16) -> Self {
        Self {
            host: host.to_string(),
            port,
            ..Self::default()
        }
    }

    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let millis = |key: &str, default: Duration| {
            lookup(key)
                .and_then(|v| v.parse::<u64>().ok())
                .map(Duration::from_millis)
                .unwrap_or(default)
        };

        Self {
            host: lookup("FEEDSTREAM_HOST").unwrap_or(defaults.host),
            port: lookup("FEEDSTREAM_PORT")
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.port),
            initial_delay: millis("FEEDSTREAM_INITIAL_DELAY_MS", defaults.initial_delay),
            max_delay: millis("FEEDSTREAM_MAX_DELAY_MS", defaults.max_delay),
            connect_timeout: millis("FEEDSTREAM_CONNECT_TIMEOUT_MS", defaults.connect_timeout),
        }
    }

    pub fn backoff(&self) -> Backoff {
        Backoff::new(self.initial_delay, self.max_delay)
    }
}
