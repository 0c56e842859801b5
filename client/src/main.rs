use std::io::Write;

use feedstream::{Consumer, Credentials, FilterParams, StreamConfig, StreamHandle};
use serde_json::Value;
use tracing_subscriber::EnvFilter;

/// Prints each record as one JSON line; disconnects after `limit` records.
struct PrintConsumer {
    limit: Option<usize>,
    received: usize,
    handle: Option<StreamHandle>,
}

impl Consumer for PrintConsumer {
    fn session_bound(&mut self, handle: StreamHandle) {
        self.handle = Some(handle);
    }

    fn connection_made(&mut self) {
        tracing::info!("streaming");
    }

    fn connection_failed(&mut self, reason: &feedstream::Rejection) {
        eprintln!("{reason}");
    }

    fn record_received(&mut self, record: Value) {
        let mut stdout = std::io::stdout().lock();
        let _ = writeln!(stdout, "{record}");

        self.received += 1;
        if Some(self.received) == self.limit {
            if let Some(handle) = &self.handle {
                let _ = handle.disconnect();
            }
        }
    }
}

fn env_list(key: &str) -> Vec<String> {
    std::env::var(key)
        .unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let collection = std::env::args().nth(1).unwrap_or_else(|| "sample".to_string());
    let config = StreamConfig::from_env();
    let credentials = Credentials::new(
        std::env::var("FEEDSTREAM_USER").unwrap_or_default(),
        std::env::var("FEEDSTREAM_PASSWORD").unwrap_or_default(),
    );
    let consumer = PrintConsumer {
        limit: std::env::var("FEEDSTREAM_LIMIT").ok().and_then(|v| v.parse().ok()),
        received: 0,
        handle: None,
    };

    let handle = match collection.as_str() {
        "firehose" => feedstream::firehose(&config, credentials, consumer),
        "retweet" => feedstream::retweet(&config, credentials, consumer),
        "sample" => feedstream::sample(&config, credentials, consumer),
        "filter" => {
            let params = FilterParams {
                track: env_list("FEEDSTREAM_TRACK"),
                follow: env_list("FEEDSTREAM_FOLLOW"),
                ..FilterParams::default()
            };
            feedstream::filter(&config, credentials, &params, consumer)?
        }
        other => return Err(format!("unknown collection: {other}").into()),
    };

    tokio::select! {
        _ = handle.closed() => {}
        _ = tokio::signal::ctrl_c() => {
            // Before the first transport is bound there is nothing to drain.
            if handle.disconnect().is_ok() {
                handle.closed().await;
            }
        }
    }
    Ok(())
}
