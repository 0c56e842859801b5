//! Stateless request builder for the streaming collections.
//!
//! # Design
//! `FeedClient` holds only the host and credentials. Each collection has a
//! `build_*` method producing an `HttpRequest`; the host executes it and
//! feeds the response bytes to a `ChunkParser`. Parameter validation happens
//! here, before any connection attempt.

use crate::error::StreamError;
use crate::http::{Credentials, HttpMethod, HttpRequest};
use crate::types::FilterParams;

pub const FIREHOSE_PATH: &str = "/1/statuses/firehose.json";
pub const RETWEET_PATH: &str = "/1/statuses/retweet.json";
pub const SAMPLE_PATH: &str = "/1/statuses/sample.json";
pub const FILTER_PATH: &str = "/1/statuses/filter.json";

/// Synchronous, stateless client for the streaming API.
#[derive(Debug, Clone)]
pub struct FeedClient {
    host: String,
    credentials: Credentials,
}

impl FeedClient {
    pub fn new(host: &str, credentials: Credentials) -> Self {
        Self {
            host: host.trim_end_matches('/').to_string(),
            credentials,
        }
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn build_firehose(&self) -> HttpRequest {
        self.get(FIREHOSE_PATH)
    }

    pub fn build_retweet(&self) -> HttpRequest {
        self.get(RETWEET_PATH)
    }

    pub fn build_sample(&self) -> HttpRequest {
        self.get(SAMPLE_PATH)
    }

    /// Build the filtered-stream request.
    ///
    /// Parameters are emitted in the order `count`, `delimited`, `follow`,
    /// `track`; list values are comma-joined.
    pub fn build_filter(&self, params: &FilterParams) -> Result<HttpRequest, StreamError> {
        if !params.has_terms() {
            return Err(StreamError::config(
                "at least one parameter is required: track or follow",
            ));
        }

        let mut form = Vec::new();
        if let Some(count) = params.count.filter(|c| *c != 0) {
            form.push(("count".to_string(), count.to_string()));
        }
        if let Some(delimited) = params.delimited.filter(|d| *d != 0) {
            form.push(("delimited".to_string(), delimited.to_string()));
        }
        if !params.follow.is_empty() {
            form.push(("follow".to_string(), params.follow.join(",")));
        }
        if !params.track.is_empty() {
            form.push(("track".to_string(), params.track.join(",")));
        }

        Ok(HttpRequest {
            method: HttpMethod::Post,
            host: self.host.clone(),
            path: FILTER_PATH.to_string(),
            credentials: self.credentials.clone(),
            params: form,
        })
    }

    fn get(&self, path: &str) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Get,
            host: self.host.clone(),
            path: path.to_string(),
            credentials: self.credentials.clone(),
            params: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> FeedClient {
        FeedClient::new("stream.example.com", Credentials::new("user", "pass"))
    }

    #[test]
    fn build_sample_produces_get() {
        let req = client().build_sample();
        assert_eq!(req.method, HttpMethod::Get);
        assert_eq!(req.path, SAMPLE_PATH);
        assert_eq!(req.host, "stream.example.com");
        assert!(req.params.is_empty());
    }

    #[test]
    fn build_firehose_and_retweet_use_their_paths() {
        assert_eq!(client().build_firehose().path, FIREHOSE_PATH);
        assert_eq!(client().build_retweet().path, RETWEET_PATH);
    }

    #[test]
    fn build_filter_requires_terms() {
        let err = client().build_filter(&FilterParams::default()).unwrap_err();
        assert!(matches!(err, StreamError::Config { .. }));
    }

    #[test]
    fn build_filter_orders_and_joins_params() {
        let params = FilterParams {
            count: Some(10),
            delimited: Some(1),
            track: vec!["rust lang".to_string(), "tokio".to_string()],
            follow: vec!["12".to_string(), "34".to_string()],
        };
        let req = client().build_filter(&params).unwrap();
        assert_eq!(req.method, HttpMethod::Post);
        assert_eq!(req.path, FILTER_PATH);
        assert_eq!(
            req.encoded_params(),
            "count=10&delimited=1&follow=12%2C34&track=rust+lang%2Ctokio"
        );
    }

    #[test]
    fn build_filter_skips_zero_count_and_delimited() {
        let params = FilterParams {
            count: Some(0),
            delimited: Some(0),
            ..FilterParams::follow(["42"])
        };
        let req = client().build_filter(&params).unwrap();
        assert_eq!(req.encoded_params(), "follow=42");
    }

    #[test]
    fn separate_calls_do_not_share_params() {
        let c = client();
        let first = c.build_filter(&FilterParams::track(["a"])).unwrap();
        let second = c.build_filter(&FilterParams::follow(["1"])).unwrap();
        assert_eq!(first.encoded_params(), "track=a");
        assert_eq!(second.encoded_params(), "follow=1");
    }

    #[test]
    fn trailing_slash_is_stripped() {
        let c = FeedClient::new("stream.example.com/", Credentials::new("u", "p"));
        assert_eq!(c.host(), "stream.example.com");
    }
}
