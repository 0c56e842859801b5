use std::{
    convert::Infallible,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
};

use axum::{
    body::Body,
    extract::{Form, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use base64::{engine::general_purpose::STANDARD, Engine};
use bytes::Bytes;
use futures_util::{stream, StreamExt};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;
use tracing::info;
use uuid::Uuid;

/// Payload of the keep-alive chunk sent after every status.
pub const KEEP_ALIVE: &[u8] = b"\r\n";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: u64,
    pub screen_name: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Status {
    pub id: Uuid,
    pub text: String,
    pub user: User,
}

impl Status {
    pub fn new(user_id: u64, screen_name: &str, text: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            text: text.to_string(),
            user: User {
                id: user_id,
                screen_name: screen_name.to_string(),
            },
        }
    }
}

/// What the mock server streams and whom it lets in.
///
/// Clones share the connection counter, so a test can keep one clone and
/// hand another to `app`.
#[derive(Clone, Debug)]
pub struct MockFeed {
    pub username: String,
    pub password: String,
    pub statuses: Vec<Status>,
    /// Keep the response open after the last status instead of closing.
    pub hold_open: bool,
    connections: Arc<AtomicUsize>,
}

impl MockFeed {
    pub fn new(username: &str, password: &str, statuses: Vec<Status>) -> Self {
        Self {
            username: username.to_string(),
            password: password.to_string(),
            statuses,
            hold_open: false,
            connections: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn hold_open(mut self, hold_open: bool) -> Self {
        self.hold_open = hold_open;
        self
    }

    /// Number of streams opened so far (authorized requests only).
    pub fn connections(&self) -> usize {
        self.connections.load(Ordering::SeqCst)
    }

    fn authorized(&self, headers: &HeaderMap) -> bool {
        let Some(token) = headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Basic "))
        else {
            return false;
        };
        let Ok(decoded) = STANDARD.decode(token.trim()) else {
            return false;
        };
        decoded == format!("{}:{}", self.username, self.password).as_bytes()
    }
}

pub fn sample_statuses() -> Vec<Status> {
    vec![
        Status::new(1, "ferris", "hello world"),
        Status::new(2, "tokio", "async rust is fun"),
        Status::new(3, "serde", "serializing all the things"),
        Status::new(1, "ferris", "rust 2024 edition"),
    ]
}

#[derive(Debug, Default, Deserialize)]
pub struct FilterForm {
    pub count: Option<i32>,
    pub delimited: Option<u32>,
    pub track: Option<String>,
    pub follow: Option<String>,
}

fn split_terms(value: Option<&str>) -> Vec<String> {
    value
        .unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

pub fn app(feed: MockFeed) -> Router {
    Router::new()
        .route("/1/statuses/firehose.json", get(unfiltered))
        .route("/1/statuses/retweet.json", get(unfiltered))
        .route("/1/statuses/sample.json", get(unfiltered))
        .route("/1/statuses/filter.json", post(filtered))
        .with_state(feed)
}

pub async fn run(listener: TcpListener, feed: MockFeed) -> Result<(), std::io::Error> {
    axum::serve(listener, app(feed)).await
}

async fn unfiltered(State(feed): State<MockFeed>, headers: HeaderMap) -> Response {
    if !feed.authorized(&headers) {
        return unauthorized();
    }
    stream_statuses(&feed, feed.statuses.clone())
}

async fn filtered(
    State(feed): State<MockFeed>,
    headers: HeaderMap,
    Form(form): Form<FilterForm>,
) -> Response {
    if !feed.authorized(&headers) {
        return unauthorized();
    }

    let track: Vec<String> = split_terms(form.track.as_deref())
        .into_iter()
        .map(|t| t.to_lowercase())
        .collect();
    let follow = split_terms(form.follow.as_deref());
    if track.is_empty() && follow.is_empty() {
        return StatusCode::NOT_ACCEPTABLE.into_response();
    }

    let statuses = feed
        .statuses
        .iter()
        .filter(|s| {
            let text = s.text.to_lowercase();
            track.iter().any(|t| text.contains(t.as_str()))
                || follow.contains(&s.user.id.to_string())
        })
        .cloned()
        .collect();
    stream_statuses(&feed, statuses)
}

fn unauthorized() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        [(header::WWW_AUTHENTICATE, "Basic realm=\"Firehose\"")],
    )
        .into_response()
}

/// Stream each status as its own chunk, followed by a keep-alive chunk.
fn stream_statuses(feed: &MockFeed, statuses: Vec<Status>) -> Response {
    let stream_id = feed.connections.fetch_add(1, Ordering::SeqCst) + 1;
    info!(stream_id, statuses = statuses.len(), hold_open = feed.hold_open, "stream opened");

    let frames: Vec<Result<Bytes, Infallible>> = statuses
        .iter()
        .filter_map(|s| serde_json::to_vec(s).ok())
        .flat_map(|json| [Ok(Bytes::from(json)), Ok(Bytes::from_static(KEEP_ALIVE))])
        .collect();
    let frames = stream::iter(frames);

    if feed.hold_open {
        (
            [(header::CONTENT_TYPE, "application/json")],
            Body::from_stream(frames.chain(stream::pending())),
        )
            .into_response()
    } else {
        (
            [
                (header::CONTENT_TYPE, "application/json"),
                (header::CONNECTION, "close"),
            ],
            Body::from_stream(frames),
        )
            .into_response()
    }
}
