//! Verify request encoding and response parsing against JSON test vectors
//! stored in `test-vectors/`.
//!
//! Response vectors list the byte segments in delivery order; each segment
//! is pushed separately and the parser is drained after every push, so the
//! vectors also exercise delivery boundaries that fall inside lines and
//! chunks.

use feedstream_core::{
    ChunkParser, Credentials, FeedClient, FilterParams, HttpRequest, ParseError, ParseEvent,
    StreamError,
};
use serde_json::{json, Value};

fn build(client: &FeedClient, case: &Value) -> Result<HttpRequest, StreamError> {
    match case["collection"].as_str().unwrap() {
        "firehose" => Ok(client.build_firehose()),
        "retweet" => Ok(client.build_retweet()),
        "sample" => Ok(client.build_sample()),
        "filter" => {
            let params: FilterParams = serde_json::from_value(case["params"].clone()).unwrap();
            client.build_filter(&params)
        }
        other => panic!("unknown collection: {other}"),
    }
}

/// Render a parse event in the vector file's notation.
fn event_json(event: &ParseEvent) -> Value {
    match event {
        ParseEvent::Connected(head) => json!({ "connected": head.status }),
        ParseEvent::Rejected(rejection) => json!({
            "rejected": { "status": rejection.status, "message": rejection.message }
        }),
        ParseEvent::Record(record) => json!({ "record": record }),
    }
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

#[test]
fn request_test_vectors() {
    let raw = include_str!("../../test-vectors/requests.json");
    let vectors: Value = serde_json::from_str(raw).unwrap();

    let credentials = Credentials::new(
        vectors["username"].as_str().unwrap(),
        vectors["password"].as_str().unwrap(),
    );
    let client = FeedClient::new(vectors["host"].as_str().unwrap(), credentials);

    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let result = build(&client, case);

        if let Some(expected_error) = case.get("expected_error") {
            let err = result.unwrap_err();
            match expected_error.as_str().unwrap() {
                "Config" => assert!(matches!(err, StreamError::Config { .. }), "{name}: expected Config"),
                other => panic!("{name}: unknown expected_error: {other}"),
            }
            continue;
        }

        let encoded = String::from_utf8(result.unwrap().encode()).unwrap();
        assert_eq!(encoded, case["expected_request"].as_str().unwrap(), "{name}: request bytes");
    }
}

// ---------------------------------------------------------------------------
// Responses
// ---------------------------------------------------------------------------

#[test]
fn response_test_vectors() {
    let raw = include_str!("../../test-vectors/responses.json");
    let vectors: Value = serde_json::from_str(raw).unwrap();

    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let mut parser = ChunkParser::new();
        let mut events = Vec::new();
        let mut error = None;

        for segment in case["segments"].as_array().unwrap() {
            parser.push(segment.as_str().unwrap().as_bytes());
            match parser.drain() {
                Ok(batch) => events.extend(batch.iter().map(event_json)),
                Err(err) => {
                    error = Some(err);
                    break;
                }
            }
        }

        if let Some(expected_error) = case.get("expected_error") {
            match (expected_error.as_str().unwrap(), error) {
                ("InvalidStatusLine", Some(ParseError::InvalidStatusLine(_))) => {}
                (expected, got) => panic!("{name}: expected {expected}, got {got:?}"),
            }
            continue;
        }

        assert!(error.is_none(), "{name}: unexpected error {error:?}");
        assert_eq!(Value::Array(events), case["expected_events"], "{name}: events");
    }
}

#[test]
fn whole_response_matches_segmented_delivery() {
    let raw = include_str!("../../test-vectors/responses.json");
    let vectors: Value = serde_json::from_str(raw).unwrap();

    for case in vectors["cases"].as_array().unwrap() {
        if case.get("expected_error").is_some() {
            continue;
        }
        let name = case["name"].as_str().unwrap();
        let wire: String = case["segments"]
            .as_array()
            .unwrap()
            .iter()
            .map(|s| s.as_str().unwrap())
            .collect();

        let mut parser = ChunkParser::new();
        parser.push(wire.as_bytes());
        let events: Vec<Value> = parser.drain().unwrap().iter().map(event_json).collect();
        assert_eq!(Value::Array(events), case["expected_events"], "{name}: events");
    }
}
