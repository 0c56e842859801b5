//! HTTP request types and the raw request encoder.
//!
//! # Design
//! The core never opens a socket. `HttpRequest` describes the streaming
//! request as plain data and `HttpRequest::encode` produces the exact bytes
//! the host writes right after the transport connects. Encoding is pure, so
//! the host can re-encode the same request on every reconnect attempt.

use std::fmt;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

/// `User-Agent` sent with every streaming request.
pub const USER_AGENT: &str = "feedstream/0.1";

/// HTTP method for a streaming request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
}

impl HttpMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
        }
    }
}

/// Username and password for the static Basic-Auth header.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Base64 of `username:password`, as carried by `Authorization: Basic`.
    pub fn basic_token(&self) -> String {
        STANDARD.encode(format!("{}:{}", self.username, self.password))
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// A streaming request described as plain data.
///
/// Built by `FeedClient::build_*`. For `GET` the `params` are appended as a
/// query string; for `POST` they form the url-encoded body.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub host: String,
    pub path: String,
    pub credentials: Credentials,
    pub params: Vec<(String, String)>,
}

impl HttpRequest {
    /// Url-encoded `params`, or an empty string when there are none.
    pub fn encoded_params(&self) -> String {
        // Serializing a list of string pairs cannot fail.
        serde_urlencoded::to_string(&self.params).unwrap_or_default()
    }

    /// Request line target: the path plus the query string for `GET`.
    pub fn target(&self) -> String {
        match self.method {
            HttpMethod::Get if !self.params.is_empty() => {
                format!("{}?{}", self.path, self.encoded_params())
            }
            _ => self.path.clone(),
        }
    }

    /// Encode the request head (and the form body for `POST`) as the bytes
    /// to write immediately after connecting.
    pub fn encode(&self) -> Vec<u8> {
        let mut lines = vec![
            format!("{} {} HTTP/1.1", self.method.as_str(), self.target()),
            format!("Authorization: Basic {}", self.credentials.basic_token()),
            format!("User-Agent: {USER_AGENT}"),
            format!("Host: {}", self.host),
        ];

        let body = match self.method {
            HttpMethod::Get => String::new(),
            HttpMethod::Post => {
                let body = self.encoded_params();
                lines.push("Content-Type: application/x-www-form-urlencoded".to_string());
                lines.push(format!("Content-Length: {}", body.len()));
                body
            }
        };

        let mut out = lines.join("\r\n");
        out.push_str("\r\n\r\n");
        out.push_str(&body);
        out.into_bytes()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(method: HttpMethod, params: Vec<(&str, &str)>) -> HttpRequest {
        HttpRequest {
            method,
            host: "stream.example.com".to_string(),
            path: "/1/statuses/sample.json".to_string(),
            credentials: Credentials::new("user", "pass"),
            params: params
                .into_iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }

    #[test]
    fn basic_token_encodes_user_and_password() {
        assert_eq!(Credentials::new("user", "pass").basic_token(), "dXNlcjpwYXNz");
    }

    #[test]
    fn debug_redacts_password() {
        let shown = format!("{:?}", Credentials::new("user", "hunter2"));
        assert!(shown.contains("user"));
        assert!(!shown.contains("hunter2"));
    }

    #[test]
    fn get_request_has_no_body_headers() {
        let bytes = request(HttpMethod::Get, Vec::new()).encode();
        assert_eq!(
            String::from_utf8(bytes).unwrap(),
            "GET /1/statuses/sample.json HTTP/1.1\r\n\
             Authorization: Basic dXNlcjpwYXNz\r\n\
             User-Agent: feedstream/0.1\r\n\
             Host: stream.example.com\r\n\
             \r\n"
        );
    }

    #[test]
    fn get_request_puts_params_in_query_string() {
        let req = request(HttpMethod::Get, vec![("count", "5")]);
        assert_eq!(req.target(), "/1/statuses/sample.json?count=5");
        let text = String::from_utf8(req.encode()).unwrap();
        assert!(text.starts_with("GET /1/statuses/sample.json?count=5 HTTP/1.1\r\n"));
        assert!(text.ends_with("\r\n\r\n"));
    }

    #[test]
    fn post_request_carries_form_body() {
        let req = request(HttpMethod::Post, vec![("track", "rust lang")]);
        let text = String::from_utf8(req.encode()).unwrap();
        assert_eq!(req.target(), "/1/statuses/sample.json");
        assert!(text.contains("Content-Type: application/x-www-form-urlencoded\r\n"));
        assert!(text.contains("Content-Length: 15\r\n"));
        assert!(text.ends_with("\r\n\r\ntrack=rust+lang"));
    }

    #[test]
    fn post_without_params_sends_zero_length() {
        let text = String::from_utf8(request(HttpMethod::Post, Vec::new()).encode()).unwrap();
        assert!(text.ends_with("Content-Length: 0\r\n\r\n"));
    }
}
