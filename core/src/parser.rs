//! Incremental parser for a chunked HTTP/1.1 streaming response.
//!
//! # Design
//! The response head is line oriented and parsed greedily. Once the body
//! starts, line parsing is only used for chunk-size lines; chunk payloads are
//! consumed as raw byte runs because a JSON document may itself contain CRLF.
//! Each completed chunk is decoded as exactly one JSON document.
//!
//! The parser is pull based: `push` only buffers bytes and `next_event`
//! examines just enough of the buffer to produce the next event. A caller
//! that stops pulling (because the consumer disconnected) leaves the rest of
//! the buffer untouched.
//!
//! Non-hex chunk-size lines (keep-alives, the CRLF that trails every chunk)
//! and chunks that are not valid JSON are dropped silently.

use bytes::{Buf, BytesMut};
use serde_json::Value;

use crate::error::{ParseError, Rejection};

/// Longest line accepted without a terminating CRLF.
pub const MAX_LINE_LENGTH: usize = 16 * 1024;

const CRLF: &[u8] = b"\r\n";

/// Where the parser is in the response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Header,
    ChunkSize,
    ChunkData { remaining: usize },
    /// Rejected handshake or framing error; all further input is ignored.
    Failed,
}

/// Status line and header fields of an accepted response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseHead {
    pub protocol: String,
    pub status: u16,
    pub message: String,
    pub headers: Vec<(String, String)>,
}

impl ResponseHead {
    /// First header value with a case-insensitive name match.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Something the host must act on.
#[derive(Debug, Clone, PartialEq)]
pub enum ParseEvent {
    /// The server answered 200; records follow.
    Connected(ResponseHead),
    /// The server answered with another status. Terminal.
    Rejected(Rejection),
    /// One decoded JSON document.
    Record(Value),
}

#[derive(Debug)]
pub struct ChunkParser {
    phase: Phase,
    header_lines: Vec<String>,
    buffer: BytesMut,
    chunk: Vec<u8>,
}

impl Default for ChunkParser {
    fn default() -> Self {
        Self::new()
    }
}

impl ChunkParser {
    pub fn new() -> Self {
        Self {
            phase: Phase::Header,
            header_lines: Vec::new(),
            buffer: BytesMut::new(),
            chunk: Vec::new(),
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Bytes received but not yet examined.
    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    /// Buffer bytes from the transport. Ignored once the parser has failed.
    pub fn push(&mut self, data: &[u8]) {
        if self.phase != Phase::Failed {
            self.buffer.extend_from_slice(data);
        }
    }

    /// Advance until the next event or until more input is needed.
    ///
    /// Returns `Ok(None)` when the buffered bytes are exhausted. After an
    /// error or a rejection every further call returns `Ok(None)`.
    pub fn next_event(&mut self) -> Result<Option<ParseEvent>, ParseError> {
        loop {
            match self.phase {
                Phase::Failed => return Ok(None),
                Phase::Header => {
                    let Some(line) = self.take_line()? else {
                        return Ok(None);
                    };
                    if !line.is_empty() {
                        self.header_lines.push(line);
                        continue;
                    }
                    if self.header_lines.is_empty() {
                        continue;
                    }
                    return self.finish_head().map(Some);
                }
                Phase::ChunkSize => {
                    let Some(line) = self.take_line()? else {
                        return Ok(None);
                    };
                    if let Some(size) = parse_chunk_size(&line) {
                        self.phase = Phase::ChunkData { remaining: size };
                    }
                }
                Phase::ChunkData { remaining } => {
                    if remaining > 0 && self.buffer.is_empty() {
                        return Ok(None);
                    }
                    let take = remaining.min(self.buffer.len());
                    self.chunk.extend_from_slice(&self.buffer[..take]);
                    self.buffer.advance(take);

                    let remaining = remaining - take;
                    if remaining > 0 {
                        self.phase = Phase::ChunkData { remaining };
                        return Ok(None);
                    }

                    self.phase = Phase::ChunkSize;
                    let chunk = std::mem::take(&mut self.chunk);
                    if let Ok(record) = serde_json::from_slice::<Value>(&chunk) {
                        return Ok(Some(ParseEvent::Record(record)));
                    }
                }
            }
        }
    }

    /// Drain every event the buffered bytes currently yield.
    pub fn drain(&mut self) -> Result<Vec<ParseEvent>, ParseError> {
        let mut events = Vec::new();
        while let Some(event) = self.next_event()? {
            events.push(event);
        }
        Ok(events)
    }

    fn finish_head(&mut self) -> Result<ParseEvent, ParseError> {
        let lines = std::mem::take(&mut self.header_lines);
        let head = match parse_head(&lines) {
            Ok(head) => head,
            Err(err) => return Err(self.fail(err)),
        };

        if head.status == 200 {
            self.phase = Phase::ChunkSize;
            Ok(ParseEvent::Connected(head))
        } else {
            self.phase = Phase::Failed;
            self.buffer.clear();
            Ok(ParseEvent::Rejected(Rejection {
                status: head.status,
                message: head.message,
            }))
        }
    }

    fn take_line(&mut self) -> Result<Option<String>, ParseError> {
        let end = self.buffer.windows(CRLF.len()).position(|w| w == CRLF);
        let Some(end) = end else {
            if self.buffer.len() > MAX_LINE_LENGTH {
                return Err(self.fail(ParseError::LineTooLong {
                    limit: MAX_LINE_LENGTH,
                }));
            }
            return Ok(None);
        };
        if end > MAX_LINE_LENGTH {
            return Err(self.fail(ParseError::LineTooLong {
                limit: MAX_LINE_LENGTH,
            }));
        }

        let line = String::from_utf8_lossy(&self.buffer[..end]).into_owned();
        self.buffer.advance(end + CRLF.len());
        Ok(Some(line))
    }

    fn fail(&mut self, err: ParseError) -> ParseError {
        self.phase = Phase::Failed;
        self.buffer.clear();
        self.chunk.clear();
        self.header_lines.clear();
        err
    }
}

/// Parse `<protocol> <status> <message>` plus `Name: value` header lines.
fn parse_head(lines: &[String]) -> Result<ResponseHead, ParseError> {
    let status_line = lines.first().map(String::as_str).unwrap_or_default();
    let mut parts = status_line.splitn(3, ' ');
    let protocol = parts.next().unwrap_or_default();
    let status = parts
        .next()
        .and_then(|s| s.parse::<u16>().ok())
        .ok_or_else(|| ParseError::InvalidStatusLine(status_line.to_string()))?;
    let message = parts.next().unwrap_or_default();

    let headers = lines
        .iter()
        .skip(1)
        .filter_map(|line| line.split_once(':'))
        .map(|(name, value)| (name.trim().to_string(), value.trim().to_string()))
        .collect();

    Ok(ResponseHead {
        protocol: protocol.to_string(),
        status,
        message: message.to_string(),
        headers,
    })
}

/// Hex chunk size, ignoring surrounding whitespace and any `;extension`.
fn parse_chunk_size(line: &str) -> Option<usize> {
    let size = line.split(';').next().unwrap_or_default().trim();
    if size.is_empty() || !size.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    usize::from_str_radix(size, 16).ok()
}
