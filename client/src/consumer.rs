//! The callbacks an application implements to receive a stream.

use feedstream_core::Rejection;
use serde_json::Value;

use crate::handle::StreamHandle;

/// Receives lifecycle notifications and decoded records.
///
/// Callbacks run on the stream's task, one at a time and in wire order.
/// They must not block; a slow callback delays every later record.
pub trait Consumer: Send + 'static {
    /// Called every time a transport is established, before the request is
    /// written. Keep the handle to call `disconnect()` later.
    fn session_bound(&mut self, _handle: StreamHandle) {}

    /// The server accepted the stream (status 200).
    fn connection_made(&mut self) {}

    /// The server refused the stream. No reconnect follows.
    fn connection_failed(&mut self, _reason: &Rejection) {}

    /// One decoded JSON document.
    fn record_received(&mut self, record: Value);
}
