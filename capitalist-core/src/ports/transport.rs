//! Transport port
//!
//! The single capability the client needs from the network: send one request
//! envelope and hand back the decoded JSON body.

use serde_json::Value as JsonValue;

use crate::domain::result::Result;

/// Request envelope: flat mapping of wire field names to values
pub type Payload = serde_json::Map<String, JsonValue>;

/// Sends request envelopes to the Capitalist API
///
/// Implementations must turn every failure below the request/response
/// boundary (connect, timeout, undecodable body) into
/// [`Error::Transport`](crate::domain::result::Error::Transport) carrying the
/// payload that was being sent. Interpreting the response envelope is the
/// caller's job.
pub trait Transport: Send + Sync {
    /// Transport name (e.g., "http", "mock")
    fn name(&self) -> &str;

    /// POST one envelope and return the decoded response body
    fn request(&self, payload: &Payload) -> Result<JsonValue>;
}

impl<T: Transport + ?Sized> Transport for std::sync::Arc<T> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn request(&self, payload: &Payload) -> Result<JsonValue> {
        (**self).request(payload)
    }
}
