//! Scripted in-memory transport
//!
//! Replays queued responses in order and records every envelope it was
//! asked to send. Lets the client be exercised end to end without a server.

use std::collections::VecDeque;
use std::io;
use std::sync::Mutex;

use serde_json::{json, Value as JsonValue};

use crate::domain::result::{Error, Result, TransportFailure};
use crate::ports::{Payload, Transport};

/// One scripted reply
#[derive(Debug, Clone)]
pub enum MockReply {
    /// Decoded response body returned as-is
    Body(JsonValue),
    /// Simulated network failure with the given message
    Fail(String),
}

/// Transport that replays scripted replies
#[derive(Debug, Default)]
pub struct MockTransport {
    replies: Mutex<VecDeque<MockReply>>,
    requests: Mutex<Vec<Payload>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a raw response body
    pub fn push_body(&self, body: JsonValue) -> &Self {
        self.push(MockReply::Body(body))
    }

    /// Queue `{code: 0, data}`
    pub fn push_ok(&self, data: JsonValue) -> &Self {
        self.push_body(json!({"code": 0, "data": data}))
    }

    /// Queue `{code, message}`
    pub fn push_rejection(&self, code: i64, message: &str) -> &Self {
        self.push_body(json!({"code": code, "message": message}))
    }

    /// Queue a network failure
    pub fn push_failure(&self, message: &str) -> &Self {
        self.push(MockReply::Fail(message.to_string()))
    }

    /// Queue a successful `get_token` handshake reply
    pub fn push_token(&self, token: &str, modulus_hex: &str, exponent_hex: &str) -> &Self {
        self.push_ok(json!({
            "token": token,
            "modulus": modulus_hex,
            "exponent": exponent_hex,
        }))
    }

    fn push(&self, reply: MockReply) -> &Self {
        self.replies.lock().unwrap().push_back(reply);
        self
    }

    /// Envelopes sent so far, in order
    pub fn requests(&self) -> Vec<Payload> {
        self.requests.lock().unwrap().clone()
    }

    /// Operation names sent so far, in order
    pub fn operations(&self) -> Vec<String> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .map(|p| {
                p.get("operation")
                    .and_then(JsonValue::as_str)
                    .unwrap_or_default()
                    .to_string()
            })
            .collect()
    }

    /// Number of envelopes sent for one operation
    pub fn count(&self, operation: &str) -> usize {
        self.operations().iter().filter(|op| *op == operation).count()
    }

    /// Scripted replies not consumed yet
    pub fn remaining(&self) -> usize {
        self.replies.lock().unwrap().len()
    }
}

impl Transport for MockTransport {
    fn name(&self) -> &str {
        "mock"
    }

    fn request(&self, payload: &Payload) -> Result<JsonValue> {
        self.requests.lock().unwrap().push(payload.clone());

        let reply = self.replies.lock().unwrap().pop_front();
        match reply {
            Some(MockReply::Body(body)) => Ok(body),
            Some(MockReply::Fail(message)) => Err(Error::from(TransportFailure::new(
                io::Error::new(io::ErrorKind::ConnectionReset, message),
                payload.clone(),
            ))),
            None => Err(Error::from(TransportFailure::new(
                io::Error::new(io::ErrorKind::UnexpectedEof, "no scripted reply left"),
                payload.clone(),
            ))),
        }
    }
}
