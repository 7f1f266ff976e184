//! Result and error types for the core library

use std::fmt;

use serde_json::Value as JsonValue;
use thiserror::Error;

use crate::ports::Payload;

/// Failure below the request/response boundary
///
/// Keeps the original cause together with the payload that was being sent,
/// so callers can inspect what was attempted. The payload carries session
/// secrets and is left out of `Display`.
#[derive(Debug)]
pub struct TransportFailure {
    cause: Box<dyn std::error::Error + Send + Sync>,
    request: Payload,
}

impl TransportFailure {
    pub fn new(
        cause: impl Into<Box<dyn std::error::Error + Send + Sync>>,
        request: Payload,
    ) -> Self {
        Self {
            cause: cause.into(),
            request,
        }
    }

    /// The underlying network, timeout or decode error
    pub fn cause(&self) -> &(dyn std::error::Error + Send + Sync + 'static) {
        self.cause.as_ref()
    }

    /// The request envelope that failed to go through
    pub fn request(&self) -> &Payload {
        &self.request
    }

    /// Operation name from the failed envelope, if any
    pub fn operation(&self) -> Option<&str> {
        self.request.get("operation").and_then(JsonValue::as_str)
    }
}

impl fmt::Display for TransportFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "error with request {}", self.cause)
    }
}

impl std::error::Error for TransportFailure {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(self.cause.as_ref())
    }
}

/// Core library error type
#[derive(Error, Debug)]
pub enum Error {
    #[error("Transport error: {0}")]
    Transport(#[from] TransportFailure),

    #[error("Received error with code {code}{}", message_suffix(.message))]
    Rejected { code: i64, message: Option<String> },

    #[error("Improperly configured: {0}")]
    ImproperlyConfigured(String),

    #[error("Invalid key material: {0}")]
    KeyMaterial(String),

    #[error("Crypto error: {0}")]
    Crypto(#[from] rsa::Error),

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Fieldless discriminant of [`Error`], used to describe retryable sets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Transport,
    Rejected,
    ImproperlyConfigured,
    KeyMaterial,
    Crypto,
    MalformedResponse,
    Config,
    Io,
    Json,
}

impl Error {
    /// Create a remote rejection error
    pub fn rejected(code: i64, message: Option<impl Into<String>>) -> Self {
        Self::Rejected {
            code,
            message: message.map(Into::into),
        }
    }

    /// Create an improperly configured error
    pub fn improperly_configured(msg: impl Into<String>) -> Self {
        Self::ImproperlyConfigured(msg.into())
    }

    /// Create a malformed response error
    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::MalformedResponse(msg.into())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Transport(_) => ErrorKind::Transport,
            Self::Rejected { .. } => ErrorKind::Rejected,
            Self::ImproperlyConfigured(_) => ErrorKind::ImproperlyConfigured,
            Self::KeyMaterial(_) => ErrorKind::KeyMaterial,
            Self::Crypto(_) => ErrorKind::Crypto,
            Self::MalformedResponse(_) => ErrorKind::MalformedResponse,
            Self::Config(_) => ErrorKind::Config,
            Self::Io(_) => ErrorKind::Io,
            Self::Json(_) => ErrorKind::Json,
        }
    }
}

fn message_suffix(message: &Option<String>) -> String {
    message.as_deref().map(|m| format!(": {m}")).unwrap_or_default()
}

/// Core library result type
pub type Result<T> = std::result::Result<T, Error>;
