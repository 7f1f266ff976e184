//! Service layer - business logic orchestration
//!
//! Services coordinate domain logic and port interactions: the session
//! handshake, retries, and the typed API operations.

pub mod auth;
pub mod client;
pub mod envelope;
pub mod retry;

pub use auth::{Authenticator, EncryptedPassword, Session, Signer};
pub use client::{BatchAccounts, Capitalist};
pub use retry::{RetryPolicy, DEFAULT_MAX_ATTEMPTS};
