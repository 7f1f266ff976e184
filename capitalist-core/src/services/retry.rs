//! Retry policy for remote calls
//!
//! A policy re-runs an operation when it fails with one of a closed set of
//! error kinds, up to a fixed number of attempts. Anything outside the set
//! propagates on the first failure. After the last attempt the final error
//! is returned unchanged.

use std::thread;
use std::time::Duration;

use crate::domain::result::{ErrorKind, Result};

/// Attempts per call, including the first one
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Retry-on-kind policy
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: u32,
    delay: Duration,
    retry_on: Vec<ErrorKind>,
}

impl RetryPolicy {
    /// Policy retrying the given kinds with the default bound and no delay
    pub fn new(retry_on: &[ErrorKind]) -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            delay: Duration::ZERO,
            retry_on: retry_on.to_vec(),
        }
    }

    /// Policy for authenticated requests: network failures only.
    ///
    /// Rejections are not retried here; resubmitting a financial operation
    /// the server already refused could duplicate its side effects.
    pub fn transport() -> Self {
        Self::new(&[ErrorKind::Transport])
    }

    /// Policy for the token handshake: network failures and rejections
    pub fn token_fetch() -> Self {
        Self::new(&[ErrorKind::Transport, ErrorKind::Rejected])
    }

    /// Never retry
    pub fn none() -> Self {
        Self::new(&[]).with_max_attempts(1)
    }

    /// Set the attempt bound (clamped to at least one attempt)
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    /// Sleep between attempts
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub fn is_retryable(&self, kind: ErrorKind) -> bool {
        self.retry_on.contains(&kind)
    }

    /// Run `operation` under this policy
    ///
    /// `label` only shows up in logs.
    pub fn run<T, F>(&self, label: &str, mut operation: F) -> Result<T>
    where
        F: FnMut() -> Result<T>,
    {
        let mut attempt = 1;
        loop {
            match operation() {
                Ok(value) => return Ok(value),
                Err(e) if attempt < self.max_attempts && self.is_retryable(e.kind()) => {
                    tracing::warn!(
                        operation = label,
                        attempt,
                        max_attempts = self.max_attempts,
                        error = %e,
                        "retrying failed call"
                    );
                    if !self.delay.is_zero() {
                        thread::sleep(self.delay);
                    }
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::transport()
    }
}
