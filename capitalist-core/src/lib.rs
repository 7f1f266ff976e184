//! Capitalist Core - client library for the Capitalist payment API
//!
//! This crate follows a hexagonal layout:
//!
//! - **domain**: Value objects (Account, CurrencyRate, Payment) and errors
//! - **ports**: Trait definitions for external dependencies (Transport)
//! - **services**: Authentication, signing, retries and the API client
//! - **adapters**: Concrete transports (HTTP, scripted mock)
//!
//! ```no_run
//! use capitalist_core::Capitalist;
//!
//! # fn main() -> capitalist_core::Result<()> {
//! let client = Capitalist::new("my-login", "my-password")?;
//! for account in client.accounts()? {
//!     println!("{} {} {}", account.number, account.balance, account.currency);
//! }
//! # Ok(())
//! # }
//! ```

pub mod adapters;
pub mod config;
pub mod domain;
pub mod ports;
pub mod services;

// Re-export commonly used types at crate root
pub use config::Config;
pub use domain::result::{Error, ErrorKind, Result, TransportFailure};
pub use domain::{Account, BatchRecord, CurrencyRate, Payment, RateType};
pub use ports::{Payload, Transport};
pub use services::{
    Authenticator, BatchAccounts, Capitalist, EncryptedPassword, RetryPolicy, Signer,
};
