//! Port definitions (hexagonal architecture)
//!
//! Ports define the interfaces for external dependencies. The client depends
//! only on these traits, not on concrete implementations.

mod transport;

pub use transport::{Payload, Transport};
