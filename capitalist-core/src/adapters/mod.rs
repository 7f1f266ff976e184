//! Adapter implementations
//!
//! Adapters implement the port traits with concrete technologies:
//! - reqwest blocking client for the Transport port
//! - Scripted in-memory transport for tests and offline use

pub mod http;
pub mod mock;
