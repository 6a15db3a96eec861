//! Application (administrative) API
//!
//! Authenticated with an application key. Users, servers, nodes and
//! allocations can optionally be kept in an in-memory cache.

pub mod client;
pub mod options;
pub mod types;

pub use client::{validate_ports, ApplicationClient};
pub use options::*;
pub use types::*;
