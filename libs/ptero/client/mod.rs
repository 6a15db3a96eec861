//! Client (user-facing) API
//!
//! Account, server, file and console operations available to a panel user.

pub mod api;
pub mod types;

pub use api::ClientApi;
pub use types::*;
