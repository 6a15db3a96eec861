//! # ptero
//!
//! Client for a Pterodactyl panel's two REST surfaces and its server
//! console sockets.
//!
//! ## Layout
//!
//! - **conversions / transformer**: snake_case ⇄ camelCase key conversion,
//!   envelope unwrapping and timestamp coercion
//! - **http**: the REST transport, auth headers and error envelope mapping
//! - **routes**: endpoint paths
//! - **application**: administrative API, with an optional entity cache
//! - **client**: user-facing API (account, servers, files)
//! - **ws**: console socket shards
//!
//! ## Example
//!
//! ```ignore
//! use ptero::{ApplicationClient, AppOptions, FetchOptions};
//!
//! let app = ApplicationClient::new("https://panel.example.com", "ptla_...", AppOptions { cache: true });
//! let users = app.get_users(&FetchOptions::new().include(["servers"])).await?;
//! ```

pub mod application;
pub mod cache;
pub mod client;
pub mod config;
pub mod conversions;
pub mod error;
pub mod http;
pub mod logging;
pub mod routes;
pub mod transformer;
pub mod ws;

pub use application::{AppOptions, ApplicationClient};
pub use cache::{ApplicationCache, EntityCache, Identified};
pub use client::ClientApi;
pub use config::{ConfigError, PanelConfig};
pub use conversions::{to_camel_case, to_snake_case, ConvertOptions};
pub use error::{ApiErrorDetail, ApiErrors, PteroError, Result};
pub use http::{Auth, AuthScheme, FetchOptions, Method, RestClient};
pub use logging::init_tracing;
pub use transformer::{from_attributes, from_data, into_json};
pub use ws::{Shard, ShardHandler, TokenSource};
