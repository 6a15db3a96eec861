//! HTTP transport for the panel API
//!
//! - **rest**: request issuing, auth headers, error envelope mapping
//! - **session**: XSRF token retrieval for cookie-authenticated sessions
//! - **query**: list/get query options and URL component encoding

pub mod query;
pub mod rest;
pub mod session;

pub use query::{encode_component, FetchOptions};
pub use rest::{Auth, AuthScheme, Method, RestClient};
pub use session::{fetch_xsrf_token, XsrfToken};
