//! Pterodactyl panel toolkit
//!
//! Re-exports the `ptero` client library and holds the helpers shared by
//! the binaries.
//!
//! ## Usage in Binaries
//!
//! ```rust
//! use ptero_lite::bin_common::load_config_from_env;
//! use ptero_lite::ptero::PanelConfig;
//! ```

pub use ptero;

pub mod bin_common {
    //! Common utilities for binary executables

    pub mod cli;

    pub use cli::{load_config_from_env, parse_args, CONFIG_PATH_ENV, DEFAULT_CONFIG_PATH};
}
