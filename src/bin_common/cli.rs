//! CLI utilities for binaries
//!
//! Resolves the config file location and reads positional arguments.

use std::path::PathBuf;

/// Environment variable holding the config file path
pub const CONFIG_PATH_ENV: &str = "PTERO_CONFIG_PATH";

pub const DEFAULT_CONFIG_PATH: &str = "config/ptero.yaml";

/// Config path from `PTERO_CONFIG_PATH`, or the default
pub fn load_config_from_env() -> PathBuf {
    std::env::var(CONFIG_PATH_ENV)
        .unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string())
        .into()
}

/// Command line arguments, excluding the program name
pub fn parse_args() -> Vec<String> {
    std::env::args().skip(1).collect()
}
