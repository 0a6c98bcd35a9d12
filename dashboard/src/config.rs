//! Process-level settings read from the environment.

use std::env;
use std::path::PathBuf;

pub const CONFIG_PATH_VAR: &str = "VOLUME_CONFIG";
pub const BIND_VAR: &str = "VOLUME_BIND";

pub const DEFAULT_CONFIG_PATH: &str = "volume.toml";
pub const DEFAULT_BIND: &str = "0.0.0.0:8000";

/// How often the page re-fetches the chart fragment.
pub const CHART_REFRESH_SECONDS: u64 = 5;

pub fn session_config_path() -> PathBuf {
    env::var(CONFIG_PATH_VAR)
        .unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_owned())
        .into()
}

pub fn bind_address() -> String {
    env::var(BIND_VAR).unwrap_or_else(|_| DEFAULT_BIND.to_owned())
}
