use std::{env, path::Path};

use anyhow::{Context, Result};

pub struct SourceConfig {
    /// Base URL of the search API, e.g. `https://api.example.com/v1/`
    pub api_base_url: String,
    /// Application key sent with every search request
    pub appkey: String,
}

impl SourceConfig {
    pub fn load(manifest_dir: &Path) -> Result<Self> {
        #[cfg(debug_assertions)]
        if let Err(e) = dotenvy::from_path(manifest_dir.join(".env")) {
            ::tracing::debug!("No .env file loaded: {e}");
        }
        #[cfg(not(debug_assertions))]
        let _ = manifest_dir;

        Ok(Self {
            api_base_url: env::var("VOLUME_API_BASE_URL")
                .context("Expected VOLUME_API_BASE_URL in environment")?,
            appkey: env::var("VOLUME_APPKEY").context("Expected VOLUME_APPKEY in environment")?,
        })
    }
}

/// Load source config using the calling crate's manifest directory.
#[macro_export]
macro_rules! load_source_config {
    () => {
        $crate::config::SourceConfig::load(std::path::Path::new(env!("CARGO_MANIFEST_DIR")))
    };
}
