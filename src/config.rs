// SPDX-License-Identifier: GPL-3.0-only

//! User configuration
//!
//! Read from `$XDG_CONFIG_HOME/scanfeast/config.json`. Every field has a
//! default, so a partial file only overrides what it names.

use crate::backends::camera::types::CameraFacing;
use crate::constants::{DEFAULT_CATALOG_URL, DEFAULT_MAX_FRAME_DIMENSION, DEFAULT_REQUEST_TIMEOUT};
use crate::errors::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Catalog endpoint the product code is appended to
    pub catalog_url: String,
    /// Catalog request timeout in milliseconds
    pub request_timeout_ms: u64,
    /// User-Agent sent to the catalog (Open Food Facts asks clients to identify themselves)
    pub user_agent: String,
    /// Frames are downscaled to this size before QR detection
    pub max_frame_dimension: u32,
    /// Camera facing when a scan session starts
    pub default_facing: CameraFacing,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            catalog_url: DEFAULT_CATALOG_URL.to_string(),
            request_timeout_ms: DEFAULT_REQUEST_TIMEOUT.as_millis() as u64,
            user_agent: format!("scanfeast/{}", env!("CARGO_PKG_VERSION")),
            max_frame_dimension: DEFAULT_MAX_FRAME_DIMENSION,
            default_facing: CameraFacing::Back,
        }
    }
}

impl Config {
    /// Default location of the config file, if the platform has a config dir
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("scanfeast").join("config.json"))
    }

    /// Load from the default location, falling back to defaults
    pub fn load() -> AppResult<Self> {
        match Self::default_path() {
            Some(path) => Self::load_from(&path),
            None => {
                debug!("No config directory on this platform, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Load from `path`; a missing file yields the defaults
    pub fn load_from(path: &Path) -> AppResult<Self> {
        let raw = match std::fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "Config file not found, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(e.into()),
        };

        let config: Config = serde_json::from_str(&raw)
            .map_err(|e| AppError::Config(format!("{}: {}", path.display(), e)))?;
        info!(path = %path.display(), catalog = %config.catalog_url, "Loaded config");
        Ok(config)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    /// URL for one product code
    pub fn product_url(&self, code: &str) -> String {
        format!(
            "{}/{}.json",
            self.catalog_url.trim_end_matches('/'),
            crate::navigation::encode_segment(code)
        )
    }
}
