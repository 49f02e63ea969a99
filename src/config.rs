//! Job configuration.
//!
//! Both jobs run with stock defaults when no file is given. A TOML file,
//! passed with `--config` or `IMAGE_JOBS_CONFIG`, overrides individual values
//! on top of those defaults.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [thumbnail]
//! max_width = 800        # Thumbnails fit inside max_width x max_height
//! max_height = 600
//! quality = 75           # JPEG quality (1-100)
//!
//! [keys]
//! url_decode = true      # Form-decode object keys from notifications
//!
//! [processing]
//! max_workers = 4        # Image worker threads (omit for auto = CPU cores)
//! max_in_flight = 4      # Records processed concurrently per invocation
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::imaging::{Quality, ThumbnailParams};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Configuration shared by both jobs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct JobConfig {
    /// Thumbnail bounds and encoding.
    pub thumbnail: ThumbnailConfig,
    /// Object key handling.
    pub keys: KeysConfig,
    /// Concurrency limits.
    pub processing: ProcessingConfig,
}

impl JobConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.thumbnail.max_width == 0 || self.thumbnail.max_height == 0 {
            return Err(ConfigError::Validation(
                "thumbnail.max_width and thumbnail.max_height must be non-zero".into(),
            ));
        }
        if !(1..=100).contains(&self.thumbnail.quality) {
            return Err(ConfigError::Validation(
                "thumbnail.quality must be 1-100".into(),
            ));
        }
        if self.processing.max_in_flight == 0 {
            return Err(ConfigError::Validation(
                "processing.max_in_flight must be at least 1".into(),
            ));
        }
        if self.processing.max_workers == Some(0) {
            return Err(ConfigError::Validation(
                "processing.max_workers must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

/// Thumbnail settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ThumbnailConfig {
    pub max_width: u32,
    pub max_height: u32,
    pub quality: u8,
}

impl Default for ThumbnailConfig {
    fn default() -> Self {
        Self {
            max_width: 800,
            max_height: 600,
            quality: 75,
        }
    }
}

impl ThumbnailConfig {
    pub fn params(&self) -> ThumbnailParams {
        ThumbnailParams {
            max_width: self.max_width,
            max_height: self.max_height,
            quality: Quality::new(self.quality),
        }
    }
}

/// Object key handling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct KeysConfig {
    /// Storage notifications form-encode keys (`my photo.jpg` arrives as
    /// `my+photo.jpg`). When set, keys are decoded before use.
    pub url_decode: bool,
}

impl Default for KeysConfig {
    fn default() -> Self {
        Self { url_decode: true }
    }
}

/// Concurrency settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Threads in the image worker pool.
    /// When absent, defaults to the number of CPU cores.
    /// Values larger than the core count are clamped down.
    pub max_workers: Option<usize>,
    /// Records processed at the same time within one invocation.
    pub max_in_flight: usize,
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            max_workers: None,
            max_in_flight: 4,
        }
    }
}

/// Resolve the effective worker thread count.
///
/// - `None` → use all available cores
/// - `Some(n)` → use `min(n, cores)` (user can constrain down, not up)
pub fn effective_threads(config: &ProcessingConfig) -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    config.max_workers.map(|n| n.min(cores)).unwrap_or(cores)
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    toml::Value::try_from(JobConfig::default())
        .map_err(|e| ConfigError::Validation(format!("default config does not serialize: {e}")))
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Parse TOML text and merge it over the stock defaults.
pub fn parse_config(content: &str) -> Result<JobConfig, ConfigError> {
    let overlay: toml::Value = toml::from_str(content)?;
    let merged = merge_toml(stock_defaults_value()?, overlay);
    let config: JobConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load configuration from an optional file.
///
/// `None` yields the validated stock defaults.
pub fn load_config(path: Option<&Path>) -> Result<JobConfig, ConfigError> {
    match path {
        Some(path) => parse_config(&fs::read_to_string(path)?),
        None => {
            let config = JobConfig::default();
            config.validate()?;
            Ok(config)
        }
    }
}
