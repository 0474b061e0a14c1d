//! Converter configuration module.
//!
//! Handles loading, validating, and merging `imgconv.toml`. Stock defaults
//! are overridden by the user's config file, which in turn is overridden by
//! command-line flags.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [conversion]
//! format = "jpg"            # jpg | png | webp | gif
//! quality = 80              # 10-100, in steps of 5
//!
//! [input]
//! accepted_types = ["image/jpeg", "image/png", "image/webp", "image/gif"]
//! max_files = 10            # Files accepted per drop
//!
//! [processing]
//! max_processes = 4         # Max parallel workers (omit for auto = CPU cores)
//! ```
//!
//! ## Partial Configuration
//!
//! Config files are sparse. Override just the values you want:
//!
//! ```toml
//! [conversion]
//! format = "webp"
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::imaging::{ConversionRequest, OutputFormat, Quality};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Default config file name, looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = "imgconv.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Converter configuration loaded from `imgconv.toml`.
///
/// All fields have sensible defaults. User config files need only specify
/// the values they want to override. Unknown keys are rejected.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConverterConfig {
    /// Target format and quality applied to every image of a run.
    pub conversion: ConversionConfig,
    /// Which files a drop accepts.
    pub input: InputConfig,
    /// Parallel processing settings.
    pub processing: ProcessingConfig,
}

impl ConverterConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let quality = self.conversion.quality.value();
        if !Quality::is_valid(quality) {
            return Err(ConfigError::Validation(format!(
                "conversion.quality must be {}-{} in steps of {}, got {quality}",
                Quality::MIN,
                Quality::MAX,
                Quality::STEP
            )));
        }
        if self.input.max_files == 0 {
            return Err(ConfigError::Validation(
                "input.max_files must be at least 1".into(),
            ));
        }
        if self.input.accepted_types.is_empty() {
            return Err(ConfigError::Validation(
                "input.accepted_types must not be empty".into(),
            ));
        }
        Ok(())
    }
}

/// Default target format and quality.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConversionConfig {
    pub format: OutputFormat,
    pub quality: Quality,
}

impl ConversionConfig {
    pub fn request(&self) -> ConversionRequest {
        ConversionRequest::new(self.format, self.quality)
    }
}

/// Drop filtering: which MIME types are accepted and how many files at once.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct InputConfig {
    pub accepted_types: Vec<String>,
    pub max_files: usize,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            accepted_types: OutputFormat::ALL
                .iter()
                .map(|f| f.mime_type().to_string())
                .collect(),
            max_files: 10,
        }
    }
}

impl InputConfig {
    pub fn accepts(&self, mime_type: &str) -> bool {
        self.accepted_types.iter().any(|t| t == mime_type)
    }
}

/// Parallel processing settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Maximum number of parallel conversion workers.
    /// When absent or null, defaults to the number of CPU cores.
    /// Values larger than the core count are clamped down.
    pub max_processes: Option<usize>,
}

/// Resolve the effective thread count from config.
///
/// - `None` → use all available cores
/// - `Some(n)` → use `min(n, cores)` (user can constrain down, not up)
pub fn effective_threads(config: &ProcessingConfig) -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    config.max_processes.map(|n| n.min(cores)).unwrap_or(cores)
}

/// Returns the stock default config as a `toml::Value::Table`.
///
/// This is the canonical representation of all default values, used as the
/// base layer for merging user overrides on top.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(ConverterConfig::default()).expect("default config must serialize")
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

/// Read a config file as a raw TOML value.
///
/// Returns `Ok(None)` if the file does not exist.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Load config from the file at `path`.
///
/// Merges user values on top of stock defaults, rejects unknown keys,
/// and validates the result. A missing file yields the stock defaults.
pub fn load_config(path: &Path) -> Result<ConverterConfig, ConfigError> {
    let base = stock_defaults_value();
    let merged = match load_raw_config(path)? {
        Some(overlay) => merge_toml(base, overlay),
        None => base,
    };
    let config: ConverterConfig = merged.try_into()?;
    config.validate()?;
    tracing::debug!("loaded config from {}", path.display());
    Ok(config)
}

/// Returns a fully-commented stock `imgconv.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# imgconv Configuration
# =====================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
#
# Command-line flags (--format, --quality) override these values.
# Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Conversion defaults
# ---------------------------------------------------------------------------
[conversion]
# Target format for every image of a run: "jpg", "png", "webp" or "gif".
format = "jpg"

# Encoding quality, 10-100 in steps of 5.
# Only JPEG output is lossy; PNG, WebP and GIF are written losslessly.
quality = 80

# ---------------------------------------------------------------------------
# Input filtering
# ---------------------------------------------------------------------------
[input]
# Files whose type is not listed here are discarded when loaded.
accepted_types = ["image/jpeg", "image/png", "image/webp", "image/gif"]

# Maximum number of files accepted per drop. Extra files are discarded.
max_files = 10

# ---------------------------------------------------------------------------
# Processing
# ---------------------------------------------------------------------------
[processing]
# Maximum parallel conversion workers.
# When omitted, defaults to the number of CPU cores.
# Values larger than the core count are clamped down.
# max_processes = 4
"##
}
