//! Run configuration.
//!
//! Handles loading and validating `photolift.toml`. Every option has a
//! stock default, so a config file is optional and sparse — override just
//! the values you want. Unknown keys are rejected to catch typos early.
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! staging_root = "staging"       # Tree of per-item folders to reconcile
//! production_root = "production" # Flat directory of published images
//! reports_dir = "reports"        # Where report.csv/.html/.json land
//! logs_dir = "logs"              # Where run logs land
//! report_name = "report"         # Basename of the report files
//!
//! [encoding]
//! quality = 85                   # JPEG quality (1-100)
//! resize_threshold = 1200        # Downscale sources wider than this
//! target_extension = "jpg"       # Format promoted images are encoded to
//! ```
//!
//! CLI flags override whatever the file says.

use crate::naming::SUPPORTED_EXTENSIONS;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
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

/// Run configuration loaded from `photolift.toml`.
///
/// All fields have sensible defaults. User config files need only specify
/// the values they want to override. Unknown keys are rejected.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RunConfig {
    /// Staging tree of per-item folders.
    pub staging_root: PathBuf,
    /// Flat production directory.
    pub production_root: PathBuf,
    /// Directory report files are written into.
    pub reports_dir: PathBuf,
    /// Directory run logs are written into.
    pub logs_dir: PathBuf,
    /// Basename for the report files (`<name>.csv` etc).
    pub report_name: String,
    /// Re-encoding policy for promoted images.
    pub encoding: EncodingConfig,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            staging_root: PathBuf::from("staging"),
            production_root: PathBuf::from("production"),
            reports_dir: PathBuf::from("reports"),
            logs_dir: PathBuf::from("logs"),
            report_name: "report".to_string(),
            encoding: EncodingConfig::default(),
        }
    }
}

/// Re-encoding settings for the promote phase.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EncodingConfig {
    /// JPEG encoding quality (1-100).
    pub quality: u32,
    /// Sources wider than this many pixels are downscaled to this width.
    pub resize_threshold: u32,
    /// Extension (and thus format) promoted images are encoded to.
    pub target_extension: String,
}

impl Default for EncodingConfig {
    fn default() -> Self {
        Self {
            quality: 85,
            resize_threshold: 1200,
            target_extension: "jpg".to_string(),
        }
    }
}

impl RunConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.encoding.quality == 0 || self.encoding.quality > 100 {
            return Err(ConfigError::Validation(
                "encoding.quality must be 1-100".into(),
            ));
        }
        if self.encoding.resize_threshold == 0 {
            return Err(ConfigError::Validation(
                "encoding.resize_threshold must be positive".into(),
            ));
        }
        if !SUPPORTED_EXTENSIONS.contains(&self.encoding.target_extension.as_str()) {
            return Err(ConfigError::Validation(format!(
                "encoding.target_extension must be one of {}",
                SUPPORTED_EXTENSIONS.join(", ")
            )));
        }
        if self.report_name.is_empty() {
            return Err(ConfigError::Validation("report_name must be set".into()));
        }
        Ok(())
    }
}

/// Load configuration from the given file, or the stock defaults when the
/// file does not exist.
pub fn load_config(path: &Path) -> Result<RunConfig, ConfigError> {
    let config = if path.exists() {
        let content = fs::read_to_string(path)?;
        toml::from_str(&content)?
    } else {
        RunConfig::default()
    };
    config.validate()?;
    Ok(config)
}

/// A stock `photolift.toml` with all options at their defaults,
/// documented. Printed by the `gen-config` subcommand.
pub fn stock_config_toml() -> String {
    r#"# photolift configuration - all options shown with their defaults.

# Tree of per-item folders (5-digit code names) to reconcile.
staging_root = "staging"

# Flat directory of published images.
production_root = "production"

# Where report.csv / report.html / report.json are written.
reports_dir = "reports"

# Where run logs are written.
logs_dir = "logs"

# Basename of the report files.
report_name = "report"

[encoding]
# JPEG quality for promoted images (1-100).
quality = 85

# Sources wider than this many pixels are downscaled to this width;
# narrower sources are re-encoded at their original size (with a warning).
resize_threshold = 1200

# Format promoted images are encoded to: jpeg, jpg, png or webp.
target_extension = "jpg"
"#
    .to_string()
}
