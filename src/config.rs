//! Run configuration.
//!
//! Everything a run does is driven by a single `rastermill.toml`. The file
//! lists the input patterns, the output directory, optimizer options that
//! are handed through to the SVG optimizer verbatim, and one
//! `[[output_format]]` block per raster variant to render from each SVG.
//!
//! ## Configuration Options
//!
//! ```toml
//! # Glob patterns, resolved against the working directory.
//! input = ["assets/**/*.svg", "assets/**/*.png", "assets/**/*.jpg"]
//!
//! # Where outputs land. The directory layout of the sources is mirrored.
//! output_dir = "dist"
//!
//! # Wipe output_dir before the run (default: false).
//! clean_output_dir = false
//!
//! # Enable mtime caching: repeat runs skip files that haven't changed.
//! # Omit to process everything on every run.
//! cache_dir = ".rastermill-cache"
//!
//! # Per-file logging; also keeps the scratch directory after the run.
//! debug = false
//!
//! # Passed through verbatim to the SVG optimizer as its config file.
//! [svg_optimizer]
//! multipass = true
//!
//! # One block per raster variant rendered from every matched SVG.
//! [[output_format]]
//! filename = "{{filename}}"      # {{filename}} becomes the source stem
//! format = "png"
//!
//! [[output_format]]
//! filename = "{{filename}}-2x"
//! format = "png"
//! output_size = "2x"
//!
//! [processing]
//! max_processes = 4              # Max parallel workers (omit for auto)
//! ```
//!
//! Unknown keys are rejected to catch typos early.

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

/// A run's configuration, loaded from `rastermill.toml`.
///
/// Only `input` has no usable default. Unknown keys are rejected.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RunConfig {
    /// Glob patterns selecting the input files.
    pub input: Vec<String>,
    /// Output directory; relative paths resolve against the working dir.
    pub output_dir: PathBuf,
    /// Remove the output directory before the run.
    pub clean_output_dir: bool,
    /// Cache directory. Absent means caching is disabled and every matched
    /// file is processed on every run.
    pub cache_dir: Option<PathBuf>,
    /// Per-file logging plus scratch-directory retention.
    pub debug: bool,
    /// Options handed verbatim to the SVG optimizer. The pipeline never
    /// interprets these; they only participate in the cache fingerprint.
    pub svg_optimizer: serde_json::Value,
    /// Raster variants rendered from every matched SVG.
    #[serde(rename = "output_format")]
    pub output_formats: Vec<OutputFormat>,
    /// Parallel processing settings.
    pub processing: ProcessingConfig,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            input: Vec::new(),
            output_dir: PathBuf::from("dist"),
            clean_output_dir: false,
            cache_dir: None,
            debug: false,
            svg_optimizer: serde_json::Value::Null,
            output_formats: Vec::new(),
            processing: ProcessingConfig::default(),
        }
    }
}

impl RunConfig {
    /// Validate config values beyond what deserialization enforces.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.input.is_empty() {
            return Err(ConfigError::Validation(
                "input must list at least one glob pattern".into(),
            ));
        }
        if self.output_dir.as_os_str().is_empty() {
            return Err(ConfigError::Validation("output_dir must not be empty".into()));
        }
        for (i, spec) in self.output_formats.iter().enumerate() {
            if spec.format.is_empty() {
                return Err(ConfigError::Validation(format!(
                    "output_format[{i}].format must not be empty"
                )));
            }
            if !spec.filename.contains(FILENAME_PLACEHOLDER) {
                return Err(ConfigError::Validation(format!(
                    "output_format[{i}].filename must contain {FILENAME_PLACEHOLDER}"
                )));
            }
            if let Some(quality) = spec.quality
                && !(1..=100).contains(&quality)
            {
                return Err(ConfigError::Validation(format!(
                    "output_format[{i}].quality must be 1-100"
                )));
            }
        }
        Ok(())
    }
}

/// Placeholder in `filename` templates, replaced with the source stem.
/// Required in every template; without it every SVG would render to the
/// same output name.
pub const FILENAME_PLACEHOLDER: &str = "{{filename}}";

/// One raster variant rendered from each staged SVG.
///
/// `filename` and `format` are required; the rest are optional renderer
/// options passed through in a fixed order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OutputFormat {
    /// Output name template; `{{filename}}` is replaced with the source
    /// file's stem. The format extension is appended automatically.
    pub filename: String,
    /// Target format ("png", "jpg", "pdf", ...).
    pub format: String,
    /// Encoding quality percentage (1-100).
    #[serde(default)]
    pub quality: Option<u32>,
    /// Source viewbox as `left:top:width:height`.
    #[serde(default)]
    pub input_viewbox: Option<String>,
    /// Output size: a scale like `"2x"`, a width like `"1024:"`, or
    /// `"width:height"`.
    #[serde(default)]
    pub output_size: Option<String>,
    /// How the viewbox maps onto the output size ("pad" or "crop").
    #[serde(default)]
    pub viewbox_mode: Option<String>,
    /// Extra CSS applied during rendering, as a JSON-compatible table.
    #[serde(default)]
    pub styles: Option<serde_json::Value>,
}

/// Parallel processing settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Maximum number of parallel workers.
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

/// Load and validate a config file.
pub fn load_config(path: &Path) -> Result<RunConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    let config: RunConfig = toml::from_str(&content)?;
    config.validate()?;
    Ok(config)
}

/// Returns a fully-commented stock `rastermill.toml` with all keys and
/// explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# Rastermill Configuration
# ========================
# input and at least the settings below are required; everything commented
# out is optional and shows its default or an example value.

# Glob patterns selecting the files to process, resolved against the
# working directory (see --cwd). SVGs are optimized and rasterized, PNGs
# are re-compressed, JPG and GIF files are copied through unchanged.
input = ["assets/**/*.svg", "assets/**/*.png"]

# Where outputs land. The source directory layout is mirrored below it:
# assets/icons/home.svg -> dist/assets/icons/home.png
output_dir = "dist"

# Wipe the output directory before each run.
# clean_output_dir = true

# Skip files whose modification time hasn't changed since the last run.
# The cache is keyed by the full option set below, so changing any
# optimizer or output-format option forces a full rebuild.
# cache_dir = ".rastermill-cache"

# Log every staged and rendered file, and keep the scratch directory
# around after the run for inspection.
# debug = true

# ---------------------------------------------------------------------------
# SVG optimizer
# ---------------------------------------------------------------------------
# This table is handed to the optimizer verbatim as its config file.
# Rastermill does not interpret it.
# [svg_optimizer]
# multipass = true

# ---------------------------------------------------------------------------
# Output formats
# ---------------------------------------------------------------------------
# One block per raster variant rendered from every matched SVG.
# {{filename}} in `filename` is replaced with the source file's stem; the
# format extension is appended automatically.

[[output_format]]
filename = "{{filename}}"
format = "png"

[[output_format]]
filename = "{{filename}}-2x"
format = "png"
output_size = "2x"

# All renderer options:
# [[output_format]]
# filename = "{{filename}}-wide"
# format = "jpg"
# quality = 80                   # 1-100
# input_viewbox = "0:0:640:480"  # left:top:width:height
# output_size = "1280:"          # "2x", "<width>:", or "<width>:<height>"
# viewbox_mode = "pad"           # "pad" or "crop"
# styles = { "#background" = { fill = "white" } }

# ---------------------------------------------------------------------------
# Processing
# ---------------------------------------------------------------------------
[processing]
# Maximum parallel workers for staging and rendering.
# Omit or comment out to auto-detect (= number of CPU cores).
# max_processes = 4
"##
}
