//! Configuration management and validation.
//!
//! Provides configuration structures for the tabular and gridded radial
//! sources, figure output and logging, loaded in layers: built-in defaults,
//! an optional TOML file, then environment variables. CLI flags are applied
//! last by the command layer.

use crate::constants::{
    APP_CONFIG_DIR, BEARING_COLUMN, BEARING_DIMENSION, COMMENT_MARKER, CONFIG_FILE_NAME,
    DEFAULT_IMAGE_HEIGHT, DEFAULT_IMAGE_WIDTH, DEFAULT_REMOTE_TIMEOUT_SECS, DEPTH_DIMENSION,
    DIRECTION_VARIABLE, HISTOGRAM_BIN_WIDTH, RADIAL_FILE_PATTERN, RANGE_DIMENSION,
    REGISTRY_FILE_NAME, TIME_VARIABLE, TIMESTAMP_LABEL,
};
use crate::error::{AvrbError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

/// Settings for LLUV `.ruv` directory trees
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TabularConfig {
    /// Glob matched against file names during discovery
    pub file_pattern: String,

    /// Lines starting with this character are headers/comments
    pub comment_marker: char,

    /// Label of the timestamp header line
    pub timestamp_label: String,

    /// Zero-based column holding the bearing
    pub bearing_column: usize,
}

impl Default for TabularConfig {
    fn default() -> Self {
        Self {
            file_pattern: RADIAL_FILE_PATTERN.to_string(),
            comment_marker: COMMENT_MARKER,
            timestamp_label: TIMESTAMP_LABEL.to_string(),
            bearing_column: BEARING_COLUMN,
        }
    }
}

/// Settings for aggregated netCDF datasets
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GriddedConfig {
    /// Directional variable read from the dataset
    pub direction_variable: String,

    /// Time coordinate variable, also the name of the time dimension
    pub time_variable: String,

    pub range_dimension: String,
    pub bearing_dimension: String,
    pub depth_dimension: String,

    /// Whether the directional variable uses the "coming from" convention
    /// and needs a 180° offset to become a bearing
    pub reverse_direction: bool,

    /// Upper bound for one remote dataset read
    pub timeout_secs: u64,
}

impl Default for GriddedConfig {
    fn default() -> Self {
        Self {
            direction_variable: DIRECTION_VARIABLE.to_string(),
            time_variable: TIME_VARIABLE.to_string(),
            range_dimension: RANGE_DIMENSION.to_string(),
            bearing_dimension: BEARING_DIMENSION.to_string(),
            depth_dimension: DEPTH_DIMENSION.to_string(),
            reverse_direction: true,
            timeout_secs: DEFAULT_REMOTE_TIMEOUT_SECS,
        }
    }
}

impl GriddedConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Figure output settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Root under which `{network}/` folders are created
    pub root: PathBuf,

    pub image_width: u32,
    pub image_height: u32,

    /// Histogram bin width in degrees
    pub histogram_bin_width: f64,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            image_width: DEFAULT_IMAGE_WIDTH,
            image_height: DEFAULT_IMAGE_HEIGHT,
            histogram_bin_width: HISTOGRAM_BIN_WIDTH,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Level applied to this crate unless RUST_LOG is set
    pub level: String,

    /// Show a progress bar while scanning radial files
    pub show_progress: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            show_progress: true,
        }
    }
}

/// Global configuration for radial bearing analysis
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Station registry file; defaults to the user config directory
    pub registry_path: Option<PathBuf>,

    pub tabular: TabularConfig,
    pub gridded: GriddedConfig,
    pub output: OutputConfig,
    pub logging: LoggingConfig,
}

impl Config {
    /// `<config dir>/avrb-stats/config.toml`
    pub fn default_config_path() -> Result<PathBuf> {
        dirs::config_dir()
            .map(|dir| dir.join(APP_CONFIG_DIR).join(CONFIG_FILE_NAME))
            .ok_or_else(|| AvrbError::configuration("could not determine user config directory"))
    }

    /// `<config dir>/avrb-stats/stations.toml`
    pub fn default_registry_path() -> Result<PathBuf> {
        dirs::config_dir()
            .map(|dir| dir.join(APP_CONFIG_DIR).join(REGISTRY_FILE_NAME))
            .ok_or_else(|| AvrbError::configuration("could not determine user config directory"))
    }

    /// Parse configuration from TOML text
    pub fn from_toml_str(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|e| AvrbError::configuration(format!("invalid TOML: {e}")))
    }

    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            AvrbError::configuration(format!(
                "failed to read config file '{}': {e}",
                path.display()
            ))
        })?;
        Self::from_toml_str(&text)
    }

    /// Load with layered configuration (defaults -> file -> environment)
    pub fn load_layered(config_file: Option<&Path>) -> Result<Self> {
        Self::load_layered_with(config_file, |key| std::env::var(key).ok())
    }

    /// Layered load with the environment read through `lookup`
    pub fn load_layered_with<F>(config_file: Option<&Path>, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = match config_file {
            Some(path) => {
                debug!("Loading configuration from {}", path.display());
                Self::from_file(path)?
            }
            None => Self::default(),
        };
        config.apply_env_overrides(lookup)?;
        Ok(config)
    }

    /// Apply `AVRB_*` overrides; `lookup` abstracts the environment for tests
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(dir) = lookup("AVRB_OUTPUT_DIR") {
            self.output.root = PathBuf::from(dir);
        }
        if let Some(path) = lookup("AVRB_REGISTRY") {
            self.registry_path = Some(PathBuf::from(path));
        }
        if let Some(secs) = lookup("AVRB_TIMEOUT_SECS") {
            self.gridded.timeout_secs = secs.trim().parse().map_err(|_| {
                AvrbError::configuration(format!("AVRB_TIMEOUT_SECS is not a number: '{secs}'"))
            })?;
        }
        if let Some(level) = lookup("AVRB_LOG_LEVEL") {
            self.logging.level = level;
        }
        Ok(())
    }

    /// Resolve the registry path, falling back to the user config directory
    pub fn registry_path(&self) -> Result<PathBuf> {
        match &self.registry_path {
            Some(path) => Ok(path.clone()),
            None => Self::default_registry_path(),
        }
    }

    /// Check settings before use
    pub fn validate(&self) -> Result<()> {
        if glob::Pattern::new(&self.tabular.file_pattern).is_err() {
            return Err(AvrbError::configuration(format!(
                "invalid file pattern '{}'",
                self.tabular.file_pattern
            )));
        }
        if self.tabular.timestamp_label.trim().is_empty() {
            return Err(AvrbError::configuration("timestamp label must not be empty"));
        }
        if !self
            .tabular
            .timestamp_label
            .starts_with(self.tabular.comment_marker)
        {
            return Err(AvrbError::configuration(format!(
                "timestamp label '{}' must start with the comment marker '{}'",
                self.tabular.timestamp_label, self.tabular.comment_marker
            )));
        }
        if self.gridded.direction_variable.is_empty() || self.gridded.time_variable.is_empty() {
            return Err(AvrbError::configuration(
                "gridded variable names must not be empty",
            ));
        }
        if self.gridded.timeout_secs == 0 {
            return Err(AvrbError::configuration("remote timeout must be positive"));
        }
        let bin_width = self.output.histogram_bin_width;
        if !(bin_width > 0.0 && bin_width <= 360.0) {
            return Err(AvrbError::configuration(format!(
                "histogram bin width must be in (0, 360], got {bin_width}"
            )));
        }
        if self.output.image_width < 200 || self.output.image_height < 200 {
            return Err(AvrbError::configuration(format!(
                "image size {}x{} is too small (minimum 200x200)",
                self.output.image_width, self.output.image_height
            )));
        }
        Ok(())
    }

    /// Set the output root
    pub fn with_output_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.output.root = root.into();
        self
    }

    /// Set the remote read timeout
    pub fn with_timeout_secs(mut self, timeout_secs: u64) -> Self {
        self.gridded.timeout_secs = timeout_secs;
        self
    }

    /// Disable the file progress bar
    pub fn without_progress(mut self) -> Self {
        self.logging.show_progress = false;
        self
    }
}
