//! Application constants for radial bearing analysis
//!
//! Default values for the tabular and gridded radial formats, the output
//! naming convention and figure layout.

// =============================================================================
// Tabular (LLUV .ruv) Format
// =============================================================================

/// File name pattern of tabular radial files
pub const RADIAL_FILE_PATTERN: &str = "*.ruv";

/// Marker starting every header/comment line
pub const COMMENT_MARKER: char = '%';

/// Label of the header line carrying the file timestamp
pub const TIMESTAMP_LABEL: &str = "%TimeStamp:";

/// Zero-based position of the BEAR column in the LLUV table
pub const BEARING_COLUMN: usize = 14;

// =============================================================================
// Gridded (netCDF aggregated) Format
// =============================================================================

/// Direction of the radial vector, "coming from" convention
pub const DIRECTION_VARIABLE: &str = "DRVA";

/// Time coordinate variable and dimension
pub const TIME_VARIABLE: &str = "TIME";

/// Spatial dimension names used to tag gridded observations
pub const RANGE_DIMENSION: &str = "RNGE";
pub const BEARING_DIMENSION: &str = "BEAR";
pub const DEPTH_DIMENSION: &str = "DEPTH";

/// Upper bound for one remote dataset read
pub const DEFAULT_REMOTE_TIMEOUT_SECS: u64 = 300;

// =============================================================================
// Output
// =============================================================================

/// Suffix of the per-station artifact: {network}-{station}_AVRBstats.png
pub const ARTIFACT_SUFFIX: &str = "_AVRBstats";
pub const ARTIFACT_EXTENSION: &str = "png";

/// Histogram bin width in degrees (72 bins over the full circle)
pub const HISTOGRAM_BIN_WIDTH: f64 = 5.0;

pub const DEFAULT_IMAGE_WIDTH: u32 = 2000;
pub const DEFAULT_IMAGE_HEIGHT: u32 = 1500;

/// Name of the directory under the user config dir
pub const APP_CONFIG_DIR: &str = "avrb-stats";
pub const CONFIG_FILE_NAME: &str = "config.toml";
pub const REGISTRY_FILE_NAME: &str = "stations.toml";

// =============================================================================
// Numerics
// =============================================================================

/// Resultant vectors shorter than this have no defined mean direction
pub const MIN_RESULTANT_LENGTH: f64 = 1e-9;
