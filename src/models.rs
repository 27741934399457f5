//! Core data structures for radial bearing analysis.
//!
//! Defines the canonical "bearing observations over time" model shared by
//! both radial sources, the derived views handed to rendering, and the
//! per-station context and outcome types.

use crate::error::{AvrbError, SkipReason};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Radial data source kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceType {
    /// Directory tree of per-timestamp LLUV text files
    Tabular,
    /// Aggregated netCDF dataset served remotely
    Gridded,
}

impl fmt::Display for SourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceType::Tabular => write!(f, "tabular"),
            SourceType::Gridded => write!(f, "gridded"),
        }
    }
}

/// Spatial indices of a gridded observation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GridCell {
    pub range: Option<usize>,
    pub bearing: Option<usize>,
    pub depth: Option<usize>,
}

/// A single measured bearing in degrees [0, 360)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BearingObservation {
    pub bearing: f64,
    pub cell: Option<GridCell>,
}

impl BearingObservation {
    pub fn new(bearing: f64) -> Self {
        Self {
            bearing,
            cell: None,
        }
    }

    pub fn in_cell(bearing: f64, cell: GridCell) -> Self {
        Self {
            bearing,
            cell: Some(cell),
        }
    }
}

/// All observations sharing one timestamp: one tabular file or one gridded time step
#[derive(Debug, Clone)]
pub struct ObservationBatch {
    pub timestamp: DateTime<Utc>,
    pub observations: Vec<BearingObservation>,
}

impl ObservationBatch {
    pub fn bearings(&self) -> impl Iterator<Item = f64> + '_ {
        self.observations.iter().map(|obs| obs.bearing)
    }
}

/// Circular mean bearing at one timestamp
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TimestampedAverage {
    pub timestamp: DateTime<Utc>,
    pub value: f64,
    /// Number of observations behind the average
    pub count: usize,
}

/// Average bearings ordered by ascending timestamp
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BearingTimeSeries {
    entries: Vec<TimestampedAverage>,
}

impl BearingTimeSeries {
    /// Build the series from averages in any order; equal timestamps keep
    /// their input order
    pub fn from_averages(mut averages: Vec<TimestampedAverage>) -> Self {
        averages.sort_by_key(|avg| avg.timestamp);
        Self { entries: averages }
    }

    pub fn entries(&self) -> &[TimestampedAverage] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// First and last timestamp covered by the series
    pub fn time_span(&self) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
        match (self.entries.first(), self.entries.last()) {
            (Some(first), Some(last)) => Some((first.timestamp, last.timestamp)),
            _ => None,
        }
    }
}

/// Pool of every bearing observed during a station run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BearingDistribution {
    values: Vec<f64>,
}

impl BearingDistribution {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn extend<I: IntoIterator<Item = f64>>(&mut self, values: I) {
        self.values.extend(values);
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Operator-configured acceptance window for the average radial bearing
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QcRange {
    pub min: f64,
    pub max: f64,
}

/// Station record as stored in the registry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StationRecord {
    #[serde(default)]
    pub network_id: String,
    #[serde(default)]
    pub station_id: String,
    #[serde(default, rename = "radial_qc_average_radial_bearing_min")]
    pub qc_min: Option<f64>,
    #[serde(default, rename = "radial_qc_average_radial_bearing_max")]
    pub qc_max: Option<f64>,
    #[serde(default)]
    pub radial_input_folder_path: Option<PathBuf>,
    #[serde(default)]
    pub opendap_data_url: Option<String>,
}

/// Where a station's radial data lives
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceLocator {
    Directory(PathBuf),
    Remote(String),
}

impl fmt::Display for SourceLocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceLocator::Directory(path) => write!(f, "{}", path.display()),
            SourceLocator::Remote(address) => write!(f, "{address}"),
        }
    }
}

/// Immutable inputs of one station analysis
#[derive(Debug, Clone, PartialEq)]
pub struct StationContext {
    pub network_id: String,
    pub station_id: String,
    pub qc_range: QcRange,
    pub locator: SourceLocator,
}

impl StationContext {
    /// Resolve the context for a source type, failing when the record lacks
    /// the fields that source needs
    pub fn resolve(record: &StationRecord, source: SourceType) -> Result<Self, AvrbError> {
        let station_id = record.station_id.trim();
        if station_id.is_empty() {
            return Err(AvrbError::metadata_unavailable("<unnamed>", "station_id"));
        }
        if record.network_id.trim().is_empty() {
            return Err(AvrbError::metadata_unavailable(station_id, "network_id"));
        }

        let qc_min = record.qc_min.ok_or_else(|| {
            AvrbError::metadata_unavailable(station_id, "radial_qc_average_radial_bearing_min")
        })?;
        let qc_max = record.qc_max.ok_or_else(|| {
            AvrbError::metadata_unavailable(station_id, "radial_qc_average_radial_bearing_max")
        })?;

        let locator = match source {
            SourceType::Tabular => record
                .radial_input_folder_path
                .clone()
                .filter(|path| !path.as_os_str().is_empty())
                .map(SourceLocator::Directory)
                .ok_or_else(|| {
                    AvrbError::metadata_unavailable(station_id, "radial_input_folder_path")
                })?,
            SourceType::Gridded => record
                .opendap_data_url
                .clone()
                .filter(|url| !url.trim().is_empty())
                .map(SourceLocator::Remote)
                .ok_or_else(|| AvrbError::metadata_unavailable(station_id, "opendap_data_url"))?,
        };

        Ok(Self {
            network_id: record.network_id.trim().to_string(),
            station_id: station_id.to_string(),
            qc_range: QcRange {
                min: qc_min,
                max: qc_max,
            },
            locator,
        })
    }

    /// Artifact path relative to the output root:
    /// `{network}/{network}-{station}_AVRBstats.png`
    pub fn artifact_path(&self) -> PathBuf {
        PathBuf::from(&self.network_id).join(format!(
            "{}-{}{}.{}",
            self.network_id,
            self.station_id,
            crate::constants::ARTIFACT_SUFFIX,
            crate::constants::ARTIFACT_EXTENSION
        ))
    }

    /// `{network}-{station}` label used in logs and status lines
    pub fn label(&self) -> String {
        format!("{}-{}", self.network_id, self.station_id)
    }
}

/// A source unit skipped or dropped during a station run
#[derive(Debug, Clone, PartialEq)]
pub struct SourceWarning {
    /// File path or `address@timestamp` of the unit
    pub source: String,
    pub reason: WarningReason,
}

#[derive(Debug, Clone, PartialEq)]
pub enum WarningReason {
    /// Tabular file skipped
    Skipped(SkipReason),
    /// Unit parsed but its bearings have no defined circular mean
    NoDefinedMean,
}

impl fmt::Display for SourceWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.reason {
            WarningReason::Skipped(reason) => write!(f, "{}: skipped ({reason})", self.source),
            WarningReason::NoDefinedMean => {
                write!(f, "{}: no defined mean bearing", self.source)
            }
        }
    }
}

/// Processing statistics of one station run
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ProcessingStats {
    pub units_found: usize,
    pub units_averaged: usize,
    pub units_skipped: usize,
    pub observations: usize,
    pub processing_time_ms: u128,
}
