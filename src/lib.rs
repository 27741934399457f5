//! AVRB Statistics Library
//!
//! Descriptive statistics on HF radar radial bearings, used to choose the
//! Average Radial Bearing (AVRB) quality-control threshold range of each
//! station.
//!
//! This library provides tools for:
//! - Reading bearings from LLUV `.ruv` radial files and from aggregated
//!   netCDF radial datasets (the latter behind the `netcdf` feature)
//! - Circular statistics on compass bearings
//! - Building a per-timestamp average bearing time series and the pooled
//!   bearing distribution of a station
//! - Annotating both views with the station's QC range and rendering them
//! - Running every station of a network with per-station failure isolation

pub mod cf_time;
pub mod circular;
pub mod config;
pub mod constants;
pub mod error;
pub mod extract;
pub mod header;
pub mod models;
pub mod processor;
pub mod registry;
pub mod render;

// CLI modules
pub mod cli {
    pub mod args;
    pub mod commands;
}

// Re-export commonly used types
pub use config::Config;
pub use error::{AvrbError, Result, SkipReason};
pub use models::{
    BearingDistribution, BearingObservation, BearingTimeSeries, ObservationBatch, QcRange,
    SourceType, StationContext, StationRecord, TimestampedAverage,
};
pub use processor::{RunSummary, StationAnalyzer, StationOutcome, StationStatistics};
pub use registry::StationRegistry;
