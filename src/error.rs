//! Error handling for radial bearing analysis.
//!
//! Provides error types with context for per-file parsing failures,
//! remote dataset access, station metadata and rendering.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AvrbError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Unreadable radial file: {path} - {reason}")]
    SourceUnreadable { path: PathBuf, reason: SkipReason },

    #[error("Radial source directory not found: {path}")]
    SourceNotFound { path: PathBuf },

    #[error("Remote dataset unavailable: {address} - {reason}")]
    RemoteSourceUnavailable { address: String, reason: String },

    #[error("Remote dataset read timed out after {timeout_secs}s: {address}")]
    RemoteTimeout { address: String, timeout_secs: u64 },

    #[error("Invalid gridded dataset {address}: {reason}")]
    InvalidDataset { address: String, reason: String },

    #[error("No bearing observations collected for {network_id}-{station_id}")]
    EmptyResult {
        network_id: String,
        station_id: String,
    },

    #[error("Station metadata unavailable for {station_id}: missing {field}")]
    MetadataUnavailable { station_id: String, field: String },

    #[error("Network not found in station registry: {network_id}")]
    NetworkNotFound { network_id: String },

    #[error("Station registry error in {path}: {reason}")]
    Registry { path: PathBuf, reason: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Rendering failed for {path}: {reason}")]
    RenderFailed { path: PathBuf, reason: String },

    #[error("Background task failed: {reason}")]
    Task { reason: String },
}

impl AvrbError {
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub fn remote_unavailable(address: impl Into<String>, reason: impl fmt::Display) -> Self {
        Self::RemoteSourceUnavailable {
            address: address.into(),
            reason: reason.to_string(),
        }
    }

    pub fn invalid_dataset(address: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidDataset {
            address: address.into(),
            reason: reason.into(),
        }
    }

    pub fn metadata_unavailable(station_id: impl Into<String>, field: impl Into<String>) -> Self {
        Self::MetadataUnavailable {
            station_id: station_id.into(),
            field: field.into(),
        }
    }

    /// Short machine-friendly label used in status lines
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Io(_) => "io",
            Self::SourceUnreadable { .. } => "source-unreadable",
            Self::SourceNotFound { .. } => "source-not-found",
            Self::RemoteSourceUnavailable { .. } => "remote-unavailable",
            Self::RemoteTimeout { .. } => "remote-timeout",
            Self::InvalidDataset { .. } => "invalid-dataset",
            Self::EmptyResult { .. } => "empty-result",
            Self::MetadataUnavailable { .. } => "metadata-unavailable",
            Self::NetworkNotFound { .. } => "network-not-found",
            Self::Registry { .. } => "registry",
            Self::Configuration { .. } => "configuration",
            Self::RenderFailed { .. } => "render-failed",
            Self::Task { .. } => "task",
        }
    }
}

/// Reason a single tabular radial file was skipped
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SkipReason {
    #[error("no data rows")]
    EmptyData,

    #[error("invalid text encoding on line {line}")]
    InvalidEncoding { line: usize },

    #[error("malformed row on line {line}: {detail}")]
    MalformedRow { line: usize, detail: String },

    #[error("missing timestamp header")]
    MissingTimestamp,

    #[error("invalid timestamp header '{text}'")]
    InvalidTimestamp { text: String },

    #[error("cannot read file: {0}")]
    Unreadable(String),
}

pub type Result<T> = std::result::Result<T, AvrbError>;
