//! Tabular radial file extraction.
//!
//! Handles discovering LLUV `.ruv` files below a station's input folder and
//! reading the bearing column and timestamp header of each one. Files that
//! cannot be used are skipped with a warning; the station run continues.

use super::{BearingExtractor, Extraction};
use crate::config::TabularConfig;
use crate::error::{AvrbError, Result, SkipReason};
use crate::header::TimestampHeader;
use crate::models::{
    BearingObservation, ObservationBatch, SourceLocator, SourceWarning, StationContext,
    WarningReason,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

/// Extractor for directory trees of LLUV radial files
#[derive(Debug, Clone)]
pub struct TabularExtractor {
    config: TabularConfig,
    pattern: glob::Pattern,
    timestamp: TimestampHeader,
    show_progress: bool,
}

impl TabularExtractor {
    pub fn new(config: TabularConfig) -> Result<Self> {
        let pattern = glob::Pattern::new(&config.file_pattern).map_err(|e| {
            AvrbError::configuration(format!("invalid file pattern '{}': {e}", config.file_pattern))
        })?;
        let timestamp = TimestampHeader::new(&config.timestamp_label)?;
        Ok(Self {
            config,
            pattern,
            timestamp,
            show_progress: false,
        })
    }

    /// Show a progress bar while scanning files
    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    /// Discover radial files below `root`, in lexicographic path order
    pub fn discover_files(&self, root: &Path) -> Result<Vec<PathBuf>> {
        if !root.is_dir() {
            return Err(AvrbError::SourceNotFound {
                path: root.to_path_buf(),
            });
        }

        debug!("Searching for radial files in: {}", root.display());

        let mut files = Vec::new();
        for entry in WalkDir::new(root).follow_links(true).sort_by_file_name() {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!("Skipping unreadable directory entry: {}", e);
                    continue;
                }
            };
            if entry.file_type().is_file() && self.matches(entry.path()) {
                files.push(entry.into_path());
            }
        }
        files.sort();

        debug!("Found {} radial files", files.len());
        Ok(files)
    }

    fn matches(&self, path: &Path) -> bool {
        path.file_name()
            .and_then(|name| name.to_str())
            .is_some_and(|name| self.pattern.matches(name))
    }

    /// Read one radial file into a batch of observations
    pub fn read_file(&self, path: &Path) -> std::result::Result<ObservationBatch, SkipReason> {
        let bytes = std::fs::read(path).map_err(|e| SkipReason::Unreadable(e.to_string()))?;
        self.parse_bytes(&bytes)
    }

    /// Parse the raw content of a radial file.
    ///
    /// Header lines are decoded lossily since they commonly carry Latin-1
    /// characters; data rows must be valid UTF-8.
    pub fn parse_bytes(&self, bytes: &[u8]) -> std::result::Result<ObservationBatch, SkipReason> {
        let mut timestamp = None;
        let mut observations = Vec::new();
        let mut data_rows = 0usize;
        let column = self.config.bearing_column;

        for (index, raw) in bytes.split(|&b| b == b'\n').enumerate() {
            let line_number = index + 1;
            let raw = raw.strip_suffix(b"\r").unwrap_or(raw);

            if is_comment(raw, self.config.comment_marker) {
                if timestamp.is_none() {
                    let line = String::from_utf8_lossy(raw);
                    if let Some(parsed) = self.timestamp.parse_line(&line) {
                        timestamp = Some(parsed?);
                    }
                }
                continue;
            }

            let line = std::str::from_utf8(raw).map_err(|_| SkipReason::InvalidEncoding {
                line: line_number,
            })?;
            if line.trim().is_empty() {
                continue;
            }

            data_rows += 1;
            let field = line.split_whitespace().nth(column).ok_or_else(|| {
                SkipReason::MalformedRow {
                    line: line_number,
                    detail: format!("no column {column}"),
                }
            })?;
            let bearing: f64 = field.parse().map_err(|_| SkipReason::MalformedRow {
                line: line_number,
                detail: format!("bearing '{field}' is not a number"),
            })?;

            if bearing.is_finite() {
                observations.push(BearingObservation::new(bearing));
            }
        }

        if data_rows == 0 {
            return Err(SkipReason::EmptyData);
        }
        let timestamp = timestamp.ok_or(SkipReason::MissingTimestamp)?;

        Ok(ObservationBatch {
            timestamp,
            observations,
        })
    }

    fn progress_bar(&self, len: usize) -> ProgressBar {
        if !self.show_progress {
            return ProgressBar::hidden();
        }
        let pb = ProgressBar::new(len as u64);
        if let Ok(style) = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta}) {msg}")
        {
            pb.set_style(style.progress_chars("#>-"));
        }
        pb
    }
}

fn is_comment(line: &[u8], marker: char) -> bool {
    let mut buf = [0u8; 4];
    let marker = marker.encode_utf8(&mut buf).as_bytes();
    line.trim_ascii_start().starts_with(marker)
}

impl BearingExtractor for TabularExtractor {
    fn name(&self) -> &'static str {
        "tabular"
    }

    fn extract(&self, context: &StationContext) -> Result<Extraction> {
        let root = match &context.locator {
            SourceLocator::Directory(path) => path,
            SourceLocator::Remote(address) => {
                return Err(AvrbError::configuration(format!(
                    "tabular extraction needs a local directory, got remote address {address}"
                )));
            }
        };

        let files = self.discover_files(root)?;
        let pb = self.progress_bar(files.len());
        pb.set_message(format!("Reading {}", context.label()));

        let mut extraction = Extraction {
            units_found: files.len(),
            ..Extraction::default()
        };

        for path in &files {
            match self.read_file(path) {
                Ok(batch) => {
                    debug!(
                        "Read {} bearings at {} from {}",
                        batch.observations.len(),
                        batch.timestamp,
                        path.display()
                    );
                    extraction.batches.push(batch);
                }
                Err(reason) => {
                    warn!(
                        "Skipping {}",
                        AvrbError::SourceUnreadable {
                            path: path.clone(),
                            reason: reason.clone(),
                        }
                    );
                    extraction.warnings.push(SourceWarning {
                        source: path.display().to_string(),
                        reason: WarningReason::Skipped(reason),
                    });
                }
            }
            pb.inc(1);
        }
        pb.finish_and_clear();

        Ok(extraction)
    }
}
