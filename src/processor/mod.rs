//! Station analysis orchestration.
//!
//! Drives one station through extraction, aggregation, QC annotation and
//! rendering, and runs every station of a network in registry order. A
//! station failure is reported in its [`StationOutcome`] and never stops its
//! siblings.

pub mod aggregate;
pub mod annotate;

#[cfg(test)]
pub mod tests;

pub use self::aggregate::{Aggregation, aggregate};
pub use self::annotate::{QcAnnotated, StationStatistics, annotate};

use crate::config::Config;
use crate::error::{AvrbError, Result};
use crate::extract::{
    BearingExtractor, DatasetOpener, Extraction, GriddedExtractor, TabularExtractor,
    default_opener,
};
use crate::models::{ProcessingStats, SourceType, StationContext, StationRecord};
use crate::render::{PngRenderer, Renderer};

use colored::*;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task;
use tracing::{Instrument, Span, debug, error, info, info_span, warn};

/// Successful result of one station analysis
#[derive(Debug, Clone)]
pub struct StationReport {
    /// Where the figure was written
    pub artifact: PathBuf,
    pub statistics: StationStatistics,
}

/// Terminal state of one station
#[derive(Debug)]
pub struct StationOutcome {
    pub network_id: String,
    pub station_id: String,
    pub result: std::result::Result<StationReport, AvrbError>,
}

impl StationOutcome {
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }

    pub fn label(&self) -> String {
        format!("{}-{}", self.network_id, self.station_id)
    }
}

/// Outcomes of every station of a network run
#[derive(Debug)]
pub struct RunSummary {
    pub network_id: String,
    pub source: SourceType,
    pub outcomes: Vec<StationOutcome>,
    pub processing_time_ms: u128,
}

impl RunSummary {
    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_success()).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.succeeded()
    }

    /// True only when every station produced its figure
    pub fn all_succeeded(&self) -> bool {
        self.outcomes.iter().all(StationOutcome::is_success)
    }
}

/// Runs the per-station pipeline against a fixed configuration
pub struct StationAnalyzer {
    config: Arc<Config>,
    tabular: Arc<TabularExtractor>,
    gridded: Arc<GriddedExtractor>,
    renderer: Arc<dyn Renderer>,
    remote_timeout: Duration,
}

impl StationAnalyzer {
    /// Create an analyzer with the PNG renderer and the default dataset opener
    pub fn new(config: Config) -> Result<Self> {
        let renderer: Arc<dyn Renderer> = Arc::new(PngRenderer::from_config(&config.output));
        Self::with_components(config, renderer, default_opener())
    }

    /// Create an analyzer with explicit rendering and dataset access.
    ///
    /// The configuration is validated first.
    pub fn with_components(
        config: Config,
        renderer: Arc<dyn Renderer>,
        opener: Arc<dyn DatasetOpener>,
    ) -> Result<Self> {
        config.validate()?;
        let tabular = TabularExtractor::new(config.tabular.clone())?
            .with_progress(config.logging.show_progress);
        let gridded = GriddedExtractor::new(config.gridded.clone(), opener);
        let remote_timeout = config.gridded.timeout();

        Ok(Self {
            config: Arc::new(config),
            tabular: Arc::new(tabular),
            gridded: Arc::new(gridded),
            renderer,
            remote_timeout,
        })
    }

    /// Override the bound on one remote dataset read
    pub fn with_remote_timeout(mut self, timeout: Duration) -> Self {
        self.remote_timeout = timeout;
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Analyse every station of a network in order and report each outcome
    pub async fn run_network(
        &self,
        network_id: &str,
        records: &[StationRecord],
        source: SourceType,
    ) -> RunSummary {
        let start_time = Instant::now();

        println!(
            "{} {} ({} stations, {} source)",
            "Analysing network".bright_green().bold(),
            network_id.bright_white().bold(),
            records.len(),
            source
        );

        let network_dir = self.config.output.root.join(network_id);
        if let Err(e) = tokio::fs::create_dir_all(&network_dir).await {
            error!(
                "Failed to create output folder {}: {}",
                network_dir.display(),
                e
            );
        }

        let mut outcomes = Vec::with_capacity(records.len());
        for record in records {
            let outcome = self.analyze(record, source).await;
            print_status(&outcome);
            outcomes.push(outcome);
        }

        let summary = RunSummary {
            network_id: network_id.to_string(),
            source,
            outcomes,
            processing_time_ms: start_time.elapsed().as_millis(),
        };

        let line = format!(
            "{} succeeded, {} failed in {:.1}s",
            summary.succeeded(),
            summary.failed(),
            summary.processing_time_ms as f64 / 1000.0
        );
        if summary.all_succeeded() {
            println!("{}", line.bright_green());
        } else {
            println!("{}", line.bright_red());
        }

        summary
    }

    /// Analyse one station; failures are captured in the outcome
    pub async fn analyze(&self, record: &StationRecord, source: SourceType) -> StationOutcome {
        let span = info_span!(
            "station",
            network = %record.network_id,
            station = %record.station_id,
            source = %source
        );
        let result = self.analyze_station(record, source).instrument(span).await;

        if let Err(e) = &result {
            warn!(
                "Station {}-{} failed: {}",
                record.network_id, record.station_id, e
            );
        }

        StationOutcome {
            network_id: record.network_id.clone(),
            station_id: record.station_id.clone(),
            result,
        }
    }

    async fn analyze_station(
        &self,
        record: &StationRecord,
        source: SourceType,
    ) -> Result<StationReport> {
        let start_time = Instant::now();
        let context = StationContext::resolve(record, source)?;
        info!("Reading {} radials from {}", source, context.locator);

        let Extraction {
            batches,
            mut warnings,
            units_found,
        } = self.extract(&context, source).await?;

        let aggregation = aggregate(&batches);
        if aggregation.time_series.is_empty() {
            return Err(AvrbError::EmptyResult {
                network_id: context.network_id.clone(),
                station_id: context.station_id.clone(),
            });
        }
        warnings.extend(aggregation.warnings);

        let units_averaged = aggregation.time_series.len();
        let stats = ProcessingStats {
            units_found,
            units_averaged,
            units_skipped: units_found.saturating_sub(units_averaged),
            observations: aggregation.distribution.len(),
            processing_time_ms: 0,
        };
        debug!(
            "Aggregated {} averages from {} observations ({} warnings)",
            stats.units_averaged,
            stats.observations,
            warnings.len()
        );

        let statistics = annotate(
            &context,
            aggregation.time_series,
            aggregation.distribution,
            warnings,
            stats,
        );

        let artifact = self.config.output.root.join(context.artifact_path());
        let mut statistics = self.render(statistics, artifact.clone()).await?;
        statistics.stats.processing_time_ms = start_time.elapsed().as_millis();

        info!(
            "Wrote {} in {}ms",
            artifact.display(),
            statistics.stats.processing_time_ms
        );

        Ok(StationReport {
            artifact,
            statistics,
        })
    }

    /// Run the matching extractor on the blocking pool; remote reads are bounded
    async fn extract(&self, context: &StationContext, source: SourceType) -> Result<Extraction> {
        let extractor: Arc<dyn BearingExtractor> = match source {
            SourceType::Tabular => self.tabular.clone(),
            SourceType::Gridded => self.gridded.clone(),
        };
        debug!("Dispatching to {} extractor", extractor.name());

        let task_context = context.clone();
        let span = Span::current();
        let handle = task::spawn_blocking(move || {
            let _entered = span.enter();
            extractor.extract(&task_context)
        });

        let joined = match source {
            SourceType::Tabular => handle.await,
            SourceType::Gridded => match tokio::time::timeout(self.remote_timeout, handle).await {
                Ok(joined) => joined,
                Err(_) => {
                    return Err(AvrbError::RemoteTimeout {
                        address: context.locator.to_string(),
                        timeout_secs: self.remote_timeout.as_secs(),
                    });
                }
            },
        };

        joined.map_err(|e| AvrbError::Task {
            reason: e.to_string(),
        })?
    }

    async fn render(
        &self,
        statistics: StationStatistics,
        path: PathBuf,
    ) -> Result<StationStatistics> {
        let renderer = Arc::clone(&self.renderer);
        let span = Span::current();

        task::spawn_blocking(move || {
            let _entered = span.enter();
            renderer.render(&statistics, &path).map(|_| statistics)
        })
        .await
        .map_err(|e| AvrbError::Task {
            reason: e.to_string(),
        })?
    }
}

fn print_status(outcome: &StationOutcome) {
    match &outcome.result {
        Ok(report) => {
            let stats = &report.statistics.stats;
            let mut line = format!(
                "  {} {}: {} averages from {} bearings",
                "✓".bright_green(),
                outcome.label().bright_white(),
                stats.units_averaged,
                stats.observations
            );
            if !report.statistics.warnings.is_empty() {
                line.push_str(&format!(
                    ", {}",
                    format!("{} warnings", report.statistics.warnings.len()).yellow()
                ));
            }
            println!("{line} -> {}", report.artifact.display());
        }
        Err(e) => {
            println!(
                "  {} {}: {} {}",
                "✗".bright_red(),
                outcome.label().bright_white(),
                format!("[{}]", e.kind()).red(),
                e
            );
        }
    }
}
