//! Command-line argument definitions for the AVRB statistics tool
//!
//! Defines the CLI interface using the clap derive API.

use crate::config::Config;
use crate::models::SourceType;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// CLI arguments for the radial bearing statistics tool
///
/// Computes average radial bearing statistics for every station of an HF
/// radar network and draws one figure per station to support choosing the
/// AVRB quality-control threshold range.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "avrb-stats",
    version,
    about = "Average radial bearing statistics for HF radar stations",
    long_about = "Reads the radial files or aggregated netCDF radial dataset of every station \
                  in an HF radar network, computes the circular mean bearing per timestamp and \
                  the distribution of all bearings, and writes one figure per station with the \
                  configured AVRB QC range marked."
)]
pub struct Args {
    /// Network to analyse, as listed in the station registry
    #[arg(short = 'n', long = "network", value_name = "ID")]
    pub network: String,

    /// Radial source type
    #[arg(short = 't', long = "type", value_enum, value_name = "TYPE")]
    pub source_type: SourceKind,

    /// Station registry file
    ///
    /// If not specified, uses the configured registry or
    /// <config dir>/avrb-stats/stations.toml
    #[arg(short = 'r', long = "registry", value_name = "FILE")]
    pub registry: Option<PathBuf>,

    /// Output root; figures go to <output>/<network>/
    #[arg(short = 'o', long = "output", value_name = "DIR")]
    pub output: Option<PathBuf>,

    /// Path to configuration file (TOML format)
    ///
    /// If not specified, looks for <config dir>/avrb-stats/config.toml
    #[arg(short = 'c', long = "config", value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Logging verbosity level
    #[arg(
        short = 'v',
        long = "verbose",
        action = clap::ArgAction::Count,
        help = "Increase logging verbosity (-v: debug, -vv: trace)"
    )]
    pub verbose: u8,

    /// Only show errors and the station status lines
    #[arg(
        short = 'q',
        long = "quiet",
        help = "Suppress output except errors",
        conflicts_with = "verbose"
    )]
    pub quiet: bool,

    /// Disable the file progress bar
    #[arg(long = "no-progress")]
    pub no_progress: bool,
}

/// Radial source formats accepted on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SourceKind {
    /// Directory tree of LLUV `.ruv` files
    #[value(alias = "ruv")]
    Tabular,
    /// Aggregated netCDF dataset over OPeNDAP
    #[value(alias = "nc")]
    Gridded,
}

impl From<SourceKind> for SourceType {
    fn from(kind: SourceKind) -> Self {
        match kind {
            SourceKind::Tabular => SourceType::Tabular,
            SourceKind::Gridded => SourceType::Gridded,
        }
    }
}

impl Args {
    /// Log level for this crate; `configured` applies without -v/-q
    pub fn get_log_level<'a>(&self, configured: &'a str) -> &'a str {
        if self.quiet {
            "error"
        } else {
            match self.verbose {
                0 => configured,
                1 => "debug",
                _ => "trace",
            }
        }
    }

    /// Check if we should show progress bars
    pub fn show_progress(&self) -> bool {
        !self.quiet && !self.no_progress
    }

    /// Apply command-line overrides on top of the layered configuration
    pub fn apply_to(&self, config: &mut Config) {
        if let Some(registry) = &self.registry {
            config.registry_path = Some(registry.clone());
        }
        if let Some(output) = &self.output {
            config.output.root = output.clone();
        }
        if !self.show_progress() {
            config.logging.show_progress = false;
        }
    }
}
