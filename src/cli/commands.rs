//! Command implementation for the AVRB statistics CLI
//!
//! Loads configuration and the station registry, installs logging and runs
//! the network analysis.

use crate::cli::args::Args;
use crate::config::Config;
use crate::error::{AvrbError, Result};
use crate::processor::{RunSummary, StationAnalyzer};
use crate::registry::StationRegistry;
use anyhow::Context;
use tracing::{debug, info};

/// Set up structured logging
pub fn setup_logging(args: &Args, config: &Config) -> Result<()> {
    use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

    let log_level = args.get_log_level(&config.logging.level);

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("avrb_stats={}", log_level)));

    let result = if args.quiet {
        // Minimal logging for quiet mode
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_level(true)
                    .with_writer(std::io::stderr)
                    .compact(),
            )
            .try_init()
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_level(true)
                    .with_timer(fmt::time::uptime())
                    .with_writer(std::io::stderr),
            )
            .try_init()
    };
    result.map_err(|e| AvrbError::configuration(format!("failed to install logger: {e}")))?;

    debug!("Logging initialized at level: {}", log_level);
    Ok(())
}

/// Layered configuration with command-line overrides, validated
pub fn load_configuration(args: &Args) -> Result<Config> {
    load_configuration_with(args, |key| std::env::var(key).ok())
}

/// [`load_configuration`] with the environment read through `lookup`
pub fn load_configuration_with<F>(args: &Args, lookup: F) -> Result<Config>
where
    F: Fn(&str) -> Option<String>,
{
    let config_file = match &args.config {
        Some(path) => Some(path.clone()),
        None => Config::default_config_path()
            .ok()
            .filter(|path| path.is_file()),
    };

    let mut config = Config::load_layered_with(config_file.as_deref(), lookup)?;
    args.apply_to(&mut config);
    config.validate()?;
    Ok(config)
}

/// Run the analysis for the requested network
pub async fn run(args: Args) -> anyhow::Result<RunSummary> {
    let config = load_configuration(&args).context("Invalid configuration")?;
    setup_logging(&args, &config)?;

    let registry_path = config.registry_path()?;
    let registry = StationRegistry::from_file(&registry_path).with_context(|| {
        format!(
            "Failed to load station registry {}",
            registry_path.display()
        )
    })?;
    let records = registry.stations_for_network(&args.network)?;
    info!(
        "Found {} stations for network {} in {}",
        records.len(),
        args.network,
        registry_path.display()
    );

    let analyzer = StationAnalyzer::new(config)?;
    Ok(analyzer
        .run_network(&args.network, &records, args.source_type.into())
        .await)
}
