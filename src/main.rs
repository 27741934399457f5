use avrb_stats::cli::{args::Args, commands};
use clap::Parser;
use std::process;

fn main() {
    // Missing or invalid flags exit with clap's usage error
    let args = Args::parse();

    let runtime = tokio::runtime::Runtime::new().unwrap_or_else(|e| {
        eprintln!("Failed to create async runtime: {}", e);
        process::exit(1);
    });

    let result = runtime.block_on(commands::run(args));

    // Do not wait for remote reads abandoned after a timeout
    runtime.shutdown_background();

    match result {
        Ok(summary) if summary.all_succeeded() => process::exit(0),
        Ok(_) => process::exit(1),
        Err(error) => {
            eprintln!("Error: {:#}", error);
            process::exit(1);
        }
    }
}
