//! taskfs CLI Binary
//!
//! Command-line interface for browsing the task tree.

use clap::Parser;
use std::process;
use taskfs::logging::init_logging;
use taskfs::tooling::cli::{exit_code, Cli, CliContext};
use tracing::warn;

fn main() {
    let cli = Cli::parse();

    let config = match cli.load_config() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error loading configuration: {}", e);
            process::exit(exit_code(&e));
        }
    };

    if let Err(e) = init_logging(Some(&config.logging)) {
        eprintln!("Error initializing logging: {}", e);
        process::exit(exit_code(&e));
    }

    let context = match CliContext::new(&config) {
        Ok(ctx) => ctx,
        Err(e) => {
            eprintln!("Error building tree: {}", e);
            process::exit(exit_code(&e));
        }
    };

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Error starting runtime: {}", e);
            process::exit(1);
        }
    };

    let result = runtime.block_on(context.execute_until(&cli.command, async {
        if tokio::signal::ctrl_c().await.is_err() {
            // No handler could be installed; never interrupt.
            std::future::pending::<()>().await;
        }
        warn!("Interrupted; abandoning command");
    }));

    match result {
        Ok(output) => {
            println!("{}", output);
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(exit_code(&e));
        }
    }
}
