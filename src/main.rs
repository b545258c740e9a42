// bfattack - Frequency attack on Bloom filter encodings
// Copyright (c) 2025 BF Attack Contributors
// Licensed under the MIT License

use bfattack::cli::{Cli, Commands};
use bfattack::config::load_config;
use bfattack::core::pipeline::ShutdownFlag;
use bfattack::logging::init_logging;
use clap::Parser;
use std::process;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

#[tokio::main]
async fn main() {
    // Load environment variables from .env file if present
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    // File logging settings come from the configuration when it loads; the
    // console is always used.
    let file_config = load_config(&cli.config).ok();
    let logging_config = file_config
        .as_ref()
        .map(|c| c.logging.clone())
        .unwrap_or_default();
    let log_level = cli
        .log_level
        .clone()
        .or_else(|| file_config.map(|c| c.application.log_level))
        .unwrap_or_else(|| "info".to_string());

    let guard = match init_logging(&log_level, &logging_config) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {e}");
            process::exit(5);
        }
    };

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        "bfattack - Frequency attack on Bloom filter encodings"
    );

    let shutdown: ShutdownFlag = Arc::new(AtomicBool::new(false));
    spawn_signal_handler(shutdown.clone());

    let exit_code = match execute_command(&cli, shutdown).await {
        Ok(code) => code,
        Err(e) => {
            tracing::error!(error = %e, "Command execution failed");
            eprintln!("Error: {e}");
            5
        }
    };

    drop(guard);
    process::exit(exit_code);
}

/// Raises the shutdown flag on SIGINT or SIGTERM
fn spawn_signal_handler(shutdown: ShutdownFlag) {
    tokio::spawn(async move {
        #[cfg(unix)]
        {
            use tokio::signal::unix::{signal, SignalKind};
            let mut sigterm = match signal(SignalKind::terminate()) {
                Ok(s) => s,
                Err(e) => {
                    tracing::error!(error = %e, "Failed to create SIGTERM handler");
                    return;
                }
            };

            tokio::select! {
                _ = tokio::signal::ctrl_c() => {
                    tracing::info!("Received SIGINT (Ctrl+C), cancelling run...");
                }
                _ = sigterm.recv() => {
                    tracing::info!("Received SIGTERM, cancelling run...");
                }
            }
        }

        #[cfg(not(unix))]
        {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "Failed to listen for Ctrl+C");
                return;
            }
            tracing::info!("Received SIGINT (Ctrl+C), cancelling run...");
        }

        println!("\n⚠️  Shutdown signal received, stopping at the next checkpoint...");
        shutdown.store(true, Ordering::SeqCst);
    });
}

/// Execute the CLI command
async fn execute_command(cli: &Cli, shutdown: ShutdownFlag) -> anyhow::Result<i32> {
    match &cli.command {
        Commands::Run(args) => args.execute(&cli.config, shutdown).await,
        Commands::ValidateConfig(args) => args.execute(&cli.config).await,
        Commands::Init(args) => args.execute().await,
    }
}
