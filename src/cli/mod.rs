//! CLI interface and argument parsing
//!
//! This module provides the command-line interface using clap.

pub mod commands;

use clap::{Parser, Subcommand};

/// Frequency attack on Bloom filter encodings
#[derive(Parser, Debug)]
#[command(name = "bfattack")]
#[command(version, about, long_about = None)]
#[command(author = "BF Attack Contributors")]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "bfattack.toml", env = "BFATTACK_CONFIG")]
    pub config: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "BFATTACK_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run one attack experiment and write its result rows
    Run(commands::run::RunArgs),

    /// Validate configuration file
    ValidateConfig(commands::validate::ValidateArgs),

    /// Initialize a new configuration file
    Init(commands::init::InitArgs),
}
