//! CLI interface for egx-scan
//!
//! Provides subcommands for:
//! - `scan`: Run one scan and dispatch the report
//! - `status`: Show session-calendar state
//! - `config`: Show the effective configuration

mod scan;

pub use scan::ScanArgs;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "egx-scan")]
#[command(about = "Price-channel opportunity scanner for EGX equities")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    pub config: String,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run one scan and dispatch the report
    Scan(ScanArgs),
    /// Show session-calendar state
    Status,
    /// Show the effective configuration
    Config,
}
