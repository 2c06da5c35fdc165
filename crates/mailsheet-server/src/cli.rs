//! Command-line definitions.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Mailsheet - turn project-listing chat messages into spreadsheets.
#[derive(Debug, Parser)]
#[command(name = "mailsheet")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Configuration file path (TOML)
    #[arg(short, long, global = true, env = "MAILSHEET_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Commands; `serve` when omitted.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the webhook server
    Serve(ServeArgs),

    /// Print the bot's open id
    BotInfo,
}

/// Arguments for the serve command.
#[derive(Debug, Default, Args)]
pub struct ServeArgs {
    /// Bind address as host:port (overrides config and environment)
    #[arg(short, long)]
    pub bind: Option<String>,

    /// Workbook output path (overrides config and environment)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}
