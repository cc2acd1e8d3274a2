use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// firstboot-tui - first-boot user account wizard
#[derive(Parser)]
#[command(name = "firstboot-tui")]
#[command(about = "A terminal-based first-boot wizard for creating the initial user account")]
#[command(version)]
pub struct Cli {
    /// Testing mode: run the wizard but short-circuit apply to success
    /// without touching the system.
    ///
    /// Used by non-interactive validation passes of the surrounding
    /// first-boot machinery; also skips the root pre-flight check.
    #[arg(long, global = true)]
    pub testing: bool,

    /// Path to a wizard settings file (JSON). Defaults to the stock
    /// system locations when omitted.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Skip the root-privilege pre-flight check (development only).
    #[arg(long, global = true, hide = true)]
    pub skip_root_check: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the interactive wizard (the default)
    Run,
    /// Validate a wizard settings file and exit
    Validate {
        /// Path to the settings file to validate
        config: PathBuf,
    },
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
