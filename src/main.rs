//! firstboot-tui - Main entry point
//!
//! A terminal-based first-boot wizard that creates the initial user
//! account: collects a username, full name, and password, then provisions
//! the account, its home directory, and optional administrator group
//! membership.

use anyhow::Context;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use firstboot_tui::app;
use firstboot_tui::cli::{Cli, Commands};
use firstboot_tui::config_file::WizardConfig;
use firstboot_tui::sanity;
use firstboot_tui::types::ApplyOutcome;

/// Initialize tracing; RUST_LOG overrides the default level.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> anyhow::Result<()> {
    init_tracing();
    info!("firstboot-tui starting up");

    let cli = Cli::parse_args();

    if let Some(Commands::Validate { config }) = &cli.command {
        info!(path = %config.display(), "validating settings file");
        let loaded = WizardConfig::load_from_file(config)?;
        loaded.validate()?;
        println!("Settings file is valid: {}", config.display());
        return Ok(());
    }

    let config = match &cli.config {
        Some(path) => {
            let loaded = WizardConfig::load_from_file(path)
                .with_context(|| format!("loading settings from {}", path.display()))?;
            loaded.validate().context("invalid wizard settings")?;
            loaded
        }
        None => WizardConfig::default(),
    };
    debug!(?config, "wizard settings resolved");

    if cli.testing {
        // Testing mode never touches the system; no tools, no root.
        debug!("testing mode: skipping pre-flight checks");
    } else {
        sanity::run_preflight_checks(cli.skip_root_check);
    }

    match app::run_wizard(&config, cli.testing)? {
        ApplyOutcome::Success => {
            info!("wizard completed");
            Ok(())
        }
        ApplyOutcome::Failure => {
            info!("wizard dismissed");
            std::process::exit(1);
        }
    }
}
