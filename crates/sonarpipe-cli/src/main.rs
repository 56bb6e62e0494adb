mod cli;
mod commands;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, GlobalArgs};

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.global);
    commands::run(cli)
}

/// Logs go to stderr so stdout only carries JSON documents. `RUST_LOG`
/// overrides the flag-derived level.
fn init_logging(global: &GlobalArgs) {
    let level = if global.verbose {
        "debug"
    } else if global.quiet {
        "warn"
    } else {
        "info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!("sonarpipe={level},sonarpipe_core={level}"))
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
