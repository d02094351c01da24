//! routeros-blacklist - IP blocklist aggregator for MikroTik routers
//!
//! Downloads public blocklists and writes deterministic RouterOS scripts.

use anyhow::Result;
use clap::Parser;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use routeros_blacklist::cli::{Cli, Commands};
use routeros_blacklist::commands;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    let log_level = if cli.verbose {
        Level::DEBUG
    } else if cli.quiet {
        Level::ERROR
    } else {
        Level::INFO
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .with_thread_ids(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config_path = cli.config.as_deref();

    // Execute command
    match cli.command {
        Commands::Generate { .. } => {
            let opts = cli.command.generate_options().unwrap_or_default();
            commands::generate::run(opts, config_path).await
        }
        Commands::Sources => commands::sources::run(config_path).await,
        Commands::Normalize { ref lines } => commands::normalize::run(lines).await,
        Commands::Config => commands::template::run().await,
        Commands::Version => {
            println!("routeros-blacklist {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}
