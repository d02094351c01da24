//! Config command implementation: print the commented default configuration.

use anyhow::Result;

use crate::config::Config;

/// Run the config command
pub async fn run() -> Result<()> {
    print!("{}", Config::generate_default_yaml());
    Ok(())
}
