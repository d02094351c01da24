//! Sources command implementation.

use anyhow::{Context, Result};
use std::path::Path;

use crate::config::{Config, Mode};
use crate::utils::truncate;

/// Run the sources command
pub async fn run(config_path: Option<&Path>) -> Result<()> {
    let config = Config::load_or_default(config_path)
        .with_context(|| format!("Failed to load config from {:?}", config_path))?;

    print!("{}", format_sources(&config));
    Ok(())
}

/// Table of configured sources with their list membership
pub fn format_sources(config: &Config) -> String {
    let mut out = String::new();
    out.push('\n');
    out.push_str(" SOURCE               STANDARD  LIGHT  DESCRIPTION\n");
    out.push_str(" ──────────────────── ──────── ────── ────────────────────────────────\n");

    for source in &config.sources {
        out.push_str(&format!(
            " {:<20} {:<8} {:<6} {}\n",
            truncate(&source.name, 20),
            yes_no(Mode::Standard.includes(source)),
            yes_no(Mode::Light.includes(source)),
            truncate(&source.description, 48),
        ));
    }

    out.push_str(" ──────────────────── ──────── ────── ────────────────────────────────\n");
    out.push_str(&format!(
        " {} sources: {} standard, {} light\n\n",
        config.sources.len(),
        config.sources_for(Mode::Standard).len(),
        config.sources_for(Mode::Light).len()
    ));
    out
}

fn yes_no(flag: bool) -> &'static str {
    if flag {
        "yes"
    } else {
        "no"
    }
}
