//! Configuration: blocklist sources, thresholds, output and fetch settings.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::error::BlacklistError;
use crate::validation::{validate_address_list_name, validate_source_url};

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Blocklist sources, in processing order
    pub sources: Vec<Source>,

    /// Minimum sizes enforced before anything is written
    pub thresholds: Thresholds,

    /// Artifact locations and the router address-list name
    pub output: OutputConfig,

    /// HTTP client settings
    pub fetch: FetchConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            sources: default_sources(),
            thresholds: Thresholds::default(),
            output: OutputConfig::default(),
            fetch: FetchConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from YAML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {:?}", path.as_ref()))?;
        let config: Config = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {:?}", path.as_ref()))?;

        config.validate()?;

        Ok(config)
    }

    /// Load from `path` when given, otherwise use the built-in defaults
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => {
                let config = Self::default();
                config.validate()?;
                Ok(config)
            }
        }
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), BlacklistError> {
        if self.sources.is_empty() {
            return Err(BlacklistError::Config(
                "At least one source must be configured".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        for source in &self.sources {
            if source.name.trim().is_empty() {
                return Err(BlacklistError::Config(
                    "Source name cannot be empty".to_string(),
                ));
            }
            if !seen.insert(source.name.as_str()) {
                return Err(BlacklistError::DuplicateSource(source.name.clone()));
            }
            validate_source_url(source)?;
        }

        validate_address_list_name(&self.output.address_list)?;

        if self.output.standard_file.as_os_str().is_empty()
            || self.output.light_file.as_os_str().is_empty()
        {
            return Err(BlacklistError::Config(
                "Output file names cannot be empty".to_string(),
            ));
        }
        if self.output.standard_file == self.output.light_file {
            return Err(BlacklistError::Config(format!(
                "Standard and light lists cannot share the output file {:?}",
                self.output.standard_file
            )));
        }

        if self.fetch.timeout_secs == 0 {
            return Err(BlacklistError::Config(
                "fetch.timeout_secs must be greater than 0".to_string(),
            ));
        }
        if self.fetch.max_concurrent == 0 {
            return Err(BlacklistError::Config(
                "fetch.max_concurrent must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }

    /// Sources flagged for `mode`, in configured order
    pub fn sources_for(&self, mode: Mode) -> Vec<&Source> {
        self.sources.iter().filter(|s| mode.includes(s)).collect()
    }

    /// Generate default config with comments
    pub fn generate_default_yaml() -> String {
        include_str!("../templates/config.yaml").to_string()
    }
}

/// One upstream blocklist feed. Identity is the name.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Source {
    pub name: String,
    pub url: String,
    #[serde(rename = "standard", default = "default_true")]
    pub include_in_standard: bool,
    #[serde(rename = "light", default)]
    pub include_in_light: bool,
    #[serde(default)]
    pub description: String,
}

impl Source {
    pub fn new(
        name: impl Into<String>,
        url: impl Into<String>,
        include_in_standard: bool,
        include_in_light: bool,
        description: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            include_in_standard,
            include_in_light,
            description: description.into(),
        }
    }
}

/// Output list variant
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Every source flagged for the standard list
    Standard,
    /// Reduced source set for devices with little flash
    Light,
}

impl Mode {
    pub const ALL: [Mode; 2] = [Mode::Standard, Mode::Light];

    pub fn label(self) -> &'static str {
        match self {
            Mode::Standard => "standard",
            Mode::Light => "light",
        }
    }

    /// Whether `source` contributes to this list
    pub fn includes(self, source: &Source) -> bool {
        match self {
            Mode::Standard => source.include_in_standard,
            Mode::Light => source.include_in_light,
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Thresholds {
    pub min_standard: usize,
    pub min_light: usize,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            min_standard: 1000,
            min_light: 500,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory receiving both artifacts
    pub directory: PathBuf,
    pub standard_file: PathBuf,
    pub light_file: PathBuf,
    /// Firewall address-list the generated script appends to
    pub address_list: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("."),
            standard_file: PathBuf::from("blacklist.rsc"),
            light_file: PathBuf::from("blacklist-light.rsc"),
            address_list: "pwlgrzs-blacklist".to_string(),
        }
    }
}

impl OutputConfig {
    /// Artifact path for `mode`
    pub fn path_for(&self, mode: Mode) -> PathBuf {
        match mode {
            Mode::Standard => self.directory.join(&self.standard_file),
            Mode::Light => self.directory.join(&self.light_file),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct FetchConfig {
    pub timeout_secs: u64,
    pub user_agent: String,
    /// Sources downloaded at the same time within one list
    pub max_concurrent: usize,
    /// Largest accepted response body per source
    pub max_size_bytes: usize,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            user_agent: "Mozilla/5.0 (compatible; Mikrotik-Blacklist-Generator/2.0)".to_string(),
            max_concurrent: 4,
            max_size_bytes: 32 * 1024 * 1024,
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_sources() -> Vec<Source> {
    vec![
        Source::new(
            "Spamhaus DROP",
            "https://www.spamhaus.org/drop/drop.txt",
            true,
            true,
            "Spamhaus Don't Route Or Peer List",
        ),
        Source::new(
            "Spamhaus EDROP",
            "https://www.spamhaus.org/drop/edrop.txt",
            true,
            true,
            "Spamhaus Extended DROP List",
        ),
        Source::new(
            "DShield",
            "https://www.dshield.org/block.txt",
            true,
            true,
            "DShield Recommended Block List",
        ),
        Source::new(
            "Blacklist.de",
            "https://lists.blocklist.de/lists/all.txt",
            true,
            true,
            "Blocklist.de All Lists",
        ),
        Source::new(
            "Feodo Tracker",
            "https://feodotracker.abuse.ch/downloads/ipblocklist.txt",
            true,
            true,
            "Feodo Tracker IP Blocklist",
        ),
        Source::new(
            "FireHOL Level1",
            "https://raw.githubusercontent.com/ktsaou/blocklist-ipsets/master/firehol_level1.netset",
            true,
            false,
            "FireHOL Level1 - Excluded from light due to size",
        ),
        Source::new(
            "Tor Exit Nodes",
            "https://check.torproject.org/torbulkexitlist",
            true,
            false,
            "Tor Exit Nodes - Excluded from light",
        ),
    ]
}
