//! # routeros-blacklist - IP blocklist aggregator for MikroTik routers
//!
//! Downloads several public IP/CIDR blocklists, extracts every valid network
//! from their heterogeneous text formats, merges them into two deduplicated
//! lists and writes each one as a RouterOS script that fills a firewall
//! address-list.
//!
//! - **standard** (`blacklist.rsc`) - every source flagged for it
//! - **light** (`blacklist-light.rsc`) - excludes heavy sources, for devices with little flash
//!
//! Every run recomputes both lists from scratch. Output is sorted, so two runs
//! over the same upstream content differ only in the timestamp line.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    routeros-blacklist                       │
//! ├─────────────────────────────────────────────────────────────┤
//! │  CLI (clap)                                                 │
//! │    └── Commands: generate, sources, normalize, config       │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Config (serde_yaml)                                        │
//! │    └── Sources with standard/light flags, thresholds        │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Fetcher (reqwest + rustls)                                 │
//! │    └── One GET per source, 30s timeout, no retries          │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Normalizer (ipnet)                                         │
//! │    └── Comments, tab/mask records, canonical CIDR           │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Aggregator (futures)                                       │
//! │    └── Per-source sets, global union, failed sources        │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Validator → Renderer → atomic writes (tempfile, fs2 lock)  │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example Usage
//!
//! ```no_run
//! use routeros_blacklist::aggregator::run_all;
//! use routeros_blacklist::config::{Config, Mode};
//! use routeros_blacklist::context::RunContext;
//! use routeros_blacklist::fetcher::HttpFetcher;
//! use routeros_blacklist::renderer::ScriptRenderer;
//! use routeros_blacklist::validation::validate_lists;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::default();
//!     let ctx = RunContext::new();
//!     let fetcher = HttpFetcher::new(&config.fetch)?;
//!
//!     let (standard, light) = run_all(&ctx, &fetcher, &config.sources, 4).await;
//!     validate_lists(standard.len(), light.len(), 1000, 500)?;
//!
//!     let renderer = ScriptRenderer::new(&ctx, &config.output.address_list);
//!     let script = renderer.render(Mode::Standard, &standard.addresses, &standard.counts);
//!     std::fs::write("blacklist.rsc", script)?;
//!     Ok(())
//! }
//! ```
//!
//! ## Modules
//!
//! - [`address`] - Canonical network type and its total order
//! - [`aggregator`] - Per-list fetch, normalize and merge
//! - [`cli`] - Command-line interface definitions
//! - [`commands`] - CLI command implementations
//! - [`config`] - Sources, thresholds, output and fetch settings
//! - [`context`] - Per-run context (start time, generator, tracing span)
//! - [`error`] - Fetch, validation and configuration errors
//! - [`fetcher`] - HTTP client for downloading sources
//! - [`fs_abstraction`] - Filesystem seam for artifact writes
//! - [`lock`] - Output directory locking
//! - [`normalizer`] - Raw line to canonical network
//! - [`renderer`] - RouterOS script rendering
//! - [`summary`] - JSON run summary
//! - [`utils`] - Formatting helpers
//! - [`validation`] - List size invariants and config checks

pub mod address;
pub mod aggregator;
pub mod cli;
pub mod commands;
pub mod config;
pub mod context;
pub mod error;
pub mod fetcher;
pub mod fs_abstraction;
pub mod lock;
pub mod normalizer;
pub mod renderer;
pub mod summary;
pub mod utils;
pub mod validation;

pub use address::{AddressSet, NetworkAddress, SourceCount};
pub use cli::{Cli, Commands};
pub use config::{Config, Mode, Source};
pub use error::{BlacklistError, FetchError, ValidationError};
