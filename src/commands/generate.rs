//! Generate command implementation.

use anyhow::{Context, Result};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use tracing::{info, warn, Instrument};

use crate::aggregator::{run_all, ListResult};
use crate::config::{Config, Mode};
use crate::context::RunContext;
use crate::fetcher::{HttpFetcher, SourceFetcher};
use crate::fs_abstraction::{real_fs, FileSystem};
use crate::lock::LockGuard;
use crate::renderer::ScriptRenderer;
use crate::summary::{ListSummary, RunSummary};
use crate::utils::format_count;
use crate::validation::validate_lists;

/// Command-line overrides for one run
#[derive(Debug, Clone, Default)]
pub struct GenerateOptions {
    pub output_dir: Option<PathBuf>,
    pub min_standard: Option<usize>,
    pub min_light: Option<usize>,
    pub dry_run: bool,
    pub summary: Option<PathBuf>,
}

impl GenerateOptions {
    /// Apply overrides on top of the loaded configuration
    pub fn apply(&self, config: &mut Config) {
        if let Some(ref dir) = self.output_dir {
            config.output.directory = dir.clone();
        }
        if let Some(min) = self.min_standard {
            config.thresholds.min_standard = min;
        }
        if let Some(min) = self.min_light {
            config.thresholds.min_light = min;
        }
    }
}

/// A rendered script waiting to be written
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub mode: Mode,
    pub path: PathBuf,
    pub contents: String,
}

/// Both lists, validated and rendered in memory
#[derive(Debug, Clone)]
pub struct Build {
    pub standard: ListResult,
    pub light: ListResult,
    pub artifacts: Vec<Artifact>,
}

impl Build {
    pub fn list(&self, mode: Mode) -> &ListResult {
        match mode {
            Mode::Standard => &self.standard,
            Mode::Light => &self.light,
        }
    }

    pub fn summary(&self, ctx: &RunContext) -> RunSummary {
        let lists = self
            .artifacts
            .iter()
            .map(|a| ListSummary::new(a.mode, a.path.clone(), self.list(a.mode)))
            .collect();
        RunSummary::new(ctx, lists)
    }

    /// Sources that failed in either list, deduplicated and sorted
    pub fn failed_sources(&self) -> Vec<&str> {
        self.standard
            .failed_sources
            .iter()
            .chain(self.light.failed_sources.iter())
            .map(String::as_str)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}

/// Run the generate command
pub async fn run(opts: GenerateOptions, config_path: Option<&Path>) -> Result<()> {
    let mut config = Config::load_or_default(config_path)
        .with_context(|| format!("Failed to load config from {:?}", config_path))?;
    opts.apply(&mut config);

    let ctx = RunContext::new();
    let fetcher = HttpFetcher::new(&config.fetch)?;
    let fs = real_fs();

    info!("Generating RouterOS blacklists ({})", ctx.generator());

    // Held for the whole run so two runs never interleave writes to one directory.
    // The directory itself is only created once both lists have validated.
    let _lock = if opts.dry_run {
        None
    } else {
        Some(LockGuard::acquire(&config.output.directory)?)
    };

    let (build, written) = execute(&ctx, &fetcher, fs, &config, &opts).await?;
    print_result(&build, &written);

    Ok(())
}

/// Build both lists and, unless this is a dry run, publish them.
///
/// Nothing is written when validation fails.
pub async fn execute<F>(
    ctx: &RunContext,
    fetcher: &F,
    fs: &dyn FileSystem,
    config: &Config,
    opts: &GenerateOptions,
) -> Result<(Build, Vec<PathBuf>)>
where
    F: SourceFetcher + ?Sized,
{
    let build = build(ctx, fetcher, config).await?;

    if opts.dry_run {
        info!("Dry run mode: skipping file generation");
        return Ok((build, Vec::new()));
    }

    fs.create_dir_all(&config.output.directory)
        .with_context(|| {
            format!(
                "Failed to create output directory {:?}",
                config.output.directory
            )
        })?;
    let written = publish(fs, ctx, &build, opts.summary.as_deref())?;
    Ok((build, written))
}

/// Aggregate both lists, validate them together and render both scripts.
///
/// Returns the [`ValidationError`](crate::error::ValidationError) (wrapped in
/// `anyhow`) when any size invariant is violated; nothing is rendered then.
pub async fn build<F>(ctx: &RunContext, fetcher: &F, config: &Config) -> Result<Build>
where
    F: SourceFetcher + ?Sized,
{
    async move {
        let (standard, light) = run_all(
            ctx,
            fetcher,
            &config.sources,
            config.fetch.max_concurrent,
        )
        .await;

        info!("Validating lists");
        validate_lists(
            standard.len(),
            light.len(),
            config.thresholds.min_standard,
            config.thresholds.min_light,
        )?;

        let renderer = ScriptRenderer::new(ctx, &config.output.address_list);
        let artifacts = Mode::ALL
            .iter()
            .map(|&mode| {
                let list = match mode {
                    Mode::Standard => &standard,
                    Mode::Light => &light,
                };
                Artifact {
                    mode,
                    path: config.output.path_for(mode),
                    contents: renderer.render(mode, &list.addresses, &list.counts),
                }
            })
            .collect();

        Ok(Build {
            standard,
            light,
            artifacts,
        })
    }
    .instrument(ctx.span().clone())
    .await
}

/// Write every artifact (and the optional summary) through `fs`.
///
/// Each file is replaced atomically. Returns the paths written.
pub fn publish(
    fs: &dyn FileSystem,
    ctx: &RunContext,
    build: &Build,
    summary_path: Option<&Path>,
) -> Result<Vec<PathBuf>> {
    let mut written = Vec::new();

    for artifact in &build.artifacts {
        info!(
            "Generating {} list with {} IPs to {:?}",
            artifact.mode,
            build.list(artifact.mode).len(),
            artifact.path
        );
        fs.write_atomic(&artifact.path, artifact.contents.as_bytes())
            .with_context(|| format!("Failed to write {:?}", artifact.path))?;
        info!("Successfully generated {:?}", artifact.path);
        written.push(artifact.path.clone());
    }

    if let Some(path) = summary_path {
        let json = build.summary(ctx).to_json()?;
        fs.write_atomic(path, json.as_bytes())
            .with_context(|| format!("Failed to write summary {:?}", path))?;
        written.push(path.to_path_buf());
    }

    Ok(written)
}

fn print_result(build: &Build, written: &[PathBuf]) {
    let failed = build.failed_sources();
    if !failed.is_empty() {
        warn!("Completed without: {}", failed.join(", "));
    }

    println!();
    println!(
        "[OK] standard: {} entries, light: {} entries",
        format_count(build.standard.len()),
        format_count(build.light.len())
    );
    for path in written {
        println!("     wrote {}", path.display());
    }
}
