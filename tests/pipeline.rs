//! End-to-end tests for the generate pipeline.
//!
//! Sources are served by an in-memory fetcher; artifacts are written to a
//! temporary directory through the real filesystem.

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use std::collections::HashMap;
use std::path::Path;
use tempfile::TempDir;

use routeros_blacklist::commands::generate::{execute, GenerateOptions};
use routeros_blacklist::config::{Config, Source};
use routeros_blacklist::context::RunContext;
use routeros_blacklist::error::{FetchError, ValidationError};
use routeros_blacklist::fetcher::SourceFetcher;
use routeros_blacklist::fs_abstraction::RealFileSystem;

/// Serves fixed bodies by source name; unknown names are unreachable
struct StaticFetcher {
    bodies: HashMap<String, String>,
}

impl StaticFetcher {
    fn new(bodies: &[(&str, String)]) -> Self {
        Self {
            bodies: bodies
                .iter()
                .map(|(name, body)| (name.to_string(), body.clone()))
                .collect(),
        }
    }
}

#[async_trait]
impl SourceFetcher for StaticFetcher {
    async fn fetch(&self, source: &Source) -> Result<Vec<String>, FetchError> {
        match self.bodies.get(&source.name) {
            Some(body) => Ok(body.lines().map(str::to_string).collect()),
            None => Err(FetchError::Network {
                name: source.name.clone(),
                cause: "connection refused".to_string(),
            }),
        }
    }
}

/// `count` distinct /32s inside `first_octet.0.0.0/8`
fn hosts(first_octet: u8, count: usize) -> String {
    (0..count)
        .map(|i| format!("{}.{}.{}.1\n", first_octet, i / 256, i % 256))
        .collect()
}

fn ctx() -> RunContext {
    RunContext::at(Utc.with_ymd_and_hms(2024, 1, 2, 15, 4, 5).unwrap())
        .with_generator("routeros-blacklist test")
}

fn config_in(dir: &Path, sources: Vec<Source>, min_standard: usize, min_light: usize) -> Config {
    let mut config = Config {
        sources,
        ..Config::default()
    };
    config.output.directory = dir.to_path_buf();
    config.thresholds.min_standard = min_standard;
    config.thresholds.min_light = min_light;
    config
}

fn three_sources() -> Vec<Source> {
    vec![
        Source::new("Alpha", "https://alpha.test/list.txt", true, true, ""),
        Source::new("Beta", "https://beta.test/list.txt", true, false, ""),
        Source::new("Gamma", "https://gamma.test/list.txt", true, true, ""),
    ]
}

fn read(dir: &Path, name: &str) -> String {
    std::fs::read_to_string(dir.join(name)).unwrap()
}

fn entry_count(script: &str) -> usize {
    script.lines().filter(|l| l.starts_with("{\"")).count()
}

#[tokio::test]
async fn test_unreachable_source_does_not_block_output() {
    let dir = TempDir::new().unwrap();
    let config = config_in(dir.path(), three_sources(), 10, 5);
    // Gamma is unreachable
    let fetcher = StaticFetcher::new(&[("Alpha", hosts(10, 20)), ("Beta", hosts(20, 30))]);

    let (build, written) = execute(
        &ctx(),
        &fetcher,
        &RealFileSystem,
        &config,
        &GenerateOptions::default(),
    )
    .await
    .unwrap();

    assert_eq!(written.len(), 2);
    assert_eq!(build.standard.len(), 50);
    assert_eq!(build.light.len(), 20);
    assert!(build.standard.failed_sources.contains("Gamma"));
    assert!(!build.standard.counts.contains_key("Gamma"));

    let standard = read(dir.path(), "blacklist.rsc");
    assert_eq!(entry_count(&standard), 50);
    assert!(standard.contains("#   - Alpha: 20 entries\n"));
    assert!(standard.contains("#   - Beta: 30 entries\n"));
    assert!(!standard.contains("Gamma"));

    let light = read(dir.path(), "blacklist-light.rsc");
    assert_eq!(entry_count(&light), 20);
    assert!(light.contains("# Mikrotik Blacklist (light)\n"));
    assert!(!light.contains("Beta"));
}

#[tokio::test]
async fn test_light_is_subset_of_standard() {
    let dir = TempDir::new().unwrap();
    let config = config_in(dir.path(), three_sources(), 1, 1);
    let fetcher = StaticFetcher::new(&[
        ("Alpha", hosts(10, 5)),
        ("Beta", hosts(20, 5)),
        ("Gamma", hosts(30, 5)),
    ]);

    let (build, _) = execute(
        &ctx(),
        &fetcher,
        &RealFileSystem,
        &config,
        &GenerateOptions::default(),
    )
    .await
    .unwrap();

    assert!(build.light.addresses.is_subset(&build.standard.addresses));

    let standard = read(dir.path(), "blacklist.rsc");
    for line in read(dir.path(), "blacklist-light.rsc")
        .lines()
        .filter(|l| l.starts_with("{\""))
    {
        assert!(standard.contains(line), "{} missing from standard", line);
    }
}

#[tokio::test]
async fn test_duplicates_across_sources_collapse() {
    let dir = TempDir::new().unwrap();
    let config = config_in(dir.path(), three_sources(), 1, 1);
    let overlapping = "1.2.3.4\n10.0.0.5/8\n# comment\n";
    let fetcher = StaticFetcher::new(&[
        ("Alpha", overlapping.to_string()),
        ("Beta", "1.2.3.4/32\n10.0.0.0/8\n".to_string()),
        ("Gamma", "10.0.0.0/8 ; SBL1\n".to_string()),
    ]);

    execute(
        &ctx(),
        &fetcher,
        &RealFileSystem,
        &config,
        &GenerateOptions::default(),
    )
    .await
    .unwrap();

    let standard = read(dir.path(), "blacklist.rsc");
    assert_eq!(entry_count(&standard), 2);
    assert!(standard.contains("{\"1.2.3.4/32\"};\\\n{\"10.0.0.0/8\"};\\\n"));
    assert!(standard.contains("# Total entries: 2\n"));
    assert!(standard.contains("#   - Alpha: 2 entries\n"));
    assert!(standard.contains("#   - Gamma: 1 entries\n"));
}

#[tokio::test]
async fn test_validation_failure_writes_nothing() {
    let dir = TempDir::new().unwrap();
    let config = config_in(dir.path(), three_sources(), 1000, 500);
    let fetcher = StaticFetcher::new(&[("Alpha", hosts(10, 10))]);

    let err = execute(
        &ctx(),
        &fetcher,
        &RealFileSystem,
        &config,
        &GenerateOptions::default(),
    )
    .await
    .unwrap_err();

    let validation = err.downcast_ref::<ValidationError>().unwrap();
    assert_eq!(validation.messages.len(), 2);
    assert!(validation.messages[0].starts_with("Standard list too small: 10 < 1000"));

    assert!(!dir.path().join("blacklist.rsc").exists());
    assert!(!dir.path().join("blacklist-light.rsc").exists());
}

#[tokio::test]
async fn test_validation_failure_does_not_create_output_dir() {
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("out");
    let config = config_in(&out, three_sources(), 1000, 500);
    let fetcher = StaticFetcher::new(&[]);

    assert!(execute(
        &ctx(),
        &fetcher,
        &RealFileSystem,
        &config,
        &GenerateOptions::default(),
    )
    .await
    .is_err());

    assert!(!out.exists());
}

#[tokio::test]
async fn test_validation_failure_keeps_previous_artifacts() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("blacklist.rsc"), "previous").unwrap();
    let config = config_in(dir.path(), three_sources(), 1000, 500);
    let fetcher = StaticFetcher::new(&[]);

    assert!(execute(
        &ctx(),
        &fetcher,
        &RealFileSystem,
        &config,
        &GenerateOptions::default(),
    )
    .await
    .is_err());

    assert_eq!(read(dir.path(), "blacklist.rsc"), "previous");
}

#[tokio::test]
async fn test_dry_run_writes_nothing() {
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("out");
    let config = config_in(&out, three_sources(), 1, 1);
    let fetcher = StaticFetcher::new(&[("Alpha", hosts(10, 3)), ("Beta", hosts(20, 3))]);
    let opts = GenerateOptions {
        dry_run: true,
        ..GenerateOptions::default()
    };

    let (build, written) = execute(&ctx(), &fetcher, &RealFileSystem, &config, &opts)
        .await
        .unwrap();

    assert!(written.is_empty());
    assert_eq!(build.artifacts.len(), 2);
    assert!(!out.exists());
}

#[tokio::test]
async fn test_runs_are_identical_for_same_input() {
    let first_dir = TempDir::new().unwrap();
    let second_dir = TempDir::new().unwrap();
    let fetcher = StaticFetcher::new(&[
        ("Alpha", "2001:db8::/32\n9.9.9.9\n1.1.1.0/24\n".to_string()),
        ("Beta", hosts(20, 4)),
        ("Gamma", "1.1.1.0/24\n".to_string()),
    ]);

    for dir in [&first_dir, &second_dir] {
        let config = config_in(dir.path(), three_sources(), 1, 1);
        execute(
            &ctx(),
            &fetcher,
            &RealFileSystem,
            &config,
            &GenerateOptions::default(),
        )
        .await
        .unwrap();
    }

    for name in ["blacklist.rsc", "blacklist-light.rsc"] {
        assert_eq!(read(first_dir.path(), name), read(second_dir.path(), name));
    }

    // IPv4 sorts before IPv6
    let light = read(first_dir.path(), "blacklist-light.rsc");
    let v4 = light.find("{\"9.9.9.9/32\"}").unwrap();
    let v6 = light.find("{\"2001:db8::/32\"}").unwrap();
    assert!(v4 < v6);
}

#[tokio::test]
async fn test_summary_written_with_artifacts() {
    let dir = TempDir::new().unwrap();
    let config = config_in(dir.path(), three_sources(), 1, 1);
    let fetcher = StaticFetcher::new(&[("Alpha", hosts(10, 4)), ("Beta", hosts(20, 2))]);
    let opts = GenerateOptions {
        summary: Some(dir.path().join("summary.json")),
        ..GenerateOptions::default()
    };

    let (_, written) = execute(&ctx(), &fetcher, &RealFileSystem, &config, &opts)
        .await
        .unwrap();
    assert_eq!(written.len(), 3);

    let json: serde_json::Value =
        serde_json::from_str(&read(dir.path(), "summary.json")).unwrap();
    assert_eq!(json["generator"], "routeros-blacklist test");
    assert_eq!(json["lists"][0]["mode"], "standard");
    assert_eq!(json["lists"][0]["total_entries"], 6);
    assert_eq!(json["lists"][1]["total_entries"], 4);
    assert_eq!(json["lists"][1]["failed_sources"][0], "Gamma");
}
