//! Fetch, normalize and merge the sources of one list.

use futures::stream::{self, StreamExt};
use std::collections::BTreeSet;
use tracing::{error, info, warn, Instrument};

use crate::address::{AddressSet, SourceCount};
use crate::config::{Mode, Source};
use crate::context::RunContext;
use crate::error::FetchError;
use crate::fetcher::SourceFetcher;
use crate::normalizer::normalize_lines;
use crate::utils::format_count;

/// Outcome of aggregating one list
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListResult {
    /// Union of every processed source's addresses
    pub addresses: AddressSet,
    /// Unique addresses per processed source, before the global merge
    pub counts: SourceCount,
    /// Sources that could not be fetched
    pub failed_sources: BTreeSet<String>,
}

impl ListResult {
    pub fn len(&self) -> usize {
        self.addresses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.addresses.is_empty()
    }
}

/// Addresses extracted from a single source
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceAddresses {
    pub name: String,
    pub addresses: AddressSet,
}

pub type SourceOutcome = Result<SourceAddresses, FetchError>;

/// Fetch one source and normalize every line it returned
pub async fn collect_source<F>(fetcher: &F, source: &Source) -> SourceOutcome
where
    F: SourceFetcher + ?Sized,
{
    let lines = fetcher.fetch(source).await?;
    let addresses = normalize_lines(&lines);

    info!(
        "Processed {}: {} unique IPs",
        source.name,
        format_count(addresses.len())
    );
    if addresses.is_empty() {
        warn!("{} returned no valid addresses", source.name);
    }

    Ok(SourceAddresses {
        name: source.name.clone(),
        addresses,
    })
}

/// Build one list from every source flagged for `mode`.
///
/// Sources are fetched concurrently (at most `max_concurrent` at a time).
/// A failing source is recorded in [`ListResult::failed_sources`] and never
/// stops the others.
pub async fn run<F>(
    ctx: &RunContext,
    fetcher: &F,
    sources: &[Source],
    mode: Mode,
    max_concurrent: usize,
) -> ListResult
where
    F: SourceFetcher + ?Sized,
{
    async move {
        let included: Vec<&Source> = sources
            .iter()
            .filter(|source| {
                let included = mode.includes(source);
                if !included {
                    info!("Skipping {} (not included in {} list)", source.name, mode);
                }
                included
            })
            .collect();

        let outcomes: Vec<SourceOutcome> = stream::iter(
            included
                .into_iter()
                .map(|source| collect_source(fetcher, source)),
        )
        .buffered(max_concurrent.max(1))
        .collect()
        .await;

        let result = merge(outcomes);
        info!(
            "{} list: {} unique entries from {} sources",
            mode,
            format_count(result.len()),
            result.counts.len()
        );
        result
    }
    .instrument(ctx.mode_span(mode))
    .await
}

/// Build both lists. The two pipelines share nothing and run side by side.
pub async fn run_all<F>(
    ctx: &RunContext,
    fetcher: &F,
    sources: &[Source],
    max_concurrent: usize,
) -> (ListResult, ListResult)
where
    F: SourceFetcher + ?Sized,
{
    tokio::join!(
        run(ctx, fetcher, sources, Mode::Standard, max_concurrent),
        run(ctx, fetcher, sources, Mode::Light, max_concurrent),
    )
}

/// Merge per-source outcomes into one list.
///
/// Duplicates across sources collapse silently; a source's count is the size
/// of its own set, not its marginal contribution to the union.
pub fn merge<I>(outcomes: I) -> ListResult
where
    I: IntoIterator<Item = SourceOutcome>,
{
    let mut result = ListResult::default();

    for outcome in outcomes {
        match outcome {
            Ok(source) => {
                result.counts.insert(source.name, source.addresses.len());
                result.addresses.extend(source.addresses);
            }
            Err(e) => {
                if e.is_network() {
                    error!("Failed to download {}: {}", e.source_name(), e);
                } else {
                    error!("Failed to process {}: {}", e.source_name(), e);
                }
                result.failed_sources.insert(e.source_name().to_string());
            }
        }
    }

    if !result.failed_sources.is_empty() {
        let failed: Vec<&str> = result.failed_sources.iter().map(String::as_str).collect();
        warn!("Some sources failed: {}", failed.join(", "));
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// Serves canned bodies by source name; unknown names fail
    struct StubFetcher {
        bodies: HashMap<String, String>,
        calls: Mutex<Vec<String>>,
    }

    impl StubFetcher {
        fn new(bodies: &[(&str, &str)]) -> Self {
            Self {
                bodies: bodies
                    .iter()
                    .map(|(n, b)| (n.to_string(), b.to_string()))
                    .collect(),
                calls: Mutex::new(Vec::new()),
            }
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl SourceFetcher for StubFetcher {
        async fn fetch(&self, source: &Source) -> Result<Vec<String>, FetchError> {
            self.calls.lock().unwrap().push(source.name.clone());
            match self.bodies.get(&source.name) {
                Some(body) => Ok(body.lines().map(str::to_string).collect()),
                None => Err(FetchError::Network {
                    name: source.name.clone(),
                    cause: "connection refused".to_string(),
                }),
            }
        }
    }

    fn src(name: &str, standard: bool, light: bool) -> Source {
        Source::new(name, format!("https://example.com/{}", name), standard, light, "")
    }

    fn strings(set: &AddressSet) -> Vec<String> {
        set.iter().map(|a| a.to_string()).collect()
    }

    #[tokio::test]
    async fn test_run_merges_and_counts() {
        let fetcher = StubFetcher::new(&[
            ("a", "1.1.1.1\n2.2.2.0/24\n# comment\n"),
            ("b", "2.2.2.9/24\n3.3.3.3\n3.3.3.3\n"),
        ]);
        let sources = vec![src("a", true, true), src("b", true, true)];

        let result = run(&RunContext::new(), &fetcher, &sources, Mode::Standard, 2).await;

        assert_eq!(
            strings(&result.addresses),
            vec!["1.1.1.1/32", "2.2.2.0/24", "3.3.3.3/32"]
        );
        // per-source counts are each source's own unique count
        assert_eq!(result.counts.get("a"), Some(&2));
        assert_eq!(result.counts.get("b"), Some(&2));
        assert!(result.failed_sources.is_empty());
    }

    #[tokio::test]
    async fn test_run_light_skips_unflagged_sources() {
        let fetcher = StubFetcher::new(&[("small", "1.1.1.1\n"), ("heavy", "9.9.9.9\n")]);
        let sources = vec![src("small", true, true), src("heavy", true, false)];

        let result = run(&RunContext::new(), &fetcher, &sources, Mode::Light, 4).await;

        assert_eq!(strings(&result.addresses), vec!["1.1.1.1/32"]);
        assert!(!result.counts.contains_key("heavy"));
        assert_eq!(fetcher.calls(), vec!["small"]);
    }

    #[tokio::test]
    async fn test_run_standard_skips_light_only_sources() {
        let fetcher = StubFetcher::new(&[("light-only", "1.1.1.1\n")]);
        let sources = vec![src("light-only", false, true)];

        let result = run(&RunContext::new(), &fetcher, &sources, Mode::Standard, 4).await;

        assert!(result.is_empty());
        assert!(fetcher.calls().is_empty());
    }

    #[tokio::test]
    async fn test_run_tolerates_failed_source() {
        let fetcher = StubFetcher::new(&[("up", "1.1.1.1\n10.0.0.0/8\n")]);
        let sources = vec![src("down", true, true), src("up", true, true)];

        let result = run(&RunContext::new(), &fetcher, &sources, Mode::Standard, 1).await;

        assert_eq!(result.len(), 2);
        assert_eq!(result.counts.len(), 1);
        assert!(!result.counts.contains_key("down"));
        assert!(result.failed_sources.contains("down"));
    }

    #[tokio::test]
    async fn test_run_all_modes_independent() {
        let fetcher = StubFetcher::new(&[("a", "1.1.1.1\n"), ("b", "2.2.2.2\n")]);
        let sources = vec![src("a", true, true), src("b", true, false)];

        let (standard, light) = run_all(&RunContext::new(), &fetcher, &sources, 4).await;

        assert_eq!(standard.len(), 2);
        assert_eq!(light.len(), 1);
        assert!(!light.counts.contains_key("b"));
    }

    #[tokio::test]
    async fn test_run_is_deterministic() {
        let fetcher = StubFetcher::new(&[
            ("a", "5.5.5.5\n1.1.1.1\n2001:db8::1\n"),
            ("b", "4.4.4.0/22\n1.1.1.1\n"),
        ]);
        let sources = vec![src("a", true, true), src("b", true, true)];

        let first = run(&RunContext::new(), &fetcher, &sources, Mode::Standard, 2).await;
        let second = run(&RunContext::new(), &fetcher, &sources, Mode::Standard, 2).await;

        assert_eq!(first, second);
        assert_eq!(
            strings(&first.addresses),
            vec!["1.1.1.1/32", "4.4.4.0/22", "5.5.5.5/32", "2001:db8::1/128"]
        );
    }

    #[test]
    fn test_merge_empty() {
        let result = merge(Vec::new());
        assert!(result.is_empty());
        assert!(result.counts.is_empty());
        assert!(result.failed_sources.is_empty());
    }

    #[test]
    fn test_merge_records_failures() {
        let outcomes = vec![
            Err(FetchError::Status {
                name: "x".to_string(),
                status: 404,
            }),
            Err(FetchError::Unexpected {
                name: "y".to_string(),
                cause: "bad url".to_string(),
            }),
        ];
        let result = merge(outcomes);
        assert_eq!(
            result.failed_sources.into_iter().collect::<Vec<_>>(),
            vec!["x", "y"]
        );
        assert!(result.counts.is_empty());
    }

    #[test]
    fn test_merge_zero_address_source_counted() {
        let outcomes = vec![Ok(SourceAddresses {
            name: "empty".to_string(),
            addresses: AddressSet::new(),
        })];
        let result = merge(outcomes);
        assert_eq!(result.counts.get("empty"), Some(&0));
    }
}
