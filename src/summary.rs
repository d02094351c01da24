//! Machine-readable summary of a generation run.

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::address::SourceCount;
use crate::aggregator::ListResult;
use crate::config::Mode;
use crate::context::RunContext;

/// Summary written next to the artifacts with `--summary`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RunSummary {
    pub generated_at: DateTime<Utc>,
    pub generator: String,
    pub lists: Vec<ListSummary>,
}

/// Statistics for one generated list
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ListSummary {
    pub mode: Mode,
    pub path: PathBuf,
    pub total_entries: usize,
    pub sources: SourceCount,
    pub failed_sources: Vec<String>,
}

impl ListSummary {
    pub fn new(mode: Mode, path: PathBuf, result: &ListResult) -> Self {
        Self {
            mode,
            path,
            total_entries: result.len(),
            sources: result.counts.clone(),
            failed_sources: result.failed_sources.iter().cloned().collect(),
        }
    }
}

impl RunSummary {
    pub fn new(ctx: &RunContext, lists: Vec<ListSummary>) -> Self {
        Self {
            generated_at: ctx.started_at(),
            generator: ctx.generator().to_string(),
            lists,
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
