//! Per-run context threaded through aggregation and rendering.

use chrono::{DateTime, Utc};
use tracing::{info_span, Span};

use crate::config::Mode;

/// Identifier written into every generated script header
pub const GENERATOR: &str = concat!(env!("CARGO_PKG_NAME"), " ", env!("CARGO_PKG_VERSION"));

/// State shared by every stage of one run.
///
/// Log records emitted while a stage runs are attached to this run's span,
/// and to a per-mode child span during aggregation.
#[derive(Debug, Clone)]
pub struct RunContext {
    started_at: DateTime<Utc>,
    generator: String,
    span: Span,
}

impl RunContext {
    pub fn new() -> Self {
        Self::at(Utc::now())
    }

    /// Context with a fixed start time (used as the header timestamp)
    pub fn at(started_at: DateTime<Utc>) -> Self {
        let span = info_span!("run", started = %started_at.format("%Y-%m-%dT%H:%M:%SZ"));
        Self {
            started_at,
            generator: GENERATOR.to_string(),
            span,
        }
    }

    pub fn with_generator(mut self, generator: impl Into<String>) -> Self {
        self.generator = generator.into();
        self
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn generator(&self) -> &str {
        &self.generator
    }

    pub fn span(&self) -> &Span {
        &self.span
    }

    /// Child span for one list's aggregation
    pub fn mode_span(&self, mode: Mode) -> Span {
        info_span!(parent: &self.span, "aggregate", mode = %mode)
    }
}

impl Default for RunContext {
    fn default() -> Self {
        Self::new()
    }
}
