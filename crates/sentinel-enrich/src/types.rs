use std::fmt;

use sentinel_core::AppConfig;
use sentinel_store::BulkFailure;

/// Traversal and write sizing for enrichment passes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnrichOptions {
    /// Hits per scroll page.
    pub batch_size: usize,
    /// Update operations per bulk request.
    pub chunk_size: usize,
}

impl Default for EnrichOptions {
    fn default() -> Self {
        Self {
            batch_size: 500,
            chunk_size: 500,
        }
    }
}

impl EnrichOptions {
    #[must_use]
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            batch_size: config.batch_size,
            chunk_size: config.chunk_size,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassKind {
    Weapons,
    Sentiment,
}

impl fmt::Display for PassKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PassKind::Weapons => write!(f, "weapons"),
            PassKind::Sentiment => write!(f, "sentiment"),
        }
    }
}

/// Where a pass is, or where it stopped.
///
/// `NotStarted → Selecting → Extracting | Scoring → BulkWriting → Refreshed → Done`.
/// A selection failure ends in `Aborted`. A failed refresh skips `Refreshed`.
/// [`PassSummary::refreshed`] records whether the refresh went through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassState {
    NotStarted,
    Selecting,
    Extracting,
    Scoring,
    BulkWriting,
    Refreshed,
    Done,
    Aborted,
}

/// Result of one bulk request within a pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkReport {
    /// Zero-based position of the chunk within the pass.
    pub index: usize,
    pub submitted: usize,
    pub success: usize,
    pub failures: Vec<BulkFailure>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PassSummary {
    pub pass: PassKind,
    /// Records returned by the selection.
    pub selected: usize,
    /// Selected records that produced no update.
    pub skipped: usize,
    /// Update operations sent to the store.
    pub submitted: usize,
    pub updated: usize,
    pub failed: usize,
    pub chunks: Vec<ChunkReport>,
    pub state: PassState,
    /// Whether written updates were made visible to search before the pass ended.
    pub refreshed: bool,
    /// Selection error that ended the pass early.
    pub aborted: Option<String>,
}

impl PassSummary {
    #[must_use]
    pub fn new(pass: PassKind) -> Self {
        Self {
            pass,
            selected: 0,
            skipped: 0,
            submitted: 0,
            updated: 0,
            failed: 0,
            chunks: Vec::new(),
            state: PassState::NotStarted,
            refreshed: false,
            aborted: None,
        }
    }

    #[must_use]
    pub fn is_aborted(&self) -> bool {
        self.state == PassState::Aborted
    }

    pub(crate) fn record_chunk(&mut self, report: ChunkReport) {
        self.submitted += report.submitted;
        self.updated += report.success;
        self.failed += report.failures.len();
        self.chunks.push(report);
    }
}

/// Summaries of a full enrichment run, weapons first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub weapons: PassSummary,
    pub sentiment: PassSummary,
}
