//! Per-run aggregation statistics.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Summary of one aggregation run.
#[derive(Debug, Clone, Serialize)]
pub struct RunStats {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,

    /// Sources whose results were processed
    pub sources: usize,

    /// Records pushed to the sink
    pub emitted: usize,

    /// Records suppressed by link deduplication
    pub duplicates: usize,

    /// Records rejected by the department filter
    pub filtered: usize,

    /// Whether the run ended before all sources were processed
    /// (sink stop or cancellation)
    pub stopped: bool,
}

impl RunStats {
    /// Start a new stats record at `started_at`.
    pub fn new(started_at: DateTime<Utc>) -> Self {
        Self {
            started_at,
            finished_at: started_at,
            sources: 0,
            emitted: 0,
            duplicates: 0,
            filtered: 0,
            stopped: false,
        }
    }
}
