//! Pipeline counters and statistics

use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};

/// Counters shared by all machine workers.
#[derive(Debug, Default)]
pub(crate) struct PipelineCounters {
    processed: AtomicU64,
    discarded: AtomicU64,
}

impl PipelineCounters {
    pub(crate) fn record_processed(&self) {
        self.processed.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_discarded(&self) {
        self.discarded.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn processed(&self) -> u64 {
        self.processed.load(Ordering::Relaxed)
    }

    pub(crate) fn discarded(&self) -> u64 {
        self.discarded.load(Ordering::Relaxed)
    }
}

/// Point-in-time pipeline statistics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PipelineStats {
    /// Readings scored and written to the store
    pub readings_processed: u64,
    /// Readings rejected as invalid (prior state kept)
    pub readings_discarded: u64,
    /// Machines with a stored state
    pub known_machines: usize,
    /// Worker loops still running
    pub running_workers: usize,
}

impl std::fmt::Display for PipelineStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} processed, {} discarded, {} machines, {} workers running",
            self.readings_processed, self.readings_discarded, self.known_machines, self.running_workers
        )
    }
}
