//! Settle rule for the job sync loop.
//!
//! The resume total of a freshly submitted job can keep rising for a while
//! after the first fetch, because the backend registers uploaded files
//! asynchronously. A job therefore only counts as done once every resume is
//! analyzed *and* the total has stayed unchanged for a configurable number
//! of consecutive snapshots.

/// Default number of consecutive stable snapshots required before settling.
/// Deployments with slow backend registration raise this.
pub const DEFAULT_STABLE_TICKS: u32 = 10;

/// Point-in-time counts derived from one job fetch. Never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProcessingSnapshot {
    pub total: u32,
    pub analyzed: u32,
}

impl ProcessingSnapshot {
    pub fn fully_analyzed(&self) -> bool {
        self.total > 0 && self.analyzed == self.total
    }
}

/// Tunable parameters for deciding when background analysis is done.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncPolicy {
    /// Consecutive snapshots with an unchanged resume total required before
    /// a fully-analyzed job settles.
    pub stable_ticks: u32,
}

impl Default for SyncPolicy {
    fn default() -> Self {
        Self {
            stable_ticks: DEFAULT_STABLE_TICKS,
        }
    }
}

impl SyncPolicy {
    /// True when the loop may stop: everything analyzed and the total has
    /// been stable long enough.
    pub fn should_settle(&self, snapshot: ProcessingSnapshot, stable_run: u32) -> bool {
        snapshot.fully_analyzed() && stable_run >= self.stable_ticks
    }
}

/// Counts the trailing run of snapshots with an unchanged resume total.
///
/// The run is the number of ticks since the total last changed: the first
/// snapshot starts it at zero, every unchanged snapshot increments it, and
/// any change resets it to zero. The reset is what prevents settling while
/// the backend is still registering uploads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StabilityTracker {
    last_total: Option<u32>,
    run: u32,
}

impl StabilityTracker {
    /// Feed one snapshot total; returns the updated run length.
    pub fn observe(&mut self, total: u32) -> u32 {
        match self.last_total {
            Some(prev) if prev == total => self.run += 1,
            _ => {
                self.last_total = Some(total);
                self.run = 0;
            }
        }
        self.run
    }

    pub fn run(&self) -> u32 {
        self.run
    }
}
