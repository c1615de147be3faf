//! Reload-vs-navigation disambiguation.
//!
//! On startup the shell must decide whether a persisted draft belongs to a
//! live session (restore it) or to an abandoned one (discard it). The
//! detection is best-effort and must fail toward clearing: resubmitting
//! stale files is worse than losing an unsaved selection.

use std::fs;
use std::path::PathBuf;

use chrono::Utc;
use engine_logging::engine_warn;

/// A gap above this since the last recorded visit means cold start.
pub const COLD_START_GAP_MS: i64 = 30_000;

/// One detection strategy. `Some(true)` means cold start, `Some(false)`
/// means warm navigation, `None` defers to the next strategy.
pub trait ColdStartSignal {
    fn probe(&self) -> Option<bool>;
}

/// Explicit platform restart flag, when the environment provides one.
pub struct ReloadFlag(pub Option<bool>);

impl ColdStartSignal for ReloadFlag {
    fn probe(&self) -> Option<bool> {
        self.0
    }
}

/// Ephemeral slot holding the last-visit timestamp.
pub trait SessionStore {
    fn last_visit_ms(&self) -> Option<i64>;
    fn record_visit_ms(&self, now_ms: i64);
}

/// Fixed-name slot in the temp directory. Shared between instances, which
/// is acceptable: concurrent dashboards sharing one visit clock only makes
/// the heuristic more eager to clear.
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn shared_slot() -> Self {
        Self::new(std::env::temp_dir().join("screener_last_visit"))
    }
}

impl SessionStore for FileSessionStore {
    fn last_visit_ms(&self) -> Option<i64> {
        let content = fs::read_to_string(&self.path).ok()?;
        content.trim().parse().ok()
    }

    fn record_visit_ms(&self, now_ms: i64) {
        if let Err(err) = fs::write(&self.path, now_ms.to_string()) {
            engine_warn!("Failed to record visit timestamp at {:?}: {}", self.path, err);
        }
    }
}

/// Last-visit heuristic: no recorded visit, or one too long ago, reads as a
/// cold start. Probing always refreshes the timestamp.
pub struct VisitGap<'a> {
    store: &'a dyn SessionStore,
    max_gap_ms: i64,
}

impl<'a> VisitGap<'a> {
    pub fn new(store: &'a dyn SessionStore, max_gap_ms: i64) -> Self {
        Self { store, max_gap_ms }
    }

    fn probe_at(&self, now_ms: i64) -> bool {
        let last = self.store.last_visit_ms();
        self.store.record_visit_ms(now_ms);
        match last {
            None => true,
            Some(previous) => now_ms.saturating_sub(previous) > self.max_gap_ms,
        }
    }
}

impl ColdStartSignal for VisitGap<'_> {
    fn probe(&self) -> Option<bool> {
        Some(self.probe_at(Utc::now().timestamp_millis()))
    }
}

/// Run the strategies in order; the first decisive one wins. With nothing
/// decisive the draft is treated as stale.
pub fn was_cold_start(signals: &[&dyn ColdStartSignal]) -> bool {
    for signal in signals {
        if let Some(cold) = signal.probe() {
            return cold;
        }
    }
    true
}
