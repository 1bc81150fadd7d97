use std::sync::Arc;
use std::time::{Duration, Instant};

use super::loader::{load_table, LoadError, TableSource};
use super::model::TargetTable;

/// Outcome of the last load, shared read-only with the UI.
pub type LoadResult = Result<Arc<TargetTable>, LoadError>;

struct Entry {
    value: LoadResult,
    loaded_at: Instant,
}

// ---------------------------------------------------------------------------
// TableCache – time-bounded cache of the loaded sheet
// ---------------------------------------------------------------------------

/// Holds the last load result for `ttl`. Failures are cached like successes
/// so an unreachable source is retried at most once per TTL.
pub struct TableCache {
    source: Box<dyn TableSource>,
    ttl: Duration,
    entry: Option<Entry>,
}

impl TableCache {
    pub fn new(source: Box<dyn TableSource>, ttl: Duration) -> Self {
        Self {
            source,
            ttl,
            entry: None,
        }
    }

    /// Return the cached result, reloading when it is missing or stale.
    pub fn get(&mut self) -> LoadResult {
        if let Some(entry) = &self.entry {
            if entry.loaded_at.elapsed() < self.ttl {
                return entry.value.clone();
            }
            log::debug!("cached table expired after {:?}", entry.loaded_at.elapsed());
        }

        let value = match load_table(self.source.as_ref()) {
            Ok(table) => {
                log::info!(
                    "Loaded {} rows ({} issuers) from {}",
                    table.len(),
                    table.issuers.len(),
                    self.source.describe()
                );
                if table.coerced_cells > 0 {
                    log::warn!("{} numeric cells could not be parsed", table.coerced_cells);
                }
                Ok(Arc::new(table))
            }
            Err(e) => {
                log::error!("Failed to load {}: {e}", self.source.describe());
                Err(e)
            }
        };

        // Replace wholesale; readers holding the old Arc keep a consistent table.
        self.entry = Some(Entry {
            value: value.clone(),
            loaded_at: Instant::now(),
        });
        value
    }

    /// Drop the cached result so the next [`get`](Self::get) reloads.
    pub fn invalidate(&mut self) {
        self.entry = None;
    }

    /// Age of the cached result, if any.
    pub fn age(&self) -> Option<Duration> {
        self.entry.as_ref().map(|e| e.loaded_at.elapsed())
    }

    /// Time left before the cached result goes stale.
    pub fn expires_in(&self) -> Option<Duration> {
        self.age().map(|age| self.ttl.saturating_sub(age))
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }
}
