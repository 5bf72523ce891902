//! File-backed processed-entry cache with retention-based eviction

use crate::error::{CacheError, Result};
use crate::types::{CacheStats, ProcessedEntry};
use chrono::{DateTime, TimeDelta, Utc};
use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// How the backing store looked when the cache was opened
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// Store parsed; holds the number of entries loaded
    Loaded(usize),
    /// No store on disk
    Missing,
    /// Store unreadable or malformed; started empty
    Corrupt,
}

/// Mapping of entry id to [`ProcessedEntry`], persisted as one JSON file.
///
/// Expired entries are only removed by a write (`record`/`record_all`);
/// reads never evict. The store is assumed to be owned by a single process.
#[derive(Debug)]
pub struct ProcessedEntryCache {
    /// In-memory mapping of entry id to record
    entries: HashMap<String, ProcessedEntry>,
    /// Backing JSON file
    store_path: PathBuf,
    /// Maximum age before an entry is evicted
    retention: TimeDelta,
    load_outcome: LoadOutcome,
}

impl ProcessedEntryCache {
    /// Open the cache, loading whatever the store currently holds.
    ///
    /// A missing or corrupt store yields an empty cache. The only error is a
    /// retention period too large to represent.
    pub fn open(store_path: impl Into<PathBuf>, retention: Duration) -> Result<Self> {
        let retention =
            TimeDelta::from_std(retention).map_err(|_| CacheError::InvalidRetention(retention))?;
        let store_path = store_path.into();
        let (entries, load_outcome) = load_store(&store_path);

        Ok(Self {
            entries,
            store_path,
            retention,
            load_outcome,
        })
    }

    /// Whether `entry_id` has already been recorded
    pub fn is_processed(&self, entry_id: &str) -> bool {
        self.entries.contains_key(entry_id)
    }

    pub fn get(&self, entry_id: &str) -> Option<&ProcessedEntry> {
        self.entries.get(entry_id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn store_path(&self) -> &Path {
        &self.store_path
    }

    pub fn load_outcome(&self) -> LoadOutcome {
        self.load_outcome
    }

    /// Insert (or overwrite) an entry, evict expired entries, and rewrite the store.
    ///
    /// On a persist error the in-memory mapping keeps the mutation.
    pub fn record(&mut self, entry: ProcessedEntry) -> Result<()> {
        self.entries.insert(entry.entry_id.clone(), entry);
        self.evict_expired(Utc::now());
        self.save()
    }

    /// Insert a batch of entries with a single sweep and a single write
    pub fn record_all(&mut self, entries: impl IntoIterator<Item = ProcessedEntry>) -> Result<usize> {
        let mut inserted = 0;
        for entry in entries {
            self.entries.insert(entry.entry_id.clone(), entry);
            inserted += 1;
        }
        self.evict_expired(Utc::now());
        self.save()?;
        Ok(inserted)
    }

    /// Current counts: total, and entries processed within the last 24h / 7d
    pub fn stats(&self) -> CacheStats {
        self.stats_at(Utc::now())
    }

    fn stats_at(&self, now: DateTime<Utc>) -> CacheStats {
        let day_cutoff = now.checked_sub_signed(TimeDelta::hours(24));
        let week_cutoff = now.checked_sub_signed(TimeDelta::days(7));
        let within = |ts: DateTime<Utc>, cutoff: Option<DateTime<Utc>>| {
            cutoff.map_or(true, |cutoff| ts >= cutoff)
        };

        let mut stats = CacheStats {
            total: self.entries.len(),
            ..CacheStats::default()
        };
        // Unparsable timestamps are never counted as recent
        for ts in self.entries.values().filter_map(ProcessedEntry::timestamp) {
            if within(ts, day_cutoff) {
                stats.last_24h += 1;
            }
            if within(ts, week_cutoff) {
                stats.last_7d += 1;
            }
        }
        stats
    }

    /// Remove entries older than the retention period, and entries whose
    /// timestamp does not parse
    fn evict_expired(&mut self, now: DateTime<Utc>) {
        let cutoff = now.checked_sub_signed(self.retention);
        let before = self.entries.len();

        self.entries.retain(|_, entry| match (entry.timestamp(), cutoff) {
            (None, _) => false,
            (Some(_), None) => true,
            (Some(ts), Some(cutoff)) => ts >= cutoff,
        });

        let removed = before - self.entries.len();
        if removed > 0 {
            info!(removed, "Cleaned up expired cache entries");
        }
    }

    /// Replace the store with the full mapping
    fn save(&self) -> Result<()> {
        let data = serde_json::to_vec_pretty(&self.entries).map_err(|e| {
            error!(path = ?self.store_path, error = %e, "Could not serialize cache");
            CacheError::from(e)
        })?;
        let tmp_path = tmp_path(&self.store_path);

        let written =
            fs::write(&tmp_path, &data).and_then(|_| fs::rename(&tmp_path, &self.store_path));
        if let Err(source) = written {
            error!(path = ?self.store_path, error = %source, "Could not save cache");
            let _ = fs::remove_file(&tmp_path);
            return Err(CacheError::Persist {
                path: self.store_path.clone(),
                source,
            });
        }

        debug!(path = ?self.store_path, entries = self.entries.len(), "Saved cache");
        Ok(())
    }
}

fn load_store(path: &Path) -> (HashMap<String, ProcessedEntry>, LoadOutcome) {
    let raw = match fs::read(path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            debug!(path = ?path, "No cache file yet, starting empty");
            return (HashMap::new(), LoadOutcome::Missing);
        }
        Err(e) => {
            warn!(path = ?path, error = %e, "Could not read cache, starting empty");
            return (HashMap::new(), LoadOutcome::Corrupt);
        }
    };

    match serde_json::from_slice::<HashMap<String, ProcessedEntry>>(&raw) {
        Ok(entries) => {
            let count = entries.len();
            info!(path = ?path, count, "Loaded cache");
            (entries, LoadOutcome::Loaded(count))
        }
        Err(e) => {
            warn!(path = ?path, error = %e, "Could not parse cache, starting empty");
            (HashMap::new(), LoadOutcome::Corrupt)
        }
    }
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".tmp");
    PathBuf::from(name)
}
