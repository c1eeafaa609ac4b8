//! Bundle cache with timed staleness and per-entry pattern memoization

use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use once_cell::sync::Lazy;
use parking_lot::Mutex;
use tracing::{debug, warn};

use crate::loader::ResourceLoader;
use crate::locale::LocaleId;
use crate::pattern::CompiledPattern;

/// Refresh timestamp sentinel meaning "never re-check"
const REFRESH_NEVER: i64 = -1;

static CLOCK_ANCHOR: Lazy<Instant> = Lazy::new(Instant::now);

/// Monotonic milliseconds since the process clock anchor
pub(crate) fn now_millis() -> i64 {
    CLOCK_ANCHOR.elapsed().as_millis() as i64
}

/// One filename's loaded bundle plus its compiled-pattern memo
///
/// The value map and load timestamp are immutable once constructed; a
/// replacement load builds a whole new entry. Only the refresh timestamp
/// is re-armed in place, which lets a failed reload keep serving the old
/// content without rebuilding it.
#[derive(Debug)]
pub struct BundleEntry {
    values: HashMap<String, String>,
    load_timestamp: i64,
    refresh_timestamp: AtomicI64,
    /// Compiled patterns per message code, then per locale
    formats: Mutex<HashMap<String, HashMap<LocaleId, Arc<CompiledPattern>>>>,
}

impl BundleEntry {
    fn new(values: HashMap<String, String>, load_timestamp: i64, refresh_timestamp: i64) -> Self {
        Self {
            values,
            load_timestamp,
            refresh_timestamp: AtomicI64::new(refresh_timestamp),
            formats: Mutex::new(HashMap::new()),
        }
    }

    /// Synthetic entry for a merged per-locale view, cached forever
    pub(crate) fn merged(values: HashMap<String, String>, now: i64) -> Self {
        Self::new(values, now, REFRESH_NEVER)
    }

    /// Raw template string for a code, if this bundle defines it
    pub fn value(&self, code: &str) -> Option<&str> {
        self.values.get(code).map(|value| value.as_str())
    }

    /// All entries in this bundle
    pub fn values(&self) -> &HashMap<String, String> {
        &self.values
    }

    /// Monotonic milliseconds at which this content was loaded
    pub fn load_timestamp(&self) -> i64 {
        self.load_timestamp
    }

    fn refresh_timestamp(&self) -> i64 {
        self.refresh_timestamp.load(Ordering::Acquire)
    }

    fn mark_refreshed(&self, timestamp: i64) {
        self.refresh_timestamp.store(timestamp, Ordering::Release);
    }

    /// Compiled pattern for a code under a locale, compiling on first use
    ///
    /// Returns `None` when the code is absent from this bundle, which is
    /// distinct from a compiled-but-empty template.
    pub fn compiled_pattern(&self, code: &str, locale: &LocaleId) -> Option<Arc<CompiledPattern>> {
        let template = self.values.get(code)?;
        let mut formats = self.formats.lock();
        let per_locale = formats.entry(code.to_string()).or_default();
        if let Some(pattern) = per_locale.get(locale) {
            return Some(Arc::clone(pattern));
        }
        let pattern = Arc::new(CompiledPattern::compile(template));
        per_locale.insert(locale.clone(), Arc::clone(&pattern));
        Some(pattern)
    }
}

/// Monotonic counters describing bundle cache behavior
#[derive(Debug, Default)]
pub struct CacheStats {
    pub hits: AtomicU64,
    pub misses: AtomicU64,
    pub reloads: AtomicU64,
    pub failed_reloads: AtomicU64,
}

impl CacheStats {
    pub fn record_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_reload(&self) {
        self.reloads.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_failed_reload(&self) {
        self.failed_reloads.fetch_add(1, Ordering::Relaxed);
    }

    pub fn hit_rate(&self) -> f64 {
        let hits = self.hits.load(Ordering::Relaxed) as f64;
        let total = hits + self.misses.load(Ordering::Relaxed) as f64;
        if total > 0.0 {
            hits / total
        } else {
            0.0
        }
    }

    pub fn get_stats(&self) -> HashMap<String, u64> {
        let mut stats = HashMap::new();
        stats.insert("hits".to_string(), self.hits.load(Ordering::Relaxed));
        stats.insert("misses".to_string(), self.misses.load(Ordering::Relaxed));
        stats.insert("reloads".to_string(), self.reloads.load(Ordering::Relaxed));
        stats.insert(
            "failed_reloads".to_string(),
            self.failed_reloads.load(Ordering::Relaxed),
        );
        stats
    }
}

/// Per-filename bundle store owning the reload-on-staleness policy
///
/// With no cache duration an entry, once loaded, is never re-checked. With
/// a duration, an entry is stale once more than the duration has passed
/// since its last validity check; staleness triggers a reload through the
/// injected loader under this cache's lock, so concurrent lookups of one
/// filename never race two reloads against each other.
pub struct BundleCache {
    loader: Arc<dyn ResourceLoader>,
    cache_duration: Option<Duration>,
    entries: Mutex<HashMap<String, Arc<BundleEntry>>>,
    stats: CacheStats,
}

impl BundleCache {
    /// Create a cache over the given loader and refresh regime
    pub fn new(loader: Arc<dyn ResourceLoader>, cache_duration: Option<Duration>) -> Self {
        Self {
            loader,
            cache_duration,
            entries: Mutex::new(HashMap::new()),
            stats: CacheStats::default(),
        }
    }

    /// Cache regime: `None` means entries never expire once loaded
    pub fn cache_duration(&self) -> Option<Duration> {
        self.cache_duration
    }

    /// Counters for hits, misses and reload outcomes
    pub fn stats(&self) -> &CacheStats {
        &self.stats
    }

    /// Current entry for a filename, reloading first when the entry is
    /// missing or its validity window has lapsed
    ///
    /// A failed reload keeps the previous content in place and re-arms the
    /// validity window so the loader is not retried on every lookup. A
    /// filename that has never loaded successfully is cached as an empty
    /// entry the same way.
    pub fn get(&self, filename: &str) -> Arc<BundleEntry> {
        let mut entries = self.entries.lock();
        let now = now_millis();
        if let Some(entry) = entries.get(filename) {
            if self.is_fresh(entry, now) {
                self.stats.record_hit();
                return Arc::clone(entry);
            }
        }
        self.stats.record_miss();
        let refreshed = self.refresh(filename, entries.get(filename), now);
        entries.insert(filename.to_string(), Arc::clone(&refreshed));
        refreshed
    }

    fn is_fresh(&self, entry: &BundleEntry, now: i64) -> bool {
        let refreshed = entry.refresh_timestamp();
        if refreshed == REFRESH_NEVER {
            return true;
        }
        match self.cache_duration {
            None => true,
            Some(window) => now - refreshed <= window.as_millis() as i64,
        }
    }

    fn refresh(
        &self,
        filename: &str,
        previous: Option<&Arc<BundleEntry>>,
        now: i64,
    ) -> Arc<BundleEntry> {
        let refresh_timestamp = match self.cache_duration {
            None => REFRESH_NEVER,
            Some(_) => now,
        };
        match self.loader.load(filename) {
            Ok(values) => {
                self.stats.record_reload();
                debug!("Loaded bundle '{}' with {} entries", filename, values.len());
                Arc::new(BundleEntry::new(values, now, refresh_timestamp))
            }
            Err(error) => {
                self.stats.record_failed_reload();
                match previous {
                    Some(entry) => {
                        warn!(
                            "Could not reload bundle '{}', keeping previous content: {}",
                            filename, error
                        );
                        entry.mark_refreshed(refresh_timestamp);
                        Arc::clone(entry)
                    }
                    None => {
                        debug!("No bundle found for '{}': {}", filename, error);
                        Arc::new(BundleEntry::new(HashMap::new(), now, refresh_timestamp))
                    }
                }
            }
        }
    }
}
