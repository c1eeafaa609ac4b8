//! Per-locale merged bundle views for the never-expire cache regime

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::debug;

use crate::bundle::{now_millis, BundleCache, BundleEntry};
use crate::chain::FilenameChains;
use crate::locale::LocaleId;

/// Cache of flattened per-locale views across the whole basename search
/// path
///
/// Only consulted when bundles never expire, so a view is computed once
/// per locale and kept forever. The view is a synthetic [`BundleEntry`]
/// and therefore carries its own compiled-pattern memo exactly like a
/// loaded bundle.
pub struct MergedViews {
    views: Mutex<HashMap<LocaleId, Arc<BundleEntry>>>,
}

impl MergedViews {
    /// Create an empty view cache
    pub fn new() -> Self {
        Self {
            views: Mutex::new(HashMap::new()),
        }
    }

    /// Merged entry for a locale, building it on first access
    ///
    /// Basenames are overlaid first to last so later basenames win on
    /// overlapping codes; within one basename the chain is applied bare
    /// basename first and most specific filename last, so specific entries
    /// override general ones. The build runs under this cache's lock, so
    /// concurrent first accesses for one locale cannot produce diverging
    /// views.
    pub fn view(
        &self,
        locale: &LocaleId,
        basenames: &[String],
        chains: &FilenameChains,
        bundles: &BundleCache,
    ) -> Arc<BundleEntry> {
        let mut views = self.views.lock();
        if let Some(view) = views.get(locale) {
            return Arc::clone(view);
        }

        let mut merged = HashMap::new();
        for basename in basenames {
            let chain = chains.chain(basename, locale);
            for filename in chain.iter().rev() {
                let entry = bundles.get(filename);
                for (code, template) in entry.values() {
                    merged.insert(code.clone(), template.clone());
                }
            }
        }
        debug!(
            "Built merged view for locale '{}' with {} entries",
            locale,
            merged.len()
        );
        let view = Arc::new(BundleEntry::merged(merged, now_millis()));
        views.insert(locale.clone(), Arc::clone(&view));
        view
    }
}

impl Default for MergedViews {
    fn default() -> Self {
        Self::new()
    }
}
