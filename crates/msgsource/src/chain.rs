//! Candidate bundle filenames per basename and locale

use std::collections::HashMap;
use std::sync::Arc;

use dashmap::DashMap;

use crate::locale::LocaleId;

/// Computes and memoizes the ordered candidate filenames for a basename
/// and locale
///
/// Chains run most specific first and always end with the bare basename.
/// When fallback to the default locale is enabled and the requested locale
/// differs from it, the default locale's candidates are appended after the
/// exact-locale ones, skipping duplicates. The memo is never invalidated:
/// bundle content may change at runtime, the names never do.
#[derive(Debug)]
pub struct FilenameChains {
    fallback_to_default: bool,
    default_locale: LocaleId,
    memo: DashMap<String, HashMap<LocaleId, Arc<Vec<String>>>>,
}

impl FilenameChains {
    /// Create a chain calculator with the given fallback policy
    pub fn new(fallback_to_default: bool, default_locale: LocaleId) -> Self {
        Self {
            fallback_to_default,
            default_locale,
            memo: DashMap::new(),
        }
    }

    /// Candidate filenames for the basename under the locale
    pub fn chain(&self, basename: &str, locale: &LocaleId) -> Arc<Vec<String>> {
        if let Some(per_locale) = self.memo.get(basename) {
            if let Some(chain) = per_locale.get(locale) {
                return Arc::clone(chain);
            }
        }
        let chain = Arc::new(self.calculate(basename, locale));
        self.memo
            .entry(basename.to_string())
            .or_default()
            .insert(locale.clone(), Arc::clone(&chain));
        chain
    }

    fn calculate(&self, basename: &str, locale: &LocaleId) -> Vec<String> {
        let mut filenames = Self::filenames_for_locale(basename, locale);
        if self.fallback_to_default && locale != &self.default_locale {
            for fallback in Self::filenames_for_locale(basename, &self.default_locale) {
                if !filenames.contains(&fallback) {
                    filenames.push(fallback);
                }
            }
        }
        filenames.push(basename.to_string());
        filenames
    }

    /// Locale-specific candidates, most specific first
    ///
    /// Suffixes are built progressively, so an empty region with a present
    /// variant yields a double-underscore candidate such as `base_en__POSIX`,
    /// and a region without a language yields `base__US`. A variant alone
    /// contributes nothing.
    fn filenames_for_locale(basename: &str, locale: &LocaleId) -> Vec<String> {
        let mut result = Vec::with_capacity(3);
        let language = locale.language();
        let region = locale.region();
        let variant = locale.variant();

        let mut temp = String::from(basename);
        temp.push('_');
        if !language.is_empty() {
            temp.push_str(language);
            result.insert(0, temp.clone());
        }

        temp.push('_');
        if !region.is_empty() {
            temp.push_str(region);
            result.insert(0, temp.clone());
        }

        if !variant.is_empty() && (!language.is_empty() || !region.is_empty()) {
            temp.push('_');
            temp.push_str(variant);
            result.insert(0, temp.clone());
        }

        result
    }
}
