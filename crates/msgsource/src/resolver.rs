//! Message resolution across bundles, common messages and parent resolvers

use std::collections::HashMap;
use std::sync::{Arc, Weak};
use std::time::Duration;

use parking_lot::Mutex;
use tracing::{debug, info};

use crate::bundle::{BundleCache, CacheStats};
use crate::chain::FilenameChains;
use crate::error::MessageNotFound;
use crate::loader::{ResourceLoader, StaticLoader};
use crate::locale::LocaleId;
use crate::merge::MergedViews;
use crate::pattern::CompiledPattern;
use crate::resolvable::{MessageArg, MessageResolvable};

/// Resolves message codes to localized text
///
/// Lookups walk the configured basenames from last to first, and within
/// each basename the candidate filename chain from most specific to most
/// general, so a later basename beats an earlier one and a specific bundle
/// beats a general one. On a miss the locale-independent common messages
/// are consulted, then the parent resolver, then the configured fallback
/// policy.
///
/// A resolver is immutable after construction and safe to share across
/// threads. Build one with [`MessageResolver::builder`].
pub struct MessageResolver {
    basenames: Vec<String>,
    default_locale: LocaleId,
    use_code_as_default: bool,
    always_use_patterns: bool,
    common_messages: HashMap<String, String>,
    /// Compiled patterns for common messages and rendered defaults,
    /// keyed by template text rather than code
    common_formats: Mutex<HashMap<String, HashMap<LocaleId, Arc<CompiledPattern>>>>,
    parent: Option<Weak<MessageResolver>>,
    chains: FilenameChains,
    bundles: BundleCache,
    merged: MergedViews,
}

impl MessageResolver {
    /// Start configuring a resolver
    pub fn builder() -> MessageResolverBuilder {
        MessageResolverBuilder::new()
    }

    /// Resolve a code, falling back to the given default text
    ///
    /// Never fails: tries the bundle search path, the common messages and
    /// the parent chain, then renders the explicit default if one was
    /// given, then applies the code-as-default policy, and finally returns
    /// an empty string.
    pub fn resolve_or_default(
        &self,
        code: &str,
        args: &[MessageArg],
        default: Option<&str>,
        locale: &LocaleId,
    ) -> String {
        if let Some(message) = self.resolve_internal(code, args, locale) {
            return message;
        }
        if default.is_none() {
            if let Some(fallback) = self.default_for_code(code) {
                return fallback;
            }
        }
        match default {
            Some(text) => self.format_message(text, args, locale),
            None => String::new(),
        }
    }

    /// Resolve a code, failing when it cannot be resolved
    ///
    /// The code-as-default policy still applies and pre-empts the failure.
    pub fn resolve(
        &self,
        code: &str,
        args: &[MessageArg],
        locale: &LocaleId,
    ) -> Result<String, MessageNotFound> {
        if let Some(message) = self.resolve_internal(code, args, locale) {
            return Ok(message);
        }
        if let Some(fallback) = self.default_for_code(code) {
            return Ok(fallback);
        }
        Err(MessageNotFound::new(code, locale.clone()))
    }

    /// Resolve a set of candidate codes as a unit
    ///
    /// Candidates are tried in order and the first resolving one wins,
    /// then the embedded default applies, then the code-as-default policy
    /// echoes the first candidate. A failure carries the last candidate
    /// code, or an empty code when the resolvable has none.
    pub fn resolve_resolvable(
        &self,
        resolvable: &MessageResolvable,
        locale: &LocaleId,
    ) -> Result<String, MessageNotFound> {
        for code in resolvable.candidate_codes() {
            if let Some(message) = self.resolve_internal(code, resolvable.args(), locale) {
                return Ok(message);
            }
        }
        if let Some(default) = resolvable.default_message() {
            return Ok(self.format_message(default, resolvable.args(), locale));
        }
        if let Some(first) = resolvable.first_code() {
            if let Some(fallback) = self.default_for_code(first) {
                return Ok(fallback);
            }
        }
        Err(MessageNotFound::new(
            resolvable.last_code().unwrap_or_default(),
            locale.clone(),
        ))
    }

    /// Whether the code resolves through bundles, common messages or the
    /// parent chain, with no default or fallback policy applied
    pub fn contains(&self, code: &str, locale: &LocaleId) -> bool {
        if self.resolve_raw(code, locale).is_some() {
            return true;
        }
        if self.common_messages.contains_key(code) {
            return true;
        }
        match self.parent() {
            Some(parent) => parent.contains(code, locale),
            None => false,
        }
    }

    /// Flattened code-to-template table visible for a locale across the
    /// whole basename search path
    ///
    /// Local bundles only; common messages and the parent chain do not
    /// contribute. In the never-expire regime this is served from the
    /// merged view cache, otherwise it is computed from the current cache
    /// contents on every call.
    pub fn all_messages(&self, locale: &LocaleId) -> HashMap<String, String> {
        if self.bundles.cache_duration().is_none() {
            let view = self
                .merged
                .view(locale, &self.basenames, &self.chains, &self.bundles);
            return view.values().clone();
        }
        let mut merged = HashMap::new();
        for basename in &self.basenames {
            let chain = self.chains.chain(basename, locale);
            for filename in chain.iter().rev() {
                let entry = self.bundles.get(filename);
                for (code, template) in entry.values() {
                    merged.insert(code.clone(), template.clone());
                }
            }
        }
        merged
    }

    /// Bundle cache counters for this resolver
    pub fn stats(&self) -> &CacheStats {
        self.bundles.stats()
    }

    /// Locale used for fallback chains when the requested one misses
    pub fn default_locale(&self) -> &LocaleId {
        &self.default_locale
    }

    /// Configured basenames in search-path order, highest priority last
    pub fn basenames(&self) -> &[String] {
        &self.basenames
    }

    /// Resolve without applying any default or fallback policy
    ///
    /// With no arguments and pattern formatting not forced, the raw
    /// template string is returned verbatim without compiling it, so
    /// stray braces in argument-free messages survive untouched.
    fn resolve_internal(&self, code: &str, args: &[MessageArg], locale: &LocaleId) -> Option<String> {
        if !self.always_use_patterns && args.is_empty() {
            if let Some(message) = self.resolve_raw(code, locale) {
                return Some(message);
            }
            if let Some(common) = self.common_messages.get(code) {
                return Some(self.format_message(common, args, locale));
            }
            return self.resolve_from_parent(code, args, locale);
        }

        // Resolve arguments eagerly so a message defined in a parent still
        // formats with arguments resolvable only in this resolver
        let resolved = self.resolve_args(args, locale);
        if let Some(pattern) = self.resolve_pattern(code, locale) {
            return Some(pattern.render(&resolved));
        }
        if let Some(common) = self.common_messages.get(code) {
            return Some(self.format_message(common, &resolved, locale));
        }
        self.resolve_from_parent(code, &resolved, locale)
    }

    /// Raw template lookup across the search path
    fn resolve_raw(&self, code: &str, locale: &LocaleId) -> Option<String> {
        if self.bundles.cache_duration().is_none() {
            let view = self
                .merged
                .view(locale, &self.basenames, &self.chains, &self.bundles);
            return view.value(code).map(|value| value.to_string());
        }
        for basename in self.basenames.iter().rev() {
            let chain = self.chains.chain(basename, locale);
            for filename in chain.iter() {
                let entry = self.bundles.get(filename);
                if let Some(value) = entry.value(code) {
                    return Some(value.to_string());
                }
            }
        }
        None
    }

    /// Compiled-pattern lookup across the search path
    fn resolve_pattern(&self, code: &str, locale: &LocaleId) -> Option<Arc<CompiledPattern>> {
        if self.bundles.cache_duration().is_none() {
            let view = self
                .merged
                .view(locale, &self.basenames, &self.chains, &self.bundles);
            return view.compiled_pattern(code, locale);
        }
        for basename in self.basenames.iter().rev() {
            let chain = self.chains.chain(basename, locale);
            for filename in chain.iter() {
                let entry = self.bundles.get(filename);
                if let Some(pattern) = entry.compiled_pattern(code, locale) {
                    return Some(pattern);
                }
            }
        }
        None
    }

    /// Replace resolvable arguments with their resolved text
    ///
    /// Argument resolution never fails: a resolvable that cannot be
    /// resolved degrades to its last candidate code.
    fn resolve_args(&self, args: &[MessageArg], locale: &LocaleId) -> Vec<MessageArg> {
        args.iter()
            .map(|arg| match arg {
                MessageArg::Resolvable(resolvable) => {
                    let resolved = match self.resolve_resolvable(resolvable, locale) {
                        Ok(message) => message,
                        Err(not_found) => not_found.code,
                    };
                    MessageArg::Str(resolved)
                }
                other => other.clone(),
            })
            .collect()
    }

    /// Format a template that lives outside the bundles, such as a common
    /// message or an explicit default
    ///
    /// With no arguments and pattern formatting not forced the template is
    /// returned verbatim. Compiled patterns are memoized per template text
    /// and locale.
    fn format_message(&self, template: &str, args: &[MessageArg], locale: &LocaleId) -> String {
        if !self.always_use_patterns && args.is_empty() {
            return template.to_string();
        }
        let pattern = {
            let mut formats = self.common_formats.lock();
            let per_locale = formats.entry(template.to_string()).or_default();
            match per_locale.get(locale) {
                Some(pattern) => Arc::clone(pattern),
                None => {
                    let pattern = Arc::new(CompiledPattern::compile(template));
                    per_locale.insert(locale.clone(), Arc::clone(&pattern));
                    pattern
                }
            }
        };
        let resolved = self.resolve_args(args, locale);
        pattern.render(&resolved)
    }

    /// Delegate to the parent's internal lookup, skipping the parent's
    /// own code-as-default policy
    fn resolve_from_parent(
        &self,
        code: &str,
        args: &[MessageArg],
        locale: &LocaleId,
    ) -> Option<String> {
        let parent = self.parent()?;
        debug!("Delegating code '{}' to parent resolver", code);
        parent.resolve_internal(code, args, locale)
    }

    fn parent(&self) -> Option<Arc<MessageResolver>> {
        self.parent.as_ref().and_then(Weak::upgrade)
    }

    fn default_for_code(&self, code: &str) -> Option<String> {
        if self.use_code_as_default {
            Some(code.to_string())
        } else {
            None
        }
    }
}

/// Builder for [`MessageResolver`]
///
/// Configuration is consumed at construction time only; the resolver does
/// not support mutating it afterwards.
pub struct MessageResolverBuilder {
    basenames: Vec<String>,
    loader: Arc<dyn ResourceLoader>,
    cache_duration: Option<Duration>,
    default_locale: LocaleId,
    fallback_to_default_locale: bool,
    use_code_as_default: bool,
    always_use_patterns: bool,
    common_messages: HashMap<String, String>,
    parent: Option<Weak<MessageResolver>>,
}

impl MessageResolverBuilder {
    fn new() -> Self {
        Self {
            basenames: Vec::new(),
            loader: Arc::new(StaticLoader::new()),
            cache_duration: None,
            default_locale: LocaleId::new("en", "", ""),
            fallback_to_default_locale: true,
            use_code_as_default: false,
            always_use_patterns: false,
            common_messages: HashMap::new(),
            parent: None,
        }
    }

    /// Append one basename to the search path
    ///
    /// Later basenames override earlier ones on overlapping codes.
    pub fn basename(mut self, basename: impl Into<String>) -> Self {
        self.basenames.push(basename.into());
        self
    }

    /// Append several basenames to the search path
    pub fn basenames<I, S>(mut self, basenames: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.basenames.extend(basenames.into_iter().map(Into::into));
        self
    }

    /// Loader the bundle cache reads resources through
    pub fn loader(mut self, loader: impl ResourceLoader + 'static) -> Self {
        self.loader = Arc::new(loader);
        self
    }

    /// How long a loaded bundle stays valid before it is re-checked
    ///
    /// The default, `None`, caches forever and enables the merged
    /// per-locale views.
    pub fn cache_duration(mut self, duration: Option<Duration>) -> Self {
        self.cache_duration = duration;
        self
    }

    /// Locale whose candidates back up every other locale's chain
    pub fn default_locale(mut self, locale: LocaleId) -> Self {
        self.default_locale = locale;
        self
    }

    /// Whether chains for non-default locales fall back to the default
    /// locale's candidates. Enabled by default.
    pub fn fallback_to_default_locale(mut self, fallback: bool) -> Self {
        self.fallback_to_default_locale = fallback;
        self
    }

    /// Return the code itself instead of failing for unresolvable codes
    pub fn use_code_as_default(mut self, use_code: bool) -> Self {
        self.use_code_as_default = use_code;
        self
    }

    /// Always run templates through the pattern engine, even without
    /// arguments
    pub fn always_use_patterns(mut self, always: bool) -> Self {
        self.always_use_patterns = always;
        self
    }

    /// Locale-independent common messages consulted after the bundles
    pub fn common_messages<I, K, V>(mut self, messages: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.common_messages = messages
            .into_iter()
            .map(|(key, value)| (key.into(), value.into()))
            .collect();
        self
    }

    /// Parent resolver consulted when this one cannot resolve a code
    ///
    /// The reference is stored weakly; callers keep the parent alive from
    /// outside, and a dropped parent behaves as no parent. A resolver
    /// chain must not form a cycle. Do not enable the code-as-default
    /// policy on a resolver used as a parent: it would short-circuit the
    /// child's remaining candidate codes.
    pub fn parent(mut self, parent: &Arc<MessageResolver>) -> Self {
        self.parent = Some(Arc::downgrade(parent));
        self
    }

    /// Build the resolver
    pub fn build(self) -> MessageResolver {
        info!(
            "Message resolver initialized with basenames {:?} and default locale '{}'",
            self.basenames, self.default_locale
        );
        let chains = FilenameChains::new(self.fallback_to_default_locale, self.default_locale.clone());
        let bundles = BundleCache::new(self.loader, self.cache_duration);
        MessageResolver {
            basenames: self.basenames,
            default_locale: self.default_locale,
            use_code_as_default: self.use_code_as_default,
            always_use_patterns: self.always_use_patterns,
            common_messages: self.common_messages,
            common_formats: Mutex::new(HashMap::new()),
            parent: self.parent,
            chains,
            bundles,
            merged: MergedViews::new(),
        }
    }
}

impl Default for MessageResolverBuilder {
    fn default() -> Self {
        Self::new()
    }
}
