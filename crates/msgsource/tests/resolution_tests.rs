//! End-to-end resolution scenarios exercising the public API

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use parking_lot::Mutex;
use proptest::prelude::*;

use msgsource::{
    FilenameChains, LoadError, LoadResult, LocaleId, MessageArg, MessageResolvable,
    MessageResolver, ResourceLoader, StaticLoader,
};

/// Counts loads per filename over a fixed bundle table
struct CountingLoader {
    counts: Mutex<HashMap<String, usize>>,
    inner: StaticLoader,
}

impl CountingLoader {
    fn new(inner: StaticLoader) -> Self {
        Self {
            counts: Mutex::new(HashMap::new()),
            inner,
        }
    }

    fn count(&self, name: &str) -> usize {
        self.counts.lock().get(name).copied().unwrap_or(0)
    }
}

impl ResourceLoader for CountingLoader {
    fn load(&self, name: &str) -> LoadResult<HashMap<String, String>> {
        *self.counts.lock().entry(name.to_string()).or_insert(0) += 1;
        self.inner.load(name)
    }
}

/// Loader whose content can be replaced while a resolver is using it
struct SwappingLoader {
    bundles: Mutex<HashMap<String, HashMap<String, String>>>,
}

impl SwappingLoader {
    fn new() -> Self {
        Self {
            bundles: Mutex::new(HashMap::new()),
        }
    }

    fn set(&self, name: &str, entries: &[(&str, &str)]) {
        self.bundles.lock().insert(
            name.to_string(),
            entries
                .iter()
                .map(|(key, value)| (key.to_string(), value.to_string()))
                .collect(),
        );
    }
}

impl ResourceLoader for SwappingLoader {
    fn load(&self, name: &str) -> LoadResult<HashMap<String, String>> {
        match self.bundles.lock().get(name) {
            Some(entries) => Ok(entries.clone()),
            None => Err(LoadError::unavailable(name)),
        }
    }
}

/// Loader that starts failing after a number of successful calls
struct FlakyLoader {
    calls: AtomicUsize,
    allowed: usize,
    inner: StaticLoader,
}

impl FlakyLoader {
    fn new(inner: StaticLoader, allowed: usize) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            allowed,
            inner,
        }
    }
}

impl ResourceLoader for FlakyLoader {
    fn load(&self, name: &str) -> LoadResult<HashMap<String, String>> {
        if self.calls.fetch_add(1, Ordering::SeqCst) >= self.allowed {
            return Err(LoadError::malformed(name, "backing store went away"));
        }
        self.inner.load(name)
    }
}

fn en() -> LocaleId {
    LocaleId::from("en")
}

fn en_us() -> LocaleId {
    LocaleId::from("en_US")
}

fn walk_fixture() -> StaticLoader {
    StaticLoader::new()
        .with_bundle("messages_en_US", [("label.other", "Other")])
        .with_bundle("messages_en", [("label.greeting", "Hello {0}")])
        .with_bundle("messages", [("label.greeting", "Base {0}"), ("label.base", "Base only")])
}

#[test]
fn test_locale_walk_prefers_most_specific_bundle() {
    // The never-expire and timed regimes take different code paths but
    // must agree on the outcome
    for cache_duration in [None, Some(Duration::from_secs(3600))] {
        let resolver = MessageResolver::builder()
            .basename("messages")
            .loader(walk_fixture())
            .cache_duration(cache_duration)
            .build();

        let text = resolver
            .resolve("label.greeting", &["Ann".into()], &en_us())
            .unwrap();
        assert_eq!(text, "Hello Ann");

        // Codes only the bare bundle defines still resolve
        assert_eq!(
            resolver.resolve("label.base", &[], &en_us()).unwrap(),
            "Base only"
        );
        assert_eq!(
            resolver.resolve("label.other", &[], &en_us()).unwrap(),
            "Other"
        );
    }
}

#[test]
fn test_later_basename_overrides_earlier() {
    let loader = StaticLoader::new()
        .with_bundle("app_en", [("title", "App"), ("app.only", "kept")])
        .with_bundle("overrides_en", [("title", "Override")]);

    for cache_duration in [None, Some(Duration::from_secs(3600))] {
        let resolver = MessageResolver::builder()
            .basenames(["app", "overrides"])
            .loader(loader.clone())
            .cache_duration(cache_duration)
            .build();

        assert_eq!(resolver.resolve("title", &[], &en()).unwrap(), "Override");
        assert_eq!(resolver.resolve("app.only", &[], &en()).unwrap(), "kept");
    }
}

#[test]
fn test_fallback_chain_with_parent_and_resolvable_args() {
    // German has no translations anywhere; everything is found through
    // the default-locale fallback, with the argument resolved in the
    // child and the template found in the parent
    let parent_loader =
        StaticLoader::new().with_bundle("parent_en", [("wrapped", "parent says {0}")]);
    let parent = Arc::new(
        MessageResolver::builder()
            .basename("parent")
            .loader(parent_loader)
            .build(),
    );

    let child_loader = StaticLoader::new().with_bundle("child_en", [("name", "Ann")]);
    let child = MessageResolver::builder()
        .basename("child")
        .loader(child_loader)
        .parent(&parent)
        .build();

    let arg = MessageArg::from(MessageResolvable::code("name"));
    let text = child.resolve("wrapped", &[arg], &LocaleId::from("de")).unwrap();
    assert_eq!(text, "parent says Ann");
}

#[test]
fn test_disabling_default_locale_fallback() {
    let loader = StaticLoader::new().with_bundle("messages_en", [("greeting", "Hello")]);

    let with_fallback = MessageResolver::builder()
        .basename("messages")
        .loader(loader.clone())
        .build();
    assert_eq!(
        with_fallback.resolve("greeting", &[], &LocaleId::from("fr")).unwrap(),
        "Hello"
    );

    let without_fallback = MessageResolver::builder()
        .basename("messages")
        .loader(loader)
        .fallback_to_default_locale(false)
        .build();
    assert!(without_fallback
        .resolve("greeting", &[], &LocaleId::from("fr"))
        .is_err());
}

#[test]
fn test_never_expire_regime_loads_each_filename_once() {
    let loader = Arc::new(CountingLoader::new(
        StaticLoader::new()
            .with_bundle("messages_en", [("greeting", "Hello")])
            .with_bundle("messages", [("farewell", "Bye")]),
    ));
    let resolver = MessageResolver::builder()
        .basename("messages")
        .loader(Arc::clone(&loader))
        .build();

    for _ in 0..5 {
        assert_eq!(resolver.resolve("greeting", &[], &en()).unwrap(), "Hello");
        assert_eq!(resolver.resolve("farewell", &[], &en()).unwrap(), "Bye");
        assert!(resolver.resolve("missing", &[], &en()).is_err());
    }
    let _ = resolver.all_messages(&en());

    assert_eq!(loader.count("messages_en"), 1);
    assert_eq!(loader.count("messages"), 1);
}

#[test]
fn test_concurrent_resolution_loads_each_filename_once() {
    // Both regimes must serialize the first load of a filename behind the
    // cache lock, with every racing caller agreeing on the rendered text
    for cache_duration in [None, Some(Duration::from_secs(3600))] {
        let loader = Arc::new(CountingLoader::new(
            StaticLoader::new().with_bundle("messages", [("app.title", "Tools for {0}")]),
        ));
        let resolver = Arc::new(
            MessageResolver::builder()
                .basename("messages")
                .loader(Arc::clone(&loader))
                .cache_duration(cache_duration)
                .build(),
        );

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let resolver = Arc::clone(&resolver);
                thread::spawn(move || {
                    resolver.resolve("app.title", &["Ann".into()], &en()).unwrap()
                })
            })
            .collect();
        for handle in handles {
            assert_eq!(handle.join().unwrap(), "Tools for Ann");
        }

        // messages_en has no bundle and is negatively cached; the bare
        // bundle satisfies every caller after a single load
        assert_eq!(loader.count("messages_en"), 1);
        assert_eq!(loader.count("messages"), 1);
    }
}

#[test]
fn test_timed_regime_picks_up_changed_content() {
    let loader = Arc::new(SwappingLoader::new());
    loader.set("messages_en", &[("status", "one")]);

    let resolver = MessageResolver::builder()
        .basename("messages")
        .loader(Arc::clone(&loader))
        .cache_duration(Some(Duration::from_millis(200)))
        .build();

    assert_eq!(resolver.resolve("status", &[], &en()).unwrap(), "one");

    loader.set("messages_en", &[("status", "two")]);
    assert_eq!(
        resolver.resolve("status", &[], &en()).unwrap(),
        "one",
        "content swap must stay invisible inside the validity window"
    );

    thread::sleep(Duration::from_millis(500));
    assert_eq!(resolver.resolve("status", &[], &en()).unwrap(), "two");
    assert_eq!(resolver.stats().reloads.load(Ordering::Relaxed), 2);
}

#[test]
fn test_timed_regime_serves_stale_content_on_failure() {
    let loader = FlakyLoader::new(
        StaticLoader::new().with_bundle("messages_en", [("status", "one")]),
        1,
    );
    let resolver = MessageResolver::builder()
        .basename("messages")
        .loader(loader)
        .cache_duration(Some(Duration::from_millis(100)))
        .build();

    assert_eq!(resolver.resolve("status", &[], &en()).unwrap(), "one");

    thread::sleep(Duration::from_millis(300));
    assert_eq!(
        resolver.resolve("status", &[], &en()).unwrap(),
        "one",
        "stale content must be served when the reload fails"
    );
    assert!(resolver.stats().failed_reloads.load(Ordering::Relaxed) >= 1);
}

#[test]
fn test_all_messages_spans_basenames_and_locales() {
    let loader = StaticLoader::new()
        .with_bundle("app", [("base.key", "base")])
        .with_bundle("app_de", [("title", "Der Titel")])
        .with_bundle("extra_de", [("title", "Override")]);
    let resolver = MessageResolver::builder()
        .basenames(["app", "extra"])
        .loader(loader)
        .build();

    let all = resolver.all_messages(&LocaleId::from("de"));
    assert_eq!(all.len(), 2);
    assert_eq!(all["base.key"], "base");
    assert_eq!(all["title"], "Override");
}

#[test]
fn test_code_fallback_policy_across_entry_points() {
    let resolver = MessageResolver::builder().use_code_as_default(true).build();
    let locale = en();

    assert_eq!(
        resolver.resolve_or_default("missing.code", &[], None, &locale),
        "missing.code"
    );
    assert_eq!(resolver.resolve("missing.code", &[], &locale).unwrap(), "missing.code");

    // For a resolvable the policy echoes the first candidate, while a
    // plain failure would have reported the last
    let resolvable = MessageResolvable::codes(["first.code", "last.code"]);
    assert_eq!(
        resolver.resolve_resolvable(&resolvable, &locale).unwrap(),
        "first.code"
    );
}

fn locale_strategy() -> impl Strategy<Value = LocaleId> {
    let language = prop_oneof![Just(String::new()), "[a-z]{2,3}"];
    let region = prop_oneof![Just(String::new()), "[A-Z]{2}"];
    let variant = prop_oneof![Just(String::new()), "[A-Za-z0-9]{1,8}"];
    (language, region, variant)
        .prop_map(|(language, region, variant)| LocaleId::new(&language, &region, &variant))
}

proptest! {
    #[test]
    fn prop_chain_ends_with_the_bare_basename(locale in locale_strategy()) {
        let chains = FilenameChains::new(true, LocaleId::from("en"));
        let chain = chains.chain("messages", &locale);
        prop_assert_eq!(chain.last().map(String::as_str), Some("messages"));
    }

    #[test]
    fn prop_chain_has_no_duplicates(locale in locale_strategy()) {
        let chains = FilenameChains::new(true, LocaleId::from("en"));
        let chain = chains.chain("messages", &locale);
        let unique: HashSet<&String> = chain.iter().collect();
        prop_assert_eq!(unique.len(), chain.len());
    }

    #[test]
    fn prop_every_candidate_extends_the_basename(locale in locale_strategy()) {
        let chains = FilenameChains::new(true, LocaleId::from("en"));
        let chain = chains.chain("messages", &locale);
        for name in chain.iter() {
            prop_assert!(name.starts_with("messages"));
        }
    }

    #[test]
    fn prop_fallback_adds_nothing_for_the_default_locale(locale in locale_strategy()) {
        let with_fallback = FilenameChains::new(true, locale.clone());
        let without_fallback = FilenameChains::new(false, locale.clone());
        let with_chain = with_fallback.chain("messages", &locale);
        let without_chain = without_fallback.chain("messages", &locale);
        prop_assert_eq!(with_chain.as_ref(), without_chain.as_ref());
    }
}
