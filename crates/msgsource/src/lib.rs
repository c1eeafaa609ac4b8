//! Locale-aware message resolution over layered resource bundles
//!
//! This crate maps message codes to localized text. Messages live in
//! bundles addressed by basename and locale suffix (`messages_en_US`,
//! `messages_en`, `messages`), loaded through a pluggable
//! [`ResourceLoader`] and cached with an optional freshness window.
//! Templates carry positional `{0}`-style placeholders rendered by a
//! small pattern engine.
//!
//! Features:
//! - Candidate filename chains per locale with fallback to a default
//!   locale, where later basenames override earlier ones
//! - Bundle caching with never-expire and timed regimes, serving stale
//!   content when a reload fails
//! - Per-locale merged views in the never-expire regime
//! - Common messages, parent resolver chaining and a code-as-default
//!   fallback policy
//! - Resolvable arguments that are themselves resolved before the
//!   enclosing template is rendered
//!
//! # Example
//!
//! ```
//! use msgsource::{LocaleId, MessageResolver, StaticLoader};
//!
//! let loader = StaticLoader::new()
//!     .with_bundle("messages_en", [("label.greeting", "Hello {0}")]);
//! let resolver = MessageResolver::builder()
//!     .basename("messages")
//!     .loader(loader)
//!     .build();
//!
//! let text = resolver.resolve_or_default(
//!     "label.greeting",
//!     &["Ann".into()],
//!     None,
//!     &LocaleId::from("en"),
//! );
//! assert_eq!(text, "Hello Ann");
//! ```
//!
//! Filesystem-backed `.properties` loading lives in the companion
//! `msgsource-fs` crate.

pub mod bundle;
pub mod chain;
pub mod error;
pub mod loader;
pub mod locale;
pub mod merge;
pub mod pattern;
pub mod resolvable;
pub mod resolver;

pub use bundle::{BundleCache, BundleEntry, CacheStats};
pub use chain::FilenameChains;
pub use error::{LoadError, LoadResult, MessageNotFound};
pub use loader::{ResourceLoader, StaticLoader};
pub use locale::LocaleId;
pub use merge::MergedViews;
pub use pattern::CompiledPattern;
pub use resolvable::{MessageArg, MessageResolvable};
pub use resolver::{MessageResolver, MessageResolverBuilder};
