//! Filesystem `.properties` backend for the msgsource resolver
//!
//! [`FsLoader`] reads `<basename><locale suffix>.properties` files from a
//! directory and plugs into `msgsource` as a
//! [`ResourceLoader`](msgsource::ResourceLoader):
//!
//! ```no_run
//! use msgsource::{LocaleId, MessageResolver};
//! use msgsource_fs::FsLoader;
//!
//! let resolver = MessageResolver::builder()
//!     .basename("messages")
//!     .loader(FsLoader::new("i18n"))
//!     .build();
//! let title = resolver.resolve_or_default("app.title", &[], None, &LocaleId::from("en_US"));
//! ```

pub mod loader;
pub mod properties;

pub use loader::{Encoding, FsLoader, PROPERTIES_SUFFIX};
pub use properties::PropertiesError;
