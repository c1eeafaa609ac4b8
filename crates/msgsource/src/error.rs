//! Error types for resource loading and message resolution

use thiserror::Error;

use crate::locale::LocaleId;

/// Result type alias for resource loading operations
pub type LoadResult<T> = std::result::Result<T, LoadError>;

/// Errors produced by resource loaders
///
/// Both variants are recoverable from the resolver's point of view: a failed
/// load keeps the previously cached bundle content in place and degrades to
/// an empty bundle when nothing was ever loaded.
#[derive(Error, Debug)]
pub enum LoadError {
    /// The named resource could not be found or read
    #[error("Resource '{name}' unavailable")]
    Unavailable {
        name: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The resource was read but its contents could not be decoded or parsed
    #[error("Resource '{name}' malformed: {reason}")]
    Malformed { name: String, reason: String },
}

impl LoadError {
    /// Create an unavailable error without an underlying cause
    pub fn unavailable(name: impl Into<String>) -> Self {
        Self::Unavailable {
            name: name.into(),
            source: None,
        }
    }

    /// Create an unavailable error wrapping an underlying cause
    pub fn unavailable_with_source(
        name: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Unavailable {
            name: name.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a malformed-resource error
    pub fn malformed(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Malformed {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// Name of the resource the failure refers to
    pub fn resource_name(&self) -> &str {
        match self {
            Self::Unavailable { name, .. } | Self::Malformed { name, .. } => name,
        }
    }
}

/// A message code could not be resolved for a locale
///
/// Only the failing entry points produce this; the defaulting entry point
/// absorbs it and falls back to the supplied default text or the code
/// itself. For a resolvable with multiple candidate codes the error carries
/// the last candidate, not the first.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("No message found under code '{code}' for locale '{locale}'")]
pub struct MessageNotFound {
    /// The code that failed to resolve
    pub code: String,
    /// The locale the lookup ran under
    pub locale: LocaleId,
}

impl MessageNotFound {
    /// Create a not-found error for a code and locale
    pub fn new(code: impl Into<String>, locale: LocaleId) -> Self {
        Self {
            code: code.into(),
            locale,
        }
    }
}
