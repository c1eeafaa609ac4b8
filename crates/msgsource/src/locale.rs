//! Locale identifiers for bundle selection

use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use unic_langid::LanguageIdentifier;

/// A language/region/variant triple identifying a message locale
///
/// Components are normalized at construction: the language is lowercased,
/// the region uppercased and the variant kept verbatim. The string form
/// uses underscores (`en_US`, `en__POSIX`), which is also the spelling that
/// candidate bundle filenames are built from. Script subtags are not
/// represented.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LocaleId {
    language: String,
    region: String,
    variant: String,
}

impl LocaleId {
    /// Create a locale from language, region and variant parts
    pub fn new(language: &str, region: &str, variant: &str) -> Self {
        Self {
            language: language.trim().to_ascii_lowercase(),
            region: region.trim().to_ascii_uppercase(),
            variant: variant.trim().to_string(),
        }
    }

    /// Lowercased language component, empty for the root locale
    pub fn language(&self) -> &str {
        &self.language
    }

    /// Uppercased region component, possibly empty
    pub fn region(&self) -> &str {
        &self.region
    }

    /// Variant component, possibly empty
    pub fn variant(&self) -> &str {
        &self.variant
    }
}

impl fmt::Display for LocaleId {
    /// Underscore form mirroring the bundle filename suffix rules: the
    /// region separator appears whenever a region follows or a variant
    /// needs its position held, and a variant is only shown when a
    /// language or region is present.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let has_language = !self.language.is_empty();
        let has_region = !self.region.is_empty();
        let has_variant = !self.variant.is_empty();

        f.write_str(&self.language)?;
        if has_region || (has_language && has_variant) {
            write!(f, "_{}", self.region)?;
        }
        if has_variant && (has_language || has_region) {
            write!(f, "_{}", self.variant)?;
        }
        Ok(())
    }
}

impl From<&str> for LocaleId {
    /// Parse lenient `en_US_POSIX` or BCP 47 style `en-US` spellings.
    /// Unknown or empty input produces the root locale rather than failing.
    fn from(text: &str) -> Self {
        let mut parts = text.splitn(3, |c| c == '_' || c == '-');
        let language = parts.next().unwrap_or_default();
        let region = parts.next().unwrap_or_default();
        let variant = parts.next().unwrap_or_default();
        Self::new(language, region, variant)
    }
}

impl From<String> for LocaleId {
    fn from(text: String) -> Self {
        Self::from(text.as_str())
    }
}

impl FromStr for LocaleId {
    type Err = Infallible;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        Ok(Self::from(text))
    }
}

impl From<&LanguageIdentifier> for LocaleId {
    fn from(id: &LanguageIdentifier) -> Self {
        let language = id.language.as_str();
        let language = if language == "und" { "" } else { language };
        let region = id.region.map(|r| r.as_str().to_string()).unwrap_or_default();
        let variant = id
            .variants()
            .next()
            .map(|v| v.as_str().to_string())
            .unwrap_or_default();
        Self::new(language, &region, &variant)
    }
}

impl From<LanguageIdentifier> for LocaleId {
    fn from(id: LanguageIdentifier) -> Self {
        Self::from(&id)
    }
}
