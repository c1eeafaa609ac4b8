//! Filesystem-backed resource loading

use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::{fmt, fs};

use tracing::debug;

use msgsource::{LoadError, LoadResult, ResourceLoader};

use crate::properties;

/// Extension appended to bundle filenames on disk
pub const PROPERTIES_SUFFIX: &str = ".properties";

/// Byte encoding of the properties files
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    Utf8,
    /// ISO-8859-1, the traditional properties encoding
    Latin1,
}

impl Default for Encoding {
    fn default() -> Self {
        Self::Utf8
    }
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Utf8 => f.write_str("UTF-8"),
            Self::Latin1 => f.write_str("ISO-8859-1"),
        }
    }
}

/// Loads `<name>.properties` files from a root directory
///
/// The resolver hands over fully expanded bundle filenames such as
/// `messages_en_US`; this loader appends the suffix and reads the file
/// under its root. A missing file is reported as unavailable, unreadable
/// bytes or bad escapes as malformed.
pub struct FsLoader {
    root: PathBuf,
    encoding: Encoding,
}

impl FsLoader {
    /// Loader over the given directory, expecting UTF-8 files
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            encoding: Encoding::default(),
        }
    }

    /// Use a different byte encoding
    pub fn with_encoding(mut self, encoding: Encoding) -> Self {
        self.encoding = encoding;
        self
    }

    /// Directory the properties files live under
    pub fn root(&self) -> &PathBuf {
        &self.root
    }

    fn decode(&self, name: &str, bytes: Vec<u8>) -> LoadResult<String> {
        match self.encoding {
            Encoding::Utf8 => String::from_utf8(bytes)
                .map_err(|error| LoadError::malformed(name, format!("invalid UTF-8: {}", error))),
            // Latin-1 maps every byte onto the same code point
            Encoding::Latin1 => Ok(bytes.iter().map(|byte| *byte as char).collect()),
        }
    }
}

impl ResourceLoader for FsLoader {
    fn load(&self, name: &str) -> LoadResult<HashMap<String, String>> {
        let path = self.root.join(format!("{}{}", name, PROPERTIES_SUFFIX));
        debug!("Loading properties [{}] with encoding {}", path.display(), self.encoding);

        let bytes = fs::read(&path).map_err(|error| {
            if error.kind() == ErrorKind::NotFound {
                LoadError::unavailable(name)
            } else {
                LoadError::unavailable_with_source(name, error)
            }
        })?;
        let content = self.decode(name, bytes)?;
        properties::parse(&content).map_err(|error| LoadError::malformed(name, error.to_string()))
    }
}
