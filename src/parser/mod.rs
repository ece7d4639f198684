pub mod extract;

use std::fmt;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

#[derive(Debug, Clone, PartialEq)]
pub enum DocumentSource {
    File(PathBuf),
    Inline,
}

impl fmt::Display for DocumentSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocumentSource::File(path) => write!(f, "{}", path.display()),
            DocumentSource::Inline => f.write_str("inline"),
        }
    }
}

/// Text handed to the extraction rules. Read once, never modified.
#[derive(Debug, Clone)]
pub struct RawDocument {
    source: DocumentSource,
    content: String,
}

impl RawDocument {
    pub fn inline(content: impl Into<String>) -> Self {
        Self {
            source: DocumentSource::Inline,
            content: content.into(),
        }
    }

    /// Read a UTF-8 document from disk. A missing or unreadable file yields
    /// `None` so callers fall back to defaults.
    pub fn read(path: &Path) -> Option<Self> {
        match std::fs::read_to_string(path) {
            Ok(content) => Some(Self {
                source: DocumentSource::File(path.to_path_buf()),
                content,
            }),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("{} not found, using defaults", path.display());
                None
            }
            Err(e) => {
                warn!("Cannot read {}: {}, using defaults", path.display(), e);
                None
            }
        }
    }

    pub fn source(&self) -> &DocumentSource {
        &self.source
    }

    pub fn content(&self) -> &str {
        &self.content
    }
}
