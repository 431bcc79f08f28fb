use std::{
    fs,
    path::{Path, PathBuf},
};

use hostile_presence_core::{ConfigurationError, EscalationRow};
use serde::Deserialize;
use thiserror::Error;

/// Durable record set holding escalation rows.
pub trait EscalationSource {
    /// Reads every row in one bulk load.
    fn load_rows(&self) -> Result<Vec<EscalationRow>, EscalationLoadError>;
}

/// Errors raised while loading escalation records.
#[derive(Debug, Error)]
pub enum EscalationLoadError {
    /// The backing file could not be read.
    #[error("failed to read escalation records from {path}: {source}")]
    Io {
        /// File that failed to load.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },
    /// The TOML document was malformed.
    #[error("malformed TOML escalation records: {0}")]
    Toml(#[from] toml::de::Error),
    /// The JSON document was malformed.
    #[error("malformed JSON escalation records: {0}")]
    Json(#[from] serde_json::Error),
    /// A row violated the record invariants.
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
}

/// Rows already held in memory.
#[derive(Clone, Debug, Default)]
pub struct StaticEscalationSource {
    rows: Vec<EscalationRow>,
}

impl StaticEscalationSource {
    /// Wraps the provided rows.
    #[must_use]
    pub fn new(rows: Vec<EscalationRow>) -> Self {
        Self { rows }
    }
}

impl EscalationSource for StaticEscalationSource {
    fn load_rows(&self) -> Result<Vec<EscalationRow>, EscalationLoadError> {
        Ok(self.rows.clone())
    }
}

#[derive(Debug, Deserialize)]
struct TomlDocument {
    #[serde(default)]
    escalations: Vec<EscalationRow>,
}

/// TOML document with an `[[escalations]]` array of rows.
#[derive(Clone, Debug)]
pub struct TomlEscalationSource {
    text: String,
}

impl TomlEscalationSource {
    /// Uses the provided document text.
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    /// Reads the document from disk.
    pub fn from_path(path: &Path) -> Result<Self, EscalationLoadError> {
        read_text(path).map(Self::new)
    }
}

impl EscalationSource for TomlEscalationSource {
    fn load_rows(&self) -> Result<Vec<EscalationRow>, EscalationLoadError> {
        let document: TomlDocument = toml::from_str(&self.text)?;
        Ok(document.escalations)
    }
}

/// JSON document holding a top-level array of rows.
#[derive(Clone, Debug)]
pub struct JsonEscalationSource {
    text: String,
}

impl JsonEscalationSource {
    /// Uses the provided document text.
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    /// Reads the document from disk.
    pub fn from_path(path: &Path) -> Result<Self, EscalationLoadError> {
        read_text(path).map(Self::new)
    }
}

impl EscalationSource for JsonEscalationSource {
    fn load_rows(&self) -> Result<Vec<EscalationRow>, EscalationLoadError> {
        Ok(serde_json::from_str(&self.text)?)
    }
}

fn read_text(path: &Path) -> Result<String, EscalationLoadError> {
    fs::read_to_string(path).map_err(|source| EscalationLoadError::Io {
        path: path.to_path_buf(),
        source,
    })
}
