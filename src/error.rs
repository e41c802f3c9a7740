use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for archive operations
pub type Result<T> = std::result::Result<T, ArchiveError>;

/// Unified error type for all archive operations
#[derive(Debug, Error)]
pub enum ArchiveError {
    // Entry errors
    #[error("Entry already exists in archive: {0}")]
    DuplicateEntry(String),

    #[error("Entry {0} is a directory, not content")]
    InvalidTarget(String),

    #[error("Entry name {0} is reserved for the archive manifest")]
    ReservedEntry(String),

    #[error("Malformed entry '{name}': {reason}")]
    MalformedEntry { name: String, reason: String },

    #[error("Source not found: {}: {source}", .path.display())]
    SourceNotFound {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    // Persistence errors
    #[error("Failed to save archive {}: {source}", .path.display())]
    PersistenceFailure {
        path: PathBuf,
        #[source]
        source: Box<ArchiveError>,
    },

    #[error("Cannot extract entry '{entry}': {source}")]
    ExtractionFailure {
        entry: String,
        #[source]
        source: io::Error,
    },

    #[error("Operation not supported: {0}")]
    NotSupported(&'static str),

    // Manifest errors
    #[error("Invalid manifest: {0}")]
    InvalidManifest(String),

    // I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),

    // Serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl ArchiveError {
    pub(crate) fn malformed(name: &str, reason: impl Into<String>) -> Self {
        ArchiveError::MalformedEntry {
            name: name.to_string(),
            reason: reason.into(),
        }
    }

    /// The wrapped cause of a persistence failure, if this is one.
    pub fn persistence_cause(&self) -> Option<&ArchiveError> {
        match self {
            ArchiveError::PersistenceFailure { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<toml::de::Error> for ArchiveError {
    fn from(err: toml::de::Error) -> Self {
        ArchiveError::Config(err.to_string())
    }
}
