//! Error types and load result structures for the rule loader.

use std::path::PathBuf;

use crate::scanner::ScanError;
use crate::schema::RuleKind;

/// Errors that can occur while loading rules.
///
/// Everything except [`RuleError::Scan`] and [`RuleError::Notify`] is scoped
/// to a single file: the loader records it and moves on.
#[derive(Debug, thiserror::Error)]
pub enum RuleError {
    /// Filesystem I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The file is not valid YAML.
    #[error("YAML parse error: {0}")]
    Parse(#[from] serde_yaml::Error),

    /// The document parsed but is not a key/value mapping (empty file, list, scalar).
    #[error("document is not a key/value mapping")]
    NotStructured,

    #[error("missing `type` field")]
    MissingType,

    #[error("unknown rule type '{0}'")]
    UnknownType(String),

    /// The document does not fit the shape registered for its type.
    #[error("invalid {kind} rule: {source}")]
    Shape {
        kind: RuleKind,
        #[source]
        source: serde_yaml::Error,
    },

    /// Rule validation error (e.g. blank name).
    #[error("Validation error: {0}")]
    Validation(String),

    /// A parse worker panicked or was cancelled.
    #[error("parse task failed: {0}")]
    Task(String),

    /// Discovering candidate files failed.
    #[error("Scan error: {0}")]
    Scan(#[from] ScanError),

    /// Filesystem watcher error.
    #[error("Notify watcher error: {0}")]
    Notify(#[from] notify::Error),
}

/// Result alias for rule operations.
pub type Result<T> = std::result::Result<T, RuleError>;

/// Outcome of loading a single rule file.
#[derive(Debug)]
pub struct LoadResult {
    /// Path to the file that was loaded.
    pub path: PathBuf,
    /// Status of the load attempt.
    pub status: LoadStatus,
}

/// Status of a single file load attempt.
#[derive(Debug)]
pub enum LoadStatus {
    /// Rule was successfully loaded.
    Loaded { name: String, kind: RuleKind },
    /// Read, parse or validation error occurred; the file was skipped.
    Failed { error: String },
}

impl LoadStatus {
    pub fn is_loaded(&self) -> bool {
        matches!(self, LoadStatus::Loaded { .. })
    }
}
