//! Rule file discovery.
//!
//! Produces the candidate rule files under a root directory, filtered by
//! extension (case-insensitive), optionally descending into subdirectories.
//! Two strategies are provided:
//!
//! - [`scan_sequential`]: a single synchronous `walkdir` pass.
//! - [`scan_parallel`]: one tokio task per subdirectory, admitted through a
//!   fixed-capacity semaphore.
//!
//! Neither strategy guarantees an output order that callers may rely on;
//! the loader sorts candidates before parsing.

mod parallel;
mod sequential;


use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};

pub use self::parallel::{scan_parallel, DEFAULT_SCAN_CONCURRENCY};
pub use self::sequential::scan_sequential;

/// Errors that abort a scan. Problems below the root are logged and skipped.
#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    #[error("cannot read rules root {path}: {source}")]
    Root {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("rules root {0} is not a directory")]
    NotADirectory(PathBuf),

    #[error("scan concurrency must be at least 1")]
    ZeroCapacity,
}

/// What to scan and which files count as candidates.
#[derive(Debug, Clone)]
pub struct ScanOptions {
    pub root: PathBuf,
    /// Extension without the dot, e.g. `yaml`. A leading dot is tolerated.
    pub suffix: String,
    /// Recurse into subdirectories. Files directly under `root` are always listed.
    pub descend: bool,
    /// List dotfiles and enter dot-directories. Off by default.
    pub include_hidden: bool,
}

impl ScanOptions {
    pub fn new(root: impl Into<PathBuf>, suffix: impl Into<String>, descend: bool) -> Self {
        Self {
            root: root.into(),
            suffix: suffix.into(),
            descend,
            include_hidden: false,
        }
    }

    pub fn include_hidden(mut self, include: bool) -> Self {
        self.include_hidden = include;
        self
    }

    /// Whether an entry named `name` is left out of the walk.
    pub fn skips(&self, name: &OsStr) -> bool {
        !self.include_hidden && is_hidden(name)
    }

    /// Whether `path` has the configured extension.
    pub fn matches(&self, path: &Path) -> bool {
        let wanted = self.suffix.trim_start_matches('.');
        path.extension()
            .and_then(|e| e.to_str())
            .map(|e| e.eq_ignore_ascii_case(wanted))
            .unwrap_or(false)
    }
}

/// Names starting with a dot.
fn is_hidden(name: &OsStr) -> bool {
    name.to_str().map(|n| n.starts_with('.')).unwrap_or(false)
}

pub(crate) fn check_root(root: &Path) -> Result<(), ScanError> {
    let meta = fs::metadata(root).map_err(|source| ScanError::Root {
        path: root.to_path_buf(),
        source,
    })?;
    if !meta.is_dir() {
        return Err(ScanError::NotADirectory(root.to_path_buf()));
    }
    Ok(())
}
