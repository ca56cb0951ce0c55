//! Synchronous directory walk.

use std::path::{Path, PathBuf};

use tracing::warn;
use walkdir::WalkDir;

use super::{check_root, ScanError, ScanOptions};

/// Walk `opts.root` on the calling thread and return every matching file.
///
/// Entries are visited in file-name order, so the output is stable for an
/// unchanged tree. A symlink is a candidate when it resolves to a file;
/// symlinked directories are not entered. Unreadable entries are logged and
/// skipped.
pub fn scan_sequential(opts: &ScanOptions) -> Result<Vec<PathBuf>, ScanError> {
    check_root(&opts.root)?;

    let max_depth = if opts.descend { usize::MAX } else { 1 };
    let walker = WalkDir::new(&opts.root)
        .follow_links(false)
        .max_depth(max_depth)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !opts.skips(e.file_name()));

    let mut found = Vec::new();
    for entry in walker {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                warn!(error = %e, "skipping unreadable entry");
                continue;
            }
        };
        if !opts.matches(entry.path()) {
            continue;
        }
        let file_type = entry.file_type();
        if file_type.is_file() || (file_type.is_symlink() && resolves_to_file(entry.path())) {
            found.push(entry.into_path());
        }
    }

    Ok(found)
}

fn resolves_to_file(path: &Path) -> bool {
    match path.metadata() {
        Ok(meta) => meta.is_file(),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "skipping dangling symlink");
            false
        }
    }
}
