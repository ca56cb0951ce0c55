//! Concurrent directory walk with bounded admission.
//!
//! Every directory is read by its own task, and a task must hold a permit
//! from the shared semaphore while it reads. The permit is released before
//! the task waits on its children. Holding it across that wait would let
//! parents occupy every permit while their children queue for one, which
//! deadlocks as soon as the live branch count exceeds the capacity. Because
//! a waiting parent holds nothing, any capacity of at least one makes
//! progress; the capacity only bounds how many directories are read at once.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use futures::future::{join_all, BoxFuture};
use futures::FutureExt;
use tokio::sync::Semaphore;
use tracing::warn;

use super::{check_root, ScanError, ScanOptions};

/// Default number of directories read concurrently.
pub const DEFAULT_SCAN_CONCURRENCY: usize = 1000;

/// Walk `opts.root` with one task per directory, at most `capacity` of them
/// reading at any instant. Output order is unspecified.
pub async fn scan_parallel(opts: &ScanOptions, capacity: usize) -> Result<Vec<PathBuf>, ScanError> {
    if capacity == 0 {
        return Err(ScanError::ZeroCapacity);
    }
    check_root(&opts.root)?;

    let limiter = Arc::new(Semaphore::new(capacity));
    let opts = Arc::new(opts.clone());
    Ok(walk_dir(opts.root.clone(), opts, limiter).await)
}

fn walk_dir(
    dir: PathBuf,
    opts: Arc<ScanOptions>,
    limiter: Arc<Semaphore>,
) -> BoxFuture<'static, Vec<PathBuf>> {
    async move {
        let (mut found, subdirs) = {
            let _permit = match limiter.acquire().await {
                Ok(p) => p,
                Err(_) => return Vec::new(),
            };
            read_entries(&dir, &opts).await
        };

        let children = subdirs.into_iter().map(|sub| {
            tokio::spawn(walk_dir(sub, Arc::clone(&opts), Arc::clone(&limiter)))
        });

        for joined in join_all(children).await {
            match joined {
                Ok(paths) => found.extend(paths),
                Err(e) => warn!(parent = %dir.display(), error = %e, "directory scan task failed"),
            }
        }

        found
    }
    .boxed()
}

/// Read one directory: matching files, plus subdirectories when descending.
async fn read_entries(dir: &Path, opts: &ScanOptions) -> (Vec<PathBuf>, Vec<PathBuf>) {
    let mut files = Vec::new();
    let mut subdirs = Vec::new();

    let mut entries = match tokio::fs::read_dir(dir).await {
        Ok(e) => e,
        Err(e) => {
            warn!(path = %dir.display(), error = %e, "failed to read directory");
            return (files, subdirs);
        }
    };

    loop {
        let entry = match entries.next_entry().await {
            Ok(Some(entry)) => entry,
            Ok(None) => break,
            Err(e) => {
                warn!(path = %dir.display(), error = %e, "failed to read directory entry");
                break;
            }
        };

        if opts.skips(&entry.file_name()) {
            continue;
        }

        let file_type = match entry.file_type().await {
            Ok(t) => t,
            Err(e) => {
                warn!(path = %entry.path().display(), error = %e, "failed to stat entry");
                continue;
            }
        };

        let path = entry.path();
        if file_type.is_dir() {
            if opts.descend {
                subdirs.push(path);
            }
        } else if file_type.is_file() && opts.matches(&path) {
            files.push(path);
        } else if file_type.is_symlink() && opts.matches(&path) {
            // Followed for files only; symlinked directories are not entered.
            match tokio::fs::metadata(&path).await {
                Ok(meta) if meta.is_file() => files.push(path),
                Ok(_) => {}
                Err(e) => warn!(path = %path.display(), error = %e, "skipping dangling symlink"),
            }
        }
    }

    (files, subdirs)
}
