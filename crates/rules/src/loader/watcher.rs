//! Hot reload: watch the rules directory and swap in a freshly loaded set.

use std::path::Path;
use std::time::Duration;

use notify::event::RemoveKind;
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::scanner::ScanOptions;

use super::core::RuleLoader;
use super::error::Result;
use super::ruleset::SharedRuleSet;

/// Default quiet period before a burst of file events triggers a reload.
pub const DEFAULT_RELOAD_DEBOUNCE: Duration = Duration::from_millis(500);

/// Keeps the watcher and its reload task alive. Dropping it stops both.
pub struct RuleWatcher {
    _watcher: RecommendedWatcher,
    task: JoinHandle<()>,
}

impl Drop for RuleWatcher {
    fn drop(&mut self) {
        self.task.abort();
    }
}

impl RuleLoader {
    /// Start watching the rules root.
    ///
    /// Any create, modify or remove of a rule file schedules a full
    /// [`load`](RuleLoader::load); once events have been quiet for
    /// `debounce`, the result replaces the contents of `shared`. A reload
    /// that fails keeps the previous set.
    ///
    /// Must be called from within a tokio runtime.
    pub fn watch(&self, shared: SharedRuleSet, debounce: Duration) -> Result<RuleWatcher> {
        let (tx, mut rx) = mpsc::unbounded_channel::<()>();
        let scan = self.options().scan_options();

        let mut watcher = notify::recommended_watcher(move |res: notify::Result<Event>| match res {
            Ok(event) => {
                if is_relevant(&event, &scan) {
                    let _ = tx.send(());
                }
            }
            Err(e) => warn!(error = %e, "filesystem watcher error"),
        })?;

        let mode = if self.options().descend {
            RecursiveMode::Recursive
        } else {
            RecursiveMode::NonRecursive
        };
        watcher.watch(&self.options().root, mode)?;

        let loader = self.clone();
        let task = tokio::spawn(async move {
            while rx.recv().await.is_some() {
                // Wait for the burst to settle.
                loop {
                    match tokio::time::timeout(debounce, rx.recv()).await {
                        Ok(Some(())) => continue,
                        Ok(None) => return,
                        Err(_) => break,
                    }
                }

                match loader.load().await {
                    Ok(rules) => {
                        info!(rules = rules.len(), "reloaded rules after filesystem change");
                        shared.replace(rules);
                    }
                    Err(e) => {
                        warn!(error = %e, "rule reload failed, keeping previous rule set");
                    }
                }
            }
            debug!("rule watcher channel closed");
        });

        info!(path = %self.options().root.display(), ?mode, "watching rules directory for changes");
        Ok(RuleWatcher {
            _watcher: watcher,
            task,
        })
    }
}

fn is_relevant(event: &Event, scan: &ScanOptions) -> bool {
    match event.kind {
        EventKind::Create(_) | EventKind::Modify(_) => event.paths.iter().any(|p| is_rule_file(p, scan)),
        EventKind::Remove(RemoveKind::Folder) => true,
        EventKind::Remove(_) => event.paths.iter().any(|p| is_rule_file(p, scan)),
        _ => false,
    }
}

fn is_rule_file(path: &Path, scan: &ScanOptions) -> bool {
    let hidden = path.file_name().map(|n| scan.skips(n)).unwrap_or(true);
    !hidden && scan.matches(path)
}
