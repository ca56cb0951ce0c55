//! Core [`RuleLoader`] struct: directory scan plus bounded concurrent parsing.

use std::path::PathBuf;
use std::sync::Arc;

use elastalert_core::Config;
use futures::future::join_all;
use tokio::sync::Semaphore;
use tracing::{debug, info, warn};

use crate::scanner::{scan_parallel, scan_sequential, ScanOptions, DEFAULT_SCAN_CONCURRENCY};
use crate::schema::RuleDefinition;

use super::error::{LoadResult, LoadStatus, Result, RuleError};
use super::parser::RuleParser;
use super::ruleset::RuleSet;

/// Default number of rule files parsed at the same time.
pub const DEFAULT_PARSE_CONCURRENCY: usize = 16;

/// Where rules live and how hard to work when loading them.
#[derive(Debug, Clone)]
pub struct LoaderOptions {
    pub root: PathBuf,
    /// Rule file extension, `yaml` by default.
    pub suffix: String,
    /// Recurse into subdirectories of `root`.
    pub descend: bool,
    /// Use the task-per-directory scanner instead of a single walk.
    pub parallel_scan: bool,
    /// Also list dotfiles and enter dot-directories.
    pub include_hidden: bool,
    pub scan_concurrency: usize,
    pub parse_concurrency: usize,
}

impl LoaderOptions {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            suffix: "yaml".to_string(),
            descend: true,
            parallel_scan: false,
            include_hidden: false,
            scan_concurrency: DEFAULT_SCAN_CONCURRENCY,
            parse_concurrency: DEFAULT_PARSE_CONCURRENCY,
        }
    }

    /// Build options from the process config.
    pub fn from_config(config: &Config) -> Self {
        Self {
            root: config.rules_folder.clone(),
            suffix: config.rules_suffix.clone(),
            descend: config.scan_subdirectories,
            parallel_scan: config.parallel_scan,
            include_hidden: config.scan_hidden,
            scan_concurrency: config.scan_concurrency,
            parse_concurrency: config.load_concurrency,
        }
    }

    pub fn suffix(mut self, suffix: impl Into<String>) -> Self {
        self.suffix = suffix.into();
        self
    }

    pub fn descend(mut self, descend: bool) -> Self {
        self.descend = descend;
        self
    }

    pub fn parallel_scan(mut self, parallel: bool) -> Self {
        self.parallel_scan = parallel;
        self
    }

    pub fn include_hidden(mut self, include: bool) -> Self {
        self.include_hidden = include;
        self
    }

    pub fn parse_concurrency(mut self, n: usize) -> Self {
        self.parse_concurrency = n;
        self
    }

    pub fn scan_options(&self) -> ScanOptions {
        ScanOptions::new(self.root.clone(), self.suffix.clone(), self.descend)
            .include_hidden(self.include_hidden)
    }
}

/// Filesystem-backed rule loader.
///
/// Each [`load`](RuleLoader::load) call is independent: it rescans the tree,
/// parses every candidate and returns a fresh [`RuleSet`]. Nothing is cached
/// between calls.
#[derive(Debug, Clone)]
pub struct RuleLoader {
    options: LoaderOptions,
}

impl RuleLoader {
    pub fn new(options: LoaderOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &LoaderOptions {
        &self.options
    }

    /// Load every rule under the root.
    ///
    /// Only a failure to scan the root is an error. Files that cannot be
    /// read or parsed are logged and left out of the set.
    pub async fn load(&self) -> Result<RuleSet> {
        let (rules, _) = self.load_report().await?;
        Ok(rules)
    }

    /// Like [`load`](RuleLoader::load), also returning one [`LoadResult`]
    /// per candidate file in candidate order.
    pub async fn load_report(&self) -> Result<(RuleSet, Vec<LoadResult>)> {
        let candidates = self.candidates().await?;
        let total = candidates.len();
        debug!(root = %self.options.root.display(), candidates = total, "parsing rule files");

        // Slot i belongs to candidate i, whatever order the workers finish in.
        let mut slots: Vec<Option<RuleDefinition>> = std::iter::repeat_with(|| None).take(total).collect();
        let mut report = Vec::with_capacity(total);

        let limiter = Arc::new(Semaphore::new(self.options.parse_concurrency.max(1)));
        let workers = candidates.iter().map(|path| {
            let limiter = Arc::clone(&limiter);
            let path = path.clone();
            tokio::spawn(async move {
                let _permit = limiter
                    .acquire_owned()
                    .await
                    .map_err(|e| RuleError::Task(e.to_string()))?;
                tokio::task::spawn_blocking(move || RuleParser::parse_file(&path))
                    .await
                    .map_err(|e| RuleError::Task(e.to_string()))?
            })
        });
        let outcomes = join_all(workers).await;

        for (slot, (path, joined)) in candidates.into_iter().zip(outcomes).enumerate() {
            let outcome = joined
                .map_err(|e| RuleError::Task(e.to_string()))
                .and_then(|parsed| parsed);

            match outcome {
                Ok(rule) => {
                    debug!(rule = %rule.name(), kind = %rule.kind(), path = %path.display(), "loaded rule");
                    report.push(LoadResult {
                        path,
                        status: LoadStatus::Loaded {
                            name: rule.name().to_string(),
                            kind: rule.kind(),
                        },
                    });
                    slots[slot] = Some(rule);
                }
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "failed to load rule file");
                    report.push(LoadResult {
                        path,
                        status: LoadStatus::Failed {
                            error: e.to_string(),
                        },
                    });
                }
            }
        }

        // Drop the empty slots without disturbing the order of the rest.
        let rules: Vec<RuleDefinition> = slots.into_iter().flatten().collect();
        info!(
            loaded = rules.len(),
            failed = total - rules.len(),
            candidates = total,
            "rules loaded"
        );

        Ok((RuleSet::new(rules), report))
    }

    /// Scan for candidate files and put them in a stable order.
    async fn candidates(&self) -> Result<Vec<PathBuf>> {
        let scan = self.options.scan_options();
        let mut paths = if self.options.parallel_scan {
            scan_parallel(&scan, self.options.scan_concurrency).await?
        } else {
            tokio::task::spawn_blocking(move || scan_sequential(&scan))
                .await
                .map_err(|e| RuleError::Task(e.to_string()))??
        };
        paths.sort();
        paths.dedup();
        Ok(paths)
    }
}
