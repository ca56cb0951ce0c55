//! Filesystem rule loader.
//!
//! Discovers rule files under a root directory, parses each one into a
//! [`RuleDefinition`](crate::schema::RuleDefinition) on a bounded pool of
//! workers, and returns them as an ordered [`RuleSet`]. Files that fail to
//! parse are logged and skipped. An optional `notify` watcher reloads the
//! whole set when rule files change.

mod core;
mod error;
mod parser;
mod ruleset;
mod watcher;

#[cfg(test)]
mod tests;

pub use self::core::{LoaderOptions, RuleLoader, DEFAULT_PARSE_CONCURRENCY};
pub use self::error::{LoadResult, LoadStatus, Result, RuleError};
pub use self::parser::RuleParser;
pub use self::ruleset::{RuleSet, SharedRuleSet};
pub use self::watcher::{RuleWatcher, DEFAULT_RELOAD_DEBOUNCE};
