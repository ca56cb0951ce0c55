//! Single-file rule parsing.

use std::fs;
use std::path::Path;

use crate::schema::{RuleDefinition, RuleEnvelope};

use super::error::Result;

/// Turns one rule file into a [`RuleDefinition`].
///
/// Stateless: every call builds its own decoder, so parsers running on
/// different workers never share state.
pub struct RuleParser;

impl RuleParser {
    /// Read and parse the file at `path`.
    pub fn parse_file(path: &Path) -> Result<RuleDefinition> {
        let contents = fs::read_to_string(path)?;
        Self::parse_str(&contents)
    }

    /// Parse rule text via two-pass deserialization.
    ///
    /// First pass: parse into a generic YAML value and resolve `type`.
    /// Second pass: decode the same value into the kind-specific shape.
    pub fn parse_str(contents: &str) -> Result<RuleDefinition> {
        let document: serde_yaml::Value = serde_yaml::from_str(contents)?;
        RuleEnvelope::from_document(document)?.parse_full()
    }
}
