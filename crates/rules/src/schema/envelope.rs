//! First-pass view of a rule document: the discriminator plus the raw body.

use serde_yaml::{Mapping, Value};

use super::{RuleDefinition, RuleKind};
use crate::loader::RuleError;

/// A parsed document whose `type` has been resolved but whose body has not
/// yet been decoded.
///
/// Used during two-pass loading: first resolve `type` against the
/// [`RuleKind`] registry, then decode the full document into that shape.
#[derive(Debug, Clone)]
pub struct RuleEnvelope {
    pub kind: RuleKind,
    pub document: Value,
}

impl RuleEnvelope {
    /// Resolve the discriminator of an already parsed YAML document.
    ///
    /// Top-level keys are matched case-insensitively (`Type: spike` is the
    /// same as `type: spike`); nested values such as `filter` are untouched.
    pub fn from_document(document: Value) -> Result<Self, RuleError> {
        let mapping = match document {
            Value::Mapping(m) => lowercase_keys(m),
            _ => return Err(RuleError::NotStructured),
        };

        let kind = match mapping.get("type") {
            None | Some(Value::Null) => return Err(RuleError::MissingType),
            Some(Value::String(s)) => s
                .parse::<RuleKind>()
                .map_err(|_| RuleError::UnknownType(s.clone()))?,
            Some(other) => {
                let rendered = serde_yaml::to_string(other).unwrap_or_default();
                return Err(RuleError::UnknownType(rendered.trim().to_string()));
            }
        };

        Ok(Self {
            kind,
            document: Value::Mapping(mapping),
        })
    }

    /// Second pass: decode into the registered shape and validate it.
    pub fn parse_full(self) -> Result<RuleDefinition, RuleError> {
        let kind = self.kind;
        let rule = kind
            .decode(self.document)
            .map_err(|source| RuleError::Shape { kind, source })?;

        if rule.name().trim().is_empty() {
            return Err(RuleError::Validation(format!(
                "{} rule has an empty name",
                kind
            )));
        }

        Ok(rule)
    }
}

/// Lowercase string keys. On a clash the later key wins.
fn lowercase_keys(mapping: Mapping) -> Mapping {
    mapping
        .into_iter()
        .map(|(key, value)| match key {
            Value::String(s) => (Value::String(s.to_lowercase()), value),
            other => (other, value),
        })
        .collect()
}
