//! Fields shared by every rule kind.

use elastalert_core::DurationStr;
use serde::{Deserialize, Deserializer, Serialize};

/// Common fields present on every rule regardless of its `type`.
///
/// The `type` key itself is not stored here; it is carried by the
/// [`RuleDefinition`](super::RuleDefinition) variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleBase {
    pub name: String,
    /// Target index (or index pattern) on the search backend.
    #[serde(default)]
    pub index: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub num_events: u64,
    #[serde(default)]
    pub timeframe: Option<DurationStr>,
    /// Backend-specific filter payload, passed through untouched.
    #[serde(default)]
    pub filter: serde_yaml::Value,
    /// Alerter names. A single string is read as a one-element list.
    #[serde(default, deserialize_with = "one_or_many")]
    pub alert: Vec<String>,
    /// Recipients. A single address is read as a one-element list.
    #[serde(default, deserialize_with = "one_or_many")]
    pub email: Vec<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

/// Accept `key: value`, `key: [a, b]` or an explicit null.
fn one_or_many<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<OneOrMany>::deserialize(deserializer)? {
        None => Vec::new(),
        Some(OneOrMany::One(s)) => vec![s],
        Some(OneOrMany::Many(v)) => v,
    })
}
