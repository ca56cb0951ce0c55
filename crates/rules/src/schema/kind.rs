//! Rule type discriminator and the registry of known kinds.

use serde::{Deserialize, Serialize};
use serde_yaml::Value;
use std::fmt;
use std::str::FromStr;

use super::{
    CardinalityRule, ChangeRule, FrequencyRule, MetricAggregationRule, NewTermRule,
    PercentageMatchRule, RuleDefinition, SpikeAggregationRule, SpikeRule,
};

/// Known values of a rule file's `type` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleKind {
    Cardinality,
    Change,
    Frequency,
    NewTerm,
    PercentageMatch,
    MetricAggregation,
    Spike,
    SpikeAggregation,
}

impl RuleKind {
    /// Every registered kind, in registry order.
    pub const ALL: [RuleKind; 8] = [
        RuleKind::Cardinality,
        RuleKind::Change,
        RuleKind::Frequency,
        RuleKind::NewTerm,
        RuleKind::PercentageMatch,
        RuleKind::MetricAggregation,
        RuleKind::Spike,
        RuleKind::SpikeAggregation,
    ];

    /// The discriminator string as written in rule files.
    pub fn as_str(self) -> &'static str {
        match self {
            RuleKind::Cardinality => "cardinality",
            RuleKind::Change => "change",
            RuleKind::Frequency => "frequency",
            RuleKind::NewTerm => "new_term",
            RuleKind::PercentageMatch => "percentage_match",
            RuleKind::MetricAggregation => "metric_aggregation",
            RuleKind::Spike => "spike",
            RuleKind::SpikeAggregation => "spike_aggregation",
        }
    }

    /// Decode a full rule document into this kind's shape.
    pub fn decode(self, document: Value) -> Result<RuleDefinition, serde_yaml::Error> {
        match self {
            RuleKind::Cardinality => {
                serde_yaml::from_value::<CardinalityRule>(document).map(RuleDefinition::Cardinality)
            }
            RuleKind::Change => {
                serde_yaml::from_value::<ChangeRule>(document).map(RuleDefinition::Change)
            }
            RuleKind::Frequency => {
                serde_yaml::from_value::<FrequencyRule>(document).map(RuleDefinition::Frequency)
            }
            RuleKind::NewTerm => {
                serde_yaml::from_value::<NewTermRule>(document).map(RuleDefinition::NewTerm)
            }
            RuleKind::PercentageMatch => serde_yaml::from_value::<PercentageMatchRule>(document)
                .map(RuleDefinition::PercentageMatch),
            RuleKind::MetricAggregation => serde_yaml::from_value::<MetricAggregationRule>(document)
                .map(RuleDefinition::MetricAggregation),
            RuleKind::Spike => {
                serde_yaml::from_value::<SpikeRule>(document).map(RuleDefinition::Spike)
            }
            RuleKind::SpikeAggregation => serde_yaml::from_value::<SpikeAggregationRule>(document)
                .map(RuleDefinition::SpikeAggregation),
        }
    }
}

impl fmt::Display for RuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RuleKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        RuleKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| format!("unknown rule type: '{}'", s))
    }
}
