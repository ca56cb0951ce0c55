//! Tagged rule container and accessors.

use super::{
    CardinalityRule, ChangeRule, FrequencyRule, MetricAggregationRule, NewTermRule,
    PercentageMatchRule, RuleBase, RuleKind, SpikeAggregationRule, SpikeRule,
};

/// A fully deserialized rule of any supported kind.
#[derive(Debug, Clone, PartialEq)]
pub enum RuleDefinition {
    Cardinality(CardinalityRule),
    Change(ChangeRule),
    Frequency(FrequencyRule),
    NewTerm(NewTermRule),
    PercentageMatch(PercentageMatchRule),
    MetricAggregation(MetricAggregationRule),
    Spike(SpikeRule),
    SpikeAggregation(SpikeAggregationRule),
}

impl RuleDefinition {
    /// Get the common fields regardless of kind.
    pub fn base(&self) -> &RuleBase {
        match self {
            RuleDefinition::Cardinality(rule) => &rule.base,
            RuleDefinition::Change(rule) => &rule.base,
            RuleDefinition::Frequency(rule) => &rule.base,
            RuleDefinition::NewTerm(rule) => &rule.base,
            RuleDefinition::PercentageMatch(rule) => &rule.base,
            RuleDefinition::MetricAggregation(rule) => &rule.base,
            RuleDefinition::Spike(rule) => &rule.base,
            RuleDefinition::SpikeAggregation(rule) => &rule.base,
        }
    }

    /// Get the rule kind.
    pub fn kind(&self) -> RuleKind {
        match self {
            RuleDefinition::Cardinality(_) => RuleKind::Cardinality,
            RuleDefinition::Change(_) => RuleKind::Change,
            RuleDefinition::Frequency(_) => RuleKind::Frequency,
            RuleDefinition::NewTerm(_) => RuleKind::NewTerm,
            RuleDefinition::PercentageMatch(_) => RuleKind::PercentageMatch,
            RuleDefinition::MetricAggregation(_) => RuleKind::MetricAggregation,
            RuleDefinition::Spike(_) => RuleKind::Spike,
            RuleDefinition::SpikeAggregation(_) => RuleKind::SpikeAggregation,
        }
    }

    pub fn name(&self) -> &str {
        &self.base().name
    }

    pub fn index(&self) -> &str {
        &self.base().index
    }

    pub fn as_spike(&self) -> Option<&SpikeRule> {
        match self {
            RuleDefinition::Spike(rule) => Some(rule),
            _ => None,
        }
    }

    pub fn as_metric_aggregation(&self) -> Option<&MetricAggregationRule> {
        match self {
            RuleDefinition::MetricAggregation(rule) => Some(rule),
            _ => None,
        }
    }
}
