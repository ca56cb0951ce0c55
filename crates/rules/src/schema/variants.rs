//! Kind-specific rule shapes.
//!
//! Each struct flattens [`RuleBase`] and adds the fields its evaluator needs.
//! Unknown keys are ignored; required keys are the ones without a default.

use elastalert_core::DurationStr;
use serde::{Deserialize, Serialize};

use super::RuleBase;

/// Direction of change a spike rule alerts on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpikeType {
    Up,
    Down,
    #[default]
    Both,
}

/// Aggregation applied to `metric_agg_key`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricAggType {
    Min,
    Max,
    Avg,
    Sum,
    Cardinality,
    ValueCount,
}

/// Alert when the number of unique values of a field crosses a bound.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardinalityRule {
    #[serde(flatten)]
    pub base: RuleBase,
    /// Count the number of unique values for this field.
    pub cardinality_field: String,
    #[serde(default)]
    pub min_cardinality: u64,
}

/// Alert when a field changes value between two documents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeRule {
    #[serde(flatten)]
    pub base: RuleBase,
    /// The field to look for changes in.
    pub compare_key: String,
    /// Ignore documents without the `compare_key` field.
    #[serde(default)]
    pub ignore_null: bool,
    /// The change must occur in two documents with the same `query_key`.
    #[serde(default)]
    pub query_key: String,
}

/// Alert when at least `num_events` occur within `timeframe`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrequencyRule {
    #[serde(flatten)]
    pub base: RuleBase,
}

/// Alert on a value never seen before in `fields`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewTermRule {
    #[serde(flatten)]
    pub base: RuleBase,
    #[serde(default)]
    pub fields: Vec<String>,
    #[serde(default)]
    pub terms_window_size: Option<DurationStr>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PercentageMatchRule {
    #[serde(flatten)]
    pub base: RuleBase,
    #[serde(default)]
    pub buffer_time: Option<DurationStr>,
    #[serde(default)]
    pub query_key: String,
    #[serde(default)]
    pub doc_type: String,
    #[serde(default)]
    pub min_percentage: Option<f64>,
    #[serde(default)]
    pub max_percentage: Option<f64>,
    #[serde(default)]
    pub bucket_interval: Option<DurationStr>,
    #[serde(default)]
    pub sync_bucket_interval: bool,
    #[serde(default)]
    pub allow_buffer_time_overlap: bool,
    #[serde(default)]
    pub use_run_every_query_size: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricAggregationRule {
    #[serde(flatten)]
    pub base: RuleBase,
    #[serde(default)]
    pub buffer_time: Option<DurationStr>,
    pub metric_agg_key: String,
    pub metric_agg_type: MetricAggType,
    #[serde(default)]
    pub query_key: String,
    #[serde(default)]
    pub doc_type: String,
    #[serde(default)]
    pub bucket_interval: Option<DurationStr>,
    #[serde(default)]
    pub sync_bucket_interval: bool,
    #[serde(default)]
    pub allow_buffer_time_overlap: bool,
    #[serde(default)]
    pub use_run_every_query_size: bool,
    #[serde(default)]
    pub min_threshold: Option<f64>,
    #[serde(default)]
    pub max_threshold: Option<f64>,
}

/// Alert when the event rate in the current window differs from the
/// reference window by `spike_height`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpikeRule {
    #[serde(flatten)]
    pub base: RuleBase,
    #[serde(default)]
    pub threshold_cur: u64,
    #[serde(default)]
    pub threshold_ref: u64,
    #[serde(default)]
    pub spike_height: f64,
    #[serde(default)]
    pub spike_type: SpikeType,
}

/// Spike detection over a metric aggregation instead of a raw count.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpikeAggregationRule {
    #[serde(flatten)]
    pub base: RuleBase,
    #[serde(default)]
    pub buffer_time: Option<DurationStr>,
    pub metric_agg_key: String,
    pub metric_agg_type: MetricAggType,
    #[serde(default)]
    pub query_key: String,
    #[serde(default)]
    pub doc_type: String,
    #[serde(default)]
    pub threshold_cur: u64,
    #[serde(default)]
    pub threshold_ref: u64,
    #[serde(default)]
    pub spike_height: f64,
    #[serde(default)]
    pub spike_type: SpikeType,
}
