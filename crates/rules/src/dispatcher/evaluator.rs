//! The evaluation capability the dispatcher routes rules to.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::info;

use crate::schema::{RuleDefinition, RuleKind};

/// Failure reported by an [`Evaluator`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EvalError {
    #[error("evaluation failed: {0}")]
    Failed(String),

    #[error("search backend error: {0}")]
    Backend(String),
}

/// What an evaluator knows about the tick it runs in.
#[derive(Debug, Clone)]
pub struct EvalContext {
    /// When the alerter started. Rules use it to avoid querying windows
    /// that reach back before any data was being watched.
    pub start_time: DateTime<Utc>,
    /// 1-based tick number.
    pub tick: u64,
    pub tick_started_at: DateTime<Utc>,
}

impl EvalContext {
    pub fn new(start_time: DateTime<Utc>, tick: u64) -> Self {
        Self {
            start_time,
            tick,
            tick_started_at: Utc::now(),
        }
    }
}

/// Judges one rule against live data.
///
/// One implementation is registered per [`RuleKind`]; the dispatcher only
/// hands an evaluator rules of the kind it was registered for.
#[async_trait]
pub trait Evaluator: Send + Sync {
    async fn evaluate(&self, rule: &RuleDefinition, ctx: &EvalContext) -> Result<(), EvalError>;
}

/// Evaluator that only records that a rule came up for evaluation.
pub struct LoggingEvaluator;

#[async_trait]
impl Evaluator for LoggingEvaluator {
    async fn evaluate(&self, rule: &RuleDefinition, ctx: &EvalContext) -> Result<(), EvalError> {
        info!(
            rule = %rule.name(),
            kind = %rule.kind(),
            index = %rule.index(),
            tick = ctx.tick,
            "evaluating rule"
        );
        Ok(())
    }
}

/// Evaluators keyed by the rule kind they handle.
#[derive(Clone, Default)]
pub struct EvaluatorRegistry {
    evaluators: HashMap<RuleKind, Arc<dyn Evaluator>>,
}

impl EvaluatorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `evaluator` for `kind`, returning the one it replaces.
    pub fn register(
        &mut self,
        kind: RuleKind,
        evaluator: Arc<dyn Evaluator>,
    ) -> Option<Arc<dyn Evaluator>> {
        self.evaluators.insert(kind, evaluator)
    }

    /// Builder form of [`register`](EvaluatorRegistry::register).
    pub fn with(mut self, kind: RuleKind, evaluator: Arc<dyn Evaluator>) -> Self {
        self.register(kind, evaluator);
        self
    }

    /// Use `evaluator` for every kind that has none yet.
    pub fn with_default(mut self, evaluator: Arc<dyn Evaluator>) -> Self {
        for kind in RuleKind::ALL {
            self.evaluators
                .entry(kind)
                .or_insert_with(|| Arc::clone(&evaluator));
        }
        self
    }

    pub fn get(&self, kind: RuleKind) -> Option<&Arc<dyn Evaluator>> {
        self.evaluators.get(&kind)
    }

    pub fn len(&self) -> usize {
        self.evaluators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.evaluators.is_empty()
    }
}
