//! [`RuleDispatcher`]: routes every rule of a set to its evaluator.

use std::any::Any;
use std::panic::AssertUnwindSafe;

use futures::FutureExt;
use tracing::{debug, warn};

use crate::loader::RuleSet;
use crate::schema::{RuleDefinition, RuleKind};

use super::evaluator::{EvalContext, EvalError, EvaluatorRegistry};

/// Why a single rule was not evaluated successfully.
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error("no evaluator registered for {0} rules")]
    NoEvaluator(RuleKind),

    #[error(transparent)]
    Evaluator(#[from] EvalError),

    #[error("evaluator panicked: {0}")]
    Panicked(String),
}

/// Per-tick tally.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchReport {
    /// Rules whose evaluator returned `Ok`.
    pub evaluated: usize,
    /// Rules whose evaluator returned an error or panicked.
    pub failed: usize,
    /// Rules whose kind has no evaluator.
    pub missing: usize,
}

impl DispatchReport {
    pub fn total(&self) -> usize {
        self.evaluated + self.failed + self.missing
    }
}

/// Hands each rule to the evaluator registered for its kind.
///
/// A rule that fails, panics or has no evaluator is logged and counted;
/// the remaining rules of the set are still dispatched.
#[derive(Clone)]
pub struct RuleDispatcher {
    registry: EvaluatorRegistry,
}

impl RuleDispatcher {
    pub fn new(registry: EvaluatorRegistry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &EvaluatorRegistry {
        &self.registry
    }

    /// Dispatch every rule in `rules`, in order, one at a time.
    pub async fn dispatch_all(&self, rules: &RuleSet, ctx: &EvalContext) -> DispatchReport {
        let mut report = DispatchReport::default();

        for rule in rules {
            match self.dispatch_one(rule, ctx).await {
                Ok(()) => {
                    debug!(rule = %rule.name(), kind = %rule.kind(), "rule evaluated");
                    report.evaluated += 1;
                }
                Err(e @ DispatchError::NoEvaluator(_)) => {
                    warn!(rule = %rule.name(), error = %e, "rule skipped");
                    report.missing += 1;
                }
                Err(e) => {
                    warn!(rule = %rule.name(), kind = %rule.kind(), error = %e, "rule evaluation failed");
                    report.failed += 1;
                }
            }
        }

        report
    }

    /// Dispatch a single rule.
    pub async fn dispatch_one(
        &self,
        rule: &RuleDefinition,
        ctx: &EvalContext,
    ) -> Result<(), DispatchError> {
        let kind = rule.kind();
        let evaluator = self
            .registry
            .get(kind)
            .ok_or(DispatchError::NoEvaluator(kind))?;

        match AssertUnwindSafe(evaluator.evaluate(rule, ctx)).catch_unwind().await {
            Ok(result) => result.map_err(DispatchError::from),
            Err(payload) => Err(DispatchError::Panicked(panic_message(payload.as_ref()))),
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
