//! Per-tick rule dispatch.
//!
//! The evaluation algorithms themselves (frequency, spike, cardinality, ...)
//! live behind the [`Evaluator`] trait. The dispatcher only decides which
//! evaluator a rule goes to and keeps one rule's failure from affecting the
//! rest of the tick.

mod core;
mod evaluator;


pub use self::core::{DispatchError, DispatchReport, RuleDispatcher};
pub use self::evaluator::{EvalContext, EvalError, Evaluator, EvaluatorRegistry, LoggingEvaluator};
