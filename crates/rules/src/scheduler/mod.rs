//! Fixed-interval scheduling of rule evaluation.
//!
//! The [`Scheduler`] owns the interval timer and a cancellation token. On
//! each tick it takes a snapshot of the shared rule set and hands it to the
//! [`RuleDispatcher`](crate::dispatcher::RuleDispatcher).

mod core;


pub use self::core::{Scheduler, SchedulerError, SchedulerState, SchedulerSummary};
