//! [`Scheduler`]: fixed-interval tick loop over the loaded rule set.

use std::time::Duration;

use chrono::{DateTime, Utc};
use elastalert_core::{DurationError, DurationStr};
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::dispatcher::{DispatchReport, EvalContext, RuleDispatcher};
use crate::loader::SharedRuleSet;

/// Scheduler lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    /// Waiting for the next tick or for cancellation.
    Idle,
    /// Dispatching the rule set.
    Ticking,
    /// Cancelled; the loop has exited.
    Terminated,
}

impl std::fmt::Display for SchedulerState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Idle => write!(f, "Idle"),
            Self::Ticking => write!(f, "Ticking"),
            Self::Terminated => write!(f, "Terminated"),
        }
    }
}

/// Startup errors; the process cannot run without a valid interval.
#[derive(Debug, thiserror::Error)]
pub enum SchedulerError {
    #[error("invalid run interval '{value}': {source}")]
    InvalidInterval {
        value: String,
        #[source]
        source: DurationError,
    },

    #[error("run interval must be greater than zero")]
    ZeroInterval,
}

/// What a finished [`Scheduler::run`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchedulerSummary {
    pub ticks: u64,
}

/// Runs the dispatcher over the current rule set once per interval.
///
/// Ticks never overlap: each dispatch is awaited inside the loop. When a
/// tick runs longer than the interval the missed firings are not replayed;
/// the next tick fires as soon as the slow one returns and later ticks
/// keep a full interval from it (`MissedTickBehavior::Delay`).
pub struct Scheduler {
    every: Duration,
    rules: SharedRuleSet,
    dispatcher: RuleDispatcher,
    start_time: DateTime<Utc>,
    state: watch::Sender<SchedulerState>,
}

impl Scheduler {
    /// Build a scheduler from a textual interval such as `"30s"`.
    pub fn new(
        run_every: &DurationStr,
        rules: SharedRuleSet,
        dispatcher: RuleDispatcher,
    ) -> Result<Self, SchedulerError> {
        let every = run_every
            .to_duration()
            .map_err(|source| SchedulerError::InvalidInterval {
                value: run_every.to_string(),
                source,
            })?;
        Self::with_interval(every, rules, dispatcher)
    }

    pub fn with_interval(
        every: Duration,
        rules: SharedRuleSet,
        dispatcher: RuleDispatcher,
    ) -> Result<Self, SchedulerError> {
        if every.is_zero() {
            return Err(SchedulerError::ZeroInterval);
        }
        let (state, _) = watch::channel(SchedulerState::Idle);
        Ok(Self {
            every,
            rules,
            dispatcher,
            start_time: Utc::now(),
            state,
        })
    }

    /// Override the alerter start time handed to evaluators.
    pub fn with_start_time(mut self, start_time: DateTime<Utc>) -> Self {
        self.start_time = start_time;
        self
    }

    pub fn interval(&self) -> Duration {
        self.every
    }

    pub fn start_time(&self) -> DateTime<Utc> {
        self.start_time
    }

    /// Observe state transitions.
    pub fn state_handle(&self) -> watch::Receiver<SchedulerState> {
        self.state.subscribe()
    }

    pub fn state(&self) -> SchedulerState {
        *self.state.borrow()
    }

    /// Dispatch the current rule set once.
    pub async fn tick_once(&self, tick: u64) -> DispatchReport {
        let rules = self.rules.snapshot();
        let ctx = EvalContext::new(self.start_time, tick);
        debug!(tick, rules = rules.len(), "tick started");

        let report = self.dispatcher.dispatch_all(&rules, &ctx).await;
        info!(
            tick,
            evaluated = report.evaluated,
            failed = report.failed,
            missing = report.missing,
            "tick finished"
        );
        report
    }

    /// Tick until `shutdown` is cancelled.
    ///
    /// The first tick fires one interval after the call. Cancellation is
    /// checked before every tick, so a cancel raised while a tick is running
    /// ends the loop as soon as that tick returns.
    pub async fn run(self, shutdown: CancellationToken) -> SchedulerSummary {
        let mut ticker = tokio::time::interval(self.every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        ticker.tick().await; // the first tick completes immediately

        info!(every = ?self.every, "scheduler started");
        let mut ticks = 0u64;

        loop {
            tokio::select! {
                biased;
                _ = shutdown.cancelled() => break,
                _ = ticker.tick() => {
                    ticks += 1;
                    self.state.send_replace(SchedulerState::Ticking);
                    self.tick_once(ticks).await;
                    self.state.send_replace(SchedulerState::Idle);
                }
            }
        }

        self.state.send_replace(SchedulerState::Terminated);
        info!(ticks, "run cancelled, scheduler stopped");
        SchedulerSummary { ticks }
    }
}
