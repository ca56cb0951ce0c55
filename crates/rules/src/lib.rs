//! Rule loading, scheduling and dispatch for the alerter.
//!
//! This crate provides:
//! - Typed YAML rule definitions, one variant per rule type
//! - Directory scanning (sequential walk or bounded task-per-directory)
//! - Concurrent rule loading with per-file error isolation and hot reload
//! - Per-kind evaluator dispatch
//! - A fixed-interval, non-overlapping, cancellable scheduler

pub mod dispatcher;
pub mod loader;
pub mod scanner;
pub mod scheduler;
pub mod schema;
