//! Claims Harness - test execution against a claims submission API
//!
//! This library builds canonical claim payloads from declarative test
//! cases, submits them one at a time with an enforced pacing delay, and
//! aggregates pass/fail outcomes that can be refreshed against the system
//! of record.

pub mod catalog;
pub mod client;
pub mod common;
pub mod model;
pub mod payload;
pub mod results;
pub mod runner;

// Re-export commonly used types
pub use common::{Error, Result};
pub use model::{ExecutionGroup, TestCase, TestCaseKind};
pub use results::{ExecutionOutcome, OutcomeStatus, ResultAggregator};
pub use runner::{CancelHandle, Orchestrator, RunPlan, RunSummary, Sampler};
