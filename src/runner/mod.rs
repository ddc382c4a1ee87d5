//! Sequential test-case execution
//!
//! One logical worker per run: items are submitted strictly in order with
//! an enforced pacing delay between them. The pacing is a deliberate
//! rate-limit against the downstream claims system, not an implementation
//! limitation.

pub mod orchestrator;
pub mod sampler;

pub use orchestrator::{
    CancelHandle, Orchestrator, OutcomeStream, RunPlan, RunProgress, RunSummary, RunningBatch,
};
pub use sampler::Sampler;
