//! Execution orchestrator
//!
//! Resolves selected titles, builds every payload up front (configuration
//! errors abort before any network call), then submits one item at a time,
//! recording each outcome before the next item starts.

use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Duration;

use chrono::Utc;
use futures_util::Stream;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

use crate::client::{SubmissionClient, SubmitResponse};
use crate::common::{Error, Result};
use crate::model::{ExecutionGroup, TestCase, TestCaseKind};
use crate::payload::{self, BuiltPayload};
use crate::results::{ExecutionOutcome, OutcomeDetails, OutcomeStatus, ResultAggregator};

/// Default pacing delay between submissions
pub const DEFAULT_PACING: Duration = Duration::from_millis(3000);

/// What to run: ordered groups, an optional title selection, and pacing
#[derive(Debug, Clone)]
pub struct RunPlan {
    pub groups: Vec<ExecutionGroup>,
    /// Titles to run; `None` runs every case in every group
    pub selection: Option<Vec<String>>,
    pub pacing: Duration,
}

impl RunPlan {
    pub fn new(groups: Vec<ExecutionGroup>) -> Self {
        Self {
            groups,
            selection: None,
            pacing: DEFAULT_PACING,
        }
    }

    pub fn with_selection(mut self, titles: Vec<String>) -> Self {
        self.selection = Some(titles);
        self
    }

    pub fn with_pacing(mut self, pacing: Duration) -> Self {
        self.pacing = pacing;
        self
    }
}

/// Position of the run loop, published for observers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunProgress {
    /// Name of the group the current item belongs to
    pub group: String,
    /// Index within the full concatenated run, 0-based
    pub index: usize,
    pub total: usize,
    pub title: String,
}

/// Totals for one completed run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    /// Whether the run stopped early on a cancellation request
    pub cancelled: bool,
}

/// Cooperative cancellation signal
///
/// Checked at the top of each loop iteration, never mid-submission: the
/// in-flight item completes and its outcome is still recorded.
#[derive(Debug, Clone, Default)]
pub struct CancelHandle(Arc<AtomicBool>);

impl CancelHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Ordered stream of outcomes from one run; closes when the loop ends
pub struct OutcomeStream {
    rx: mpsc::UnboundedReceiver<ExecutionOutcome>,
}

impl OutcomeStream {
    /// Receive the next outcome, or `None` once the run loop has ended
    pub async fn recv(&mut self) -> Option<ExecutionOutcome> {
        self.rx.recv().await
    }
}

impl Stream for OutcomeStream {
    type Item = ExecutionOutcome;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.get_mut().rx.poll_recv(cx)
    }
}

/// A run in progress
pub struct RunningBatch {
    /// Outcome events in execution order
    pub outcomes: OutcomeStream,
    /// Observes which group/index/title is currently running
    pub progress: watch::Receiver<Option<RunProgress>>,
    cancel: CancelHandle,
    handle: JoinHandle<RunSummary>,
}

impl RunningBatch {
    pub fn cancel_handle(&self) -> CancelHandle {
        self.cancel.clone()
    }

    /// Wait for the run loop to finish
    pub async fn wait(self) -> Result<RunSummary> {
        self.handle
            .await
            .map_err(|e| Error::Internal(format!("Run task failed: {}", e)))
    }
}

/// One resolved, pre-built item of a run
#[derive(Debug)]
struct ResolvedCase {
    group: String,
    case: TestCase,
    built: BuiltPayload,
}

/// Drives sequential paced execution of test-case batches
pub struct Orchestrator {
    submitter: Arc<dyn SubmissionClient>,
    aggregator: Arc<ResultAggregator>,
}

impl Orchestrator {
    pub fn new(submitter: Arc<dyn SubmissionClient>, aggregator: Arc<ResultAggregator>) -> Self {
        Self {
            submitter,
            aggregator,
        }
    }

    /// Start a run
    ///
    /// Resolution and payload building happen here, synchronously:
    /// configuration errors (`TestCaseNotFound`, `InvalidTestCase`) abort
    /// the whole run before any network call is made.
    pub fn start(&self, plan: RunPlan) -> Result<RunningBatch> {
        let resolved = resolve(&plan)?;

        let (outcome_tx, outcome_rx) = mpsc::unbounded_channel();
        let (progress_tx, progress_rx) = watch::channel(None);
        let cancel = CancelHandle::new();

        let handle = tokio::spawn(run_loop(
            Arc::clone(&self.submitter),
            Arc::clone(&self.aggregator),
            resolved,
            plan.pacing,
            cancel.clone(),
            outcome_tx,
            progress_tx,
        ));

        Ok(RunningBatch {
            outcomes: OutcomeStream { rx: outcome_rx },
            progress: progress_rx,
            cancel,
            handle,
        })
    }
}

/// Resolve the plan's selection and build every payload
fn resolve(plan: &RunPlan) -> Result<Vec<ResolvedCase>> {
    // Groups are concatenated in order, each preserving its internal
    // order; groups are never interleaved.
    let all: Vec<(&str, &TestCase)> = plan
        .groups
        .iter()
        .flat_map(|g| g.test_cases.iter().map(move |c| (g.name.as_str(), c)))
        .collect();

    let selected: Vec<(&str, &TestCase)> = match &plan.selection {
        Some(titles) => {
            for title in titles {
                if !all.iter().any(|(_, c)| &c.title == title) {
                    return Err(Error::TestCaseNotFound(title.clone()));
                }
            }
            all.into_iter()
                .filter(|(_, c)| titles.contains(&c.title))
                .collect()
        }
        None => all,
    };

    selected
        .into_iter()
        .map(|(group, case)| {
            Ok(ResolvedCase {
                group: group.to_string(),
                case: case.clone(),
                built: payload::build(case)?,
            })
        })
        .collect()
}

#[tracing::instrument(skip_all, fields(items = resolved.len()))]
async fn run_loop(
    submitter: Arc<dyn SubmissionClient>,
    aggregator: Arc<ResultAggregator>,
    resolved: Vec<ResolvedCase>,
    pacing: Duration,
    cancel: CancelHandle,
    outcome_tx: mpsc::UnboundedSender<ExecutionOutcome>,
    progress_tx: watch::Sender<Option<RunProgress>>,
) -> RunSummary {
    let total = resolved.len();
    let mut summary = RunSummary {
        total,
        ..Default::default()
    };

    for (index, item) in resolved.into_iter().enumerate() {
        if cancel.is_cancelled() {
            tracing::info!(index, "Run cancelled, no further items started");
            summary.cancelled = true;
            break;
        }

        let _ = progress_tx.send(Some(RunProgress {
            group: item.group.clone(),
            index,
            total,
            title: item.case.title.clone(),
        }));

        let submitted_at = Utc::now();
        let started = tokio::time::Instant::now();
        let result = submitter.submit(&item.built.payload).await;
        let duration_ms = started.elapsed().as_millis() as u64;

        let outcome = match result {
            Ok(response) => {
                let (status, message) = interpret(item.case.kind, &response);
                tracing::info!(
                    title = %item.case.title,
                    group = %item.group,
                    %status,
                    duration_ms,
                    "Submission completed"
                );
                ExecutionOutcome {
                    id: uuid::Uuid::new_v4().to_string(),
                    claim_id: response.claim_id.clone(),
                    source_title: item.case.title.clone(),
                    status,
                    duration_ms,
                    submitted_at,
                    message,
                    details: OutcomeDetails {
                        request: item.built.payload.clone(),
                        response: Some(response.raw),
                        error: None,
                        validation_errors: response.validation_errors,
                    },
                    refreshed_at: None,
                }
            }
            Err(e) => {
                // A single item's transport failure never aborts the batch
                tracing::warn!(
                    title = %item.case.title,
                    group = %item.group,
                    error = %e,
                    duration_ms,
                    "Submission errored, continuing with next item"
                );
                ExecutionOutcome {
                    id: uuid::Uuid::new_v4().to_string(),
                    claim_id: None,
                    source_title: item.case.title.clone(),
                    status: OutcomeStatus::Failed,
                    duration_ms,
                    submitted_at,
                    message: e.to_string(),
                    details: OutcomeDetails {
                        request: item.built.payload.clone(),
                        response: None,
                        error: Some(e.to_string()),
                        validation_errors: Vec::new(),
                    },
                    refreshed_at: None,
                }
            }
        };

        match outcome.status {
            OutcomeStatus::Passed => summary.passed += 1,
            _ => summary.failed += 1,
        }

        // Visible to observers before the next item starts
        aggregator.append(outcome.clone()).await;
        let _ = outcome_tx.send(outcome);

        // Unconditional pacing after every item except the last
        if index + 1 < total {
            tokio::time::sleep(pacing).await;
        }
    }

    let _ = progress_tx.send(None);
    summary
}

/// Interpret a structured submission response against the test-case kind
///
/// Negative cases exist to prove the remote validator rejects bad input,
/// so a rejection passes them and an acceptance fails them.
fn interpret(kind: TestCaseKind, response: &SubmitResponse) -> (OutcomeStatus, String) {
    let passed = match kind {
        TestCaseKind::Positive => response.success,
        TestCaseKind::Negative => !response.success,
    };
    let message = response.message.clone().unwrap_or_else(|| {
        if response.success {
            "Claim accepted".to_string()
        } else {
            "Claim rejected by remote validation".to_string()
        }
    });
    let status = if passed {
        OutcomeStatus::Passed
    } else {
        OutcomeStatus::Failed
    };
    (status, message)
}
