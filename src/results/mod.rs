//! Execution outcomes and the result aggregator
//!
//! The aggregator is an append-only ordered collection of outcomes,
//! decoupled from any rendering layer. The only mutation it supports is
//! the targeted per-claim [`ResultAggregator::refresh`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::client::{RefreshClient, ValidationIssue};
use crate::common::{Error, Result};
use crate::payload::SubmissionPayload;

/// Status of one submission attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutcomeStatus {
    Passed,
    Failed,
    /// Transient, used only while an attempt is in flight; never stored
    Running,
}

impl std::fmt::Display for OutcomeStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Passed => write!(f, "passed"),
            Self::Failed => write!(f, "failed"),
            Self::Running => write!(f, "running"),
        }
    }
}

/// Raw request/response detail of one attempt
///
/// `request` is the immutable audit trail: refresh never touches it.
/// Exactly one of `response`/`error` is populated once the outcome is
/// terminal.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutcomeDetails {
    pub request: SubmissionPayload,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default)]
    pub validation_errors: Vec<ValidationIssue>,
}

/// The terminal record of one test-case submission attempt
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionOutcome {
    /// Generated identifier, stable across refreshes
    pub id: String,
    /// Remote claim identifier, present only on successful submission
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub claim_id: Option<String>,
    /// Title of the test case this outcome came from
    pub source_title: String,
    pub status: OutcomeStatus,
    pub duration_ms: u64,
    pub submitted_at: DateTime<Utc>,
    pub message: String,
    pub details: OutcomeDetails,
    /// Set by refresh each time the outcome is re-checked
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refreshed_at: Option<DateTime<Utc>>,
}

/// Fields returned to the caller after a successful refresh
#[derive(Debug, Clone)]
pub struct RefreshUpdate {
    /// Remote processing outcome string as reported
    pub outcome: String,
    pub status: OutcomeStatus,
    pub message: String,
    /// How many stored outcomes were updated
    pub updated: usize,
}

/// Append-only ordered collection of outcomes with targeted refresh
#[derive(Default)]
pub struct ResultAggregator {
    outcomes: Mutex<Vec<ExecutionOutcome>>,
    /// Per-claim locks so concurrent refreshes on the same claim id are
    /// serialized while different claims never contend
    claim_locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl ResultAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an outcome at the end
    ///
    /// Never reorders or deduplicates: the same title may legitimately
    /// appear more than once across groups or repeated runs.
    pub async fn append(&self, outcome: ExecutionOutcome) {
        self.outcomes.lock().await.push(outcome);
    }

    /// Ordered copy of all stored outcomes
    pub async fn snapshot(&self) -> Vec<ExecutionOutcome> {
        self.outcomes.lock().await.clone()
    }

    pub async fn len(&self) -> usize {
        self.outcomes.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.outcomes.lock().await.is_empty()
    }

    /// Re-fetch the remote status for a claim and update every stored
    /// outcome with a matching claim id in place
    ///
    /// `status`, `message` and `refreshed_at` are replaced; `id` and
    /// `details.request` are never touched. Errors leave stored state
    /// untouched.
    pub async fn refresh(
        &self,
        claim_id: &str,
        hint: Option<&str>,
        client: &dyn RefreshClient,
    ) -> Result<RefreshUpdate> {
        let lock = self.claim_lock(claim_id).await;
        let _guard = lock.lock().await;

        let report = client.fetch_status(claim_id, hint).await?;
        let status = map_remote_status(claim_id, &report.status)?;
        let message = report
            .message
            .clone()
            .unwrap_or_else(|| format!("Remote status: {}", report.status));

        let refreshed_at = Utc::now();
        let mut outcomes = self.outcomes.lock().await;
        let mut updated = 0;
        for outcome in outcomes
            .iter_mut()
            .filter(|o| o.claim_id.as_deref() == Some(claim_id))
        {
            outcome.status = status;
            outcome.message = message.clone();
            outcome.refreshed_at = Some(refreshed_at);
            updated += 1;
        }

        tracing::info!(claim_id, %status, updated, "Refreshed stored outcomes");
        Ok(RefreshUpdate {
            outcome: report.outcome,
            status,
            message,
            updated,
        })
    }

    async fn claim_lock(&self, claim_id: &str) -> Arc<Mutex<()>> {
        let mut locks = self.claim_locks.lock().await;
        locks
            .entry(claim_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }
}

/// Map a remote adjudication status to an outcome status
///
/// A claim that exists but has not reached a terminal status yet is
/// `RefreshUnavailable`; the caller is told, stored outcomes stay as-is.
fn map_remote_status(claim_id: &str, remote: &str) -> Result<OutcomeStatus> {
    match remote.to_ascii_lowercase().as_str() {
        "approved" | "accepted" | "completed" => Ok(OutcomeStatus::Passed),
        "rejected" | "denied" | "declined" => Ok(OutcomeStatus::Failed),
        other => Err(Error::refresh_unavailable(claim_id, other)),
    }
}
