//! Submission and refresh clients
//!
//! The orchestrator and aggregator are agnostic to transport; they depend
//! on these traits only. [`http::ClaimsApiClient`] is the HTTP/JSON
//! implementation against the remote claims API.

pub mod http;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::common::Result;
use crate::payload::SubmissionPayload;

pub use http::ClaimsApiClient;

/// A field-level rejection from remote validation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationIssue {
    /// Path of the rejected field within the submitted payload
    pub path: String,
    pub message: String,
}

/// Structured result of one claim submission
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitResponse {
    /// Whether the remote API accepted the claim
    pub success: bool,
    /// Remote claim identifier, present on acceptance
    #[serde(default)]
    pub claim_id: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub validation_errors: Vec<ValidationIssue>,
    /// Raw response body, kept for the audit trail
    #[serde(default)]
    pub raw: serde_json::Value,
}

/// Submits built payloads to the remote claims API
#[async_trait]
pub trait SubmissionClient: Send + Sync {
    /// Submit one payload
    ///
    /// A remote rejection (validation failure) is a structured response
    /// with `success = false`, not an error; errors are reserved for
    /// transport failures, timeouts and unparseable bodies.
    async fn submit(&self, payload: &SubmissionPayload) -> Result<SubmitResponse>;
}

/// Point-in-time status of a claim in the system of record
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimStatusReport {
    /// Processing outcome (e.g. "complete", "queued")
    pub outcome: String,
    /// Adjudication status (e.g. "approved", "rejected")
    pub status: String,
    #[serde(default)]
    pub message: Option<String>,
    /// Status of the remote rule engine pass, where reported
    #[serde(default)]
    pub rule_status: Option<String>,
}

/// Re-fetches the current status of a previously submitted claim
#[async_trait]
pub trait RefreshClient: Send + Sync {
    /// Fetch the current remote status for a claim
    ///
    /// `hint` is an opaque routing hint some deployments require (e.g. the
    /// submitting facility). Fails with `Error::ClaimNotFound` when the
    /// system of record has no such claim.
    async fn fetch_status(&self, claim_id: &str, hint: Option<&str>)
        -> Result<ClaimStatusReport>;
}
