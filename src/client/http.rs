//! HTTP implementation of the submission and refresh clients

use async_trait::async_trait;
use std::time::Duration;

use crate::common::config::{ApiConfig, Timeouts};
use crate::common::{Error, Result};
use crate::payload::SubmissionPayload;

use super::{ClaimStatusReport, RefreshClient, SubmissionClient, SubmitResponse, ValidationIssue};

/// Client for the remote claims API
pub struct ClaimsApiClient {
    client: reqwest::Client,
    base_url: String,
    token: Option<String>,
    timeouts: Timeouts,
}

impl ClaimsApiClient {
    pub fn new(api: &ApiConfig, timeouts: &Timeouts) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: api.base_url.clone(),
            token: api.token.clone(),
            timeouts: timeouts.clone(),
        }
    }

    fn url(&self, path: &str) -> String {
        if self.base_url.ends_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }
}

#[async_trait]
impl SubmissionClient for ClaimsApiClient {
    #[tracing::instrument(skip(self, payload), fields(title = %payload.title))]
    async fn submit(&self, payload: &SubmissionPayload) -> Result<SubmitResponse> {
        let request = self
            .authorize(self.client.post(self.url("claims")))
            .timeout(Duration::from_secs(self.timeouts.submit_secs))
            .json(payload);

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                Error::Timeout(self.timeouts.submit_secs)
            } else {
                Error::Submission(format!("Request failed: {}", e))
            }
        })?;

        let status = response.status();
        let body: serde_json::Value = response.json().await.map_err(|e| {
            Error::Submission(format!("Non-JSON response ({}): {}", status, e))
        })?;

        tracing::debug!(status = %status, "Submission response received");
        Ok(parse_submit_body(status.is_success(), body))
    }
}

#[async_trait]
impl RefreshClient for ClaimsApiClient {
    #[tracing::instrument(skip(self))]
    async fn fetch_status(
        &self,
        claim_id: &str,
        hint: Option<&str>,
    ) -> Result<ClaimStatusReport> {
        let mut request = self
            .authorize(self.client.get(self.url(&format!("claims/{}/status", claim_id))))
            .timeout(Duration::from_secs(self.timeouts.refresh_secs));
        if let Some(hint) = hint {
            request = request.query(&[("hint", hint)]);
        }

        let response = request
            .send()
            .await
            .map_err(|e| Error::Submission(format!("Status request failed: {}", e)))?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(Error::ClaimNotFound(claim_id.to_string()));
        }
        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(Error::Submission(format!(
                "Status request failed ({}): {}",
                status, text
            )));
        }

        response
            .json::<ClaimStatusReport>()
            .await
            .map_err(|e| Error::Submission(format!("Invalid status body: {}", e)))
    }
}

/// Build a structured submit response from the remote body
///
/// A non-2xx status with a parseable JSON body is a remote rejection, not
/// a transport failure: it still yields a structured response so the
/// orchestrator records validation errors per field.
fn parse_submit_body(http_success: bool, body: serde_json::Value) -> SubmitResponse {
    let success = http_success
        && body
            .get("success")
            .and_then(|v| v.as_bool())
            .unwrap_or(true);

    let claim_id = body
        .get("claimId")
        .and_then(|v| v.as_str())
        .map(|s| s.to_string());

    let message = body
        .get("message")
        .and_then(|v| v.as_str())
        .map(|s| s.to_string());

    let validation_errors = body
        .get("validationErrors")
        .and_then(|v| v.as_array())
        .map(|errors| {
            errors
                .iter()
                .map(|e| ValidationIssue {
                    path: e.get("path").and_then(|v| v.as_str()).unwrap_or("").to_string(),
                    message: e
                        .get("message")
                        .and_then(|v| v.as_str())
                        .unwrap_or("")
                        .to_string(),
                })
                .collect()
        })
        .unwrap_or_default();

    SubmitResponse {
        success,
        claim_id,
        message,
        validation_errors,
        raw: body,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_url_join_handles_trailing_slash() {
        let mut api = ApiConfig::default();
        api.base_url = "https://claims.example.test/".to_string();
        let client = ClaimsApiClient::new(&api, &Timeouts::default());
        assert_eq!(client.url("claims"), "https://claims.example.test/claims");

        api.base_url = "https://claims.example.test".to_string();
        let client = ClaimsApiClient::new(&api, &Timeouts::default());
        assert_eq!(
            client.url("claims/CLM-1/status"),
            "https://claims.example.test/claims/CLM-1/status"
        );
    }

    #[test]
    fn test_parse_accepted_body() {
        let parsed = parse_submit_body(
            true,
            json!({"success": true, "claimId": "CLM-42", "message": "accepted"}),
        );
        assert!(parsed.success);
        assert_eq!(parsed.claim_id.as_deref(), Some("CLM-42"));
        assert_eq!(parsed.raw["claimId"], "CLM-42");
    }

    #[test]
    fn test_parse_rejection_with_validation_errors() {
        let parsed = parse_submit_body(
            false,
            json!({
                "message": "validation failed",
                "validationErrors": [
                    {"path": "productOrService[0].netAmount", "message": "tariff mismatch"},
                    {"path": "provider", "message": "unknown facility"}
                ]
            }),
        );
        assert!(!parsed.success);
        assert!(parsed.claim_id.is_none());
        assert_eq!(parsed.validation_errors.len(), 2);
        assert_eq!(
            parsed.validation_errors[0].path,
            "productOrService[0].netAmount"
        );
    }

    #[test]
    fn test_parse_2xx_with_explicit_failure_flag() {
        let parsed = parse_submit_body(true, json!({"success": false, "message": "duplicate"}));
        assert!(!parsed.success);
    }
}
