//! Error types for the claims harness
//!
//! Errors fall into three classes with different propagation rules:
//! configuration errors abort a run before any network activity, per-item
//! submission errors degrade to recorded failed outcomes, and refresh
//! errors are reported without touching stored state.

use std::io;
use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the claims harness
#[derive(Error, Debug)]
pub enum Error {
    // === Configuration Errors (abort the run) ===
    #[error("Test case '{0}' not found in the selected groups")]
    TestCaseNotFound(String),

    #[error("Invalid test case '{title}': {reason}")]
    InvalidTestCase { title: String, reason: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid configuration file: {0}")]
    ConfigParse(String),

    #[error("Invalid test suite file: {0}")]
    SuiteParse(String),

    #[error("Failed to read file '{path}': {error}")]
    FileRead { path: String, error: String },

    // === Submission Errors (recorded as failed outcomes) ===
    #[error("Submission failed: {0}")]
    Submission(String),

    #[error("Submission timed out after {0} seconds")]
    Timeout(u64),

    // === Refresh Errors (reported, stored state untouched) ===
    #[error("Claim '{0}' not found in the system of record")]
    ClaimNotFound(String),

    #[error("Claim '{claim_id}' has no terminal status yet (currently '{status}')")]
    RefreshUnavailable { claim_id: String, status: String },

    // === IO Errors ===
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    // === Serialization Errors ===
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // === Internal Errors ===
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create an invalid test case error
    pub fn invalid_test_case(title: &str, reason: &str) -> Self {
        Self::InvalidTestCase {
            title: title.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Create a file read error
    pub fn file_read(path: &std::path::Path, error: &impl std::fmt::Display) -> Self {
        Self::FileRead {
            path: path.display().to_string(),
            error: error.to_string(),
        }
    }

    /// Create a refresh unavailable error
    pub fn refresh_unavailable(claim_id: &str, status: &str) -> Self {
        Self::RefreshUnavailable {
            claim_id: claim_id.to_string(),
            status: status.to_string(),
        }
    }

    /// Whether this error belongs to the configuration class, i.e. it is
    /// allowed to interrupt a run before any network call is made.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::TestCaseNotFound(_)
                | Self::InvalidTestCase { .. }
                | Self::Config(_)
                | Self::ConfigParse(_)
                | Self::SuiteParse(_)
                | Self::FileRead { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configuration_class() {
        assert!(Error::TestCaseNotFound("x".to_string()).is_configuration());
        assert!(Error::invalid_test_case("t", "no line items").is_configuration());
        assert!(!Error::Submission("boom".to_string()).is_configuration());
        assert!(!Error::ClaimNotFound("c-1".to_string()).is_configuration());
    }

    #[test]
    fn test_messages_are_actionable() {
        let err = Error::refresh_unavailable("CLM-9", "queued");
        assert!(err.to_string().contains("CLM-9"));
        assert!(err.to_string().contains("queued"));
    }
}
