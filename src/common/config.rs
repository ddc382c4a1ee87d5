//! Configuration file handling

use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

use super::{Error, Result};

/// Main configuration structure
#[derive(Debug, Deserialize, Default)]
pub struct HarnessConfig {
    /// Remote claims API settings
    #[serde(default)]
    pub api: ApiConfig,

    /// Pacing settings
    #[serde(default)]
    pub pacing: PacingConfig,

    /// Timeout settings
    #[serde(default)]
    pub timeouts: Timeouts,
}

/// Remote claims API settings
#[derive(Debug, Deserialize, Clone)]
pub struct ApiConfig {
    /// Base URL of the claims submission API
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Bearer token for authentication, if required
    pub token: Option<String>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            token: None,
        }
    }
}

fn default_base_url() -> String {
    "http://localhost:8000".to_string()
}

/// Pacing settings
///
/// The pacing delay is a rate-limit policy against the downstream claims
/// system, which mis-processes requests submitted in rapid succession.
#[derive(Debug, Deserialize, Clone)]
pub struct PacingConfig {
    /// Delay between sequential submissions, in milliseconds
    #[serde(default = "default_pacing_ms")]
    pub pacing_ms: u64,
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            pacing_ms: default_pacing_ms(),
        }
    }
}

fn default_pacing_ms() -> u64 {
    3000
}

impl PacingConfig {
    /// The pacing delay as a Duration
    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.pacing_ms)
    }
}

/// Timeout settings in seconds
#[derive(Debug, Deserialize, Clone)]
pub struct Timeouts {
    /// Timeout for one claim submission request
    #[serde(default = "default_submit")]
    pub submit_secs: u64,

    /// Timeout for one status refresh request
    #[serde(default = "default_refresh")]
    pub refresh_secs: u64,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            submit_secs: default_submit(),
            refresh_secs: default_refresh(),
        }
    }
}

fn default_submit() -> u64 {
    30
}
fn default_refresh() -> u64 {
    15
}

impl HarnessConfig {
    /// Load configuration from a TOML file
    ///
    /// Returns default configuration if the file doesn't exist
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let content =
                std::fs::read_to_string(path).map_err(|e| Error::file_read(path, &e))?;
            return toml::from_str(&content).map_err(|e| Error::ConfigParse(e.to_string()));
        }
        Ok(Self::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_when_missing() {
        let config = HarnessConfig::load_from(Path::new("/nonexistent/harness.toml")).unwrap();
        assert_eq!(config.pacing.pacing_ms, 3000);
        assert_eq!(config.timeouts.submit_secs, 30);
        assert_eq!(config.api.base_url, "http://localhost:8000");
        assert!(config.api.token.is_none());
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("harness.toml");
        std::fs::write(
            &path,
            r#"
[api]
base_url = "https://claims.example.test"
token = "secret"

[pacing]
pacing_ms = 500
"#,
        )
        .unwrap();

        let config = HarnessConfig::load_from(&path).unwrap();
        assert_eq!(config.api.base_url, "https://claims.example.test");
        assert_eq!(config.api.token.as_deref(), Some("secret"));
        assert_eq!(config.pacing.pacing_ms, 500);
        assert_eq!(config.pacing.delay(), Duration::from_millis(500));
        // Section absent from the file keeps its defaults
        assert_eq!(config.timeouts.refresh_secs, 15);
    }

    #[test]
    fn test_invalid_toml_is_a_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("harness.toml");
        std::fs::write(&path, "pacing = [not toml").unwrap();

        let err = HarnessConfig::load_from(&path).unwrap_err();
        assert!(matches!(err, Error::ConfigParse(_)));
    }
}
