//! Domain types for declarative claim test cases
//!
//! Test cases are authored externally (YAML suites, see [`crate::catalog`])
//! and are read-only to the orchestrator. Field names follow the camelCase
//! wire convention of the remote claims API.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Whether a test case expects the remote API to accept or reject it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TestCaseKind {
    /// The submission should be accepted
    Positive,
    /// The submission should be rejected by remote validation
    Negative,
}

impl std::fmt::Display for TestCaseKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Positive => write!(f, "positive"),
            Self::Negative => write!(f, "negative"),
        }
    }
}

/// How the payload is used by the remote API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum UsageMode {
    /// A regular claim submission
    #[default]
    Claim,
    /// A preauthorization request
    Preauthorization,
    /// A claim converted from a prior preauthorization
    PreauthClaim,
    /// A claim related to a previously submitted one
    Related,
}

impl UsageMode {
    /// The wire value for the payload's `use` field
    pub fn as_wire(&self) -> &'static str {
        match self {
            Self::Claim => "claim",
            Self::Preauthorization => "preauthorization",
            Self::PreauthClaim => "preauth-claim",
            Self::Related => "related",
        }
    }
}

/// Claim sub-type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ClaimSubType {
    Inpatient,
    #[default]
    Outpatient,
}

impl ClaimSubType {
    /// The wire value for the payload's `claimSubType` field
    pub fn as_wire(&self) -> &'static str {
        match self {
            Self::Inpatient => "inpatient",
            Self::Outpatient => "outpatient",
        }
    }
}

/// A monetary amount with its currency
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Money {
    pub value: Decimal,
    pub currency: String,
}

impl Money {
    pub fn new(value: Decimal, currency: &str) -> Self {
        Self {
            value,
            currency: currency.to_string(),
        }
    }
}

/// Service period of one line item
///
/// `start > end` is not rejected here; the remote validator owns that rule.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Period {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

/// Billable period of the whole claim
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BillablePeriod {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    /// Date the claim was created on the submitting side
    pub created: Option<NaiveDate>,
}

/// Reference to a patient, provider or practitioner directory entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartyRef {
    /// Directory identifier (e.g. a CR number or facility code)
    pub id: String,
    /// Human-readable name, if known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display: Option<String>,
}

impl PartyRef {
    pub fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            display: None,
        }
    }
}

/// One billable intervention on a claim
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    /// Position within the claim, 1-based
    pub sequence: u32,
    /// Intervention billing code (e.g. "SHA-08-005")
    pub code: String,
    pub display: String,
    #[serde(default = "default_quantity")]
    pub quantity: u32,
    pub unit_price: Money,
    #[serde(default)]
    pub service_period: Period,
    /// Whether the code belongs to the per-diem tariff class, i.e. its
    /// price is multiplied by the number of service days
    #[serde(default)]
    pub per_diem: bool,
}

fn default_quantity() -> u32 {
    1
}

/// A named, declarative description of one claim scenario
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestCase {
    /// Unique within the full set submitted in one run; titles are the
    /// join key between selection and execution
    pub title: String,
    pub kind: TestCaseKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patient: Option<PartyRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<PartyRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub practitioner: Option<PartyRef>,
    pub line_items: Vec<LineItem>,
    #[serde(default)]
    pub billable_period: BillablePeriod,
    /// Manual total override; when present it is submitted verbatim in
    /// place of the calculated sum
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub declared_total: Option<Money>,
    #[serde(default)]
    pub usage_mode: UsageMode,
    #[serde(default)]
    pub claim_sub_type: ClaimSubType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub related_claim_id: Option<String>,
    /// Bundle-only payloads may omit patient/provider; the remote side
    /// resolves run-time identifiers independently
    #[serde(default)]
    pub bundle_only: bool,
}

/// A named partition of test cases run as one logical batch
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionGroup {
    /// Group name, typically "positive" or "negative"
    pub name: String,
    pub test_cases: Vec<TestCase>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_usage_mode_wire_values() {
        assert_eq!(UsageMode::Claim.as_wire(), "claim");
        assert_eq!(UsageMode::PreauthClaim.as_wire(), "preauth-claim");
        assert_eq!(ClaimSubType::Inpatient.as_wire(), "inpatient");
    }

    #[test]
    fn test_parse_test_case_yaml() {
        let yaml = r#"
title: Valid Facility & Tariff
kind: positive
patient:
  id: CR-123
provider:
  id: FAC-77
  display: Test Facility
lineItems:
  - sequence: 1
    code: SHA-08-005
    display: Inpatient bed day
    unitPrice:
      value: 10000
      currency: KES
    servicePeriod:
      start: 2025-07-08
      end: 2025-07-10
    perDiem: true
billablePeriod:
  start: 2025-07-08
  end: 2025-07-10
"#;
        let case: TestCase = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(case.title, "Valid Facility & Tariff");
        assert_eq!(case.kind, TestCaseKind::Positive);
        assert_eq!(case.usage_mode, UsageMode::Claim);
        assert_eq!(case.line_items.len(), 1);
        let item = &case.line_items[0];
        assert!(item.per_diem);
        assert_eq!(item.quantity, 1);
        assert_eq!(item.unit_price.value, Decimal::from(10_000));
        assert_eq!(
            item.service_period.start,
            Some(NaiveDate::from_ymd_opt(2025, 7, 8).unwrap())
        );
    }

    #[test]
    fn test_kebab_case_usage_mode() {
        let mode: UsageMode = serde_yaml::from_str("preauth-claim").unwrap();
        assert_eq!(mode, UsageMode::PreauthClaim);
    }
}
