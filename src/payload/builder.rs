//! Payload builder
//!
//! Deterministic and side-effect-free: identical test cases produce
//! byte-identical payloads. Validation of field values is the remote API's
//! responsibility; the builder only rejects test cases it cannot express
//! as a payload at all.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::common::{Error, Result};
use crate::model::{LineItem, Money, PartyRef, Period, TestCase, UsageMode};

/// Canonical request body for one claim submission
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionPayload {
    pub title: String,
    /// Marks the submission as a validation-test claim
    pub test: bool,
    #[serde(rename = "use")]
    pub usage: String,
    pub claim_sub_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub patient: Option<PartyRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider: Option<PartyRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub practitioner: Option<PartyRef>,
    pub product_or_service: Vec<SubmittedLineItem>,
    pub billable_period: WirePeriod,
    pub total: Money,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub related_claim_id: Option<String>,
}

/// One line item as submitted
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmittedLineItem {
    pub sequence: u32,
    pub code: String,
    pub display: String,
    pub quantity: u32,
    pub unit_price: Money,
    pub service_period: WireDateRange,
    pub net_amount: Money,
}

/// Billable period on the wire
///
/// Missing dates serialize as empty strings rather than being omitted, to
/// keep the wire shape stable for the remote API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WirePeriod {
    pub start: String,
    pub end: String,
    pub created: String,
}

/// Service period on the wire
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireDateRange {
    pub start: String,
    pub end: String,
}

/// Result of building a payload
///
/// The calculated total is always exposed alongside the submitted one so a
/// caller can offer to discard a manual override.
#[derive(Debug, Clone, PartialEq)]
pub struct BuiltPayload {
    pub payload: SubmissionPayload,
    /// Sum of all line-item net amounts
    pub calculated_total: Money,
    /// Whether the submitted total came from a manual override
    pub total_overridden: bool,
}

/// Build the canonical payload for a test case
///
/// Uses the test case's `declared_total` as a manual override when present.
pub fn build(case: &TestCase) -> Result<BuiltPayload> {
    build_with_total(case, case.declared_total.clone())
}

/// Build the canonical payload with an explicit total override
pub fn build_with_total(case: &TestCase, override_total: Option<Money>) -> Result<BuiltPayload> {
    if case.line_items.is_empty() {
        return Err(Error::invalid_test_case(&case.title, "lineItems is empty"));
    }
    if !case.bundle_only {
        if case.patient.is_none() {
            return Err(Error::invalid_test_case(&case.title, "patient is required"));
        }
        if case.provider.is_none() {
            return Err(Error::invalid_test_case(&case.title, "provider is required"));
        }
    }
    if case.usage_mode == UsageMode::Related && case.related_claim_id.is_none() {
        return Err(Error::invalid_test_case(
            &case.title,
            "relatedClaimId is required for usage mode 'related'",
        ));
    }

    let currency = case.line_items[0].unit_price.currency.clone();
    let mut calculated = Decimal::ZERO;
    let mut items = Vec::with_capacity(case.line_items.len());
    for item in &case.line_items {
        let net = net_amount(item);
        calculated += net;
        items.push(SubmittedLineItem {
            sequence: item.sequence,
            code: item.code.clone(),
            display: item.display.clone(),
            quantity: item.quantity,
            unit_price: item.unit_price.clone(),
            service_period: WireDateRange {
                start: format_date(item.service_period.start),
                end: format_date(item.service_period.end),
            },
            net_amount: Money::new(net, &item.unit_price.currency),
        });
    }

    let calculated_total = Money::new(calculated, &currency);
    let total_overridden = override_total.is_some();
    let total = override_total.unwrap_or_else(|| calculated_total.clone());

    let payload = SubmissionPayload {
        title: case.title.clone(),
        test: true,
        usage: case.usage_mode.as_wire().to_string(),
        claim_sub_type: case.claim_sub_type.as_wire().to_string(),
        patient: case.patient.clone(),
        provider: case.provider.clone(),
        practitioner: case.practitioner.clone(),
        product_or_service: items,
        billable_period: WirePeriod {
            start: format_date(case.billable_period.start),
            end: format_date(case.billable_period.end),
            created: format_date(case.billable_period.created),
        },
        total,
        related_claim_id: case.related_claim_id.clone(),
    };

    Ok(BuiltPayload {
        payload,
        calculated_total,
        total_overridden,
    })
}

/// Net amount for one line item
///
/// Per-diem codes are priced per service day: the date difference
/// `end - start`, clamped to a minimum of one day so a zero-length or
/// missing period never nets to zero. Flat codes submit the unit price.
fn net_amount(item: &LineItem) -> Decimal {
    if item.per_diem {
        item.unit_price.value * Decimal::from(service_days(&item.service_period))
    } else {
        item.unit_price.value
    }
}

/// Whole service days in a period, minimum 1
fn service_days(period: &Period) -> i64 {
    match (period.start, period.end) {
        (Some(start), Some(end)) => (end - start).num_days().max(1),
        _ => 1,
    }
}

/// Fixed `YYYY-MM-DD` representation; missing dates become empty strings
fn format_date(date: Option<NaiveDate>) -> String {
    match date {
        Some(d) => d.format("%Y-%m-%d").to_string(),
        None => String::new(),
    }
}
