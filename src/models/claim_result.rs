//! Claim result models for the Entitlement Resolution Engine.
//!
//! This module contains the [`ClaimResult`] type and its associated structures
//! that capture all outputs from an entitlement resolution, including the
//! per-country breakdowns, allowance totals, the day-by-day ledger, and the
//! audit trace.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

use super::{DayLedger, EntitlementBreakdown, FundingSource};

/// Aggregated totals for a resolved claim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimTotals {
    /// Sum of all per-country entitlement totals.
    pub entitlement_total: Decimal,
    /// The representation allowance amount.
    pub representation: Decimal,
    /// The supplementary allowance amount (externally funded, 30-day cap).
    pub supplementary: Decimal,
    /// Entitlement + representation + supplementary.
    pub grand_total: Decimal,
    /// Total breakfasts granted across all countries.
    pub breakfast_count: u32,
    /// Total lunches granted across all countries.
    pub lunch_count: u32,
    /// Total dinners granted across all countries.
    pub dinner_count: u32,
    /// Total nights of accommodation granted across all countries.
    pub night_count: u32,
    /// Calendar days spanned by the itinerary, inclusive.
    pub total_days: u32,
    /// Number of countries whose rates contributed.
    pub countries_used: u32,
    /// True when more than one country's rates contributed.
    pub multiple_country_rates: bool,
}

/// A single step in the audit trace recording a resolution decision.
///
/// Each step captures the input, output, and reasoning for a rule application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditStep {
    /// The sequential step number.
    pub step_number: u32,
    /// The unique identifier of the rule that was applied.
    pub rule_id: String,
    /// The human-readable name of the rule.
    pub rule_name: String,
    /// The input data for this step.
    pub input: serde_json::Value,
    /// The output data from this step.
    pub output: serde_json::Value,
    /// Human-readable explanation of the decision.
    pub reasoning: String,
}

/// A warning generated during resolution.
///
/// Warnings indicate potential issues that don't prevent resolution
/// but may require attention.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditWarning {
    /// A code identifying the type of warning.
    pub code: String,
    /// A human-readable description of the warning.
    pub message: String,
    /// The severity level (e.g., "low", "medium", "high").
    pub severity: String,
}

/// The complete audit trace for a resolution.
///
/// Records every decision made during the resolution process for
/// transparency and compliance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditTrace {
    /// The sequence of resolution steps.
    pub steps: Vec<AuditStep>,
    /// Any warnings generated during resolution.
    pub warnings: Vec<AuditWarning>,
    /// The total resolution duration in microseconds.
    pub duration_us: u64,
}

/// The complete result of an entitlement resolution.
///
/// This struct captures all outputs from the engine: per-country breakdowns
/// with meal/night counts, the allowance totals, the independently derived
/// day-by-day ledger, and a complete audit trace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimResult {
    /// Unique identifier for this resolution.
    pub claim_id: Uuid,
    /// When the resolution was performed.
    pub timestamp: DateTime<Utc>,
    /// The version of the engine that performed the resolution.
    pub engine_version: String,
    /// The ID of the traveler the claim is for.
    pub traveler_id: String,
    /// The traveler's grade tier.
    pub grade_tier: String,
    /// The funding source of the itinerary.
    pub funding: FundingSource,
    /// Entitlement breakdown per contributing country, in stable key order.
    pub per_country: BTreeMap<String, EntitlementBreakdown>,
    /// Aggregated totals.
    pub totals: ClaimTotals,
    /// The independently derived day-by-day ledger.
    pub ledger: DayLedger,
    /// Complete audit trace of resolution decisions.
    pub audit_trace: AuditTrace,
}
