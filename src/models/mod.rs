//! Data models for the Entitlement Resolution Engine.
//!
//! This module contains the domain types: itineraries and travel legs,
//! per-country entitlement breakdowns, the day-by-day ledger, and the
//! complete claim result with its audit trace.

mod breakdown;
mod claim_result;
mod itinerary;
mod ledger;

pub use breakdown::{Component, EntitlementBreakdown};
pub use claim_result::{AuditStep, AuditTrace, AuditWarning, ClaimResult, ClaimTotals};
pub use itinerary::{FundingSource, Leg, TravelClaim};
pub use ledger::{DayComponent, DayLedger, DayLedgerEntry, DayStatus};
