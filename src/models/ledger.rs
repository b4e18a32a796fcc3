//! Day-by-day ledger models.
//!
//! The Day-by-Day Reconciler independently re-derives, for every calendar day
//! spanned by an itinerary, which location and rate apply and which components
//! are payable. Entries are never mutated after creation.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// The traveler's state on one calendar day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DayStatus {
    /// In transit on an outbound leg.
    OutboundTravel,
    /// In transit on a return leg.
    ReturnTravel,
    /// Dwelling at the destination.
    Destination,
}

impl std::fmt::Display for DayStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DayStatus::OutboundTravel => write!(f, "outbound travel"),
            DayStatus::ReturnTravel => write!(f, "return travel"),
            DayStatus::Destination => write!(f, "destination"),
        }
    }
}

/// Eligibility and amount for one component on one ledger day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayComponent {
    /// Whether the component is payable on this day.
    pub eligible: bool,
    /// The payable amount; zero when ineligible.
    pub amount: Decimal,
}

impl DayComponent {
    /// An eligible component with the given amount.
    pub fn granted(amount: Decimal) -> Self {
        Self {
            eligible: true,
            amount,
        }
    }

    /// An ineligible component.
    pub fn withheld() -> Self {
        Self {
            eligible: false,
            amount: Decimal::ZERO,
        }
    }

    /// Eligible with the amount, or withheld.
    pub fn when(eligible: bool, amount: Decimal) -> Self {
        if eligible {
            Self::granted(amount)
        } else {
            Self::withheld()
        }
    }
}

/// One calendar day of the reconciled ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayLedgerEntry {
    /// Zero-based index of the day within the itinerary span.
    pub day_index: u32,
    /// The calendar date.
    pub date: NaiveDate,
    /// The traveler's state on this day.
    pub status: DayStatus,
    /// The country whose rate applies on this day.
    pub location: String,
    /// Breakfast eligibility and amount.
    pub breakfast: DayComponent,
    /// Lunch eligibility and amount.
    pub lunch: DayComponent,
    /// Dinner eligibility and amount.
    pub dinner: DayComponent,
    /// Accommodation eligibility and amount.
    pub accommodation: DayComponent,
    /// Incidental "other" eligibility and amount.
    pub other: DayComponent,
    /// Representation allowance eligibility and amount.
    pub representation: DayComponent,
    /// Supplementary allowance eligibility and amount. Not part of the day
    /// total.
    pub supplementary: DayComponent,
    /// Sum of all eligible components except supplementary.
    pub day_total: Decimal,
}

/// The full reconciled ledger, one entry per calendar day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayLedger {
    /// Entries in day order.
    pub entries: Vec<DayLedgerEntry>,
    /// Sum of all day totals.
    pub grand_total: Decimal,
}

impl DayLedger {
    /// Builds a ledger from entries, deriving the grand total.
    pub fn new(entries: Vec<DayLedgerEntry>) -> Self {
        let grand_total = entries.iter().map(|e| e.day_total).sum();
        Self {
            entries,
            grand_total,
        }
    }

    /// Sum of the supplementary amounts, which are excluded from day totals.
    pub fn supplementary_total(&self) -> Decimal {
        self.entries.iter().map(|e| e.supplementary.amount).sum()
    }
}
