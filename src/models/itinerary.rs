//! Itinerary model and related types.
//!
//! This module defines the Leg and TravelClaim structs for representing
//! multi-leg international itineraries in the entitlement resolution system.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Represents the funding source of an itinerary.
///
/// Externally funded itineraries attract a fixed per-day supplementary
/// allowance, capped at 30 days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FundingSource {
    /// Funded by the traveler's own government.
    Government,
    /// Funded by an external body.
    External,
}

/// One uninterrupted travel movement between a departure country/time and
/// an arrival country/time.
///
/// Timestamps are local wall-clock date+time with minute resolution; there is
/// no timezone model, two timestamps compare by raw value. `arrival_time >
/// departure_time` is expected but not enforced; the engine absorbs reversed
/// ranges arithmetically.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Leg {
    /// The country identifier the leg departs from.
    pub from_country: String,
    /// The country identifier the leg arrives in.
    pub to_country: String,
    /// The departure timestamp.
    pub departure_time: NaiveDateTime,
    /// The arrival timestamp.
    pub arrival_time: NaiveDateTime,
}

impl Leg {
    /// Returns true when departure and arrival fall on the same calendar day.
    pub fn same_day_travel(&self) -> bool {
        self.departure_time.date() == self.arrival_time.date()
    }

    /// Returns true when the leg departs and arrives in the same country.
    pub fn same_country(&self) -> bool {
        self.from_country == self.to_country
    }
}

/// A complete travel claim: the ordered outbound legs, the implicit
/// destination dwell, the ordered return legs, and the traveler's grade
/// tier and funding source.
///
/// The destination dwell interval is implicit:
/// `[last outbound arrival, first return departure]`, and may be zero-length.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TravelClaim {
    /// Identifier of the traveler the claim is for.
    pub traveler_id: String,
    /// The traveler's grade tier (keys into the grade policy table).
    pub grade_tier: String,
    /// The funding source for the itinerary.
    pub funding: FundingSource,
    /// Ordered, non-empty outbound legs.
    pub outbound: Vec<Leg>,
    /// Ordered, non-empty return legs.
    #[serde(rename = "return")]
    pub return_legs: Vec<Leg>,
}

impl TravelClaim {
    /// The itinerary's first timestamp: the first outbound departure.
    pub fn start(&self) -> Option<NaiveDateTime> {
        self.outbound.first().map(|leg| leg.departure_time)
    }

    /// The itinerary's last timestamp: the last return arrival.
    pub fn end(&self) -> Option<NaiveDateTime> {
        self.return_legs.last().map(|leg| leg.arrival_time)
    }

    /// The destination dwell interval, `[last outbound arrival, first return
    /// departure]`. May be zero-length.
    pub fn destination_dwell(&self) -> Option<(NaiveDateTime, NaiveDateTime)> {
        let arrival = self.outbound.last()?.arrival_time;
        let departure = self.return_legs.first()?.departure_time;
        Some((arrival, departure))
    }

    /// The destination country: where the last outbound leg arrives.
    pub fn destination_country(&self) -> Option<&str> {
        self.outbound.last().map(|leg| leg.to_country.as_str())
    }

    /// The number of calendar days spanned by the itinerary, inclusive of
    /// both boundary days. A reversed or missing span yields zero.
    pub fn total_days(&self) -> u32 {
        match (self.start(), self.end()) {
            (Some(start), Some(end)) if end.date() >= start.date() => {
                (end.date() - start.date()).num_days() as u32 + 1
            }
            _ => 0,
        }
    }

    /// All calendar dates spanned by the itinerary, in order.
    pub fn spanned_dates(&self) -> Vec<NaiveDate> {
        match (self.start(), self.end()) {
            (Some(start), Some(end)) => start
                .date()
                .iter_days()
                .take_while(|d| *d <= end.date())
                .collect(),
            _ => Vec::new(),
        }
    }

    /// Returns true for externally funded itineraries.
    pub fn is_external(&self) -> bool {
        self.funding == FundingSource::External
    }
}
