//! Time-of-day band tables.
//!
//! The band cascades that decide which components a leg's arrival or
//! departure side pays are encoded as ordered tables of
//! `(predicate, granted component set, reason)` evaluated top-to-bottom with
//! first-match-wins semantics. This keeps the many special cases auditable
//! and unit-testable in isolation.

use chrono::{NaiveDateTime, Timelike};
use rust_decimal::Decimal;

use crate::config::RateRecord;
use crate::models::Component;

/// Converts a timestamp's time-of-day to fractional hours
/// (`hour + minutes / 60`).
pub fn fractional_hour(t: NaiveDateTime) -> Decimal {
    Decimal::from(t.hour()) + Decimal::from(t.minute()) / Decimal::from(60)
}

/// A whole-hour boundary as a Decimal.
pub(crate) fn hr(n: u32) -> Decimal {
    Decimal::from(n)
}

/// The base rate for one component of a rate record.
pub(crate) fn rate_component(record: &RateRecord, component: Component) -> Decimal {
    match component {
        Component::Breakfast => record.breakfast,
        Component::Lunch => record.lunch,
        Component::Dinner => record.dinner,
        Component::Accommodation => record.accommodation,
    }
}

/// The hour context a band rule is evaluated against.
#[derive(Debug, Clone, Copy)]
pub struct BandContext {
    /// Arrival time-of-day in fractional hours.
    pub arrival_hour: Decimal,
    /// Departure time-of-day in fractional hours.
    pub departure_hour: Decimal,
}

impl BandContext {
    /// Builds a context from leg timestamps.
    pub fn new(departure_time: NaiveDateTime, arrival_time: NaiveDateTime) -> Self {
        Self {
            arrival_hour: fractional_hour(arrival_time),
            departure_hour: fractional_hour(departure_time),
        }
    }
}

/// One row of a band table.
pub struct BandRule {
    /// Identifier used in audit output.
    pub id: &'static str,
    /// The predicate deciding whether this band applies.
    pub matches: fn(&BandContext) -> bool,
    /// The components granted when the band applies.
    pub grants: &'static [Component],
    /// Human-readable reason attached to the breakdown.
    pub reason: &'static str,
}

/// Arrival-side bands for a normal (not same-day round trip) leg.
pub const ARRIVAL_BANDS: &[BandRule] = &[
    BandRule {
        id: "arrival_night",
        matches: |c| c.arrival_hour < hr(6),
        grants: &[Component::Accommodation],
        reason: "arrival before 06:00: accommodation only",
    },
    BandRule {
        id: "arrival_morning",
        matches: |c| c.arrival_hour < hr(12),
        grants: &[Component::Breakfast],
        reason: "arrival between 06:00 and 12:00: breakfast only",
    },
    BandRule {
        id: "arrival_afternoon",
        matches: |c| c.arrival_hour < hr(18),
        grants: &[Component::Lunch],
        reason: "arrival between 12:00 and 18:00: lunch only",
    },
    BandRule {
        id: "arrival_evening",
        matches: |_| true,
        grants: &[Component::Dinner, Component::Accommodation],
        reason: "arrival at or after 18:00: dinner and accommodation",
    },
];

/// Arrival-side override bands for a same-day round trip (same calendar day,
/// same departure and arrival country). These consider both the arrival and
/// the departure hour; when none applies, the side pays nothing.
pub const ROUND_TRIP_BANDS: &[BandRule] = &[
    BandRule {
        id: "round_trip_morning",
        matches: |c| {
            c.arrival_hour >= hr(6) && c.arrival_hour < hr(12) && c.departure_hour < hr(12)
        },
        grants: &[Component::Breakfast],
        reason: "same-day round trip within the morning: breakfast only",
    },
    BandRule {
        id: "round_trip_afternoon",
        matches: |c| {
            c.arrival_hour >= hr(12) && c.arrival_hour < hr(18) && c.departure_hour < hr(18)
        },
        grants: &[Component::Lunch],
        reason: "same-day round trip within the afternoon: lunch only",
    },
    BandRule {
        id: "round_trip_evening",
        matches: |c| c.arrival_hour >= hr(18) && c.departure_hour >= hr(18),
        grants: &[Component::Dinner, Component::Accommodation],
        reason: "same-day round trip in the evening: dinner and accommodation",
    },
];

/// Departure-side bands.
pub const DEPARTURE_BANDS: &[BandRule] = &[
    BandRule {
        id: "departure_night",
        matches: |c| c.departure_hour < hr(6),
        grants: &[Component::Accommodation],
        reason: "departure before 06:00: accommodation only",
    },
    BandRule {
        id: "departure_morning",
        matches: |c| c.departure_hour < hr(12),
        grants: &[Component::Breakfast],
        reason: "departure between 06:00 and 12:00: breakfast only",
    },
    BandRule {
        id: "departure_afternoon",
        matches: |c| c.departure_hour < hr(18),
        grants: &[Component::Breakfast, Component::Lunch],
        reason: "departure between 12:00 and 18:00: breakfast and lunch",
    },
    BandRule {
        id: "departure_evening",
        matches: |c| c.departure_hour < hr(21),
        grants: &[Component::Dinner],
        reason: "departure between 18:00 and 21:00: dinner only",
    },
    BandRule {
        id: "departure_late",
        matches: |_| true,
        grants: &[Component::Dinner],
        reason: "departure at or after 21:00: dinner only, no earlier meals carried over",
    },
];

/// Evaluates a band table top-to-bottom, returning the first matching row.
pub fn first_match<'a>(table: &'a [BandRule], ctx: &BandContext) -> Option<&'a BandRule> {
    table.iter().find(|rule| (rule.matches)(ctx))
}
