//! Entitlement resolution engine.
//!
//! The resolvers are pure functions over the immutable rate catalog and an
//! itinerary. The [`aggregate_claim`] path sequences the leg, layover and
//! stay resolvers into per-country totals; [`build_day_ledger`] independently
//! re-derives the same itinerary day by day, and [`reconcile`] cross-checks
//! the two.

mod aggregator;
mod bands;
mod day_ledger;
mod layover;
mod leg;
mod stay;

pub use aggregator::{ClaimComputation, SUPPLEMENTARY_DAY_CAP, aggregate_claim};
pub use day_ledger::{LEDGER_DIVERGENCE, build_day_ledger, reconcile};
pub use layover::{LayoverEntitlement, resolve_layover};
pub use leg::{LegEntitlement, resolve_leg};
pub use stay::{StayEntitlement, resolve_stay};

use rust_decimal::Decimal;

use crate::models::Component;

/// Fixed share of a daily allowance attributed to one component.
///
/// Accommodation is the dominant share at 50%; lunch and dinner take 15%
/// each and breakfast 10%. The remaining 10% is the incidental "other"
/// uplift handled by [`other_uplift`].
pub(crate) fn day_share(scaled_rate: Decimal, component: Component) -> Decimal {
    let percent = match component {
        Component::Breakfast => Decimal::new(10, 2),
        Component::Lunch => Decimal::new(15, 2),
        Component::Dinner => Decimal::new(15, 2),
        Component::Accommodation => Decimal::new(50, 2),
    };
    scaled_rate * percent
}

/// The 10% incidental uplift applied to a base amount.
pub(crate) fn other_uplift(amount: Decimal) -> Decimal {
    amount * Decimal::new(10, 2)
}
