//! Leg entitlement resolution.
//!
//! Resolves the subsistence entitlement for one travel leg: a single
//! departure timestamp and country, and a single arrival timestamp and
//! country. The arrival side and the departure side are resolved against
//! separate band tables; the departure side's country-rate selection depends
//! on the direction of travel relative to the home jurisdiction.

use rust_decimal::Decimal;
use std::collections::BTreeMap;

use crate::config::{Jurisdiction, RateCatalog, RateRecord};
use crate::error::EngineResult;
use crate::models::{AuditStep, Component, EntitlementBreakdown};

use super::bands::{
    ARRIVAL_BANDS, BandContext, DEPARTURE_BANDS, ROUND_TRIP_BANDS, first_match, rate_component,
};
use super::other_uplift;

/// The result of resolving one leg.
#[derive(Debug, Clone)]
pub struct LegEntitlement {
    /// Per-country breakdowns produced by this leg.
    pub breakdowns: BTreeMap<String, EntitlementBreakdown>,
    /// Sum of all breakdown totals.
    pub total: Decimal,
    /// Human-readable reasons, one per applied rule.
    pub reasons: Vec<String>,
    /// The audit step recording this resolution.
    pub audit_step: AuditStep,
}

/// Resolves the entitlement for one travel leg.
///
/// Fails with [`crate::error::EngineError::MissingRate`] when either country
/// is absent from the rate catalog; no partial result is produced.
///
/// The arrival side is evaluated at the destination country: a same-day
/// round trip uses the override bands (which consider both hours), any other
/// leg uses the normal arrival bands, and arriving at the home jurisdiction
/// suppresses the whole side. The departure side is evaluated only when the
/// two countries differ; its rate source and exclusion behavior depend on
/// whether the traveler is returning home, leaving home, or moving between
/// two foreign countries.
pub fn resolve_leg(
    from_country: &str,
    to_country: &str,
    departure_time: chrono::NaiveDateTime,
    arrival_time: chrono::NaiveDateTime,
    catalog: &RateCatalog,
    multiplier: Decimal,
    step_number: u32,
) -> EngineResult<LegEntitlement> {
    let departure_jurisdiction = catalog.resolve(from_country)?;
    let arrival_jurisdiction = catalog.resolve(to_country)?;

    let ctx = BandContext::new(departure_time, arrival_time);
    let same_day = departure_time.date() == arrival_time.date();
    let same_country = from_country == to_country;

    let mut breakdowns: BTreeMap<String, EntitlementBreakdown> = BTreeMap::new();
    let mut reasons: Vec<String> = Vec::new();
    let mut arrival_granted: Vec<Component> = Vec::new();

    // Arrival side, at the destination country's rates.
    match arrival_jurisdiction {
        Jurisdiction::Home => {
            // Arriving home cuts off subsistence immediately: explicit zero,
            // not merely zero-rated.
            reasons.push("arrival at home jurisdiction: arrival-side entitlement suppressed".to_string());
        }
        Jurisdiction::Foreign(rate) => {
            let table = if same_day && same_country {
                ROUND_TRIP_BANDS
            } else {
                ARRIVAL_BANDS
            };
            if let Some(band) = first_match(table, &ctx) {
                let entry = breakdowns.entry(to_country.to_string()).or_default();
                let mut side_total = Decimal::ZERO;
                let mut meals_granted = 0u32;
                for component in band.grants {
                    let amount = rate_component(rate, *component) * multiplier;
                    entry.grant(*component, amount);
                    side_total += amount;
                    if component.is_meal() {
                        meals_granted += 1;
                    }
                    arrival_granted.push(*component);
                }
                if meals_granted >= 1 {
                    entry.add_other(other_uplift(side_total));
                }
                reasons.push(format!("arrival side ({}): {}", to_country, band.reason));
            }
        }
    }

    // Departure side, only when the leg crosses a border.
    if !same_country
        && let Some(band) = first_match(DEPARTURE_BANDS, &ctx)
    {
        let selection = select_departure_rate(
            from_country,
            to_country,
            departure_jurisdiction,
            arrival_jurisdiction,
        );
        if let Some((rate, rate_country, exclude_covered)) = selection {
            let entry = breakdowns.entry(rate_country.to_string()).or_default();
            let mut side_total = Decimal::ZERO;
            let mut meals_granted = 0u32;
            for component in band.grants {
                if exclude_covered && arrival_granted.contains(component) {
                    reasons.push(format!(
                        "departure side: {} already covered on arrival side, skipped",
                        component
                    ));
                    continue;
                }
                let amount = rate_component(rate, *component) * multiplier;
                entry.grant(*component, amount);
                side_total += amount;
                if component.is_meal() {
                    meals_granted += 1;
                }
            }
            if meals_granted >= 1 {
                entry.add_other(other_uplift(side_total));
            }
            reasons.push(format!(
                "departure side (at {} rates): {}",
                rate_country, band.reason
            ));
        }
    }

    let total: Decimal = breakdowns.values().map(|b| b.total).sum();

    let audit_step = AuditStep {
        step_number,
        rule_id: "leg_resolver".to_string(),
        rule_name: "Leg Entitlement".to_string(),
        input: serde_json::json!({
            "from_country": from_country,
            "to_country": to_country,
            "departure_time": departure_time.to_string(),
            "arrival_time": arrival_time.to_string(),
            "same_day_travel": same_day,
            "same_country": same_country,
            "multiplier": multiplier.normalize().to_string(),
        }),
        output: serde_json::json!({
            "total": total.normalize().to_string(),
            "countries": breakdowns.keys().collect::<Vec<_>>(),
        }),
        reasoning: reasons.join("; "),
    };

    Ok(LegEntitlement {
        breakdowns,
        total,
        reasons,
        audit_step,
    })
}

/// Picks the rate record, the country the departure side is booked against,
/// and whether arrival-side components are excluded.
///
/// Returns `None` when no rate applies (both sides home, which only occurs
/// for degenerate input since a home-to-home leg is same-country).
fn select_departure_rate<'a>(
    from_country: &'a str,
    to_country: &'a str,
    departure_jurisdiction: Jurisdiction<'a>,
    arrival_jurisdiction: Jurisdiction<'a>,
) -> Option<(&'a RateRecord, &'a str, bool)> {
    if arrival_jurisdiction.is_home() {
        // Returning home: the final leg is compensated at the departure
        // country's own rates, without exclusion (the arrival side was
        // fully suppressed).
        departure_jurisdiction
            .record()
            .map(|rate| (rate, from_country, false))
    } else if departure_jurisdiction.is_home() {
        // Leaving home: no entitlement accrues in the zero-rate home
        // country, so the destination's rates apply.
        arrival_jurisdiction
            .record()
            .map(|rate| (rate, to_country, true))
    } else {
        // Between two foreign countries: the departure country pays its own
        // rates, minus anything the arrival side already granted.
        departure_jurisdiction
            .record()
            .map(|rate| (rate, from_country, true))
    }
}
