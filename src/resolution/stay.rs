//! Stay entitlement resolution.
//!
//! Resolves the entitlement for a continuous dwell at one location between
//! an arrival and the next departure. Whole 24-hour blocks replicate the
//! full-day entitlement; the two boundary days get partial grants based on
//! their clock hours.

use rust_decimal::Decimal;

use crate::models::{AuditStep, Component, EntitlementBreakdown};

use super::bands::{fractional_hour, hr};
use super::{day_share, other_uplift};

/// The result of resolving one destination stay.
#[derive(Debug, Clone)]
pub struct StayEntitlement {
    /// Breakdown at the stay location's rates.
    pub breakdown: EntitlementBreakdown,
    /// Sum of all granted components.
    pub total: Decimal,
    /// Number of whole 24-hour blocks in the dwell.
    pub full_days: u32,
    /// Human-readable reasons, one per applied rule.
    pub reasons: Vec<String>,
    /// The audit step recording this resolution.
    pub audit_step: AuditStep,
}

/// Resolves the entitlement for a continuous stay.
///
/// `daily_rate` is the full-day allowance of the stay country, unscaled.
/// Whole 24-hour blocks each grant all five components as fixed shares of
/// the scaled daily rate. A reversed or zero-length dwell produces
/// `full_days = 0` and falls through to the partial-day rules only.
pub fn resolve_stay(
    arrival_time: chrono::NaiveDateTime,
    departure_time: chrono::NaiveDateTime,
    daily_rate: Decimal,
    multiplier: Decimal,
    step_number: u32,
) -> StayEntitlement {
    let scaled = daily_rate * multiplier;
    let dwell_minutes = (departure_time - arrival_time).num_minutes().max(0);
    let full_days = (dwell_minutes / (24 * 60)) as u32;
    let spans_further_day = departure_time.date() > arrival_time.date();

    let arrival_hour = fractional_hour(arrival_time);
    let departure_hour = fractional_hour(departure_time);

    let mut breakdown = EntitlementBreakdown::default();
    let mut reasons: Vec<String> = Vec::new();

    if full_days > 0 {
        let n = Decimal::from(full_days);
        breakdown.grant_many(Component::Breakfast, day_share(scaled, Component::Breakfast), full_days);
        breakdown.grant_many(Component::Lunch, day_share(scaled, Component::Lunch), full_days);
        breakdown.grant_many(Component::Dinner, day_share(scaled, Component::Dinner), full_days);
        breakdown.grant_many(Component::Accommodation, day_share(scaled, Component::Accommodation), full_days);
        breakdown.add_other(n * other_uplift(scaled));
        reasons.push(format!(
            "{} full day(s) at the stay location, full daily allowance each",
            full_days
        ));
    }

    // Partial arrival day. A dinner is still due for a late arrival when the
    // stay carries into a further day (the traveler ate that evening away).
    if arrival_time.time() != chrono::NaiveTime::MIN {
        if arrival_hour < hr(12) {
            breakdown.grant(Component::Lunch, day_share(scaled, Component::Lunch));
            reasons.push("partial arrival day: lunch (arrived before 12:00)".to_string());
        }
        if arrival_hour < hr(18) || spans_further_day {
            breakdown.grant(Component::Dinner, day_share(scaled, Component::Dinner));
            reasons.push("partial arrival day: dinner".to_string());
        }
        if spans_further_day {
            breakdown.grant(Component::Accommodation, day_share(scaled, Component::Accommodation));
            reasons.push("partial arrival day: accommodation (overnight)".to_string());
        }
    }

    // Partial departure day.
    if departure_time.time() != chrono::NaiveTime::MIN {
        if departure_hour >= hr(7) {
            breakdown.grant(Component::Breakfast, day_share(scaled, Component::Breakfast));
            reasons.push("partial departure day: breakfast (departed at/after 07:00)".to_string());
        }
        if departure_hour >= hr(14) {
            breakdown.grant(Component::Lunch, day_share(scaled, Component::Lunch));
            reasons.push("partial departure day: lunch (departed at/after 14:00)".to_string());
        }
    }

    let total = breakdown.total;
    let audit_step = AuditStep {
        step_number,
        rule_id: "stay_resolver".to_string(),
        rule_name: "Destination Stay Entitlement".to_string(),
        input: serde_json::json!({
            "arrival_time": arrival_time.to_string(),
            "departure_time": departure_time.to_string(),
            "daily_rate": daily_rate.normalize().to_string(),
            "multiplier": multiplier.normalize().to_string(),
        }),
        output: serde_json::json!({
            "full_days": full_days,
            "total": total.normalize().to_string(),
        }),
        reasoning: reasons.join("; "),
    };

    StayEntitlement {
        breakdown,
        total,
        full_days,
        reasons,
        audit_step,
    }
}
