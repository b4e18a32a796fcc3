//! Layover entitlement resolution.
//!
//! Resolves the entitlement accrued while waiting between two legs in the
//! same direction. The gap is walked one calendar day at a time; each day
//! is reduced to an effective clock window and the meal components are
//! tested against that window.

use chrono::Days;
use rust_decimal::Decimal;

use crate::models::{AuditStep, Component, EntitlementBreakdown};

use super::bands::{fractional_hour, hr};
use super::{day_share, other_uplift};

/// Hard bound on the day-walk loop. Malformed (reversed or absurdly long)
/// gaps stop here instead of looping without bound.
const MAX_LAYOVER_DAYS: u32 = 100;

/// The result of resolving one layover gap.
#[derive(Debug, Clone)]
pub struct LayoverEntitlement {
    /// Breakdown at the layover country's rates.
    pub breakdown: EntitlementBreakdown,
    /// Sum of all granted components.
    pub total: Decimal,
    /// Number of calendar days actually walked.
    pub days_walked: u32,
    /// Human-readable reasons, one per walked day.
    pub reasons: Vec<String>,
    /// The audit step recording this resolution.
    pub audit_step: AuditStep,
}

/// Resolves the entitlement for the gap between an arrival at a waypoint
/// and the onward departure from it.
///
/// Each calendar day of the gap is given an effective window: the first day
/// opens at the gap's start hour, the last day closes at the gap's end hour,
/// and middle days span the whole clock. Accommodation accrues on every
/// walked day except the final calendar day. The "other" uplift is one 10%
/// share of the scaled daily rate per day on which at least one meal was
/// granted, approximated as `ceil(meal grants / 3)` meal-days.
pub fn resolve_layover(
    gap_start: chrono::NaiveDateTime,
    gap_end: chrono::NaiveDateTime,
    daily_rate: Decimal,
    multiplier: Decimal,
    step_number: u32,
) -> LayoverEntitlement {
    let scaled = daily_rate * multiplier;
    let end_date = gap_end.date();
    let start_hour = fractional_hour(gap_start);
    let end_hour = fractional_hour(gap_end);

    let mut breakdown = EntitlementBreakdown::default();
    let mut reasons: Vec<String> = Vec::new();
    let mut meal_grants: u32 = 0;
    let mut days_walked: u32 = 0;

    let mut current_date = gap_start.date();
    while current_date <= end_date && days_walked < MAX_LAYOVER_DAYS {
        let first_day = days_walked == 0;
        let last_day = current_date == end_date;

        // Effective clock window for this day.
        let window_start = if first_day { start_hour } else { hr(0) };
        let window_end = if last_day { end_hour } else { hr(24) };

        let mut day_grants: Vec<&str> = Vec::new();

        let breakfast = if first_day {
            window_start < hr(7)
        } else {
            window_end > hr(6)
        };
        if breakfast {
            breakdown.grant(Component::Breakfast, day_share(scaled, Component::Breakfast));
            meal_grants += 1;
            day_grants.push("breakfast");
        }

        // The window either straddles midday or ends within the lunch
        // service window.
        let lunch = (window_start < hr(12) && window_end > hr(12))
            || (window_end >= hr(12) && window_end <= hr(14));
        if lunch {
            breakdown.grant(Component::Lunch, day_share(scaled, Component::Lunch));
            meal_grants += 1;
            day_grants.push("lunch");
        }

        // An early-morning end on a later day is the tail of an overnight
        // wait; the dinner belongs to that wait.
        let dinner = window_end >= hr(18) || (!first_day && window_end < hr(6));
        if dinner {
            breakdown.grant(Component::Dinner, day_share(scaled, Component::Dinner));
            meal_grants += 1;
            day_grants.push("dinner");
        }

        if !last_day {
            breakdown.grant(
                Component::Accommodation,
                day_share(scaled, Component::Accommodation),
            );
            day_grants.push("accommodation");
        }

        reasons.push(format!(
            "layover day {} ({}): {}",
            days_walked,
            current_date,
            if day_grants.is_empty() {
                "nothing granted".to_string()
            } else {
                day_grants.join(", ")
            }
        ));

        days_walked += 1;
        current_date = match current_date.checked_add_days(Days::new(1)) {
            Some(next) => next,
            None => break,
        };
    }

    let meal_days = meal_grants.div_ceil(3);
    if meal_days > 0 {
        breakdown.add_other(Decimal::from(meal_days) * other_uplift(scaled));
    }

    let total = breakdown.total;
    let audit_step = AuditStep {
        step_number,
        rule_id: "layover_resolver".to_string(),
        rule_name: "Layover Entitlement".to_string(),
        input: serde_json::json!({
            "gap_start": gap_start.to_string(),
            "gap_end": gap_end.to_string(),
            "daily_rate": daily_rate.normalize().to_string(),
            "multiplier": multiplier.normalize().to_string(),
        }),
        output: serde_json::json!({
            "days_walked": days_walked,
            "meal_days": meal_days,
            "total": total.normalize().to_string(),
        }),
        reasoning: reasons.join("; "),
    };

    LayoverEntitlement {
        breakdown,
        total,
        days_walked,
        reasons,
        audit_step,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDateTime;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn make_datetime(date_str: &str, time_str: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(&format!("{} {}", date_str, time_str), "%Y-%m-%d %H:%M:%S")
            .unwrap()
    }

    // ==========================================================================
    // LAY-001: overnight connection, evening arrival to morning departure
    // ==========================================================================
    #[test]
    fn test_lay_001_overnight_connection() {
        let result = resolve_layover(
            make_datetime("2024-03-01", "20:00:00"),
            make_datetime("2024-03-02", "09:00:00"),
            dec("200.00"),
            dec("1.0"),
            1,
        );

        assert_eq!(result.days_walked, 2);
        // Day 0 (20:00-24:00): dinner 30 + accommodation 100.
        // Day 1 (00:00-09:00): breakfast 20. Final day: no accommodation.
        // 2 meal grants -> 1 meal-day -> other 20.
        assert_eq!(result.breakdown.dinner, dec("30.00"));
        assert_eq!(result.breakdown.accommodation, dec("100.00"));
        assert_eq!(result.breakdown.breakfast, dec("20.00"));
        assert_eq!(result.breakdown.lunch, Decimal::ZERO);
        assert_eq!(result.breakdown.other, dec("20.00"));
        assert_eq!(result.total, dec("170.00"));
    }

    // ==========================================================================
    // LAY-002: same-day midday wait crosses the lunch boundary
    // ==========================================================================
    #[test]
    fn test_lay_002_midday_wait_grants_lunch() {
        let result = resolve_layover(
            make_datetime("2024-03-01", "10:00:00"),
            make_datetime("2024-03-01", "13:30:00"),
            dec("200.00"),
            dec("1.0"),
            1,
        );

        assert_eq!(result.days_walked, 1);
        assert_eq!(result.breakdown.lunch, dec("30.00"));
        assert_eq!(result.breakdown.breakfast, Decimal::ZERO);
        assert_eq!(result.breakdown.dinner, Decimal::ZERO);
        // Single-day gap: the only day is also the final day.
        assert_eq!(result.breakdown.accommodation, Decimal::ZERO);
        assert_eq!(result.breakdown.other, dec("20.00"));
        assert_eq!(result.total, dec("50.00"));
    }

    #[test]
    fn test_middle_day_gets_all_components() {
        let result = resolve_layover(
            make_datetime("2024-03-01", "23:00:00"),
            make_datetime("2024-03-03", "08:00:00"),
            dec("200.00"),
            dec("1.0"),
            1,
        );

        assert_eq!(result.days_walked, 3);
        // Day 0: accommodation only (window 23:00-24:00 grants dinner at
        // window end 24:00 >= 18:00, plus accommodation).
        // Day 1: full window, breakfast + lunch + dinner + accommodation.
        // Day 2 (final, 00:00-08:00): breakfast only.
        assert_eq!(result.breakdown.breakfast_count, 2);
        assert_eq!(result.breakdown.lunch_count, 1);
        assert_eq!(result.breakdown.dinner_count, 2);
        assert_eq!(result.breakdown.night_count, 2);
        // 5 meal grants -> 2 meal-days.
        assert_eq!(result.breakdown.other, dec("40.00"));
    }

    #[test]
    fn test_early_morning_first_day_breakfast() {
        // Gap opens at 05:00: breakfast is still due on day 0.
        let result = resolve_layover(
            make_datetime("2024-03-01", "05:00:00"),
            make_datetime("2024-03-01", "06:30:00"),
            dec("200.00"),
            dec("1.0"),
            1,
        );
        assert_eq!(result.breakdown.breakfast, dec("20.00"));
        assert_eq!(result.breakdown.lunch, Decimal::ZERO);
    }

    #[test]
    fn test_reversed_gap_walks_no_days() {
        let result = resolve_layover(
            make_datetime("2024-03-05", "10:00:00"),
            make_datetime("2024-03-01", "10:00:00"),
            dec("200.00"),
            dec("1.0"),
            1,
        );
        assert_eq!(result.days_walked, 0);
        assert_eq!(result.total, Decimal::ZERO);
    }

    #[test]
    fn test_iteration_cap_bounds_long_gaps() {
        let result = resolve_layover(
            make_datetime("2024-01-01", "10:00:00"),
            make_datetime("2025-06-01", "10:00:00"),
            dec("200.00"),
            dec("1.0"),
            1,
        );
        assert_eq!(result.days_walked, 100);
        assert_eq!(result.breakdown.night_count, 100);
    }
}
