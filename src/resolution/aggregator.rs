//! Itinerary aggregation.
//!
//! Sequences the leg, layover and stay resolvers across a full travel claim
//! and folds their breakdowns into per-country subtotals, the itinerary-level
//! allowances and the grand total.

use rust_decimal::Decimal;
use std::collections::BTreeMap;
use tracing::debug;

use crate::config::RateCatalog;
use crate::error::{EngineError, EngineResult};
use crate::models::{AuditStep, ClaimTotals, EntitlementBreakdown, Leg, TravelClaim};

use super::layover::resolve_layover;
use super::leg::resolve_leg;
use super::stay::resolve_stay;

/// Cap on the supplementary allowance, in days.
pub const SUPPLEMENTARY_DAY_CAP: u32 = 30;

/// The aggregated computation for one claim, before reconciliation.
#[derive(Debug, Clone)]
pub struct ClaimComputation {
    /// Entitlement breakdown per contributing country.
    pub per_country: BTreeMap<String, EntitlementBreakdown>,
    /// The aggregated totals.
    pub totals: ClaimTotals,
    /// Audit steps from every resolver invocation, in sequence.
    pub audit_steps: Vec<AuditStep>,
}

/// Resolves a full travel claim into per-country breakdowns and totals.
///
/// The outbound legs are resolved in order, with a layover resolution
/// between each consecutive pair at the waypoint country's rate. After the
/// last outbound leg the destination dwell is resolved as a stay, and the
/// return legs then mirror the outbound pattern. A layover or stay at the
/// home jurisdiction accrues nothing.
///
/// Fails if either leg list is empty, the grade tier is unknown, or any
/// referenced country is missing from the catalog. A missing rate aborts
/// the whole computation; no partial result is produced.
pub fn aggregate_claim(
    claim: &TravelClaim,
    catalog: &RateCatalog,
) -> EngineResult<ClaimComputation> {
    if claim.outbound.is_empty() {
        return Err(EngineError::CalculationError {
            message: "itinerary has no outbound legs".to_string(),
        });
    }
    if claim.return_legs.is_empty() {
        return Err(EngineError::CalculationError {
            message: "itinerary has no return legs".to_string(),
        });
    }

    let grade = catalog.grade(&claim.grade_tier)?;
    let multiplier = grade.multiplier;

    let mut per_country: BTreeMap<String, EntitlementBreakdown> = BTreeMap::new();
    let mut audit_steps: Vec<AuditStep> = Vec::new();
    let mut step_number: u32 = 0;

    resolve_direction(
        &claim.outbound,
        catalog,
        multiplier,
        &mut per_country,
        &mut audit_steps,
        &mut step_number,
    )?;

    // Destination dwell between the last outbound arrival and the first
    // return departure. A home destination accrues nothing.
    if let (Some((arrival, departure)), Some(destination)) =
        (claim.destination_dwell(), claim.destination_country())
    {
        let jurisdiction = catalog.resolve(destination)?;
        if let Some(rate) = jurisdiction.record() {
            step_number += 1;
            let stay = resolve_stay(arrival, departure, rate.full_day, multiplier, step_number);
            debug!(destination, total = %stay.total, full_days = stay.full_days, "stay resolved");
            per_country
                .entry(destination.to_string())
                .or_default()
                .merge(&stay.breakdown);
            audit_steps.push(stay.audit_step);
        }
    }

    resolve_direction(
        &claim.return_legs,
        catalog,
        multiplier,
        &mut per_country,
        &mut audit_steps,
        &mut step_number,
    )?;

    let entitlement_total: Decimal = per_country.values().map(|b| b.total).sum();
    let total_days = claim.total_days();

    // Representation allowance: reverse-engineered from the average implied
    // daily rate rather than tracked per country.
    let representation = if grade.representation_percent > Decimal::ZERO
        && total_days > 0
        && !multiplier.is_zero()
    {
        let days = Decimal::from(total_days);
        let avg_implied_daily_rate = entitlement_total / (days * multiplier);
        avg_implied_daily_rate * grade.representation_percent / Decimal::from(100) * days
    } else {
        Decimal::ZERO
    };

    let supplementary = if claim.is_external() {
        Decimal::from(total_days.min(SUPPLEMENTARY_DAY_CAP))
            * catalog.allowances().supplementary_daily_rate
    } else {
        Decimal::ZERO
    };

    let grand_total = entitlement_total + representation + supplementary;

    let countries_used = per_country.values().filter(|b| !b.total.is_zero()).count() as u32;
    let totals = ClaimTotals {
        entitlement_total,
        representation,
        supplementary,
        grand_total,
        breakfast_count: per_country.values().map(|b| b.breakfast_count).sum(),
        lunch_count: per_country.values().map(|b| b.lunch_count).sum(),
        dinner_count: per_country.values().map(|b| b.dinner_count).sum(),
        night_count: per_country.values().map(|b| b.night_count).sum(),
        total_days,
        countries_used,
        multiple_country_rates: countries_used > 1,
    };

    step_number += 1;
    audit_steps.push(AuditStep {
        step_number,
        rule_id: "itinerary_totals".to_string(),
        rule_name: "Itinerary Totals".to_string(),
        input: serde_json::json!({
            "total_days": total_days,
            "funding": claim.funding,
            "grade_tier": claim.grade_tier,
        }),
        output: serde_json::json!({
            "entitlement_total": entitlement_total.normalize().to_string(),
            "representation": representation.normalize().to_string(),
            "supplementary": supplementary.normalize().to_string(),
            "grand_total": grand_total.normalize().to_string(),
        }),
        reasoning: format!(
            "{} day(s), {} country rate(s) used",
            total_days, countries_used
        ),
    });

    Ok(ClaimComputation {
        per_country,
        totals,
        audit_steps,
    })
}

/// Resolves one direction's legs plus the layovers between them.
fn resolve_direction(
    legs: &[Leg],
    catalog: &RateCatalog,
    multiplier: Decimal,
    per_country: &mut BTreeMap<String, EntitlementBreakdown>,
    audit_steps: &mut Vec<AuditStep>,
    step_number: &mut u32,
) -> EngineResult<()> {
    for (index, leg) in legs.iter().enumerate() {
        *step_number += 1;
        let resolved = resolve_leg(
            &leg.from_country,
            &leg.to_country,
            leg.departure_time,
            leg.arrival_time,
            catalog,
            multiplier,
            *step_number,
        )?;
        for (country, breakdown) in &resolved.breakdowns {
            per_country
                .entry(country.clone())
                .or_default()
                .merge(breakdown);
        }
        audit_steps.push(resolved.audit_step);

        // Layover at this leg's arrival point while waiting for the next
        // leg. Waiting at home accrues nothing.
        if let Some(next) = legs.get(index + 1) {
            let jurisdiction = catalog.resolve(&leg.to_country)?;
            if let Some(rate) = jurisdiction.record() {
                *step_number += 1;
                let layover = resolve_layover(
                    leg.arrival_time,
                    next.departure_time,
                    rate.full_day,
                    multiplier,
                    *step_number,
                );
                debug!(
                    country = %leg.to_country,
                    total = %layover.total,
                    days = layover.days_walked,
                    "layover resolved"
                );
                per_country
                    .entry(leg.to_country.clone())
                    .or_default()
                    .merge(&layover.breakdown);
                audit_steps.push(layover.audit_step);
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigLoader;
    use crate::models::FundingSource;
    use chrono::NaiveDateTime;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn make_datetime(date_str: &str, time_str: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(&format!("{} {}", date_str, time_str), "%Y-%m-%d %H:%M:%S")
            .unwrap()
    }

    fn load_catalog() -> RateCatalog {
        ConfigLoader::load("./config/dsa")
            .expect("Failed to load config")
            .catalog()
            .clone()
    }

    fn leg(from: &str, to: &str, dep: NaiveDateTime, arr: NaiveDateTime) -> Leg {
        Leg {
            from_country: from.to_string(),
            to_country: to.to_string(),
            departure_time: dep,
            arrival_time: arr,
        }
    }

    fn single_destination_claim(tier: &str, funding: FundingSource) -> TravelClaim {
        TravelClaim {
            traveler_id: "trav_001".to_string(),
            grade_tier: tier.to_string(),
            funding,
            outbound: vec![leg(
                "ZWE",
                "USA",
                make_datetime("2024-03-01", "08:00:00"),
                make_datetime("2024-03-02", "19:00:00"),
            )],
            return_legs: vec![leg(
                "USA",
                "ZWE",
                make_datetime("2024-03-08", "09:30:00"),
                make_datetime("2024-03-10", "20:00:00"),
            )],
        }
    }

    // ==========================================================================
    // AGG-001: single-destination itinerary, standard grade, government funded
    // ==========================================================================
    #[test]
    fn test_agg_001_single_destination_standard() {
        let catalog = load_catalog();
        let claim = single_destination_claim("standard", FundingSource::Government);
        let result = aggregate_claim(&claim, &catalog).unwrap();

        // Outbound leg: dinner 45 + accommodation 150 + breakfast 30 + other
        // 22.50 = 247.50.
        // Stay (arr 03-02 19:00 to dep 03-08 09:30): 5 full days x 300 =
        // 1500, plus arrival-day dinner 45 + accommodation 150, plus
        // departure-day breakfast 30 = 1725.
        // Return leg (home arrival suppressed): breakfast 30 + other 3 = 33.
        let usa = &result.per_country["USA"];
        assert_eq!(usa.total, dec("2005.50"));
        assert_eq!(result.totals.entitlement_total, dec("2005.50"));
        assert_eq!(result.totals.grand_total, dec("2005.50"));
        assert_eq!(result.totals.representation, Decimal::ZERO);
        assert_eq!(result.totals.supplementary, Decimal::ZERO);
        assert_eq!(result.totals.total_days, 10);
        assert_eq!(result.totals.countries_used, 1);
        assert!(!result.totals.multiple_country_rates);
        assert_eq!(result.totals.breakfast_count, 8);
        assert_eq!(result.totals.lunch_count, 5);
        assert_eq!(result.totals.dinner_count, 7);
        assert_eq!(result.totals.night_count, 7);
    }

    // ==========================================================================
    // AGG-002: multi-leg itinerary with a waypoint layover uses two country
    // rates
    // ==========================================================================
    #[test]
    fn test_agg_002_waypoint_layover_multi_country() {
        let catalog = load_catalog();
        let claim = TravelClaim {
            traveler_id: "trav_002".to_string(),
            grade_tier: "standard".to_string(),
            funding: FundingSource::Government,
            outbound: vec![
                leg(
                    "ZWE",
                    "ARE",
                    make_datetime("2024-03-01", "07:00:00"),
                    make_datetime("2024-03-01", "15:00:00"),
                ),
                leg(
                    "ARE",
                    "FRA",
                    make_datetime("2024-03-02", "09:00:00"),
                    make_datetime("2024-03-02", "13:30:00"),
                ),
            ],
            return_legs: vec![leg(
                "FRA",
                "ZWE",
                make_datetime("2024-03-04", "10:00:00"),
                make_datetime("2024-03-05", "06:30:00"),
            )],
        };

        let result = aggregate_claim(&claim, &catalog).unwrap();

        // ARE: leg 1 (lunch 48 + other 4.80 + departure breakfast 32 + other
        // 3.20 = 88) + layover (dinner 48 + accommodation 160 + breakfast 32
        // + other 32 = 272) + leg 2 departure side (breakfast 32 + other
        // 3.20 = 35.20) = 395.20.
        assert_eq!(result.per_country["ARE"].total, dec("395.20"));
        // FRA: leg 2 arrival (lunch 39 + other 3.90 = 42.90) + stay (1 full
        // day 260 + dinner 39 + accommodation 130 + breakfast 26 = 455) +
        // return departure (breakfast 26 + other 2.60 = 28.60) = 526.50.
        assert_eq!(result.per_country["FRA"].total, dec("526.50"));
        assert_eq!(result.totals.entitlement_total, dec("921.70"));
        assert_eq!(result.totals.countries_used, 2);
        assert!(result.totals.multiple_country_rates);
        assert_eq!(result.totals.total_days, 5);
    }

    // ==========================================================================
    // AGG-003: executive grade representation + external supplementary
    // ==========================================================================
    #[test]
    fn test_agg_003_executive_external_allowances() {
        let catalog = load_catalog();
        let claim = single_destination_claim("executive", FundingSource::External);
        let result = aggregate_claim(&claim, &catalog).unwrap();

        // Entitlement scales linearly with the 1.25 multiplier.
        assert_eq!(result.totals.entitlement_total, dec("2506.875"));
        // Representation: avg implied daily rate = 2506.875 / (10 x 1.25)
        // = 200.55; x 10% x 10 days = 200.55.
        assert_eq!(result.totals.representation, dec("200.55"));
        // Supplementary: 10 days x 40.00.
        assert_eq!(result.totals.supplementary, dec("400.00"));
        assert_eq!(result.totals.grand_total, dec("3107.425"));
    }

    // ==========================================================================
    // AGG-004: supplementary allowance caps at 30 days
    // ==========================================================================
    #[test]
    fn test_agg_004_supplementary_capped_at_30_days() {
        let catalog = load_catalog();
        let claim = TravelClaim {
            traveler_id: "trav_003".to_string(),
            grade_tier: "standard".to_string(),
            funding: FundingSource::External,
            outbound: vec![leg(
                "ZWE",
                "KEN",
                make_datetime("2024-03-01", "08:00:00"),
                make_datetime("2024-03-01", "11:00:00"),
            )],
            return_legs: vec![leg(
                "KEN",
                "ZWE",
                make_datetime("2024-04-14", "08:00:00"),
                make_datetime("2024-04-14", "11:00:00"),
            )],
        };

        let result = aggregate_claim(&claim, &catalog).unwrap();
        // 2024-03-01 through 2024-04-14 inclusive is 45 days.
        assert_eq!(result.totals.total_days, 45);
        assert_eq!(result.totals.supplementary, dec("1200.00"));
    }

    #[test]
    fn test_empty_outbound_rejected() {
        let catalog = load_catalog();
        let mut claim = single_destination_claim("standard", FundingSource::Government);
        claim.outbound.clear();
        assert!(matches!(
            aggregate_claim(&claim, &catalog),
            Err(EngineError::CalculationError { .. })
        ));
    }

    #[test]
    fn test_empty_return_rejected() {
        let catalog = load_catalog();
        let mut claim = single_destination_claim("standard", FundingSource::Government);
        claim.return_legs.clear();
        assert!(matches!(
            aggregate_claim(&claim, &catalog),
            Err(EngineError::CalculationError { .. })
        ));
    }

    #[test]
    fn test_unknown_grade_rejected() {
        let catalog = load_catalog();
        let claim = single_destination_claim("intern", FundingSource::Government);
        assert!(matches!(
            aggregate_claim(&claim, &catalog),
            Err(EngineError::GradeNotFound { .. })
        ));
    }

    #[test]
    fn test_missing_rate_aborts_aggregation() {
        let catalog = load_catalog();
        let mut claim = single_destination_claim("standard", FundingSource::Government);
        claim.outbound[0].to_country = "ATL".to_string();
        assert!(matches!(
            aggregate_claim(&claim, &catalog),
            Err(EngineError::MissingRate { .. })
        ));
    }

    #[test]
    fn test_audit_steps_are_sequential() {
        let catalog = load_catalog();
        let claim = single_destination_claim("standard", FundingSource::Government);
        let result = aggregate_claim(&claim, &catalog).unwrap();

        let numbers: Vec<u32> = result.audit_steps.iter().map(|s| s.step_number).collect();
        let expected: Vec<u32> = (1..=numbers.len() as u32).collect();
        assert_eq!(numbers, expected);
        // Leg, stay, leg, totals.
        assert_eq!(result.audit_steps.len(), 4);
        assert_eq!(result.audit_steps[0].rule_id, "leg_resolver");
        assert_eq!(result.audit_steps[1].rule_id, "stay_resolver");
        assert_eq!(result.audit_steps[3].rule_id, "itinerary_totals");
    }
}
