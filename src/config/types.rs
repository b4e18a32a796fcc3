//! Configuration types for entitlement resolution.
//!
//! This module contains the strongly-typed configuration structures that
//! are deserialized from YAML configuration files.

use rust_decimal::Decimal;
use serde::Deserialize;
use std::collections::HashMap;

use crate::error::{EngineError, EngineResult};

/// Metadata about the rate catalog.
///
/// Contains identifying information about the catalog, including its
/// issuing authority code, name, version, and source URL.
#[derive(Debug, Clone, Deserialize)]
pub struct CatalogMetadata {
    /// The catalog code (e.g., "DSA-2024").
    pub code: String,
    /// The human-readable name of the catalog.
    pub name: String,
    /// The version or effective date of the catalog.
    pub version: String,
    /// URL to the official rate circular.
    pub source_url: String,
}

/// The daily subsistence rate record for one country.
///
/// All amounts are per-day base rates before grade scaling.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RateRecord {
    /// The full-day allowance rate.
    pub full_day: Decimal,
    /// The breakfast component rate.
    pub breakfast: Decimal,
    /// The lunch component rate.
    pub lunch: Decimal,
    /// The dinner component rate.
    pub dinner: Decimal,
    /// The accommodation component rate.
    pub accommodation: Decimal,
}

impl RateRecord {
    /// Returns true if every component of the record is zero.
    pub fn is_zero(&self) -> bool {
        self.full_day.is_zero()
            && self.breakfast.is_zero()
            && self.lunch.is_zero()
            && self.dinner.is_zero()
            && self.accommodation.is_zero()
    }
}

/// Catalog configuration file structure (catalog.yaml).
#[derive(Debug, Clone, Deserialize)]
pub struct CatalogConfig {
    /// Catalog metadata.
    pub catalog: CatalogMetadata,
    /// The country identifier of the traveler's home jurisdiction.
    ///
    /// Arrival there suppresses further entitlement. If the rates map carries
    /// a record for this country it must be all-zero.
    pub home_country: String,
    /// Map of country identifier to rate record.
    pub rates: HashMap<String, RateRecord>,
}

/// Grade policy for one traveler seniority tier.
#[derive(Debug, Clone, Deserialize)]
pub struct GradePolicy {
    /// Scalar applied to every base rate component.
    pub multiplier: Decimal,
    /// Percentage of the unscaled country full-day rate paid as a
    /// representation allowance while physically present at a non-home
    /// destination.
    pub representation_percent: Decimal,
}

/// Grade policy configuration file structure (grades.yaml).
#[derive(Debug, Clone, Deserialize)]
pub struct GradesConfig {
    /// Map of grade tier identifier to policy.
    pub grades: HashMap<String, GradePolicy>,
}

/// Fixed allowance rates (allowances.yaml).
#[derive(Debug, Clone, Deserialize)]
pub struct AllowanceRates {
    /// The fixed per-day supplementary allowance for externally funded
    /// itineraries.
    pub supplementary_daily_rate: Decimal,
}

/// The jurisdiction a country identifier resolves to.
///
/// The home jurisdiction is the single country with an all-zero rate record;
/// resolving it as a tagged variant keeps the string comparison against the
/// home code in one place instead of scattered through every resolver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Jurisdiction<'a> {
    /// The traveler's home jurisdiction. No subsistence accrues here.
    Home,
    /// A foreign country with its rate record.
    Foreign(&'a RateRecord),
}

impl<'a> Jurisdiction<'a> {
    /// Returns true for the home jurisdiction.
    pub fn is_home(&self) -> bool {
        matches!(self, Jurisdiction::Home)
    }

    /// Returns the rate record for a foreign country, or `None` for home.
    pub fn record(&self) -> Option<&'a RateRecord> {
        match self {
            Jurisdiction::Home => None,
            Jurisdiction::Foreign(record) => Some(record),
        }
    }
}

/// The complete rate catalog loaded from YAML files.
///
/// This struct aggregates all configuration loaded from the various
/// YAML files in a catalog configuration directory.
#[derive(Debug, Clone)]
pub struct RateCatalog {
    /// Catalog metadata.
    metadata: CatalogMetadata,
    /// The home jurisdiction's country identifier.
    home_country: String,
    /// Per-country rate records.
    rates: HashMap<String, RateRecord>,
    /// Grade tier policies.
    grades: HashMap<String, GradePolicy>,
    /// Fixed allowance rates.
    allowances: AllowanceRates,
}

impl RateCatalog {
    /// Creates a new RateCatalog from its component parts.
    ///
    /// Validates the engine invariant that the home jurisdiction's record,
    /// when present in the rates map, is all-zero.
    pub fn new(
        metadata: CatalogMetadata,
        home_country: String,
        rates: HashMap<String, RateRecord>,
        grades: HashMap<String, GradePolicy>,
        allowances: AllowanceRates,
    ) -> EngineResult<Self> {
        if let Some(home_record) = rates.get(&home_country)
            && !home_record.is_zero()
        {
            return Err(EngineError::ConfigInvalid {
                message: format!(
                    "home jurisdiction '{}' must have an all-zero rate record",
                    home_country
                ),
            });
        }
        Ok(Self {
            metadata,
            home_country,
            rates,
            grades,
            allowances,
        })
    }

    /// Returns the catalog metadata.
    pub fn metadata(&self) -> &CatalogMetadata {
        &self.metadata
    }

    /// Returns the home jurisdiction's country identifier.
    pub fn home_country(&self) -> &str {
        &self.home_country
    }

    /// Returns the fixed allowance rates.
    pub fn allowances(&self) -> &AllowanceRates {
        &self.allowances
    }

    /// Resolves a country identifier to its jurisdiction.
    ///
    /// The home country resolves to [`Jurisdiction::Home`] whether or not an
    /// explicit all-zero record is present for it. Any other country without
    /// a rate record is a [`EngineError::MissingRate`] — the computation for
    /// the affected leg must abort rather than substitute zeros.
    pub fn resolve(&self, country: &str) -> EngineResult<Jurisdiction<'_>> {
        if country == self.home_country {
            return Ok(Jurisdiction::Home);
        }
        self.rates
            .get(country)
            .map(Jurisdiction::Foreign)
            .ok_or_else(|| EngineError::MissingRate {
                country: country.to_string(),
            })
    }

    /// Looks up the grade policy for a tier.
    pub fn grade(&self, tier: &str) -> EngineResult<&GradePolicy> {
        self.grades
            .get(tier)
            .ok_or_else(|| EngineError::GradeNotFound {
                tier: tier.to_string(),
            })
    }
}
