//! Per-country entitlement breakdown accumulator.
//!
//! Each resolver owns the breakdowns it produces; the aggregator merges them
//! by country into a read-only final map.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A payable meal or accommodation component.
///
/// The incidental "other" uplift is not a component in this sense: it is
/// derived from granted components, never granted by a band directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Component {
    /// The breakfast meal component.
    Breakfast,
    /// The lunch meal component.
    Lunch,
    /// The dinner meal component.
    Dinner,
    /// The overnight accommodation component.
    Accommodation,
}

impl Component {
    /// Returns true for meal components (everything except accommodation).
    pub fn is_meal(&self) -> bool {
        !matches!(self, Component::Accommodation)
    }
}

impl std::fmt::Display for Component {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Component::Breakfast => write!(f, "breakfast"),
            Component::Lunch => write!(f, "lunch"),
            Component::Dinner => write!(f, "dinner"),
            Component::Accommodation => write!(f, "accommodation"),
        }
    }
}

/// Accumulated entitlement for one country.
///
/// Five component totals plus meal/night counts and the running total. The
/// `total` field is the single derived value; it is only ever updated through
/// [`EntitlementBreakdown::grant`], [`EntitlementBreakdown::add_other`] and
/// [`EntitlementBreakdown::merge`], which keeps it equal to the sum of the
/// five components.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntitlementBreakdown {
    /// Total breakfast amount.
    pub breakfast: Decimal,
    /// Total lunch amount.
    pub lunch: Decimal,
    /// Total dinner amount.
    pub dinner: Decimal,
    /// Total accommodation amount.
    pub accommodation: Decimal,
    /// Total incidental "other" amount.
    pub other: Decimal,
    /// Number of breakfasts granted.
    pub breakfast_count: u32,
    /// Number of lunches granted.
    pub lunch_count: u32,
    /// Number of dinners granted.
    pub dinner_count: u32,
    /// Number of nights of accommodation granted.
    pub night_count: u32,
    /// Sum of the five component totals.
    pub total: Decimal,
}

impl EntitlementBreakdown {
    /// Grants one component occurrence, accumulating its amount and count.
    pub fn grant(&mut self, component: Component, amount: Decimal) {
        match component {
            Component::Breakfast => {
                self.breakfast += amount;
                self.breakfast_count += 1;
            }
            Component::Lunch => {
                self.lunch += amount;
                self.lunch_count += 1;
            }
            Component::Dinner => {
                self.dinner += amount;
                self.dinner_count += 1;
            }
            Component::Accommodation => {
                self.accommodation += amount;
                self.night_count += 1;
            }
        }
        self.total += amount;
    }

    /// Grants `count` occurrences of a component at once.
    pub fn grant_many(&mut self, component: Component, amount_each: Decimal, count: u32) {
        for _ in 0..count {
            self.grant(component, amount_each);
        }
    }

    /// Adds to the incidental "other" total.
    pub fn add_other(&mut self, amount: Decimal) {
        self.other += amount;
        self.total += amount;
    }

    /// Merges another breakdown into this one.
    pub fn merge(&mut self, other: &EntitlementBreakdown) {
        self.breakfast += other.breakfast;
        self.lunch += other.lunch;
        self.dinner += other.dinner;
        self.accommodation += other.accommodation;
        self.other += other.other;
        self.breakfast_count += other.breakfast_count;
        self.lunch_count += other.lunch_count;
        self.dinner_count += other.dinner_count;
        self.night_count += other.night_count;
        self.total += other.total;
    }

    /// Total number of meal grants (breakfasts + lunches + dinners).
    pub fn meal_count(&self) -> u32 {
        self.breakfast_count + self.lunch_count + self.dinner_count
    }
}
