//! Request types for the Entitlement Resolution Engine API.
//!
//! This module defines the JSON request structures for the `/calculate` endpoint.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::models::{FundingSource, Leg, TravelClaim};

/// Request body for the `/calculate` endpoint.
///
/// Contains all information needed to resolve the subsistence entitlement
/// for one traveler's itinerary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClaimRequest {
    /// The traveler information.
    pub traveler: TravelerRequest,
    /// The funding source for the itinerary.
    pub funding: FundingSource,
    /// The ordered outbound legs.
    pub outbound: Vec<LegRequest>,
    /// The ordered return legs.
    #[serde(rename = "return")]
    pub return_legs: Vec<LegRequest>,
}

/// Traveler information in a claim request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TravelerRequest {
    /// Unique identifier for the traveler.
    pub id: String,
    /// The traveler's grade tier (e.g., "standard", "executive").
    pub grade_tier: String,
}

/// Leg information in a claim request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LegRequest {
    /// The country identifier the leg departs from.
    pub from_country: String,
    /// The country identifier the leg arrives in.
    pub to_country: String,
    /// The departure timestamp (local wall-clock).
    pub departure_time: NaiveDateTime,
    /// The arrival timestamp (local wall-clock).
    pub arrival_time: NaiveDateTime,
}

impl From<LegRequest> for Leg {
    fn from(req: LegRequest) -> Self {
        Leg {
            from_country: req.from_country,
            to_country: req.to_country,
            departure_time: req.departure_time,
            arrival_time: req.arrival_time,
        }
    }
}

impl From<ClaimRequest> for TravelClaim {
    fn from(req: ClaimRequest) -> Self {
        TravelClaim {
            traveler_id: req.traveler.id,
            grade_tier: req.traveler.grade_tier,
            funding: req.funding,
            outbound: req.outbound.into_iter().map(Into::into).collect(),
            return_legs: req.return_legs.into_iter().map(Into::into).collect(),
        }
    }
}
