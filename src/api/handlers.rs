//! HTTP request handlers for the Entitlement Resolution Engine API.
//!
//! This module contains the handler functions for all API endpoints.

use std::time::Instant;

use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    http::{StatusCode, header},
    response::IntoResponse,
    routing::post,
};
use chrono::Utc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::config::ConfigLoader;
use crate::error::EngineError;
use crate::models::{AuditTrace, ClaimResult, TravelClaim};
use crate::resolution::{aggregate_claim, build_day_ledger, reconcile};

use super::request::ClaimRequest;
use super::response::{ApiError, ApiErrorResponse};
use super::state::AppState;

/// Creates the API router with all endpoints.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/calculate", post(calculate_handler))
        .with_state(state)
}

/// Handler for POST /calculate endpoint.
///
/// Accepts a claim request and returns the resolved entitlement result.
async fn calculate_handler(
    State(state): State<AppState>,
    payload: Result<Json<ClaimRequest>, JsonRejection>,
) -> impl IntoResponse {
    // Generate correlation ID for request tracking
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, "Processing claim request");

    // Handle JSON parsing errors
    let request = match payload {
        Ok(Json(req)) => req,
        Err(rejection) => {
            let error = match rejection {
                JsonRejection::JsonDataError(err) => {
                    // Get the body text which contains the detailed error from serde
                    let body_text = err.body_text();
                    warn!(
                        correlation_id = %correlation_id,
                        error = %body_text,
                        "JSON data error"
                    );
                    if body_text.contains("missing field") {
                        ApiError::new("VALIDATION_ERROR", body_text)
                    } else {
                        ApiError::malformed_json(body_text)
                    }
                }
                JsonRejection::JsonSyntaxError(err) => {
                    warn!(
                        correlation_id = %correlation_id,
                        error = %err,
                        "JSON syntax error"
                    );
                    ApiError::malformed_json(format!("Invalid JSON syntax: {}", err))
                }
                JsonRejection::MissingJsonContentType(_) => {
                    ApiError::new("MISSING_CONTENT_TYPE", "Content-Type must be application/json")
                }
                _ => ApiError::malformed_json("Failed to parse request body"),
            };
            return (
                StatusCode::BAD_REQUEST,
                [(header::CONTENT_TYPE, "application/json")],
                Json(error),
            )
                .into_response();
        }
    };

    // Convert request types to domain types
    let claim: TravelClaim = request.into();

    // Validate the grade tier exists before resolving
    let config = state.config();
    if let Err(err) = config.catalog().grade(&claim.grade_tier) {
        warn!(
            correlation_id = %correlation_id,
            grade_tier = %claim.grade_tier,
            "Grade tier not found"
        );
        let api_error: ApiErrorResponse = err.into();
        return (
            api_error.status,
            [(header::CONTENT_TYPE, "application/json")],
            Json(api_error.error),
        )
            .into_response();
    }

    // Perform the resolution
    let start_time = Instant::now();
    match perform_resolution(&claim, config) {
        Ok(result) => {
            let duration = start_time.elapsed();
            info!(
                correlation_id = %correlation_id,
                traveler_id = %claim.traveler_id,
                legs_count = claim.outbound.len() + claim.return_legs.len(),
                grand_total = %result.totals.grand_total,
                duration_us = duration.as_micros(),
                "Resolution completed successfully"
            );
            (
                StatusCode::OK,
                [(header::CONTENT_TYPE, "application/json")],
                Json(result),
            )
                .into_response()
        }
        Err(err) => {
            warn!(
                correlation_id = %correlation_id,
                error = %err,
                "Resolution failed"
            );
            let api_error: ApiErrorResponse = err.into();
            (
                api_error.status,
                [(header::CONTENT_TYPE, "application/json")],
                Json(api_error.error),
            )
                .into_response()
        }
    }
}

/// Resolves a claim end to end: aggregation, ledger derivation, and
/// reconciliation of the two totals.
fn perform_resolution(
    claim: &TravelClaim,
    config: &ConfigLoader,
) -> Result<ClaimResult, EngineError> {
    let start_time = Instant::now();
    let catalog = config.catalog();

    let computation = aggregate_claim(claim, catalog)?;
    let ledger = build_day_ledger(claim, catalog)?;

    let mut warnings = Vec::new();
    if let Some(warning) = reconcile(&computation.totals, &ledger) {
        warn!(
            code = %warning.code,
            message = %warning.message,
            "Ledger reconciliation divergence"
        );
        warnings.push(warning);
    }

    Ok(ClaimResult {
        claim_id: Uuid::new_v4(),
        timestamp: Utc::now(),
        engine_version: env!("CARGO_PKG_VERSION").to_string(),
        traveler_id: claim.traveler_id.clone(),
        grade_tier: claim.grade_tier.clone(),
        funding: claim.funding,
        per_country: computation.per_country,
        totals: computation.totals,
        ledger,
        audit_trace: AuditTrace {
            steps: computation.audit_steps,
            warnings,
            duration_us: start_time.elapsed().as_micros() as u64,
        },
    })
}
