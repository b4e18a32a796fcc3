//! HTTP API module for the Entitlement Resolution Engine.
//!
//! This module provides the REST API endpoint for resolving daily
//! subsistence allowance claims for multi-leg international itineraries.

mod handlers;
mod request;
mod response;
mod state;

pub use handlers::create_router;
pub use request::ClaimRequest;
pub use response::ApiError;
pub use state::AppState;
