//! Entitlement Resolution Engine for travel daily subsistence allowances.
//!
//! This crate computes per-traveler subsistence entitlements (meals,
//! accommodation, incidental "other" expenses, representation and supplementary
//! allowances) for multi-leg international itineraries, given per-country daily
//! rate tables and a traveler grade tier.

#![warn(missing_docs)]

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod resolution;
