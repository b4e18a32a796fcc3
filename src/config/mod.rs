//! Configuration for the Entitlement Resolution Engine.
//!
//! The rate catalog and grade policy tables are externally supplied static
//! data, loaded from YAML files. This module provides the strongly-typed
//! configuration structures and the loader that reads and validates them.

mod loader;
mod types;

pub use loader::ConfigLoader;
pub use types::{
    AllowanceRates, CatalogMetadata, GradePolicy, Jurisdiction, RateCatalog, RateRecord,
};
