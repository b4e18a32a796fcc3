//! Configuration loading functionality.
//!
//! This module provides the [`ConfigLoader`] type for loading the rate
//! catalog, grade policy and allowance tables from YAML files.

use std::fs;
use std::path::Path;

use crate::error::{EngineError, EngineResult};

use super::types::{AllowanceRates, CatalogConfig, GradesConfig, RateCatalog};

/// Loads and provides access to the rate catalog configuration.
///
/// The `ConfigLoader` reads YAML configuration files from a directory
/// and provides access to the validated [`RateCatalog`].
///
/// # Directory Structure
///
/// The configuration directory should have the following structure:
/// ```text
/// config/dsa/
/// ├── catalog.yaml     # Catalog metadata, home country, per-country rates
/// ├── grades.yaml      # Grade tier policies
/// └── allowances.yaml  # Fixed supplementary allowance rate
/// ```
///
/// # Example
///
/// ```no_run
/// use dsa_engine::config::ConfigLoader;
///
/// let loader = ConfigLoader::load("./config/dsa").unwrap();
///
/// // Resolve a country to its jurisdiction
/// let jurisdiction = loader.catalog().resolve("USA").unwrap();
/// assert!(!jurisdiction.is_home());
/// ```
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    catalog: RateCatalog,
}

impl ConfigLoader {
    /// Loads configuration from the specified directory.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the configuration directory (e.g., "./config/dsa")
    ///
    /// # Returns
    ///
    /// Returns a `ConfigLoader` instance on success, or an error if:
    /// - Any required file is missing
    /// - Any file contains invalid YAML
    /// - The home jurisdiction carries a non-zero rate record
    ///
    /// # Example
    ///
    /// ```no_run
    /// use dsa_engine::config::ConfigLoader;
    ///
    /// let loader = ConfigLoader::load("./config/dsa")?;
    /// # Ok::<(), dsa_engine::error::EngineError>(())
    /// ```
    pub fn load<P: AsRef<Path>>(path: P) -> EngineResult<Self> {
        let path = path.as_ref();

        // Load catalog.yaml
        let catalog_path = path.join("catalog.yaml");
        let catalog_config = Self::load_yaml::<CatalogConfig>(&catalog_path)?;

        // Load grades.yaml
        let grades_path = path.join("grades.yaml");
        let grades_config = Self::load_yaml::<GradesConfig>(&grades_path)?;

        // Load allowances.yaml
        let allowances_path = path.join("allowances.yaml");
        let allowances = Self::load_yaml::<AllowanceRates>(&allowances_path)?;

        let catalog = RateCatalog::new(
            catalog_config.catalog,
            catalog_config.home_country,
            catalog_config.rates,
            grades_config.grades,
            allowances,
        )?;

        Ok(Self { catalog })
    }

    /// Loads and parses a YAML file.
    fn load_yaml<T: serde::de::DeserializeOwned>(path: &Path) -> EngineResult<T> {
        let path_str = path.display().to_string();

        let content = fs::read_to_string(path).map_err(|_| EngineError::ConfigNotFound {
            path: path_str.clone(),
        })?;

        serde_yaml::from_str(&content).map_err(|e| EngineError::ConfigParseError {
            path: path_str,
            message: e.to_string(),
        })
    }

    /// Returns the loaded rate catalog.
    pub fn catalog(&self) -> &RateCatalog {
        &self.catalog
    }
}
