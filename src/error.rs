//! Error types for the Entitlement Resolution Engine.
//!
//! This module provides strongly-typed errors using the `thiserror` crate
//! for all error conditions that can occur during entitlement resolution.

use thiserror::Error;

/// The main error type for the Entitlement Resolution Engine.
///
/// All operations in the engine return this error type, making it easy
/// to handle errors consistently throughout the application.
///
/// # Example
///
/// ```
/// use dsa_engine::error::EngineError;
///
/// let error = EngineError::ConfigNotFound {
///     path: "/missing/file.yaml".to_string(),
/// };
/// assert_eq!(error.to_string(), "Configuration file not found: /missing/file.yaml");
/// ```
#[derive(Debug, Error)]
pub enum EngineError {
    /// Configuration file was not found at the specified path.
    #[error("Configuration file not found: {path}")]
    ConfigNotFound {
        /// The path that was not found.
        path: String,
    },

    /// Configuration file could not be parsed.
    #[error("Failed to parse configuration file '{path}': {message}")]
    ConfigParseError {
        /// The path to the file that failed to parse.
        path: String,
        /// A description of the parse error.
        message: String,
    },

    /// Configuration was loaded but violates an engine invariant.
    #[error("Invalid configuration: {message}")]
    ConfigInvalid {
        /// A description of the violated invariant.
        message: String,
    },

    /// A referenced country has no entry in the rate catalog.
    ///
    /// This aborts the entire computation for the affected leg; no partial
    /// or zero-filled result is substituted.
    #[error("No rate record for country: {country}")]
    MissingRate {
        /// The country identifier that was not found.
        country: String,
    },

    /// The requested grade tier has no entry in the grade policy table.
    #[error("Grade tier not found: {tier}")]
    GradeNotFound {
        /// The grade tier identifier that was not found.
        tier: String,
    },

    /// A general calculation error occurred.
    #[error("Calculation error: {message}")]
    CalculationError {
        /// A description of the calculation error.
        message: String,
    },
}

/// A type alias for Results that return EngineError.
pub type EngineResult<T> = Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_not_found_displays_path() {
        let error = EngineError::ConfigNotFound {
            path: "/missing/file.yaml".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Configuration file not found: /missing/file.yaml"
        );
    }

    #[test]
    fn test_missing_rate_displays_country() {
        let error = EngineError::MissingRate {
            country: "ATL".to_string(),
        };
        assert_eq!(error.to_string(), "No rate record for country: ATL");
    }

    #[test]
    fn test_grade_not_found_displays_tier() {
        let error = EngineError::GradeNotFound {
            tier: "tier_99".to_string(),
        };
        assert_eq!(error.to_string(), "Grade tier not found: tier_99");
    }

    #[test]
    fn test_config_parse_error_displays_path_and_message() {
        let error = EngineError::ConfigParseError {
            path: "/config/bad.yaml".to_string(),
            message: "invalid YAML syntax".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Failed to parse configuration file '/config/bad.yaml': invalid YAML syntax"
        );
    }

    #[test]
    fn test_config_invalid_displays_message() {
        let error = EngineError::ConfigInvalid {
            message: "home country record must be all-zero".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Invalid configuration: home country record must be all-zero"
        );
    }

    #[test]
    fn test_calculation_error_displays_message() {
        let error = EngineError::CalculationError {
            message: "negative day count".to_string(),
        };
        assert_eq!(error.to_string(), "Calculation error: negative day count");
    }

    #[test]
    fn test_errors_implement_std_error() {
        fn assert_error<T: std::error::Error>() {}
        assert_error::<EngineError>();
    }

    #[test]
    fn test_error_propagation_with_question_mark() {
        fn returns_missing_rate() -> EngineResult<()> {
            Err(EngineError::MissingRate {
                country: "XXX".to_string(),
            })
        }

        fn propagates_error() -> EngineResult<()> {
            returns_missing_rate()?;
            Ok(())
        }

        assert!(propagates_error().is_err());
    }
}
