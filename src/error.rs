// src/error.rs
use crate::solvers::Method;
use thiserror::Error;

/// Error types for the ode-lab engine
///
/// Every error is local to one solve: a failing method never poisons the
/// others when several are requested together.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum OdeError {
    /// Invalid parameter values
    #[error("Invalid parameter '{parameter}' = {value}: {constraint}")]
    InvalidParameters {
        parameter: String,
        value: f64,
        constraint: String,
    },

    /// Invalid configuration
    #[error("Invalid configuration for '{field}': {reason}")]
    InvalidConfiguration { field: String, reason: String },

    /// Malformed equation or reference-function text
    #[error("Failed to parse '{formula}': {reason}")]
    Parse { formula: String, reason: String },

    /// The equation (or reference solution) could not be evaluated at a point
    #[error("Evaluation failed at x = {x}, y = {y}: {reason}")]
    EvaluationFailure { x: f64, y: f64, reason: String },

    /// The grid needs more steps than the configured ceiling allows
    #[error("{method} needs more than {limit} steps at h = {step:e}")]
    IterationLimitExceeded {
        method: Method,
        step: f64,
        limit: usize,
    },

    /// Fine pass of a Runge comparison does not reach every coarse grid point
    #[error("{method} fine pass at h = {step:e} has {fine_samples} samples, {required} needed")]
    GridMismatch {
        method: Method,
        step: f64,
        fine_samples: usize,
        required: usize,
    },

    /// Milne corrector fixed-point iteration did not settle
    #[error(
        "Milne corrector did not converge at x = {x} after {iterations} iterations (last change {last_change:e})"
    )]
    CorrectorDivergence {
        x: f64,
        iterations: usize,
        last_change: f64,
    },

    /// Runge estimate still above tolerance after the last allowed halving
    #[error(
        "{method} did not reach epsilon = {epsilon:e} after {halvings} step halvings (estimate {estimate:e})"
    )]
    ToleranceNotMet {
        method: Method,
        epsilon: f64,
        halvings: u32,
        estimate: f64,
    },

    /// Configuration file could not be read or decoded
    #[error("Failed to load configuration from '{source_name}': {reason}")]
    ConfigLoad { source_name: String, reason: String },
}

/// Result type alias for ode-lab operations
pub type OdeResult<T> = Result<T, OdeError>;

/// Validation utilities
pub mod validation {
    use super::{OdeError, OdeResult};

    /// Validate that a parameter is positive
    pub fn validate_positive(name: &str, value: f64) -> OdeResult<()> {
        if !(value > 0.0) {
            Err(OdeError::InvalidParameters {
                parameter: name.to_string(),
                value,
                constraint: "must be positive (> 0)".to_string(),
            })
        } else {
            Ok(())
        }
    }

    /// Validate that a value is finite and not NaN
    pub fn validate_finite(name: &str, value: f64) -> OdeResult<()> {
        if !value.is_finite() {
            Err(OdeError::InvalidParameters {
                parameter: name.to_string(),
                value,
                constraint: "must be finite (not NaN or infinite)".to_string(),
            })
        } else {
            Ok(())
        }
    }

    /// Validate that `upper` does not lie before `lower`
    pub fn validate_ordered(lower_name: &str, lower: f64, upper_name: &str, upper: f64) -> OdeResult<()> {
        if upper < lower {
            Err(OdeError::InvalidParameters {
                parameter: upper_name.to_string(),
                value: upper,
                constraint: format!("must be >= {} ({})", lower_name, lower),
            })
        } else {
            Ok(())
        }
    }

    /// Validate an iteration or halving limit
    pub fn validate_limit(field: &str, limit: usize) -> OdeResult<()> {
        if limit == 0 {
            Err(OdeError::InvalidConfiguration {
                field: field.to_string(),
                reason: "must be greater than 0".to_string(),
            })
        } else if limit > 10_000_000 {
            Err(OdeError::InvalidConfiguration {
                field: field.to_string(),
                reason: "exceeds maximum allowed (10,000,000)".to_string(),
            })
        } else {
            Ok(())
        }
    }
}
