// src/config.rs
use crate::error::{validation::*, OdeError, OdeResult};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::path::Path;

/// Parameters of one solve
///
/// Immutable while a solve runs; every routine takes the step size it
/// works with as an explicit argument instead of reading `step` from here,
/// so a coarse and a fine pass can share one config.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    pub x_start: f64,
    pub x_end: f64,
    /// Requested step size `h`; the adaptive controller may halve it
    pub step: f64,
    /// Tolerance for the Runge estimate and the Milne corrector
    pub epsilon: f64,
    /// `y(x_start)`
    pub initial_y: f64,
    /// Hard ceiling on steps per integration pass
    pub max_iterations: usize,
    /// Maximum number of global step halvings
    pub max_halvings: u32,
    /// Maximum corrector iterations per Milne step
    pub max_corrector_iterations: usize,
}

impl SolverConfig {
    /// Validate the solver configuration
    pub fn validate(&self) -> OdeResult<()> {
        validate_finite("x_start", self.x_start)?;
        validate_finite("x_end", self.x_end)?;
        validate_ordered("x_start", self.x_start, "x_end", self.x_end)?;
        validate_finite("step", self.step)?;
        validate_positive("step", self.step)?;
        validate_finite("epsilon", self.epsilon)?;
        validate_positive("epsilon", self.epsilon)?;
        validate_finite("initial_y", self.initial_y)?;
        validate_limit("max_iterations", self.max_iterations)?;
        validate_limit("max_halvings", self.max_halvings as usize)?;
        validate_limit("max_corrector_iterations", self.max_corrector_iterations)?;

        if self.max_halvings > 60 {
            return Err(OdeError::InvalidConfiguration {
                field: "max_halvings".to_string(),
                reason: "more than 60 halvings underflows any useful step".to_string(),
            });
        }

        Ok(())
    }

    /// Parse a YAML document; missing fields take their defaults
    pub fn from_yaml_str(text: &str) -> OdeResult<Self> {
        let config: SolverConfig =
            serde_yaml::from_str(text).map_err(|e| OdeError::ConfigLoad {
                source_name: "<string>".to_string(),
                reason: e.to_string(),
            })?;
        config.validate()?;
        Ok(config)
    }
}

impl Default for SolverConfig {
    fn default() -> Self {
        SolverConfig {
            x_start: 1.0,
            x_end: 1.5,
            step: 0.2,
            epsilon: 1e-4,
            initial_y: -1.0,
            max_iterations: 2000,
            max_halvings: 16,
            max_corrector_iterations: 100,
        }
    }
}

/// Load and validate a solver configuration from a YAML file
pub fn load_config<P: AsRef<Path>>(path: P) -> OdeResult<SolverConfig> {
    let path = path.as_ref();
    let source_name = path.display().to_string();
    let file = File::open(path).map_err(|e| OdeError::ConfigLoad {
        source_name: source_name.clone(),
        reason: e.to_string(),
    })?;
    let config: SolverConfig = serde_yaml::from_reader(file).map_err(|e| OdeError::ConfigLoad {
        source_name,
        reason: e.to_string(),
    })?;
    config.validate()?;
    Ok(config)
}
