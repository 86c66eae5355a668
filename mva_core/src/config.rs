//! Solver configuration.

use serde::{Deserialize, Serialize};

use crate::error::MvaError;

/// Default convergence tolerance on the total response time.
pub const DEFAULT_TOLERANCE: f64 = 1e-6;

/// Default iteration budget before a solve is reported as non-converged.
pub const DEFAULT_MAX_ITERATIONS: usize = 10_000;

/// Controls when the fixed-point loop stops.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SolverConfig {
    /// Converged once successive totals differ by less than this
    pub tolerance: f64,

    /// Maximum number of full iterations
    pub max_iterations: usize,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            tolerance: DEFAULT_TOLERANCE,
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }
}

impl SolverConfig {
    /// Creates a configuration with the given tolerance and the default budget.
    pub fn new(tolerance: f64) -> Self {
        Self {
            tolerance,
            ..Default::default()
        }
    }

    /// Sets the tolerance.
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Sets the iteration budget.
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Rejects a non-positive or non-finite tolerance and an empty budget.
    pub fn validate(&self) -> Result<(), MvaError> {
        if !self.tolerance.is_finite() || self.tolerance <= 0.0 {
            return Err(MvaError::config(format!(
                "error tolerance must be a positive number, got {}",
                self.tolerance
            )));
        }
        if self.max_iterations == 0 {
            return Err(MvaError::config("iteration budget must be at least 1"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = SolverConfig::default();
        assert_eq!(config.tolerance, DEFAULT_TOLERANCE);
        assert_eq!(config.max_iterations, DEFAULT_MAX_ITERATIONS);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_rejects_bad_tolerance() {
        for eps in [0.0, -1e-3, f64::NAN, f64::INFINITY] {
            let err = SolverConfig::new(eps).validate().unwrap_err();
            assert!(matches!(err, MvaError::InvalidConfig(_)), "eps={eps}");
        }
    }

    #[test]
    fn test_rejects_empty_budget() {
        let config = SolverConfig::default().with_max_iterations(0);
        assert!(matches!(config.validate(), Err(MvaError::InvalidConfig(_))));
    }
}
