//! Solver configuration types.

use std::fmt;
use std::str::FromStr;

use crate::SolveError;

/// Which algorithm the driver runs.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Engine {
    /// Two-phase revised simplex
    #[default]
    Simplex,
    /// Primal-dual path-following interior point
    InteriorPoint,
}

impl Engine {
    pub fn as_str(self) -> &'static str {
        match self {
            Engine::Simplex => "simplex",
            Engine::InteriorPoint => "interior-point",
        }
    }

    /// Iteration ceiling used when the configuration does not set one.
    pub fn default_max_iterations(self) -> usize {
        match self {
            Engine::Simplex => 1000,
            Engine::InteriorPoint => 100,
        }
    }
}

impl fmt::Display for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Engine {
    type Err = SolveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "simplex" => Ok(Engine::Simplex),
            "interior-point" => Ok(Engine::InteriorPoint),
            _ => Err(SolveError::UnknownEngine(s.to_string())),
        }
    }
}

/// Configuration options for a solve call.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Debug, Clone, PartialEq)]
pub struct SolverConfig {
    /// Algorithm to run.
    pub engine: Engine,
    /// Hard iteration ceiling. `None` uses the engine default.
    pub max_iterations: Option<usize>,
    /// Optimality, feasibility and convergence threshold.
    pub tolerance: f64,
    /// Interior point: largest factor the barrier target may shrink by per iteration.
    pub barrier_reduction: f64,
    /// Interior point: share of the distance to the boundary a step may cover.
    pub fraction_to_boundary: f64,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            engine: Engine::Simplex,
            max_iterations: None,
            tolerance: 1e-6,
            barrier_reduction: 10.0,
            fraction_to_boundary: 0.9,
        }
    }
}

impl SolverConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_engine(mut self, engine: Engine) -> Self {
        self.engine = engine;
        self
    }

    pub fn with_max_iterations(mut self, max: usize) -> Self {
        self.max_iterations = Some(max);
        self
    }

    pub fn with_tolerance(mut self, tol: f64) -> Self {
        self.tolerance = tol;
        self
    }

    pub fn with_barrier_reduction(mut self, factor: f64) -> Self {
        self.barrier_reduction = factor;
        self
    }

    pub fn with_fraction_to_boundary(mut self, fraction: f64) -> Self {
        self.fraction_to_boundary = fraction;
        self
    }

    /// Effective iteration ceiling for the selected engine.
    pub fn iteration_limit(&self) -> usize {
        self.iteration_limit_for(self.engine)
    }

    /// Iteration ceiling `engine` runs with under this configuration.
    pub fn iteration_limit_for(&self, engine: Engine) -> usize {
        self.max_iterations
            .unwrap_or_else(|| engine.default_max_iterations())
    }

    pub fn validate(&self) -> Result<(), SolveError> {
        if !(self.tolerance.is_finite() && self.tolerance > 0.0) {
            return Err(SolveError::InvalidConfig(format!(
                "tolerance must be finite and positive (got {})",
                self.tolerance
            )));
        }
        if self.max_iterations == Some(0) {
            return Err(SolveError::InvalidConfig(
                "max_iterations must be at least 1".to_string(),
            ));
        }
        if !(self.barrier_reduction.is_finite() && self.barrier_reduction > 1.0) {
            return Err(SolveError::InvalidConfig(format!(
                "barrier_reduction must be greater than 1 (got {})",
                self.barrier_reduction
            )));
        }
        if !(self.fraction_to_boundary > 0.0 && self.fraction_to_boundary < 1.0) {
            return Err(SolveError::InvalidConfig(format!(
                "fraction_to_boundary must lie in (0, 1) (got {})",
                self.fraction_to_boundary
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_engine_from_str() {
        assert_eq!("simplex".parse::<Engine>(), Ok(Engine::Simplex));
        assert_eq!("Interior-Point".parse::<Engine>(), Ok(Engine::InteriorPoint));
        assert_eq!(
            "barrier".parse::<Engine>(),
            Err(SolveError::UnknownEngine("barrier".to_string()))
        );
    }

    #[test]
    fn test_engine_display_round_trips() {
        for engine in [Engine::Simplex, Engine::InteriorPoint] {
            assert_eq!(engine.to_string().parse::<Engine>(), Ok(engine));
        }
    }

    #[test]
    fn test_iteration_limit_defaults_per_engine() {
        let config = SolverConfig::new();
        assert_eq!(config.iteration_limit(), 1000);
        let config = config.with_engine(Engine::InteriorPoint);
        assert_eq!(config.iteration_limit(), 100);
        let config = config.with_max_iterations(7);
        assert_eq!(config.iteration_limit(), 7);
    }

    #[test]
    fn test_iteration_limit_for_other_engine() {
        let config = SolverConfig::new();
        assert_eq!(config.iteration_limit_for(Engine::InteriorPoint), 100);
        assert_eq!(config.with_max_iterations(3).iteration_limit_for(Engine::Simplex), 3);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        assert!(SolverConfig::new().validate().is_ok());
        assert!(SolverConfig::new().with_tolerance(0.0).validate().is_err());
        assert!(SolverConfig::new().with_tolerance(f64::NAN).validate().is_err());
        assert!(SolverConfig::new().with_max_iterations(0).validate().is_err());
        assert!(SolverConfig::new().with_barrier_reduction(1.0).validate().is_err());
        assert!(SolverConfig::new().with_fraction_to_boundary(1.0).validate().is_err());
    }
}
