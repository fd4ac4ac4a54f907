//! Capability interface shared by the simplex and interior point engines.

use crate::{Engine, SolutionStatus, StandardForm};

/// Raw, index-based result of an engine run over a [`StandardForm`].
#[derive(Debug, Clone, PartialEq)]
pub struct EngineResult {
    pub status: SolutionStatus,
    /// Value of every standard-form column (empty when there is no point to report)
    pub x: Vec<f64>,
    /// Row multipliers of the internal minimization
    pub y: Vec<f64>,
    pub iterations: usize,
}

impl EngineResult {
    /// A result that carries no point, e.g. infeasible or unbounded.
    pub fn without_point(status: SolutionStatus, iterations: usize) -> Self {
        Self {
            status,
            x: Vec::new(),
            y: Vec::new(),
            iterations,
        }
    }
}

/// An LP algorithm that runs over a standard-form problem.
///
/// Implementations never panic on numerical trouble. Systems that no fallback
/// can factor and non-finite iterates are reported as
/// [`SolutionStatus::NumericalFailure`].
pub trait LpEngine {
    /// Which engine this is.
    fn engine(&self) -> Engine;

    /// Run to optimality, a terminal status, or the iteration ceiling.
    fn run(&self, form: &StandardForm) -> EngineResult;
}
