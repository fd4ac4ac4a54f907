use std::fmt;

use crate::Engine;

/// The result of solving an LP problem.
///
/// Always branch on `status` before trusting `objective_value` or `values`.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Solution {
    /// Solution status
    pub status: SolutionStatus,
    /// Objective value in the problem's own sense
    pub objective_value: f64,
    /// Value for each original variable, in problem order. Empty when there
    /// is no point to report.
    pub values: Vec<f64>,
    /// Shadow price for each original constraint: change in objective per
    /// unit increase of its right-hand side. Empty unless optimal.
    pub duals: Vec<f64>,
    /// Iterations performed (pivots for simplex)
    pub iterations: usize,
    /// Engine that produced this solution
    pub engine: Engine,
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SolutionStatus {
    /// An optimal solution was found
    Optimal,
    /// The problem is infeasible (no solution exists)
    Infeasible,
    /// The problem is unbounded
    Unbounded,
    /// The iteration ceiling was reached before convergence
    IterationLimit,
    /// A singular system or a non-finite iterate stopped the engine
    NumericalFailure,
}

impl SolutionStatus {
    pub fn is_optimal(self) -> bool {
        matches!(self, SolutionStatus::Optimal)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SolutionStatus::Optimal => "optimal",
            SolutionStatus::Infeasible => "infeasible",
            SolutionStatus::Unbounded => "unbounded",
            SolutionStatus::IterationLimit => "iteration_limit",
            SolutionStatus::NumericalFailure => "numerical_failure",
        }
    }
}

impl fmt::Display for SolutionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Solution {
    pub fn is_optimal(&self) -> bool {
        self.status.is_optimal()
    }

    /// Value of the variable at `index`, if a point was reported.
    pub fn value(&self, index: usize) -> Option<f64> {
        self.values.get(index).copied()
    }

    /// Shadow price of the constraint at `index`, if available.
    pub fn dual(&self, index: usize) -> Option<f64> {
        self.duals.get(index).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_strings() {
        assert_eq!(SolutionStatus::Optimal.to_string(), "optimal");
        assert_eq!(SolutionStatus::IterationLimit.as_str(), "iteration_limit");
        assert!(SolutionStatus::Optimal.is_optimal());
        assert!(!SolutionStatus::NumericalFailure.is_optimal());
    }

    #[test]
    fn test_accessors_on_empty_solution() {
        let solution = Solution {
            status: SolutionStatus::Infeasible,
            objective_value: f64::INFINITY,
            values: Vec::new(),
            duals: Vec::new(),
            iterations: 3,
            engine: Engine::Simplex,
        };
        assert_eq!(solution.value(0), None);
        assert_eq!(solution.dual(0), None);
        assert!(!solution.is_optimal());
    }
}
