use std::collections::HashMap;

use optizenith_solver::{Engine, Solution, SolutionStatus};

use crate::{Variable, VariableId};

/// A [`Solution`] whose values are looked up by [`Variable`].
#[derive(Debug, Clone, PartialEq)]
pub struct ModelSolution {
    solution: Solution,
    columns: HashMap<VariableId, usize>,
}

impl ModelSolution {
    pub(crate) fn new(solution: Solution, columns: HashMap<VariableId, usize>) -> Self {
        Self { solution, columns }
    }

    /// Value of `variable`, if the solve reported a point and the variable
    /// belongs to the solved model.
    pub fn value(&self, variable: &Variable) -> Option<f64> {
        let column = self.columns.get(&variable.id())?;
        self.solution.value(*column)
    }

    pub fn status(&self) -> SolutionStatus {
        self.solution.status
    }

    pub fn is_optimal(&self) -> bool {
        self.solution.is_optimal()
    }

    pub fn objective_value(&self) -> f64 {
        self.solution.objective_value
    }

    pub fn iterations(&self) -> usize {
        self.solution.iterations
    }

    pub fn engine(&self) -> Engine {
        self.solution.engine
    }

    /// Shadow price of the constraint with index `constraint`, as returned by
    /// [`crate::Model::add_constraint`].
    pub fn dual(&self, constraint: usize) -> Option<f64> {
        self.solution.dual(constraint)
    }

    /// The underlying index-based solution.
    pub fn raw(&self) -> &Solution {
        &self.solution
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_by_variable() {
        let x = Variable::nonnegative("x");
        let y = Variable::nonnegative("y");
        let outsider = Variable::nonnegative("x");
        let columns = HashMap::from([(x.id(), 0), (y.id(), 1)]);
        let solution = ModelSolution::new(
            Solution {
                status: SolutionStatus::Optimal,
                objective_value: 7.0,
                values: vec![1.0, 3.0],
                duals: vec![0.5],
                iterations: 2,
                engine: Engine::Simplex,
            },
            columns,
        );

        assert_eq!(solution.value(&x), Some(1.0));
        assert_eq!(solution.value(&y), Some(3.0));
        assert_eq!(solution.value(&outsider), None);
        assert_eq!(solution.dual(0), Some(0.5));
        assert_eq!(solution.dual(1), None);
        assert!(solution.is_optimal());
    }

    #[test]
    fn test_no_point_means_no_values() {
        let x = Variable::nonnegative("x");
        let solution = ModelSolution::new(
            Solution {
                status: SolutionStatus::Infeasible,
                objective_value: f64::INFINITY,
                values: Vec::new(),
                duals: Vec::new(),
                iterations: 1,
                engine: Engine::Simplex,
            },
            HashMap::from([(x.id(), 0)]),
        );
        assert_eq!(solution.value(&x), None);
        assert_eq!(solution.status(), SolutionStatus::Infeasible);
    }
}
