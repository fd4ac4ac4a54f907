use std::collections::HashMap;
use std::fmt;

use optizenith_solver::{LpProblem, Solver, SolverConfig, VariableSpec};
use tracing::debug;

use crate::{Constraint, LinearExpr, ModelError, ModelSolution, Objective, Variable, VariableId};

/// A linear program under construction.
///
/// Variables keep the order in which they were added; that order is the
/// column order handed to the solver.
#[derive(Debug, Clone, Default)]
pub struct Model {
    name: String,
    variables: Vec<Variable>,
    constraints: Vec<Constraint>,
    objective: Option<Objective>,
}

impl Model {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Registers `variable` and returns a handle to it.
    pub fn add_variable(&mut self, variable: Variable) -> Result<Variable, ModelError> {
        if self.variables.contains(&variable) {
            return Err(ModelError::DuplicateVariable {
                name: variable.name().to_string(),
            });
        }
        self.variables.push(variable.clone());
        Ok(variable)
    }

    /// Creates a continuous variable with the given bounds and registers it.
    pub fn new_variable(
        &mut self,
        name: impl Into<String>,
        lower: f64,
        upper: f64,
    ) -> Result<Variable, ModelError> {
        self.add_variable(Variable::new(name, lower, upper)?)
    }

    /// Appends a constraint and returns its index.
    pub fn add_constraint(&mut self, constraint: Constraint) -> usize {
        self.constraints.push(constraint);
        self.constraints.len() - 1
    }

    /// Replaces any previous objective.
    pub fn set_objective(&mut self, objective: Objective) {
        self.objective = Some(objective);
    }

    pub fn variables(&self) -> &[Variable] {
        &self.variables
    }

    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    pub fn objective(&self) -> Option<&Objective> {
        self.objective.as_ref()
    }

    fn column_index(&self) -> HashMap<VariableId, usize> {
        self.variables
            .iter()
            .enumerate()
            .map(|(i, v)| (v.id(), i))
            .collect()
    }

    /// Snapshot of the model as an index-based [`LpProblem`].
    pub fn to_problem(&self) -> Result<LpProblem, ModelError> {
        let index = self.column_index();
        let terms = |expr: &LinearExpr| -> Result<Vec<(usize, f64)>, ModelError> {
            expr.terms()
                .iter()
                .map(|(v, c)| match index.get(&v.id()) {
                    Some(&j) => Ok((j, *c)),
                    None => Err(ModelError::UnknownVariable {
                        name: v.name().to_string(),
                    }),
                })
                .collect()
        };

        let variables = self
            .variables
            .iter()
            .map(|v| {
                let mut spec = VariableSpec::new(v.name(), v.lower(), v.upper());
                spec.integer = v.is_integer();
                spec
            })
            .collect();
        let mut problem = LpProblem::new(variables).with_name(self.name.clone());

        if let Some(objective) = &self.objective {
            problem.set_objective(terms(objective.expression())?, objective.sense());
        }
        for c in &self.constraints {
            problem.add_constraint(c.name(), terms(c.expression())?, c.op(), c.rhs());
        }
        Ok(problem)
    }

    /// Solves the current state of the model.
    pub fn solve(&self, config: &SolverConfig) -> Result<ModelSolution, ModelError> {
        let problem = self.to_problem()?;
        debug!(
            component = "model",
            operation = "solve",
            model = %self.name,
            engine = %config.engine,
            "Solving model"
        );
        let solution = Solver::with_config(config.clone()).solve(&problem)?;
        Ok(ModelSolution::new(solution, self.column_index()))
    }
}

impl fmt::Display for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Model: {}", self.name)?;
        writeln!(f, "Variables:")?;
        for v in &self.variables {
            writeln!(f, "\t{v}")?;
        }
        match &self.objective {
            Some(objective) => writeln!(f, "Objective: {objective}")?,
            None => writeln!(f, "Objective: none")?,
        }
        writeln!(f, "Constraints:")?;
        for c in &self.constraints {
            writeln!(f, "\t{c}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use optizenith_solver::{ConstraintOp, Sense, SolutionStatus, SolveError};

    #[test]
    fn test_duplicate_variable_rejected() {
        let mut model = Model::new("dup");
        let x = model.add_variable(Variable::nonnegative("x")).unwrap();
        assert!(matches!(
            model.add_variable(x.clone()),
            Err(ModelError::DuplicateVariable { .. })
        ));
        // same name, different identity is fine
        assert!(model.add_variable(Variable::nonnegative("x")).is_ok());
        assert_eq!(model.variables().len(), 2);
    }

    #[test]
    fn test_to_problem_maps_indices() {
        let mut model = Model::new("snapshot");
        let x = model.new_variable("x", 0.0, 4.0).unwrap();
        let y = model.add_variable(Variable::free("y")).unwrap();
        model.set_objective(Objective::minimize(
            LinearExpr::term(&y, 3.0).with_term(&x, 1.0),
        ));
        let idx = model.add_constraint(LinearExpr::term(&x, 2.0).with_term(&y, -1.0).geq(1.0).named("c"));
        assert_eq!(idx, 0);

        let problem = model.to_problem().unwrap();
        assert_eq!(problem.name, "snapshot");
        assert_eq!(problem.variables[0].upper, 4.0);
        assert_eq!(problem.variables[1].lower, f64::NEG_INFINITY);
        let objective = problem.objective.as_ref().unwrap();
        assert_eq!(objective.terms, vec![(1, 3.0), (0, 1.0)]);
        assert_eq!(objective.sense, Sense::Minimize);
        assert_eq!(problem.constraints[0].terms, vec![(0, 2.0), (1, -1.0)]);
        assert_eq!(problem.constraints[0].op, ConstraintOp::Ge);
        assert_eq!(problem.constraints[0].name, "c");
    }

    #[test]
    fn test_unknown_variable_reported() {
        let mut model = Model::new("stray");
        let x = model.add_variable(Variable::nonnegative("x")).unwrap();
        let stray = Variable::nonnegative("stray");
        model.set_objective(Objective::minimize(LinearExpr::from(&x)));
        model.add_constraint((LinearExpr::from(&x) + LinearExpr::from(&stray)).leq(1.0));

        assert_eq!(
            model.solve(&SolverConfig::default()).unwrap_err(),
            ModelError::UnknownVariable {
                name: "stray".to_string()
            }
        );
    }

    #[test]
    fn test_missing_objective_surfaces_solve_error() {
        let mut model = Model::new("no objective");
        model.add_variable(Variable::nonnegative("x")).unwrap();
        assert_eq!(
            model.solve(&SolverConfig::default()).unwrap_err(),
            ModelError::Solve(SolveError::MissingObjective)
        );
    }

    #[test]
    fn test_solve_textbook() {
        let mut model = Model::new("textbook");
        let x = model.add_variable(Variable::nonnegative("x")).unwrap();
        let y = model.add_variable(Variable::nonnegative("y")).unwrap();
        model.set_objective(Objective::maximize(
            LinearExpr::from(&x) + LinearExpr::term(&y, 2.0),
        ));
        model.add_constraint((LinearExpr::from(&x) + LinearExpr::from(&y)).leq(10.0));
        model.add_constraint((LinearExpr::from(&x) + LinearExpr::term(&y, 4.0)).leq(20.0));
        model.add_constraint((LinearExpr::term(&x, 3.0) + LinearExpr::term(&y, 2.0)).leq(30.0));

        let solution = model.solve(&SolverConfig::default()).unwrap();
        assert_eq!(solution.status(), SolutionStatus::Optimal);
        assert!((solution.objective_value() - 40.0 / 3.0).abs() < 1e-9);
        assert!((solution.value(&x).unwrap() - 20.0 / 3.0).abs() < 1e-9);
        assert!((solution.value(&y).unwrap() - 10.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_display_lists_everything() {
        let mut model = Model::new("demo");
        let x = model.new_variable("x", 0.0, 10.0).unwrap();
        model.set_objective(Objective::minimize(LinearExpr::from(&x)));
        model.add_constraint(LinearExpr::from(&x).geq(1.0));

        let text = model.to_string();
        assert!(text.starts_with("Model: demo\n"));
        assert!(text.contains("\tx (continuous): [0, 10]\n"));
        assert!(text.contains("Objective: Minimize x\n"));
        assert!(text.contains("\tx >= 1\n"));
    }
}
