use tracing::{debug, warn};

use crate::engine::{EngineResult, LpEngine};
use crate::interior_point::InteriorPointEngine;
use crate::problem::{LpProblem, Sense};
use crate::simplex::SimplexEngine;
use crate::{Engine, Solution, SolutionStatus, SolveError, SolverConfig, StandardForm};

/// Entry point: validates a problem, runs the configured engine and maps the
/// result back onto the original variables and constraints.
#[derive(Debug, Clone, Default)]
pub struct Solver {
    config: SolverConfig,
}

impl Solver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: SolverConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    /// Solve with the configured engine.
    ///
    /// Returns `Err` only for problems or settings that cannot be solved at
    /// all; infeasible, unbounded and stalled runs come back as a
    /// [`Solution`] with the matching status.
    pub fn solve(&self, problem: &LpProblem) -> Result<Solution, SolveError> {
        self.solve_with(problem, self.config.engine)
    }

    /// Solve with an engine chosen by name (`"simplex"` or `"interior-point"`).
    pub fn solve_with_engine(&self, problem: &LpProblem, engine: &str) -> Result<Solution, SolveError> {
        let engine: Engine = engine.parse()?;
        self.solve_with(problem, engine)
    }

    fn solve_with(&self, problem: &LpProblem, engine: Engine) -> Result<Solution, SolveError> {
        self.config.validate()?;
        let form = StandardForm::build(problem)?;

        let integers = problem.variables.iter().filter(|v| v.integer).count();
        if integers > 0 {
            warn!(
                component = "solver",
                operation = "solve",
                integers,
                "Integer variables are solved as continuous"
            );
        }

        debug!(
            component = "solver",
            operation = "solve",
            problem = %problem.name,
            engine = %engine,
            variables = problem.num_variables(),
            constraints = problem.num_constraints(),
            "Solving"
        );

        let config = self.config.clone().with_engine(engine);
        let result = match engine {
            Engine::Simplex => SimplexEngine::from_config(&config).run(&form),
            Engine::InteriorPoint => InteriorPointEngine::from_config(&config).run(&form),
        };

        let solution = package(problem, &form, result, engine);
        debug!(
            component = "solver",
            operation = "solve",
            status = %solution.status,
            objective = solution.objective_value,
            iterations = solution.iterations,
            "Solve finished"
        );
        Ok(solution)
    }
}

/// Turns an index-based engine result into a [`Solution`] over the original
/// variables and constraints.
fn package(problem: &LpProblem, form: &StandardForm, result: EngineResult, engine: Engine) -> Solution {
    let sense = form.sense;
    let empty = |status: SolutionStatus, objective_value: f64| Solution {
        status,
        objective_value,
        values: Vec::new(),
        duals: Vec::new(),
        iterations: result.iterations,
        engine,
    };

    match result.status {
        SolutionStatus::Infeasible => empty(SolutionStatus::Infeasible, worst_objective(sense)),
        SolutionStatus::Unbounded => empty(SolutionStatus::Unbounded, -worst_objective(sense)),
        SolutionStatus::NumericalFailure => empty(SolutionStatus::NumericalFailure, f64::NAN),
        SolutionStatus::IterationLimit if result.x.is_empty() => {
            empty(SolutionStatus::IterationLimit, f64::NAN)
        }
        status => {
            let values = form.recover_values(&result.x);
            let objective_value = problem
                .objective
                .as_ref()
                .map(|o| o.terms.iter().map(|&(j, coef)| coef * values[j]).sum::<f64>())
                .unwrap_or(0.0);
            let duals = if status.is_optimal() {
                form.recover_duals(&result.y)
            } else {
                Vec::new()
            };
            Solution {
                status,
                objective_value,
                values,
                duals,
                iterations: result.iterations,
                engine,
            }
        }
    }
}

/// Objective reported for an infeasible problem: `+inf` when minimizing,
/// `-inf` when maximizing. Negated for unbounded.
fn worst_objective(sense: Sense) -> f64 {
    match sense {
        Sense::Minimize => f64::INFINITY,
        Sense::Maximize => f64::NEG_INFINITY,
    }
}
