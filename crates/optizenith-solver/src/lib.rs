//! Linear programming core: standard-form conversion, a two-phase revised
//! simplex engine and a primal-dual interior point engine behind one driver.
//!
//! ```
//! use optizenith_solver::{ConstraintOp, LpProblem, Sense, Solver, VariableSpec};
//!
//! let mut problem = LpProblem::new(vec![
//!     VariableSpec::nonnegative("x"),
//!     VariableSpec::nonnegative("y"),
//! ]);
//! problem.set_objective(vec![(0, 1.0), (1, 2.0)], Sense::Maximize);
//! problem.add_constraint("a", vec![(0, 1.0), (1, 1.0)], ConstraintOp::Le, 10.0);
//! problem.add_constraint("b", vec![(0, 1.0), (1, 4.0)], ConstraintOp::Le, 20.0);
//!
//! let solution = Solver::new().solve(&problem).unwrap();
//! assert!(solution.is_optimal());
//! assert!((solution.objective_value - 40.0 / 3.0).abs() < 1e-9);
//! ```

mod config;
mod driver;
mod engine;
mod error;
mod interior_point;
mod linalg;
mod problem;
mod simplex;
mod solution;
mod standard_form;

pub use config::{Engine, SolverConfig};
pub use driver::Solver;
pub use engine::{EngineResult, LpEngine};
pub use error::SolveError;
pub use interior_point::InteriorPointEngine;
pub use problem::{Constraint, ConstraintOp, LpProblem, Objective, Sense, VariableSpec};
pub use simplex::SimplexEngine;
pub use solution::{Solution, SolutionStatus};
pub use standard_form::{ColumnMap, StandardForm, validate};
