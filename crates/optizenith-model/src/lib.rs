//! Modeling layer for optizenith: build a [`Model`] from [`Variable`]s and
//! [`LinearExpr`]s, then solve it with either engine of `optizenith-solver`.
//!
//! ```
//! use optizenith_model::{LinearExpr, Model, Objective, Variable};
//! use optizenith_solver::SolverConfig;
//!
//! let mut model = Model::new("production");
//! let x = model.add_variable(Variable::nonnegative("x")).unwrap();
//! let y = model.add_variable(Variable::nonnegative("y")).unwrap();
//! model.set_objective(Objective::maximize(LinearExpr::from(&x) + LinearExpr::term(&y, 2.0)));
//! model.add_constraint((LinearExpr::from(&x) + LinearExpr::from(&y)).leq(10.0));
//! model.add_constraint((LinearExpr::from(&x) + LinearExpr::term(&y, 4.0)).leq(20.0));
//!
//! let solution = model.solve(&SolverConfig::default()).unwrap();
//! assert!(solution.is_optimal());
//! assert!((solution.value(&x).unwrap() - 20.0 / 3.0).abs() < 1e-9);
//! ```

mod constraint;
mod error;
mod expr;
mod model;
mod solution;
mod variable;

pub use constraint::{Constraint, Objective};
pub use error::ModelError;
pub use expr::LinearExpr;
pub use model::Model;
pub use solution::ModelSolution;
pub use variable::{Variable, VariableId, VariableKind};

pub use optizenith_solver::{ConstraintOp, Engine, Sense, SolutionStatus, SolverConfig};
