#![allow(non_snake_case)]
//! Primal-dual path-following interior point method (Mehrotra predictor-corrector).
//!
//! Works on the equality standard form without artificial columns:
//!
//! ```text
//! primal  min cᵀx  s.t.  A x = b,  x ≥ 0
//! dual    max bᵀy  s.t.  Aᵀy + z = c,  z ≥ 0
//! ```
//!
//! The slack/surplus columns of the standard form make up the slack block of
//! `x`, so `r_p = A x - b` is the primal residual over structural and slack
//! parts alike. `x` and `z` stay strictly positive throughout; `y` is free.
//!
//! Each iteration solves the Newton system through the normal equations
//! `A D Aᵀ Δy = r` with `D = X Z⁻¹`, factored once and reused for the
//! predictor and corrector directions. Near the optimum `A D Aᵀ` turns
//! numerically singular. When plain Cholesky breaks down, the factorization
//! is retried with dependent pivots skipped, and only a non-finite system is
//! reported as `NumericalFailure`.
//!
//! A free variable is the split pair `x⁺ - x⁻`. Nothing in the Newton system
//! pins the pair's common part, so both halves tend to grow without bound.
//! After each step, a pair whose smaller half dominates its difference is
//! shifted back down. Each half keeps its `x·z` product.

use tracing::{debug, trace, warn};

use crate::engine::{EngineResult, LpEngine};
use crate::linalg::{self, Matrix};
use crate::{ColumnMap, Engine, SolutionStatus, SolverConfig, StandardForm};

/// A split pair is recentered once its smaller half exceeds this multiple of
/// `max(1, |x⁺ - x⁻|)`.
const SPLIT_PAIR_GROWTH: f64 = 100.0;

#[derive(Debug, Clone)]
pub struct InteriorPointEngine {
    max_iterations: usize,
    tolerance: f64,
    /// Lower bound on the centering parameter is `1 / barrier_reduction`
    barrier_reduction: f64,
    fraction_to_boundary: f64,
}

impl Default for InteriorPointEngine {
    fn default() -> Self {
        Self {
            max_iterations: Engine::InteriorPoint.default_max_iterations(),
            tolerance: 1e-6,
            barrier_reduction: 10.0,
            fraction_to_boundary: 0.9,
        }
    }
}

impl InteriorPointEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: &SolverConfig) -> Self {
        Self {
            max_iterations: config.iteration_limit_for(Engine::InteriorPoint),
            tolerance: config.tolerance,
            barrier_reduction: config.barrier_reduction,
            fraction_to_boundary: config.fraction_to_boundary,
        }
    }

    pub fn with_max_iterations(mut self, max: usize) -> Self {
        self.max_iterations = max;
        self
    }

    pub fn with_tolerance(mut self, tol: f64) -> Self {
        self.tolerance = tol;
        self
    }

    /// Centering parameter from how far the affine step would cut `μ`:
    /// `σ = (μ_aff / μ)³`, floored at `1 / barrier_reduction`.
    fn centering(&self, mu_aff: f64, mu: f64) -> f64 {
        let ratio = if mu > 0.0 { mu_aff / mu } else { 0.0 };
        ratio.powi(3).clamp(1.0 / self.barrier_reduction, 1.0)
    }

    fn result(&self, form: &StandardForm, state: &InteriorState, status: SolutionStatus, iterations: usize) -> EngineResult {
        let mut x = state.x.clone();
        x.resize(form.n_cols(), 0.0);
        EngineResult {
            status,
            x,
            y: state.y.clone(),
            iterations,
        }
    }
}

impl LpEngine for InteriorPointEngine {
    fn engine(&self) -> Engine {
        Engine::InteriorPoint
    }

    fn run(&self, form: &StandardForm) -> EngineResult {
        let n = form.artificial_start();
        let A: Matrix = form.a.iter().map(|row| row[..n].to_vec()).collect();
        let b = &form.b;
        let c = &form.c[..n];
        let b_scale = 1.0 + linalg::norm2(b);
        let c_scale = 1.0 + linalg::norm2(c);
        let split_pairs: Vec<(usize, usize)> = form
            .columns
            .iter()
            .filter_map(|map| match *map {
                ColumnMap::Split { pos, neg } => Some((pos, neg)),
                ColumnMap::Shifted { .. } => None,
            })
            .collect();

        let mut state = InteriorState::start(n, form.n_rows());

        for iteration in 0..=self.max_iterations {
            let res = Residuals::compute(&A, b, c, &state);
            let rel_p = res.primal_norm() / b_scale;
            let rel_d = res.dual_norm() / c_scale;
            trace!(
                component = "interior_point",
                iteration,
                primal = rel_p,
                dual = rel_d,
                mu = res.mu,
                "Iterate"
            );

            if rel_p < self.tolerance && rel_d < self.tolerance && res.mu < self.tolerance {
                debug!(component = "interior_point", iterations = iteration, mu = res.mu, "Converged");
                return self.result(form, &state, SolutionStatus::Optimal, iteration);
            }
            if iteration == self.max_iterations {
                warn!(component = "interior_point", iterations = iteration, mu = res.mu, "Iteration limit reached");
                return self.result(form, &state, SolutionStatus::IterationLimit, iteration);
            }

            let Some(newton) = NewtonSystem::factor(&A, &state) else {
                warn!(component = "interior_point", iteration, "Normal equations are not finite");
                return EngineResult::without_point(SolutionStatus::NumericalFailure, iteration);
            };

            // Predictor: pure affine-scaling direction
            let r_c_aff: Vec<f64> = state.x.iter().zip(&state.z).map(|(x, z)| -x * z).collect();
            let affine = newton.solve(&A, &state, &res, &r_c_aff);
            let alpha_p_aff = max_step(&state.x, &affine.dx).min(1.0);
            let alpha_d_aff = max_step(&state.z, &affine.dz).min(1.0);
            let mu_aff = state
                .x
                .iter()
                .zip(&affine.dx)
                .zip(state.z.iter().zip(&affine.dz))
                .map(|((x, dx), (z, dz))| (x + alpha_p_aff * dx) * (z + alpha_d_aff * dz))
                .sum::<f64>()
                / n as f64;
            let sigma = self.centering(mu_aff, res.mu);

            // Corrector: recenter toward σμ and cancel the second-order term
            let r_c: Vec<f64> = (0..n)
                .map(|j| sigma * res.mu - state.x[j] * state.z[j] - affine.dx[j] * affine.dz[j])
                .collect();
            let step = newton.solve(&A, &state, &res, &r_c);

            let alpha_p = (self.fraction_to_boundary * max_step(&state.x, &step.dx)).min(1.0);
            let alpha_d = (self.fraction_to_boundary * max_step(&state.z, &step.dz)).min(1.0);
            trace!(component = "interior_point", iteration, sigma, alpha_p, alpha_d, "Step");

            state.advance(&step, alpha_p, alpha_d);
            if !state.is_strictly_interior() {
                warn!(component = "interior_point", iteration, "Iterate left the interior");
                return EngineResult::without_point(SolutionStatus::NumericalFailure, iteration + 1);
            }
            let recentered = state.recenter_split_pairs(&split_pairs);
            if recentered > 0 {
                trace!(component = "interior_point", iteration, recentered, "Recentered free variables");
            }
        }

        // The loop always returns by its last pass
        EngineResult::without_point(SolutionStatus::IterationLimit, self.max_iterations)
    }
}

/// Primal, dual and slack-complementarity iterates.
struct InteriorState {
    x: Vec<f64>,
    y: Vec<f64>,
    z: Vec<f64>,
}

impl InteriorState {
    fn start(n: usize, m: usize) -> Self {
        Self {
            x: vec![1.0; n],
            y: vec![0.0; m],
            z: vec![1.0; n],
        }
    }

    fn advance(&mut self, d: &Direction, alpha_p: f64, alpha_d: f64) {
        for (x, dx) in self.x.iter_mut().zip(&d.dx) {
            *x += alpha_p * dx;
        }
        for (y, dy) in self.y.iter_mut().zip(&d.dy) {
            *y += alpha_d * dy;
        }
        for (z, dz) in self.z.iter_mut().zip(&d.dz) {
            *z += alpha_d * dz;
        }
    }

    /// Pulls each runaway `(x⁺, x⁻)` pair down by a common amount, leaving
    /// `x⁺ - x⁻` and every `x_j z_j` unchanged. Returns how many pairs moved.
    fn recenter_split_pairs(&mut self, pairs: &[(usize, usize)]) -> usize {
        let mut moved = 0;
        for &(pos, neg) in pairs {
            let floor = (self.x[pos] - self.x[neg]).abs().max(1.0);
            let common = self.x[pos].min(self.x[neg]);
            if common <= SPLIT_PAIR_GROWTH * floor {
                continue;
            }
            let shift = common - floor;
            for j in [pos, neg] {
                let product = self.x[j] * self.z[j];
                self.x[j] -= shift;
                self.z[j] = product / self.x[j];
            }
            moved += 1;
        }
        moved
    }

    fn is_strictly_interior(&self) -> bool {
        self.x.iter().chain(&self.z).all(|v| v.is_finite() && *v > 0.0)
            && self.y.iter().all(|v| v.is_finite())
    }
}

struct Residuals {
    /// `A x - b`
    r_p: Vec<f64>,
    /// `Aᵀ y + z - c`
    r_d: Vec<f64>,
    /// `xᵀz / n`
    mu: f64,
}

impl Residuals {
    fn compute(A: &[Vec<f64>], b: &[f64], c: &[f64], state: &InteriorState) -> Self {
        let n = c.len();
        let r_p = linalg::mat_vec(A, &state.x)
            .into_iter()
            .zip(b)
            .map(|(ax, bi)| ax - bi)
            .collect();
        let r_d = linalg::mat_t_vec(A, &state.y, n)
            .into_iter()
            .zip(&state.z)
            .zip(c)
            .map(|((aty, z), cj)| aty + z - cj)
            .collect();
        let mu = linalg::dot(&state.x, &state.z) / n as f64;
        Self { r_p, r_d, mu }
    }

    fn primal_norm(&self) -> f64 {
        linalg::norm2(&self.r_p)
    }

    fn dual_norm(&self) -> f64 {
        linalg::norm2(&self.r_d)
    }
}

struct Direction {
    dx: Vec<f64>,
    dy: Vec<f64>,
    dz: Vec<f64>,
}

/// Cholesky factor of `A D Aᵀ` for the current iterate.
struct NewtonSystem {
    L: Matrix,
    d: Vec<f64>,
}

impl NewtonSystem {
    fn factor(A: &[Vec<f64>], state: &InteriorState) -> Option<Self> {
        let m = A.len();
        let d: Vec<f64> = state.x.iter().zip(&state.z).map(|(x, z)| x / z).collect();
        let mut M = vec![vec![0.0; m]; m];
        for i in 0..m {
            for k in 0..=i {
                let v: f64 = A[i]
                    .iter()
                    .zip(&A[k])
                    .zip(&d)
                    .map(|((aij, akj), dj)| aij * dj * akj)
                    .sum();
                M[i][k] = v;
                M[k][i] = v;
            }
        }
        let L = match linalg::cholesky(&M) {
            Some(L) => L,
            None => {
                trace!(
                    component = "interior_point",
                    operation = "factor",
                    "Cholesky broke down, skipping dependent pivots"
                );
                linalg::cholesky_skipping(&M)?
            }
        };
        Some(Self { L, d })
    }

    /// Solves
    ///
    /// ```text
    /// A Δx         = -r_p
    /// AᵀΔy + Δz    = -r_d
    /// Z Δx + X Δz  =  r_c
    /// ```
    fn solve(&self, A: &[Vec<f64>], state: &InteriorState, res: &Residuals, r_c: &[f64]) -> Direction {
        let n = state.x.len();
        let t: Vec<f64> = (0..n)
            .map(|j| self.d[j] * (r_c[j] / state.x[j] + res.r_d[j]))
            .collect();
        let rhs: Vec<f64> = linalg::mat_vec(A, &t)
            .into_iter()
            .zip(&res.r_p)
            .map(|(at, rp)| -rp - at)
            .collect();
        let dy = linalg::cholesky_solve(&self.L, &rhs);
        let aty = linalg::mat_t_vec(A, &dy, n);
        let dx = (0..n).map(|j| t[j] + self.d[j] * aty[j]).collect();
        let dz = (0..n).map(|j| -res.r_d[j] - aty[j]).collect();
        Direction { dx, dy, dz }
    }
}

/// Largest `α` keeping `v + α·dv ≥ 0`; infinite when no component decreases.
fn max_step(v: &[f64], dv: &[f64]) -> f64 {
    v.iter()
        .zip(dv)
        .filter(|(_, d)| **d < 0.0)
        .map(|(vi, di)| -vi / di)
        .fold(f64::INFINITY, f64::min)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::problem::{ConstraintOp, LpProblem, Sense, VariableSpec};

    fn textbook() -> LpProblem {
        let mut problem = LpProblem::new(vec![
            VariableSpec::nonnegative("x"),
            VariableSpec::nonnegative("y"),
        ]);
        problem.set_objective(vec![(0, 1.0), (1, 2.0)], Sense::Maximize);
        problem.add_constraint("a", vec![(0, 1.0), (1, 1.0)], ConstraintOp::Le, 10.0);
        problem.add_constraint("b", vec![(0, 1.0), (1, 4.0)], ConstraintOp::Le, 20.0);
        problem.add_constraint("c", vec![(0, 3.0), (1, 2.0)], ConstraintOp::Le, 30.0);
        problem
    }

    #[test]
    fn test_textbook_converges() {
        let form = StandardForm::build(&textbook()).unwrap();
        let result = InteriorPointEngine::new().with_tolerance(1e-8).run(&form);

        assert_eq!(result.status, SolutionStatus::Optimal);
        let obj = linalg::dot(&form.c, &result.x);
        assert!((obj + 40.0 / 3.0).abs() < 1e-5, "obj = {obj} (expected -40/3)");
        assert!((result.x[0] - 20.0 / 3.0).abs() < 1e-4, "x = {}", result.x[0]);
        assert!((result.x[1] - 10.0 / 3.0).abs() < 1e-4, "y = {}", result.x[1]);
        assert!(result.iterations < 100);
    }

    #[test]
    fn test_iterates_stay_interior() {
        let form = StandardForm::build(&textbook()).unwrap();
        let result = InteriorPointEngine::new().run(&form);
        assert_eq!(result.status, SolutionStatus::Optimal);
        assert!(result.x[..form.artificial_start()].iter().all(|v| *v > 0.0));
    }

    #[test]
    fn test_equality_and_ge_rows() {
        // min x + y, x + y >= 4, x - y = 1  ->  x = 2.5, y = 1.5
        let mut problem = LpProblem::new(vec![
            VariableSpec::nonnegative("x"),
            VariableSpec::nonnegative("y"),
        ]);
        problem.set_objective(vec![(0, 1.0), (1, 1.0)], Sense::Minimize);
        problem.add_constraint("ge", vec![(0, 1.0), (1, 1.0)], ConstraintOp::Ge, 4.0);
        problem.add_constraint("eq", vec![(0, 1.0), (1, -1.0)], ConstraintOp::Eq, 1.0);

        let form = StandardForm::build(&problem).unwrap();
        let result = InteriorPointEngine::new().with_tolerance(1e-8).run(&form);

        assert_eq!(result.status, SolutionStatus::Optimal);
        assert!((result.x[0] - 2.5).abs() < 1e-5, "x = {}", result.x[0]);
        assert!((result.x[1] - 1.5).abs() < 1e-5, "y = {}", result.x[1]);
    }

    #[test]
    fn test_upper_bounded_variable() {
        let mut problem = LpProblem::new(vec![VariableSpec::new("x", 0.0, 10.0)]);
        problem.set_objective(vec![(0, 1.0)], Sense::Minimize);

        let form = StandardForm::build(&problem).unwrap();
        let result = InteriorPointEngine::new().run(&form);

        assert_eq!(result.status, SolutionStatus::Optimal);
        assert!(result.x[0].abs() < 1e-5, "x = {}", result.x[0]);
    }

    #[test]
    fn test_iteration_limit() {
        let form = StandardForm::build(&textbook()).unwrap();
        let result = InteriorPointEngine::new().with_max_iterations(2).run(&form);
        assert_eq!(result.status, SolutionStatus::IterationLimit);
        assert_eq!(result.iterations, 2);
    }

    #[test]
    fn test_unbounded_does_not_report_optimal() {
        let mut problem = LpProblem::new(vec![
            VariableSpec::nonnegative("x"),
            VariableSpec::nonnegative("y"),
        ]);
        problem.set_objective(vec![(0, 1.0)], Sense::Maximize);
        problem.add_constraint("gap", vec![(0, 1.0), (1, -1.0)], ConstraintOp::Le, 1.0);

        let form = StandardForm::build(&problem).unwrap();
        let result = InteriorPointEngine::new().run(&form);
        assert_ne!(result.status, SolutionStatus::Optimal);
    }

    /// Rows bounding every variable to [-20, 20] come first, followed by a
    /// degenerate mix of equality and inequality rows. Optimum 6 at (2, 0, 0).
    fn boxed_mixed_rows(v0: VariableSpec) -> LpProblem {
        let mut problem = LpProblem::new(vec![
            v0,
            VariableSpec::new("v1", 0.0, 5.0),
            VariableSpec::nonnegative("v2"),
        ]);
        problem.set_objective(vec![(0, 3.0), (1, -1.0), (2, -3.0)], Sense::Maximize);
        for j in 0..3 {
            problem.add_constraint(format!("hi{j}"), vec![(j, 1.0)], ConstraintOp::Le, 20.0);
            problem.add_constraint(format!("lo{j}"), vec![(j, 1.0)], ConstraintOp::Ge, -20.0);
        }
        let rows = [
            ([3.0, -1.0, -2.0], ConstraintOp::Eq, 6.0),
            ([-3.0, 2.0, -1.0], ConstraintOp::Le, -2.0),
            ([1.0, -1.0, 3.0], ConstraintOp::Ge, 1.0),
            ([1.0, -1.0, 1.0], ConstraintOp::Ge, 2.0),
            ([2.0, 1.0, 1.0], ConstraintOp::Eq, 4.0),
        ];
        for (i, (coefs, op, rhs)) in rows.into_iter().enumerate() {
            let terms = coefs.into_iter().enumerate().collect();
            problem.add_constraint(format!("r{i}"), terms, op, rhs);
        }
        problem
    }

    fn assert_boxed_mixed_optimum(v0: VariableSpec) {
        let form = StandardForm::build(&boxed_mixed_rows(v0)).unwrap();
        let result = InteriorPointEngine::new().run(&form);

        assert_eq!(result.status, SolutionStatus::Optimal, "after {} iterations", result.iterations);
        let values = form.recover_values(&result.x);
        let obj = 3.0 * values[0] - values[1] - 3.0 * values[2];
        assert!((obj - 6.0).abs() < 1e-5, "obj = {obj}");
        assert!((values[0] - 2.0).abs() < 1e-5, "values = {values:?}");
    }

    #[test]
    fn test_free_variable_with_singular_normal_equations() {
        assert_boxed_mixed_optimum(VariableSpec::free("v0"));
    }

    #[test]
    fn test_bounded_variable_with_singular_normal_equations() {
        assert_boxed_mixed_optimum(VariableSpec::new("v0", -20.0, 20.0));
    }

    #[test]
    fn test_free_variable_pair_stays_bounded() {
        // min x with x free and x >= -3: the split pair must not drift apart
        let mut problem = LpProblem::new(vec![VariableSpec::free("x")]);
        problem.set_objective(vec![(0, 1.0)], Sense::Minimize);
        problem.add_constraint("floor", vec![(0, 1.0)], ConstraintOp::Ge, -3.0);

        let form = StandardForm::build(&problem).unwrap();
        let result = InteriorPointEngine::new().with_tolerance(1e-8).run(&form);

        assert_eq!(result.status, SolutionStatus::Optimal);
        let values = form.recover_values(&result.x);
        assert!((values[0] + 3.0).abs() < 1e-5, "x = {}", values[0]);
        assert!(result.x[0] < 1e3 && result.x[1] < 1e3, "pair = ({}, {})", result.x[0], result.x[1]);
    }

    #[test]
    fn test_recenter_split_pairs() {
        let mut state = InteriorState {
            x: vec![1e6, 1e6 + 3.0, 50.0, 40.0],
            y: vec![],
            z: vec![1e-6, 2e-6, 1.0, 1.0],
        };
        let products: Vec<f64> = state.x.iter().zip(&state.z).map(|(x, z)| x * z).collect();

        assert_eq!(state.recenter_split_pairs(&[(0, 1), (2, 3)]), 1);
        assert!((state.x[0] - 3.0).abs() < 1e-6, "x = {:?}", state.x);
        assert!((state.x[1] - 6.0).abs() < 1e-6, "x = {:?}", state.x);
        // Below the growth threshold
        assert_eq!(&state.x[2..], &[50.0, 40.0]);
        for (j, want) in products.iter().enumerate() {
            let got = state.x[j] * state.z[j];
            assert!((got - want).abs() < 1e-9 * want.max(1.0), "x z [{j}] = {got}, expected {want}");
        }
    }

    #[test]
    fn test_from_config_iteration_limit() {
        let config = SolverConfig::default();
        assert_eq!(InteriorPointEngine::from_config(&config).max_iterations, 100);
        let config = config.with_max_iterations(7);
        assert_eq!(InteriorPointEngine::from_config(&config).max_iterations, 7);
    }

    #[test]
    fn test_centering_bounds() {
        let engine = InteriorPointEngine::new();
        assert_eq!(engine.centering(0.0, 1.0), 0.1);
        assert_eq!(engine.centering(1.0, 1.0), 1.0);
        let sigma = engine.centering(0.5, 1.0);
        assert!((sigma - 0.125).abs() < 1e-15);
    }

    #[test]
    fn test_max_step() {
        assert_eq!(max_step(&[1.0, 2.0], &[1.0, 0.5]), f64::INFINITY);
        assert_eq!(max_step(&[1.0, 2.0], &[-2.0, -1.0]), 0.5);
    }
}
