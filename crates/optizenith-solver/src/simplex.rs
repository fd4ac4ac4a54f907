//! Two-phase revised simplex.
//!
//! The basis inverse is kept explicitly and updated by a rank-one (product
//! form) pivot, with a full reinversion every [`REFACTOR_INTERVAL`] pivots and
//! between the two phases.

// Indexed loops are clearer for basis/matrix operations
#![allow(clippy::needless_range_loop)]

use tracing::{debug, trace, warn};

use crate::engine::{EngineResult, LpEngine};
use crate::linalg::{self, Matrix};
use crate::{Engine, SolutionStatus, SolverConfig, StandardForm};

/// Direction entries at or below this are not treated as positive pivots.
const PIVOT_TOL: f64 = 1e-9;
/// Pivots between full reinversions of the basis matrix.
const REFACTOR_INTERVAL: usize = 32;
/// Consecutive degenerate pivots before entering selection falls back to Bland's rule.
const BLAND_THRESHOLD: usize = 50;

/// Simplex solver for problems in standard form
#[derive(Debug, Clone)]
pub struct SimplexEngine {
    /// Maximum pivots, summed over both phases
    max_iterations: usize,
    /// Tolerance for reduced costs and phase 1 infeasibility
    tolerance: f64,
}

impl Default for SimplexEngine {
    fn default() -> Self {
        Self {
            max_iterations: Engine::Simplex.default_max_iterations(),
            tolerance: 1e-6,
        }
    }
}

impl SimplexEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: &SolverConfig) -> Self {
        Self {
            max_iterations: config.iteration_limit_for(Engine::Simplex),
            tolerance: config.tolerance,
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

    /// Phase 1: minimize the sum of artificial variables from the slack/artificial
    /// starting basis, then leave a basis free of artificials where possible.
    fn phase1(&self, form: &StandardForm, state: &mut BasisState, iterations: &mut usize) -> Result<(), SolutionStatus> {
        let cost: Vec<f64> = (0..form.n_cols())
            .map(|j| if form.is_artificial(j) { 1.0 } else { 0.0 })
            .collect();

        match self.pivot_loop(form, state, &cost, true, iterations) {
            LoopOutcome::Optimal => {}
            LoopOutcome::IterationLimit => return Err(SolutionStatus::IterationLimit),
            // The phase 1 objective is bounded below by zero
            LoopOutcome::Unbounded | LoopOutcome::Singular => {
                return Err(SolutionStatus::NumericalFailure);
            }
        }

        let infeasibility: f64 = state
            .basis
            .iter()
            .zip(&state.x_b)
            .filter(|(col, _)| form.is_artificial(**col))
            .map(|(_, value)| value.max(0.0))
            .sum();
        debug!(
            component = "simplex",
            phase = 1,
            iterations = *iterations,
            infeasibility,
            "Phase 1 finished"
        );
        if infeasibility > self.tolerance {
            return Err(SolutionStatus::Infeasible);
        }

        self.drive_out_artificials(form, state);
        if !state.refactor(form) {
            return Err(SolutionStatus::NumericalFailure);
        }
        Ok(())
    }

    /// Replace zero-level artificials in the basis with real columns. A row
    /// where no real column has a nonzero entry is redundant; its artificial
    /// stays basic at zero and never re-enters.
    fn drive_out_artificials(&self, form: &StandardForm, state: &mut BasisState) {
        for r in 0..state.basis.len() {
            if !form.is_artificial(state.basis[r]) {
                continue;
            }
            let candidate = state
                .nonbasis
                .iter()
                .enumerate()
                .filter(|(_, col)| !form.is_artificial(**col))
                .filter(|(_, col)| state.row_entry(form, r, **col).abs() > PIVOT_TOL)
                .min_by_key(|(_, col)| **col)
                .map(|(q, col)| (q, *col));

            match candidate {
                Some((q, col)) => {
                    let direction = state.direction(form, col);
                    state.pivot(r, q, col, &direction, 0.0);
                    trace!(component = "simplex", row = r, entering = col, "Drove artificial out of basis");
                }
                None => {
                    debug!(component = "simplex", row = r, "Redundant row keeps artificial at zero");
                }
            }
        }
    }

    /// Shared pivot loop. Stops at optimality, unboundedness, a singular
    /// reinversion, or when `iterations` reaches the ceiling.
    fn pivot_loop(
        &self,
        form: &StandardForm,
        state: &mut BasisState,
        cost: &[f64],
        allow_artificial: bool,
        iterations: &mut usize,
    ) -> LoopOutcome {
        let mut degenerate_run = 0;

        loop {
            let y = state.duals(cost);
            let use_bland = degenerate_run >= BLAND_THRESHOLD;
            let Some((q, entering)) =
                self.select_entering(form, state, cost, &y, allow_artificial, use_bland)
            else {
                return LoopOutcome::Optimal;
            };

            if *iterations >= self.max_iterations {
                return LoopOutcome::IterationLimit;
            }

            let direction = state.direction(form, entering);
            let Some(r) = ratio_test(&state.x_b, &direction) else {
                return LoopOutcome::Unbounded;
            };
            let step = state.x_b[r].max(0.0) / direction[r];

            if step <= PIVOT_TOL {
                degenerate_run += 1;
            } else {
                degenerate_run = 0;
            }

            let leaving = state.basis[r];
            state.pivot(r, q, entering, &direction, step);
            *iterations += 1;
            trace!(
                component = "simplex",
                iteration = *iterations,
                entering,
                leaving,
                step,
                bland = use_bland,
                "Pivot"
            );

            if state.pivots_since_refactor >= REFACTOR_INTERVAL && !state.refactor(form) {
                return LoopOutcome::Singular;
            }
        }
    }

    /// Most negative reduced cost `d_j = c_j - yᵀA_j` (Dantzig), ties to the
    /// lowest column index. With `use_bland`, the lowest improving column.
    fn select_entering(
        &self,
        form: &StandardForm,
        state: &BasisState,
        cost: &[f64],
        y: &[f64],
        allow_artificial: bool,
        use_bland: bool,
    ) -> Option<(usize, usize)> {
        let mut best: Option<(usize, usize, f64)> = None;

        for (q, &col) in state.nonbasis.iter().enumerate() {
            if !allow_artificial && form.is_artificial(col) {
                continue;
            }
            let mut reduced = cost[col];
            for (i, &yi) in y.iter().enumerate() {
                reduced -= yi * form.a[i][col];
            }
            if reduced >= -self.tolerance {
                continue;
            }
            let better = match best {
                None => true,
                Some((_, best_col, _)) if use_bland => col < best_col,
                Some((_, best_col, best_reduced)) => {
                    reduced < best_reduced || (reduced == best_reduced && col < best_col)
                }
            };
            if better {
                best = Some((q, col, reduced));
            }
        }

        best.map(|(q, col, _)| (q, col))
    }

    fn extract(&self, form: &StandardForm, state: &BasisState, status: SolutionStatus, iterations: usize) -> EngineResult {
        let mut x = vec![0.0; form.n_cols()];
        for (&col, &value) in state.basis.iter().zip(&state.x_b) {
            x[col] = value;
        }
        EngineResult {
            status,
            x,
            y: state.duals(&form.c),
            iterations,
        }
    }
}

impl LpEngine for SimplexEngine {
    fn engine(&self) -> Engine {
        Engine::Simplex
    }

    fn run(&self, form: &StandardForm) -> EngineResult {
        let mut state = BasisState::initial(form);
        let mut iterations = 0;

        if form.has_artificial() {
            if let Err(status) = self.phase1(form, &mut state, &mut iterations) {
                if status == SolutionStatus::IterationLimit {
                    warn!(component = "simplex", phase = 1, iterations, "Iteration limit reached");
                    return self.extract(form, &state, status, iterations);
                }
                if status == SolutionStatus::NumericalFailure {
                    warn!(component = "simplex", phase = 1, iterations, "Singular basis");
                }
                return EngineResult::without_point(status, iterations);
            }
        }

        let outcome = self.pivot_loop(form, &mut state, &form.c, false, &mut iterations);
        debug!(component = "simplex", phase = 2, iterations, outcome = ?outcome, "Phase 2 finished");

        match outcome {
            LoopOutcome::Optimal => self.extract(form, &state, SolutionStatus::Optimal, iterations),
            LoopOutcome::Unbounded => EngineResult::without_point(SolutionStatus::Unbounded, iterations),
            LoopOutcome::IterationLimit => {
                warn!(component = "simplex", phase = 2, iterations, "Iteration limit reached");
                self.extract(form, &state, SolutionStatus::IterationLimit, iterations)
            }
            LoopOutcome::Singular => {
                warn!(component = "simplex", phase = 2, iterations, "Singular basis");
                EngineResult::without_point(SolutionStatus::NumericalFailure, iterations)
            }
        }
    }
}

/// Minimum ratio `x_B[i] / Δx_B[i]` over `Δx_B[i] > 0`, ties to the lowest row.
fn ratio_test(x_b: &[f64], direction: &[f64]) -> Option<usize> {
    let mut min_ratio = f64::INFINITY;
    let mut min_row = None;

    for (i, (&value, &d)) in x_b.iter().zip(direction).enumerate() {
        if d > PIVOT_TOL {
            let ratio = value.max(0.0) / d;
            if ratio < min_ratio {
                min_ratio = ratio;
                min_row = Some(i);
            }
        }
    }

    min_row
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LoopOutcome {
    Optimal,
    Unbounded,
    IterationLimit,
    Singular,
}

/// Basis partition plus the explicit inverse of the basis matrix.
struct BasisState {
    /// Column in the basis at each row position; `|basis| = m`
    basis: Vec<usize>,
    nonbasis: Vec<usize>,
    b_inv: Matrix,
    x_b: Vec<f64>,
    pivots_since_refactor: usize,
}

impl BasisState {
    /// Slack/artificial identity basis, so `B_inv = I` and `x_B = b`.
    fn initial(form: &StandardForm) -> Self {
        let basis = form.initial_basis.clone();
        let nonbasis = (0..form.n_cols()).filter(|j| !basis.contains(j)).collect();
        Self {
            b_inv: linalg::identity(basis.len()),
            x_b: form.b.clone(),
            basis,
            nonbasis,
            pivots_since_refactor: 0,
        }
    }

    /// `yᵀ = c_Bᵀ B_inv`
    fn duals(&self, cost: &[f64]) -> Vec<f64> {
        let m = self.basis.len();
        let mut y = vec![0.0; m];
        for (k, &col) in self.basis.iter().enumerate() {
            let ck = cost[col];
            if ck == 0.0 {
                continue;
            }
            for i in 0..m {
                y[i] += ck * self.b_inv[k][i];
            }
        }
        y
    }

    /// `Δx_B = B_inv A_j`
    fn direction(&self, form: &StandardForm, col: usize) -> Vec<f64> {
        let a_j = linalg::column(&form.a, col);
        linalg::mat_vec(&self.b_inv, &a_j)
    }

    /// Entry `(B_inv A_j)[row]`.
    fn row_entry(&self, form: &StandardForm, row: usize, col: usize) -> f64 {
        self.b_inv[row]
            .iter()
            .zip(&form.a)
            .map(|(binv, a_row)| binv * a_row[col])
            .sum()
    }

    /// Swap `entering` into basis row `r` and update `B_inv` and `x_B`.
    fn pivot(&mut self, r: usize, q: usize, entering: usize, direction: &[f64], step: f64) {
        let m = self.basis.len();

        for i in 0..m {
            self.x_b[i] -= step * direction[i];
        }
        self.x_b[r] = step;

        let pivot_val = direction[r];
        for j in 0..m {
            self.b_inv[r][j] /= pivot_val;
        }
        for i in 0..m {
            if i != r {
                let factor = direction[i];
                if factor == 0.0 {
                    continue;
                }
                for j in 0..m {
                    self.b_inv[i][j] -= factor * self.b_inv[r][j];
                }
            }
        }

        let leaving = self.basis[r];
        self.basis[r] = entering;
        self.nonbasis[q] = leaving;
        self.pivots_since_refactor += 1;
    }

    /// Recompute `B_inv` and `x_B` from scratch. Returns `false` on a singular basis.
    fn refactor(&mut self, form: &StandardForm) -> bool {
        let b_matrix: Matrix = form
            .a
            .iter()
            .map(|row| self.basis.iter().map(|&col| row[col]).collect())
            .collect();
        let Some(b_inv) = linalg::invert(&b_matrix) else {
            return false;
        };
        self.x_b = linalg::mat_vec(&b_inv, &form.b);
        self.b_inv = b_inv;
        self.pivots_since_refactor = 0;
        true
    }
}
