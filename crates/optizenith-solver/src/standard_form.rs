//! Conversion of an [`LpProblem`] into equality standard form.
//!
//! `min cᵀx  s.t.  A x = b,  x ≥ 0,  b ≥ 0`
//!
//! Columns are laid out as `[structural | slack/surplus | artificial]`. Rows
//! are the problem constraints in their original order, followed by one row
//! per finite upper bound.

use crate::problem::{ConstraintOp, LpProblem, Sense};
use crate::SolveError;

/// Where an original variable lives among the structural columns.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ColumnMap {
    /// `x = offset + x[col]`
    Shifted { col: usize, offset: f64 },
    /// `x = x[pos] - x[neg]`
    Split { pos: usize, neg: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RowKind {
    /// One slack column, which also seeds the basis
    Slack,
    /// Surplus column plus an artificial that seeds the basis
    SurplusArtificial,
    /// Artificial only
    Artificial,
}

#[derive(Debug, Clone)]
pub struct StandardForm {
    /// Constraint matrix, `n_rows() × n_cols()`
    pub a: Vec<Vec<f64>>,
    /// Right-hand side, non-negative
    pub b: Vec<f64>,
    /// Minimization cost for every column (zero for slack and artificial)
    pub c: Vec<f64>,
    pub n_structural: usize,
    pub n_slack: usize,
    pub n_artificial: usize,
    /// Per row, the slack or artificial column forming an identity basis
    pub initial_basis: Vec<usize>,
    /// `-1.0` where the row was negated to make `b ≥ 0`
    pub row_sign: Vec<f64>,
    /// Rows `0..n_constraint_rows` are the problem constraints
    pub n_constraint_rows: usize,
    /// One entry per original variable
    pub columns: Vec<ColumnMap>,
    pub sense: Sense,
}

struct PendingRow {
    coefficients: Vec<f64>,
    op: ConstraintOp,
    rhs: f64,
}

/// Fails fast on anything the engines cannot consume.
pub fn validate(problem: &LpProblem) -> Result<(), SolveError> {
    let n = problem.num_variables();
    if n == 0 {
        return Err(SolveError::EmptyModel);
    }
    let objective = problem.objective.as_ref().ok_or(SolveError::MissingObjective)?;

    for var in &problem.variables {
        let invalid = var.lower.is_nan()
            || var.upper.is_nan()
            || var.lower > var.upper
            || var.lower == f64::INFINITY
            || var.upper == f64::NEG_INFINITY;
        if invalid {
            return Err(SolveError::InvalidBounds {
                variable: var.name.clone(),
                lower: var.lower,
                upper: var.upper,
            });
        }
    }

    check_terms(&objective.terms, n, || "objective".to_string())?;
    for (i, c) in problem.constraints.iter().enumerate() {
        let context = || constraint_label(&c.name, i);
        check_terms(&c.terms, n, &context)?;
        if !c.rhs.is_finite() {
            return Err(SolveError::NonFiniteCoefficient { context: context() });
        }
    }
    Ok(())
}

fn constraint_label(name: &str, index: usize) -> String {
    if name.is_empty() {
        format!("constraint #{index}")
    } else {
        format!("constraint '{name}'")
    }
}

fn check_terms(
    terms: &[(usize, f64)],
    n: usize,
    context: impl Fn() -> String,
) -> Result<(), SolveError> {
    for &(index, coef) in terms {
        if index >= n {
            return Err(SolveError::UnknownVariable {
                context: context(),
                index,
            });
        }
        if !coef.is_finite() {
            return Err(SolveError::NonFiniteCoefficient { context: context() });
        }
    }
    Ok(())
}

impl StandardForm {
    /// Validates `problem` and converts it.
    pub fn build(problem: &LpProblem) -> Result<Self, SolveError> {
        validate(problem)?;
        let n_vars = problem.num_variables();
        let objective = problem.objective.as_ref().ok_or(SolveError::MissingObjective)?;

        // Structural columns: shift finite lower bounds, split free variables
        let mut columns = Vec::with_capacity(n_vars);
        let mut n_structural = 0;
        for var in &problem.variables {
            if var.lower.is_finite() {
                columns.push(ColumnMap::Shifted {
                    col: n_structural,
                    offset: var.lower,
                });
                n_structural += 1;
            } else {
                columns.push(ColumnMap::Split {
                    pos: n_structural,
                    neg: n_structural + 1,
                });
                n_structural += 2;
            }
        }

        let mut rows = Vec::with_capacity(problem.num_constraints() + n_vars);
        for c in &problem.constraints {
            let mut coefficients = vec![0.0; n_structural];
            let mut rhs = c.rhs;
            for (j, coef) in c.dense_coefficients(n_vars).into_iter().enumerate() {
                if coef == 0.0 {
                    continue;
                }
                match columns[j] {
                    ColumnMap::Shifted { col, offset } => {
                        coefficients[col] += coef;
                        rhs -= coef * offset;
                    }
                    ColumnMap::Split { pos, neg } => {
                        coefficients[pos] += coef;
                        coefficients[neg] -= coef;
                    }
                }
            }
            rows.push(PendingRow {
                coefficients,
                op: c.op,
                rhs,
            });
        }
        let n_constraint_rows = rows.len();

        for (var, map) in problem.variables.iter().zip(&columns) {
            if !var.upper.is_finite() {
                continue;
            }
            let mut coefficients = vec![0.0; n_structural];
            let rhs = match *map {
                ColumnMap::Shifted { col, offset } => {
                    coefficients[col] = 1.0;
                    var.upper - offset
                }
                ColumnMap::Split { pos, neg } => {
                    coefficients[pos] = 1.0;
                    coefficients[neg] = -1.0;
                    var.upper
                }
            };
            rows.push(PendingRow {
                coefficients,
                op: ConstraintOp::Le,
                rhs,
            });
        }

        // Decide per row whether to negate and which auxiliary columns it needs
        let plan: Vec<(f64, RowKind)> = rows.iter().map(|row| classify(row.op, row.rhs)).collect();
        let n_slack = plan
            .iter()
            .filter(|(_, kind)| *kind != RowKind::Artificial)
            .count();
        let n_artificial = plan
            .iter()
            .filter(|(_, kind)| *kind != RowKind::Slack)
            .count();
        let n_cols = n_structural + n_slack + n_artificial;

        let mut a = Vec::with_capacity(rows.len());
        let mut b = Vec::with_capacity(rows.len());
        let mut initial_basis = Vec::with_capacity(rows.len());
        let mut row_sign = Vec::with_capacity(rows.len());
        let mut slack_idx = n_structural;
        let mut artificial_idx = n_structural + n_slack;

        for (row, (sign, kind)) in rows.into_iter().zip(plan) {
            let mut data = vec![0.0; n_cols];
            for (j, coef) in row.coefficients.into_iter().enumerate() {
                data[j] = sign * coef;
            }
            match kind {
                RowKind::Slack => {
                    data[slack_idx] = 1.0;
                    initial_basis.push(slack_idx);
                    slack_idx += 1;
                }
                RowKind::SurplusArtificial => {
                    data[slack_idx] = -1.0;
                    slack_idx += 1;
                    data[artificial_idx] = 1.0;
                    initial_basis.push(artificial_idx);
                    artificial_idx += 1;
                }
                RowKind::Artificial => {
                    data[artificial_idx] = 1.0;
                    initial_basis.push(artificial_idx);
                    artificial_idx += 1;
                }
            }
            a.push(data);
            b.push(sign * row.rhs);
            row_sign.push(sign);
        }

        // Internally always minimize
        let direction = sense_factor(objective.sense);
        let mut c = vec![0.0; n_cols];
        for (j, coef) in objective.dense_coefficients(n_vars).into_iter().enumerate() {
            match columns[j] {
                ColumnMap::Shifted { col, .. } => c[col] = direction * coef,
                ColumnMap::Split { pos, neg } => {
                    c[pos] = direction * coef;
                    c[neg] = -direction * coef;
                }
            }
        }

        let form = Self {
            a,
            b,
            c,
            n_structural,
            n_slack,
            n_artificial,
            initial_basis,
            row_sign,
            n_constraint_rows,
            columns,
            sense: objective.sense,
        };
        tracing::debug!(
            component = "standard_form",
            operation = "build",
            rows = form.n_rows(),
            structural = form.n_structural,
            slack = form.n_slack,
            artificial = form.n_artificial,
            "Built standard form"
        );
        Ok(form)
    }

    pub fn n_rows(&self) -> usize {
        self.b.len()
    }

    pub fn n_cols(&self) -> usize {
        self.c.len()
    }

    /// First artificial column index.
    pub fn artificial_start(&self) -> usize {
        self.n_structural + self.n_slack
    }

    pub fn is_artificial(&self, col: usize) -> bool {
        col >= self.artificial_start()
    }

    pub fn has_artificial(&self) -> bool {
        self.n_artificial > 0
    }

    /// Maps a point over the standard-form columns back onto the original
    /// variables, undoing shifts and splits.
    pub fn recover_values(&self, x: &[f64]) -> Vec<f64> {
        self.columns
            .iter()
            .map(|map| match *map {
                ColumnMap::Shifted { col, offset } => offset + x[col],
                ColumnMap::Split { pos, neg } => x[pos] - x[neg],
            })
            .collect()
    }

    /// Maps row multipliers of the internal minimization back onto the
    /// original constraints, as the change in objective per unit of rhs.
    pub fn recover_duals(&self, y: &[f64]) -> Vec<f64> {
        let direction = sense_factor(self.sense);
        y.iter()
            .zip(&self.row_sign)
            .take(self.n_constraint_rows)
            .map(|(yi, sign)| direction * sign * yi)
            .collect()
    }
}

fn sense_factor(sense: Sense) -> f64 {
    match sense {
        Sense::Minimize => 1.0,
        Sense::Maximize => -1.0,
    }
}

fn classify(op: ConstraintOp, rhs: f64) -> (f64, RowKind) {
    match op {
        ConstraintOp::Le if rhs >= 0.0 => (1.0, RowKind::Slack),
        // a <= with negative rhs negates into a >= with positive rhs
        ConstraintOp::Le => (-1.0, RowKind::SurplusArtificial),
        ConstraintOp::Ge if rhs <= 0.0 => (-1.0, RowKind::Slack),
        ConstraintOp::Ge => (1.0, RowKind::SurplusArtificial),
        ConstraintOp::Eq if rhs >= 0.0 => (1.0, RowKind::Artificial),
        ConstraintOp::Eq => (-1.0, RowKind::Artificial),
    }
}
