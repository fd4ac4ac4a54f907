//! Dense row-major linear algebra used by both engines.
//!
//! Factorizations report failure with `None` so callers can map it onto
//! `SolutionStatus::NumericalFailure` instead of panicking.

// Indexed loops read closer to the textbook elimination formulas
#![allow(clippy::needless_range_loop)]

pub(crate) type Matrix = Vec<Vec<f64>>;

/// Pivots smaller than this are treated as zero.
const SINGULAR_EPS: f64 = 1e-12;

/// Cholesky pivot thresholds, relative to the largest diagonal entry.
const CHOLESKY_RTOL: f64 = 1e-12;
const SKIP_RTOL: f64 = 1e-16;

/// Stand-in for a dropped Cholesky pivot.
const SKIPPED_PIVOT: f64 = 1e64;

pub(crate) fn identity(n: usize) -> Matrix {
    let mut m = vec![vec![0.0; n]; n];
    for (i, row) in m.iter_mut().enumerate() {
        row[i] = 1.0;
    }
    m
}

pub(crate) fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

pub(crate) fn norm2(a: &[f64]) -> f64 {
    dot(a, a).sqrt()
}

/// `A x`
pub(crate) fn mat_vec(a: &[Vec<f64>], x: &[f64]) -> Vec<f64> {
    a.iter().map(|row| dot(row, x)).collect()
}

/// `Aᵀ y`
pub(crate) fn mat_t_vec(a: &[Vec<f64>], y: &[f64], n_cols: usize) -> Vec<f64> {
    let mut out = vec![0.0; n_cols];
    for (row, &yi) in a.iter().zip(y) {
        if yi == 0.0 {
            continue;
        }
        for (o, &aij) in out.iter_mut().zip(row) {
            *o += aij * yi;
        }
    }
    out
}

/// Column `j` of `A`.
pub(crate) fn column(a: &[Vec<f64>], j: usize) -> Vec<f64> {
    a.iter().map(|row| row[j]).collect()
}

/// Inverse by Gauss-Jordan elimination with partial pivoting.
pub(crate) fn invert(a: &[Vec<f64>]) -> Option<Matrix> {
    let n = a.len();
    let mut work: Matrix = a.to_vec();
    let mut inv = identity(n);

    for col in 0..n {
        // Partial pivoting: largest magnitude at or below the diagonal
        let mut pivot_row = col;
        let mut pivot_abs = work[col][col].abs();
        for r in (col + 1)..n {
            if work[r][col].abs() > pivot_abs {
                pivot_abs = work[r][col].abs();
                pivot_row = r;
            }
        }
        if !pivot_abs.is_finite() || pivot_abs < SINGULAR_EPS {
            return None;
        }
        work.swap(col, pivot_row);
        inv.swap(col, pivot_row);

        let pivot_val = work[col][col];
        for j in 0..n {
            work[col][j] /= pivot_val;
            inv[col][j] /= pivot_val;
        }

        for i in 0..n {
            if i != col {
                let factor = work[i][col];
                if factor == 0.0 {
                    continue;
                }
                for j in 0..n {
                    work[i][j] -= factor * work[col][j];
                    inv[i][j] -= factor * inv[col][j];
                }
            }
        }
    }

    Some(inv)
}

/// Lower-triangular Cholesky factor `L` with `L Lᵀ = A`.
///
/// A pivot at or below `1e-12 · max(1, max |a_jj|)` counts as a breakdown.
pub(crate) fn cholesky(a: &[Vec<f64>]) -> Option<Matrix> {
    lower_factor(a, CHOLESKY_RTOL, false)
}

/// Cholesky factor that tolerates rank deficiency.
///
/// A pivot at or below `1e-16 · max(1, max |a_jj|)` is replaced by a huge
/// value and the rest of its column is zeroed, so [`cholesky_solve`] returns
/// (close to) zero for that component instead of amplifying round-off. Only a
/// non-finite entry makes this fail.
pub(crate) fn cholesky_skipping(a: &[Vec<f64>]) -> Option<Matrix> {
    lower_factor(a, SKIP_RTOL, true)
}

fn lower_factor(a: &[Vec<f64>], rtol: f64, skip_tiny: bool) -> Option<Matrix> {
    let n = a.len();
    let scale = a
        .iter()
        .enumerate()
        .map(|(i, row)| row[i].abs())
        .fold(1.0, f64::max);
    let threshold = rtol * scale;
    let mut l = vec![vec![0.0; n]; n];
    for j in 0..n {
        let mut diag = a[j][j];
        for k in 0..j {
            diag -= l[j][k] * l[j][k];
        }
        if !diag.is_finite() {
            return None;
        }
        if diag <= threshold {
            if !skip_tiny {
                return None;
            }
            l[j][j] = SKIPPED_PIVOT;
            continue;
        }
        let ljj = diag.sqrt();
        l[j][j] = ljj;
        for i in (j + 1)..n {
            let mut sum = a[i][j];
            for k in 0..j {
                sum -= l[i][k] * l[j][k];
            }
            l[i][j] = sum / ljj;
        }
    }
    Some(l)
}

/// Solves `L Lᵀ x = b` given the factor from [`cholesky`] or [`cholesky_skipping`].
pub(crate) fn cholesky_solve(l: &[Vec<f64>], b: &[f64]) -> Vec<f64> {
    let n = l.len();
    let mut y = b.to_vec();
    for i in 0..n {
        for k in 0..i {
            y[i] -= l[i][k] * y[k];
        }
        y[i] /= l[i][i];
    }
    for i in (0..n).rev() {
        for k in (i + 1)..n {
            y[i] -= l[k][i] * y[k];
        }
        y[i] /= l[i][i];
    }
    y
}
