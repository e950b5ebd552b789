//! Small dense linear algebra used for model estimation

use crate::{MathError, Result};

const PIVOT_TOLERANCE: f64 = 1e-12;

/// Solve the square system `a * x = b` by Gaussian elimination with partial pivoting
pub fn solve(mut a: Vec<Vec<f64>>, mut b: Vec<f64>) -> Result<Vec<f64>> {
    let n = b.len();
    if a.len() != n || a.iter().any(|row| row.len() != n) {
        return Err(MathError::InvalidInput(format!(
            "Expected a {}x{} system matrix",
            n, n
        )));
    }

    for col in 0..n {
        // Pick the row with the largest magnitude in this column
        let pivot = (col..n)
            .max_by(|&i, &j| a[i][col].abs().total_cmp(&a[j][col].abs()))
            .unwrap_or(col);

        if a[pivot][col].abs() < PIVOT_TOLERANCE {
            return Err(MathError::CalculationError(
                "Singular matrix: system has no unique solution".to_string(),
            ));
        }

        a.swap(col, pivot);
        b.swap(col, pivot);

        for row in col + 1..n {
            let factor = a[row][col] / a[col][col];
            if factor == 0.0 {
                continue;
            }
            for k in col..n {
                a[row][k] -= factor * a[col][k];
            }
            b[row] -= factor * b[col];
        }
    }

    // Back substitution
    let mut x = vec![0.0; n];
    for row in (0..n).rev() {
        let tail: f64 = (row + 1..n).map(|k| a[row][k] * x[k]).sum();
        x[row] = (b[row] - tail) / a[row][row];
    }

    Ok(x)
}

/// Ordinary least squares fit of `targets ~ design` without an implicit intercept.
///
/// Each entry of `design` is one observation row. Solves the normal equations
/// `(X'X) beta = X'y`.
pub fn least_squares(design: &[Vec<f64>], targets: &[f64]) -> Result<Vec<f64>> {
    if design.len() != targets.len() {
        return Err(MathError::InvalidInput(format!(
            "Design has {} rows but {} targets were given",
            design.len(),
            targets.len()
        )));
    }
    let k = match design.first() {
        Some(row) => row.len(),
        None => {
            return Err(MathError::InsufficientData(
                "Least squares needs at least one observation".to_string(),
            ))
        }
    };
    if k == 0 {
        return Ok(Vec::new());
    }
    if design.len() < k {
        return Err(MathError::InsufficientData(format!(
            "Least squares with {} regressors needs at least {} observations, got {}",
            k,
            k,
            design.len()
        )));
    }

    let mut xtx = vec![vec![0.0; k]; k];
    let mut xty = vec![0.0; k];
    for (row, &y) in design.iter().zip(targets) {
        if row.len() != k {
            return Err(MathError::InvalidInput(
                "All design rows must have the same width".to_string(),
            ));
        }
        for i in 0..k {
            xty[i] += row[i] * y;
            for j in i..k {
                xtx[i][j] += row[i] * row[j];
            }
        }
    }
    for i in 0..k {
        for j in 0..i {
            xtx[i][j] = xtx[j][i];
        }
    }

    solve(xtx, xty)
}
