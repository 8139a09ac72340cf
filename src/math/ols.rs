//! Ordinary least squares solver.
//!
//! ```text
//! minimize Σ (y_i - x_i^T β)^2
//! ```
//!
//! We solve through the SVD of the design matrix `X = U Σ Vᵀ`:
//! - the singular values give a rank check (and the condition number)
//!   before any coefficient is returned
//! - `(XᵀX)⁻¹ = V Σ⁻² Vᵀ` falls out of the same decomposition and feeds the
//!   coefficient standard errors
//!
//! (Nalgebra's `QR::solve` is intended for square systems and will panic for
//! non-square matrices, so SVD it is.)

use nalgebra::{DMatrix, DVector};

use crate::error::{FactorError, Result};

/// Relative singular-value cutoff below which the design is treated as singular.
pub const RANK_TOL: f64 = 1e-10;

#[derive(Debug, Clone)]
pub struct LeastSquares {
    pub beta: DVector<f64>,
    /// `(XᵀX)⁻¹`, p × p.
    pub xtx_inv: DMatrix<f64>,
    /// `σ_max / σ_min` of the design matrix.
    pub condition_number: f64,
}

/// Solve a full-rank, overdetermined least squares problem.
///
/// Fails when `n <= p` (no residual degrees of freedom), when inputs are not
/// finite, or when the columns of `x` are (numerically) linearly dependent.
pub fn solve_least_squares(x: &DMatrix<f64>, y: &DVector<f64>) -> Result<LeastSquares> {
    let (n, p) = x.shape();
    if y.len() != n {
        return Err(FactorError::shape("least squares target", n, y.len()));
    }
    if p == 0 {
        return Err(FactorError::ModelFit("design matrix has no columns".to_string()));
    }
    if n <= p {
        return Err(FactorError::ModelFit(format!(
            "model underdetermined: {n} observations for {p} parameters (need more than {p})"
        )));
    }
    if !(x.iter().all(|v| v.is_finite()) && y.iter().all(|v| v.is_finite())) {
        return Err(FactorError::ModelFit("non-finite value in regression inputs".to_string()));
    }

    let svd = x.clone().svd(true, true);
    let s_max = svd.singular_values.iter().copied().fold(0.0_f64, f64::max);
    let s_min = svd.singular_values.iter().copied().fold(f64::INFINITY, f64::min);
    if !(s_max > 0.0) || s_min / s_max < RANK_TOL {
        return Err(FactorError::ModelFit(format!(
            "design matrix is singular (collinear columns): singular values span [{s_min:.3e}, {s_max:.3e}]"
        )));
    }

    let beta = svd
        .solve(y, 0.0)
        .map_err(|e| FactorError::ModelFit(format!("least squares solve failed: {e}")))?;
    if !beta.iter().all(|v| v.is_finite()) {
        return Err(FactorError::ModelFit("non-finite coefficients".to_string()));
    }

    let v_t = svd
        .v_t
        .as_ref()
        .ok_or_else(|| FactorError::ModelFit("SVD did not produce Vᵀ".to_string()))?;
    let mut v_scaled = v_t.transpose();
    for (j, s) in svd.singular_values.iter().enumerate() {
        let mut col = v_scaled.column_mut(j);
        col *= 1.0 / (s * s);
    }
    let xtx_inv = v_scaled * v_t;

    Ok(LeastSquares {
        beta,
        xtx_inv,
        condition_number: s_max / s_min,
    })
}

/// Prepend an all-ones column to `rows` (n × k) giving an n × (k+1) design.
pub fn design_with_intercept(rows: &[Vec<f64>], k: usize) -> Result<DMatrix<f64>> {
    for (i, row) in rows.iter().enumerate() {
        if row.len() != k {
            return Err(FactorError::shape(format!("factor row {i}"), k, row.len()));
        }
    }
    Ok(DMatrix::from_fn(rows.len(), k + 1, |i, j| {
        if j == 0 { 1.0 } else { rows[i][j - 1] }
    }))
}
