//! The multivariate Gaussian log-density kernel.
//!
//! For observation `j` with residual `r = X[:, j] − mu[:, j mod q]` and a
//! factored matrix `L·Lᵗ`:
//!
//! - covariance (`is_prec = false`): `Σ = L·Lᵗ`, solve `L·w = r`,
//!   `log p = −½·k·log 2π − ½·log det Σ − ½·wᵗw`;
//! - precision (`is_prec = true`): `Λ = L·Lᵗ`, `z = Lᵗ·r`,
//!   `log p = −½·k·log 2π + ½·log det Λ − ½·zᵗz`.
//!
//! Log-determinants are always `2·Σ log Lⱼⱼ`.

use mvnad::{is_finite, Error, Result, Scalar};

use crate::linalg::{CholeskyFactor, DenseCholesky, SparseCholesky};
use crate::matrix::{DenseMatrix, SparseSymmetric};

/// `½·log 2π`.
const HALF_LN_2PI: f64 = 0.918_938_533_204_672_8;

/// Log-density of every column of `x`.
///
/// `mu` is `k × 1` (shared mean) or `k × N` (one mean per observation).
///
/// # Errors
///
/// [`Error::DimensionMismatch`] when `x`, `mu` and the factor disagree on
/// `k` or `mu` has neither 1 nor N columns; then
/// [`Error::NonFiniteInput`] for the first NaN/±∞ in `x`, then in `mu`.
pub fn mvn_logpdf<T, C>(x: &DenseMatrix<T>, mu: &DenseMatrix<T>, factor: &C, is_prec: bool) -> Result<Vec<T>>
where
    T: Scalar,
    C: CholeskyFactor<T> + ?Sized,
{
    let mut out = vec![T::lit(0.0); x.ncols()];
    mvn_logpdf_into(x, mu, factor, is_prec, &mut out)?;
    Ok(out)
}

/// Like [`mvn_logpdf`] but writes into `out` (length N).
pub fn mvn_logpdf_into<T, C>(
    x: &DenseMatrix<T>,
    mu: &DenseMatrix<T>,
    factor: &C,
    is_prec: bool,
    out: &mut [T],
) -> Result<()>
where
    T: Scalar,
    C: CholeskyFactor<T> + ?Sized,
{
    check_inputs(x, mu, factor.dim())?;
    if out.len() != x.ncols() {
        return Err(Error::DimensionMismatch {
            what: "output length",
            expected: x.ncols(),
            found: out.len(),
        });
    }

    let kernel = Kernel::new(factor, x.nrows(), is_prec);
    for (j, o) in out.iter_mut().enumerate() {
        *o = kernel.eval(x.col(j), mean_col(mu, j));
    }
    Ok(())
}

/// Factor a dense matrix, then evaluate [`mvn_logpdf`].
pub fn dense_mvn_logpdf<T: Scalar>(
    x: &DenseMatrix<T>,
    mu: &DenseMatrix<T>,
    g: &DenseMatrix<T>,
    is_prec: bool,
) -> Result<Vec<T>> {
    check_square(g.nrows(), g.ncols(), x.nrows())?;
    check_inputs(x, mu, g.nrows())?;
    let factor = DenseCholesky::factor(g)?;
    mvn_logpdf(x, mu, &factor, is_prec)
}

/// Factor a sparse matrix (minimum-degree ordering), then evaluate
/// [`mvn_logpdf`].
pub fn sparse_mvn_logpdf<T: Scalar>(
    x: &DenseMatrix<T>,
    mu: &DenseMatrix<T>,
    s: &SparseSymmetric<T>,
    is_prec: bool,
) -> Result<Vec<T>> {
    check_square(s.dim(), s.dim(), x.nrows())?;
    check_inputs(x, mu, s.dim())?;
    let factor = SparseCholesky::factor(s)?;
    mvn_logpdf(x, mu, &factor, is_prec)
}

/// [`mvn_logpdf`] with observations evaluated concurrently.
///
/// Restricted to plain floats: a recording is tied to the thread that opened it.
#[cfg(feature = "parallel")]
pub fn mvn_logpdf_par<F, C>(x: &DenseMatrix<F>, mu: &DenseMatrix<F>, factor: &C, is_prec: bool) -> Result<Vec<F>>
where
    F: mvnad::Float,
    C: CholeskyFactor<F> + Sync + ?Sized,
{
    use rayon::prelude::*;

    check_inputs(x, mu, factor.dim())?;
    let kernel = Kernel::new(factor, x.nrows(), is_prec);
    Ok((0..x.ncols())
        .into_par_iter()
        .map(|j| kernel.eval(x.col(j), mean_col(mu, j)))
        .collect())
}

/// The per-observation computation with the observation-independent terms
/// hoisted.
struct Kernel<'a, T, C: ?Sized> {
    factor: &'a C,
    is_prec: bool,
    /// `−½·k·log 2π ± Σ log Lⱼⱼ`.
    constant: T,
}

impl<'a, T: Scalar, C: CholeskyFactor<T> + ?Sized> Kernel<'a, T, C> {
    fn new(factor: &'a C, k: usize, is_prec: bool) -> Self {
        let norm = T::lit(-(k as f64) * HALF_LN_2PI);
        let half_log_det = factor.sum_log_diag();
        let constant = if is_prec {
            norm + half_log_det
        } else {
            norm - half_log_det
        };
        Kernel {
            factor,
            is_prec,
            constant,
        }
    }

    fn eval(&self, x: &[T], mu: &[T]) -> T {
        let r: Vec<T> = x.iter().zip(mu).map(|(&xi, &mi)| xi - mi).collect();
        let v = if self.is_prec {
            self.factor.mul_lower_transpose(&r)
        } else {
            self.factor.solve_lower(&r)
        };
        let mut quad = T::lit(0.0);
        for vi in v {
            quad += vi * vi;
        }
        self.constant - T::lit(0.5) * quad
    }
}

#[inline]
fn mean_col<T: Copy>(mu: &DenseMatrix<T>, j: usize) -> &[T] {
    if mu.ncols() == 1 {
        mu.col(0)
    } else {
        mu.col(j)
    }
}

pub(crate) fn check_square(nrows: usize, ncols: usize, k: usize) -> Result<()> {
    if nrows != ncols {
        return Err(Error::DimensionMismatch {
            what: "covariance columns",
            expected: nrows,
            found: ncols,
        });
    }
    if nrows != k {
        return Err(Error::DimensionMismatch {
            what: "covariance dimension",
            expected: k,
            found: nrows,
        });
    }
    Ok(())
}

/// Shapes first, then finiteness of `x`, then of `mu`.
pub(crate) fn check_inputs<T: Scalar>(x: &DenseMatrix<T>, mu: &DenseMatrix<T>, k: usize) -> Result<()> {
    let n = x.ncols();
    if x.nrows() != k {
        return Err(Error::DimensionMismatch {
            what: "observation rows",
            expected: k,
            found: x.nrows(),
        });
    }
    if mu.nrows() != k {
        return Err(Error::DimensionMismatch {
            what: "mean rows",
            expected: k,
            found: mu.nrows(),
        });
    }
    if mu.ncols() != 1 && mu.ncols() != n {
        return Err(Error::DimensionMismatch {
            what: "mean columns",
            expected: n,
            found: mu.ncols(),
        });
    }
    if let Some(index) = x.as_slice().iter().position(|v| !is_finite(v)) {
        return Err(Error::NonFiniteInput {
            what: "observations",
            index,
        });
    }
    if let Some(index) = mu.as_slice().iter().position(|v| !is_finite(v)) {
        return Err(Error::NonFiniteInput { what: "mean", index });
    }
    Ok(())
}
