//! Cholesky factorizations of symmetric positive-definite matrices.
//!
//! [`DenseCholesky`] and [`SparseCholesky`] share the [`CholeskyFactor`]
//! capability so the log-density evaluator is written once. Both are generic
//! over [`Scalar`] and can therefore be computed on plain floats, or on
//! [`mvnad::Active`] values while recording.

mod dense;
mod ordering;
mod sparse;

pub use dense::DenseCholesky;
pub use ordering::Ordering;
pub use sparse::SparseCholesky;

use mvnad::{Error, Result, Scalar};

/// What the evaluator needs from a factor `L` of a symmetric matrix `A`
/// (`Pᵗ·L·Lᵗ·P = A`, with `P = I` for dense factors).
pub trait CholeskyFactor<T: Scalar> {
    /// Order of the factored matrix.
    fn dim(&self) -> usize;

    /// `Σ log Lⱼⱼ`, half the log-determinant of `A`.
    fn sum_log_diag(&self) -> T;

    /// `w` with `L·w = P·r`.
    fn solve_lower(&self, r: &[T]) -> Vec<T>;

    /// `z = Lᵗ·P·r`.
    fn mul_lower_transpose(&self, r: &[T]) -> Vec<T>;

    /// Fill-reducing permutation (`perm[new] = old`), if any.
    fn permutation(&self) -> Option<&[usize]> {
        None
    }

    /// `log det A = 2·Σ log Lⱼⱼ`.
    fn log_det(&self) -> T {
        T::lit(2.0) * self.sum_log_diag()
    }
}

/// Either factor, for callers that pick the storage at run time.
#[derive(Clone, Debug)]
pub enum CovarianceFactor<T> {
    Dense(DenseCholesky<T>),
    Sparse(SparseCholesky<T>),
}

impl<T: Scalar> CholeskyFactor<T> for CovarianceFactor<T> {
    fn dim(&self) -> usize {
        match self {
            CovarianceFactor::Dense(f) => f.dim(),
            CovarianceFactor::Sparse(f) => f.dim(),
        }
    }

    fn sum_log_diag(&self) -> T {
        match self {
            CovarianceFactor::Dense(f) => f.sum_log_diag(),
            CovarianceFactor::Sparse(f) => f.sum_log_diag(),
        }
    }

    fn solve_lower(&self, r: &[T]) -> Vec<T> {
        match self {
            CovarianceFactor::Dense(f) => f.solve_lower(r),
            CovarianceFactor::Sparse(f) => f.solve_lower(r),
        }
    }

    fn mul_lower_transpose(&self, r: &[T]) -> Vec<T> {
        match self {
            CovarianceFactor::Dense(f) => f.mul_lower_transpose(r),
            CovarianceFactor::Sparse(f) => f.mul_lower_transpose(r),
        }
    }

    fn permutation(&self) -> Option<&[usize]> {
        match self {
            CovarianceFactor::Dense(f) => f.permutation(),
            CovarianceFactor::Sparse(f) => f.permutation(),
        }
    }
}

/// Accept pivot `d` of column `pivot` and return `√d`.
///
/// Any strictly positive pivot is accepted, however small; zero, negative
/// and NaN pivots fail.
pub(crate) fn pivot_sqrt<T: Scalar>(d: T, pivot: usize) -> Result<T> {
    if d.value() > T::lit(0.0).value() {
        return Ok(d.sqrt());
    }
    log::warn!(
        "cholesky: pivot {pivot} is {}, matrix is not positive definite",
        d.value()
    );
    Err(Error::NonPositiveDefinite { pivot })
}
