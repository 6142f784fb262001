//! Conversions between faer matrices and the internal buffers.

use faer::sparse::SparseColMat;
use faer::Mat;

use mvnad::Result;

use crate::matrix::{DenseMatrix, SparseSymmetric};

pub fn dense_from_faer(m: &Mat<f64>) -> DenseMatrix<f64> {
    DenseMatrix::from_fn(m.nrows(), m.ncols(), |i, j| m[(i, j)])
}

pub fn dense_to_faer(m: &DenseMatrix<f64>) -> Mat<f64> {
    Mat::from_fn(m.nrows(), m.ncols(), |i, j| m.get(i, j))
}

/// Copy a square faer CSC matrix. Both triangles may be present; the
/// factorizations read the lower one.
///
/// # Errors
///
/// [`Error::DimensionMismatch`](mvnad::Error::DimensionMismatch) if `m` is not square.
pub fn sparse_from_faer(m: &SparseColMat<usize, f64>) -> Result<SparseSymmetric<f64>> {
    if m.nrows() != m.ncols() {
        return Err(mvnad::Error::DimensionMismatch {
            what: "symmetric matrix columns",
            expected: m.nrows(),
            found: m.ncols(),
        });
    }
    let (symbolic, values) = m.parts();
    let col_ptr = symbolic.col_ptr();
    let row_idx = symbolic.row_idx();
    let mut triplets = Vec::with_capacity(values.len());
    for col in 0..m.ncols() {
        for idx in col_ptr[col]..col_ptr[col + 1] {
            triplets.push((row_idx[idx], col, values[idx]));
        }
    }
    SparseSymmetric::from_triplets(m.nrows(), &triplets)
}
