use std::collections::BTreeSet;

use mvnad::{Result, Scalar};

use super::{pivot_sqrt, CholeskyFactor, Ordering};
use crate::matrix::{DenseMatrix, SparseSymmetric};

/// Sparse Cholesky factor with a fill-reducing permutation:
/// `Pᵗ·L·Lᵗ·P = A`, where `(P·r)[new] = r[perm[new]]`.
///
/// `L` is stored by columns; each column starts with its diagonal entry,
/// followed by the strictly-lower rows in ascending order.
#[derive(Clone, Debug)]
pub struct SparseCholesky<T> {
    n: usize,
    perm: Vec<usize>,
    pinv: Vec<usize>,
    col_ptr: Vec<usize>,
    row_idx: Vec<usize>,
    values: Vec<T>,
}

impl<T: Scalar> SparseCholesky<T> {
    /// Factor with the default (AMD) ordering.
    pub fn factor(a: &SparseSymmetric<T>) -> Result<Self> {
        Self::factor_with(a, Ordering::default())
    }

    /// Factor a symmetric positive-definite matrix, reading its lower triangle.
    ///
    /// # Errors
    ///
    /// [`Error::NonPositiveDefinite`](mvnad::Error::NonPositiveDefinite) at
    /// the first pivot (in permuted order) that is not strictly positive.
    pub fn factor_with(a: &SparseSymmetric<T>, ordering: Ordering) -> Result<Self> {
        let n = a.dim();
        let perm = ordering.permutation(n, a.lower_entries().map(|(r, c, _)| (r, c)));
        let mut pinv = vec![0usize; n];
        for (new, &old) in perm.iter().enumerate() {
            pinv[old] = new;
        }

        // Lower triangle of C = P·A·Pᵗ, by columns.
        let mut c_cols: Vec<Vec<(usize, T)>> = vec![Vec::new(); n];
        for (r, c, v) in a.lower_entries() {
            let (pr, pc) = (pinv[r], pinv[c]);
            c_cols[pr.min(pc)].push((pr.max(pc), v));
        }
        for col in &mut c_cols {
            col.sort_by_key(|&(r, _)| r);
        }

        let (col_ptr, row_idx) = symbolic(&c_cols);
        let values = numeric(&c_cols, &col_ptr, &row_idx)?;

        log::debug!(
            "sparse cholesky: n={n}, nnz(lower A)={}, nnz(L)={}, ordering={ordering:?}",
            c_cols.iter().map(Vec::len).sum::<usize>(),
            row_idx.len()
        );

        Ok(SparseCholesky {
            n,
            perm,
            pinv,
            col_ptr,
            row_idx,
            values,
        })
    }

    /// Number of stored entries of `L`.
    pub fn nnz(&self) -> usize {
        self.values.len()
    }

    #[inline]
    fn diag(&self, j: usize) -> T {
        self.values[self.col_ptr[j]]
    }

    /// Strictly-lower entries of column `j`.
    #[inline]
    fn below(&self, j: usize) -> impl Iterator<Item = (usize, T)> + '_ {
        let range = (self.col_ptr[j] + 1)..self.col_ptr[j + 1];
        self.row_idx[range.clone()]
            .iter()
            .copied()
            .zip(self.values[range].iter().copied())
    }

    fn permute(&self, r: &[T]) -> Vec<T> {
        debug_assert_eq!(r.len(), self.n);
        self.perm.iter().map(|&old| r[old]).collect()
    }

    /// Full solve `A·x = b`: `x = Pᵗ·L⁻ᵗ·L⁻¹·P·b`.
    pub fn solve(&self, b: &[T]) -> Vec<T> {
        let mut w = self.solve_lower(b);
        for j in (0..self.n).rev() {
            let mut s = w[j];
            for (i, lij) in self.below(j) {
                s -= lij * w[i];
            }
            w[j] = s / self.diag(j);
        }
        let mut x = w.clone();
        for (new, &old) in self.perm.iter().enumerate() {
            x[old] = w[new];
        }
        x
    }

    /// `Pᵗ·L·Lᵗ·P` as a dense matrix, in the original ordering.
    pub fn reconstruct(&self) -> DenseMatrix<T> {
        let n = self.n;
        let zero = T::lit(0.0);
        let mut l = vec![zero; n * n];
        for j in 0..n {
            l[j + j * n] = self.diag(j);
            for (i, v) in self.below(j) {
                l[i + j * n] = v;
            }
        }
        DenseMatrix::from_fn(n, n, |i, j| {
            let (pi, pj) = (self.pinv[i], self.pinv[j]);
            let mut s = zero;
            for p in 0..=pi.min(pj) {
                s += l[pi + p * n] * l[pj + p * n];
            }
            s
        })
    }
}

impl<T: Scalar> CholeskyFactor<T> for SparseCholesky<T> {
    fn dim(&self) -> usize {
        self.n
    }

    fn sum_log_diag(&self) -> T {
        let mut s = T::lit(0.0);
        for j in 0..self.n {
            s += self.diag(j).ln();
        }
        s
    }

    fn solve_lower(&self, r: &[T]) -> Vec<T> {
        let mut w = self.permute(r);
        for j in 0..self.n {
            w[j] /= self.diag(j);
            let wj = w[j];
            for (i, lij) in self.below(j) {
                w[i] -= lij * wj;
            }
        }
        w
    }

    fn mul_lower_transpose(&self, r: &[T]) -> Vec<T> {
        let y = self.permute(r);
        (0..self.n)
            .map(|j| {
                let mut s = self.diag(j) * y[j];
                for (i, lij) in self.below(j) {
                    s += lij * y[i];
                }
                s
            })
            .collect()
    }

    fn permutation(&self) -> Option<&[usize]> {
        Some(&self.perm)
    }
}

/// Column structure of `L` from the elimination tree: the pattern of column
/// `j` is the strictly-lower pattern of `C[:, j]` merged with the patterns of
/// its children, minus `j` itself.
fn symbolic<T>(c_cols: &[Vec<(usize, T)>]) -> (Vec<usize>, Vec<usize>) {
    let n = c_cols.len();
    let mut children: Vec<Vec<usize>> = vec![Vec::new(); n];
    let mut patterns: Vec<BTreeSet<usize>> = Vec::with_capacity(n);

    for j in 0..n {
        let mut pattern: BTreeSet<usize> =
            c_cols[j].iter().map(|&(r, _)| r).filter(|&r| r > j).collect();
        for &child in &children[j] {
            pattern.extend(patterns[child].iter().copied().filter(|&r| r > j));
        }
        if let Some(&parent) = pattern.first() {
            children[parent].push(j);
        }
        patterns.push(pattern);
    }

    let mut col_ptr = Vec::with_capacity(n + 1);
    let mut row_idx = Vec::new();
    col_ptr.push(0);
    for (j, pattern) in patterns.into_iter().enumerate() {
        row_idx.push(j);
        row_idx.extend(pattern);
        col_ptr.push(row_idx.len());
    }
    (col_ptr, row_idx)
}

/// Left-looking numeric factorization over the symbolic structure.
fn numeric<T: Scalar>(
    c_cols: &[Vec<(usize, T)>],
    col_ptr: &[usize],
    row_idx: &[usize],
) -> Result<Vec<T>> {
    let n = c_cols.len();
    let zero = T::lit(0.0);

    // rows[j] lists (k, position of L[j][k]) for every k < j with L[j][k] in the structure.
    let mut rows: Vec<Vec<(usize, usize)>> = vec![Vec::new(); n];
    for k in 0..n {
        for p in (col_ptr[k] + 1)..col_ptr[k + 1] {
            rows[row_idx[p]].push((k, p));
        }
    }

    let mut values = vec![zero; row_idx.len()];
    let mut x = vec![zero; n];
    for j in 0..n {
        for &(r, v) in &c_cols[j] {
            x[r] = v;
        }

        // x -= L[j:, k] · L[j][k] for every earlier column touching row j.
        for &(k, pos_jk) in &rows[j] {
            let ljk = values[pos_jk];
            for p in pos_jk..col_ptr[k + 1] {
                let i = row_idx[p];
                x[i] -= values[p] * ljk;
            }
        }

        let ljj = pivot_sqrt(x[j], j)?;
        let start = col_ptr[j];
        values[start] = ljj;
        x[j] = zero;
        for p in (start + 1)..col_ptr[j + 1] {
            let i = row_idx[p];
            values[p] = x[i] / ljj;
            x[i] = zero;
        }
    }
    Ok(values)
}
