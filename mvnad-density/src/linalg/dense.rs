use mvnad::{Error, Result, Scalar};

use super::{pivot_sqrt, CholeskyFactor};
use crate::matrix::DenseMatrix;

/// Dense lower-triangular Cholesky factor, `L·Lᵗ = A`.
#[derive(Clone, Debug)]
pub struct DenseCholesky<T> {
    n: usize,
    /// Column-major `n × n`; entries above the diagonal are never read.
    l: Vec<T>,
}

impl<T: Scalar> DenseCholesky<T> {
    /// Factor a symmetric positive-definite matrix, reading its lower triangle.
    ///
    /// # Errors
    ///
    /// [`Error::DimensionMismatch`] if `a` is not square,
    /// [`Error::NonPositiveDefinite`] at the first pivot that is not
    /// strictly positive.
    #[allow(clippy::needless_range_loop)]
    pub fn factor(a: &DenseMatrix<T>) -> Result<Self> {
        let n = a.nrows();
        if a.ncols() != n {
            return Err(Error::DimensionMismatch {
                what: "covariance columns",
                expected: n,
                found: a.ncols(),
            });
        }

        let zero = T::lit(0.0);
        let mut l = vec![zero; n * n];
        for j in 0..n {
            let mut d = a.get(j, j);
            for p in 0..j {
                let ljp = l[j + p * n];
                d -= ljp * ljp;
            }
            let ljj = pivot_sqrt(d, j)?;
            l[j + j * n] = ljj;

            for i in (j + 1)..n {
                let mut s = a.get(i, j);
                for p in 0..j {
                    s -= l[i + p * n] * l[j + p * n];
                }
                l[i + j * n] = s / ljj;
            }
        }

        log::debug!("dense cholesky: n={n}");
        Ok(DenseCholesky { n, l })
    }

    /// Entry `(i, j)` of `L` (zero above the diagonal).
    #[inline]
    pub fn l(&self, i: usize, j: usize) -> T {
        if i < j {
            T::lit(0.0)
        } else {
            self.l[i + j * self.n]
        }
    }

    /// Solve `A·x = b`.
    pub fn solve(&self, b: &[T]) -> Vec<T> {
        let n = self.n;
        let mut x = self.solve_lower(b);
        for j in (0..n).rev() {
            let mut s = x[j];
            for i in (j + 1)..n {
                s -= self.l[i + j * n] * x[i];
            }
            x[j] = s / self.l[j + j * n];
        }
        x
    }

    /// `L·Lᵗ` as a dense matrix.
    pub fn reconstruct(&self) -> DenseMatrix<T> {
        DenseMatrix::from_fn(self.n, self.n, |i, j| {
            let mut s = T::lit(0.0);
            for p in 0..=i.min(j) {
                s += self.l(i, p) * self.l(j, p);
            }
            s
        })
    }
}

impl<T: Scalar> CholeskyFactor<T> for DenseCholesky<T> {
    fn dim(&self) -> usize {
        self.n
    }

    fn sum_log_diag(&self) -> T {
        let mut s = T::lit(0.0);
        for j in 0..self.n {
            s += self.l[j + j * self.n].ln();
        }
        s
    }

    fn solve_lower(&self, r: &[T]) -> Vec<T> {
        let n = self.n;
        debug_assert_eq!(r.len(), n);
        let mut w = r.to_vec();
        for j in 0..n {
            w[j] /= self.l[j + j * n];
            let wj = w[j];
            for i in (j + 1)..n {
                w[i] -= self.l[i + j * n] * wj;
            }
        }
        w
    }

    fn mul_lower_transpose(&self, r: &[T]) -> Vec<T> {
        let n = self.n;
        debug_assert_eq!(r.len(), n);
        (0..n)
            .map(|j| {
                let mut s = T::lit(0.0);
                for i in j..n {
                    s += self.l[i + j * n] * r[i];
                }
                s
            })
            .collect()
    }
}
