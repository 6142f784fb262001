//! Matrix buffers generic over the scalar type.
//!
//! [`DenseMatrix`] is column-major, so the columns of an observation block
//! are contiguous and its flat buffer is the tape's input order
//! (`index = i + k·j` for feature `i` of observation `j`).
//! [`SparseSymmetric`] is compressed sparse column storage of a symmetric
//! matrix; factorizations read only its lower triangle.

use mvnad::{Error, Result, Scalar};

/// Dense column-major matrix.
#[derive(Clone, Debug, PartialEq)]
pub struct DenseMatrix<T> {
    nrows: usize,
    ncols: usize,
    data: Vec<T>,
}

impl<T: Copy> DenseMatrix<T> {
    /// Wrap a column-major buffer.
    ///
    /// # Errors
    ///
    /// [`Error::DimensionMismatch`] if `data.len() != nrows * ncols`.
    pub fn from_col_major(nrows: usize, ncols: usize, data: Vec<T>) -> Result<Self> {
        if data.len() != nrows * ncols {
            return Err(Error::DimensionMismatch {
                what: "matrix buffer",
                expected: nrows * ncols,
                found: data.len(),
            });
        }
        Ok(DenseMatrix { nrows, ncols, data })
    }

    /// Build from row vectors (`rows[i][j]` is entry `(i, j)`).
    ///
    /// # Errors
    ///
    /// [`Error::DimensionMismatch`] for ragged rows.
    pub fn from_rows(rows: &[Vec<T>]) -> Result<Self> {
        let nrows = rows.len();
        let ncols = rows.first().map_or(0, Vec::len);
        if let Some(bad) = rows.iter().find(|r| r.len() != ncols) {
            return Err(Error::DimensionMismatch {
                what: "matrix row length",
                expected: ncols,
                found: bad.len(),
            });
        }
        Ok(Self::from_fn(nrows, ncols, |i, j| rows[i][j]))
    }

    pub fn from_fn(nrows: usize, ncols: usize, mut f: impl FnMut(usize, usize) -> T) -> Self {
        let mut data = Vec::with_capacity(nrows * ncols);
        for j in 0..ncols {
            for i in 0..nrows {
                data.push(f(i, j));
            }
        }
        DenseMatrix { nrows, ncols, data }
    }

    #[inline]
    pub fn nrows(&self) -> usize {
        self.nrows
    }

    #[inline]
    pub fn ncols(&self) -> usize {
        self.ncols
    }

    #[inline]
    pub fn get(&self, i: usize, j: usize) -> T {
        debug_assert!(i < self.nrows && j < self.ncols);
        self.data[i + j * self.nrows]
    }

    /// Column `j` as a contiguous slice.
    #[inline]
    pub fn col(&self, j: usize) -> &[T] {
        &self.data[j * self.nrows..(j + 1) * self.nrows]
    }

    /// The column-major buffer.
    #[inline]
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    pub fn into_vec(self) -> Vec<T> {
        self.data
    }

    pub fn map<U>(&self, f: impl FnMut(T) -> U) -> DenseMatrix<U> {
        DenseMatrix {
            nrows: self.nrows,
            ncols: self.ncols,
            data: self.data.iter().copied().map(f).collect(),
        }
    }
}

/// Symmetric matrix in compressed sparse column form.
///
/// Either triangle (or both) may be stored; consumers that need the full
/// matrix read the lower triangle (`row >= col`) and mirror it.
#[derive(Clone, Debug, PartialEq)]
pub struct SparseSymmetric<T> {
    n: usize,
    col_ptr: Vec<usize>,
    row_idx: Vec<usize>,
    values: Vec<T>,
}

impl<T: Scalar> SparseSymmetric<T> {
    /// Assemble an `n × n` matrix from `(row, col, value)` triplets.
    ///
    /// Duplicate positions are summed. Rows are sorted within each column.
    ///
    /// # Errors
    ///
    /// [`Error::DimensionMismatch`] if an index is out of range.
    pub fn from_triplets(n: usize, triplets: &[(usize, usize, T)]) -> Result<Self> {
        if let Some(&(r, c, _)) = triplets.iter().find(|&&(r, c, _)| r >= n || c >= n) {
            return Err(Error::DimensionMismatch {
                what: "triplet index",
                expected: n,
                found: r.max(c),
            });
        }

        let mut sorted: Vec<(usize, usize, T)> = triplets.to_vec();
        sorted.sort_by_key(|&(r, c, _)| (c, r));

        let mut col_ptr = vec![0usize; n + 1];
        let mut row_idx = Vec::with_capacity(sorted.len());
        let mut values: Vec<T> = Vec::with_capacity(sorted.len());
        let mut last: Option<(usize, usize)> = None;
        for (r, c, v) in sorted {
            if last == Some((r, c)) {
                if let Some(acc) = values.last_mut() {
                    *acc += v;
                }
                continue;
            }
            last = Some((r, c));
            row_idx.push(r);
            values.push(v);
            col_ptr[c + 1] += 1;
        }
        for j in 0..n {
            col_ptr[j + 1] += col_ptr[j];
        }

        Ok(SparseSymmetric {
            n,
            col_ptr,
            row_idx,
            values,
        })
    }

    /// Take the lower triangle of a square dense matrix, skipping exact zeros.
    ///
    /// # Errors
    ///
    /// [`Error::DimensionMismatch`] if `a` is not square.
    pub fn from_dense(a: &DenseMatrix<T>) -> Result<Self> {
        if a.nrows() != a.ncols() {
            return Err(Error::DimensionMismatch {
                what: "symmetric matrix columns",
                expected: a.nrows(),
                found: a.ncols(),
            });
        }
        let zero = T::lit(0.0);
        let mut triplets = Vec::new();
        for j in 0..a.ncols() {
            for i in j..a.nrows() {
                let v = a.get(i, j);
                if v != zero {
                    triplets.push((i, j, v));
                }
            }
        }
        Self::from_triplets(a.nrows(), &triplets)
    }

    /// The symmetric matrix described by the lower triangle, densely.
    pub fn to_dense(&self) -> DenseMatrix<T> {
        let mut out = DenseMatrix::from_fn(self.n, self.n, |_, _| T::lit(0.0));
        for (r, c, v) in self.lower_entries() {
            out.data[r + c * self.n] = v;
            out.data[c + r * self.n] = v;
        }
        out
    }

    /// Stored entries with `row >= col`, column by column.
    pub fn lower_entries(&self) -> impl Iterator<Item = (usize, usize, T)> + '_ {
        (0..self.n).flat_map(move |c| {
            (self.col_ptr[c]..self.col_ptr[c + 1])
                .filter(move |&p| self.row_idx[p] >= c)
                .map(move |p| (self.row_idx[p], c, self.values[p]))
        })
    }

    pub fn map<U>(&self, f: impl FnMut(T) -> U) -> SparseSymmetric<U> {
        SparseSymmetric {
            n: self.n,
            col_ptr: self.col_ptr.clone(),
            row_idx: self.row_idx.clone(),
            values: self.values.iter().copied().map(f).collect(),
        }
    }
}

impl<T> SparseSymmetric<T> {
    #[inline]
    pub fn dim(&self) -> usize {
        self.n
    }

    /// Number of stored entries.
    #[inline]
    pub fn nnz(&self) -> usize {
        self.values.len()
    }

    #[inline]
    pub fn col_ptr(&self) -> &[usize] {
        &self.col_ptr
    }

    #[inline]
    pub fn row_idx(&self) -> &[usize] {
        &self.row_idx
    }

    #[inline]
    pub fn values(&self) -> &[T] {
        &self.values
    }
}
