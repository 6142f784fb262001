//! Record the log-density kernel over an observation block and extract its
//! derivatives.
//!
//! The observations are the independent inputs, flattened column-major
//! (`index = i + k·j` for feature `i` of observation `j`). Mean and
//! covariance enter the tape as constants.

use mvnad::{Active, BytecodeTape, Error, Recording, Result, Scalar, TapeState, TapeThreadLocal};

use crate::linalg::{CovarianceFactor, DenseCholesky, Ordering, SparseCholesky};
use crate::logpdf::{check_inputs, check_square, mvn_logpdf};
use crate::matrix::{DenseMatrix, SparseSymmetric};

/// A covariance (or precision) matrix in either storage.
#[derive(Clone, Debug, PartialEq)]
pub enum Covariance<T> {
    Dense(DenseMatrix<T>),
    Sparse(SparseSymmetric<T>),
}

impl<T: Scalar> Covariance<T> {
    /// Order of the matrix (`k`).
    pub fn dim(&self) -> usize {
        match self {
            Covariance::Dense(g) => g.nrows(),
            Covariance::Sparse(s) => s.dim(),
        }
    }

    /// Factor with the matching Cholesky variant; `ordering` applies to
    /// sparse storage only.
    pub fn factor(&self, ordering: Ordering) -> Result<CovarianceFactor<T>> {
        Ok(match self {
            Covariance::Dense(g) => CovarianceFactor::Dense(DenseCholesky::factor(g)?),
            Covariance::Sparse(s) => {
                CovarianceFactor::Sparse(SparseCholesky::factor_with(s, ordering)?)
            }
        })
    }

    /// Apply `f` to every stored entry, keeping the storage and pattern.
    pub fn map<U: Scalar>(&self, f: impl FnMut(T) -> U) -> Covariance<U> {
        match self {
            Covariance::Dense(g) => Covariance::Dense(g.map(f)),
            Covariance::Sparse(s) => Covariance::Sparse(s.map(f)),
        }
    }

    /// Shapes of `x`, `mu` and this matrix agree, and `x`, `mu` are finite.
    fn check_with(&self, x: &DenseMatrix<T>, mu: &DenseMatrix<T>) -> Result<()> {
        match self {
            Covariance::Dense(g) => check_square(g.nrows(), g.ncols(), x.nrows())?,
            Covariance::Sparse(s) => check_square(s.dim(), s.dim(), x.nrows())?,
        }
        check_inputs(x, mu, self.dim())
    }
}

/// What the tape's dependent variables are.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputMode {
    /// A single output: the sum of the per-observation log-densities.
    #[default]
    Sum,
    /// One output per observation.
    PerObservation,
}

/// Recording configuration.
#[derive(Clone, Debug)]
pub struct TapeOptions {
    /// Run CSE and DCE after recording.
    pub optimize: bool,
    /// Validate the recorded values and every query's forward sweep.
    pub check_for_nan: bool,
    pub output: OutputMode,
    /// Fill-reducing ordering for sparse covariances.
    pub ordering: Ordering,
}

impl Default for TapeOptions {
    fn default() -> Self {
        TapeOptions {
            optimize: true,
            check_for_nan: true,
            output: OutputMode::Sum,
            ordering: Ordering::default(),
        }
    }
}

/// A recorded log-density tape over a `k × N` observation block.
pub struct MvnTape<F: TapeThreadLocal> {
    tape: BytecodeTape<F>,
    k: usize,
    n: usize,
}

impl<F: TapeThreadLocal> MvnTape<F> {
    /// Record the kernel at `x_at` with fixed `mu` and `cov`.
    ///
    /// # Errors
    ///
    /// Everything [`mvn_logpdf`] and the factorization raise, plus
    /// [`Error::RecordingActive`] if this thread is already recording and,
    /// with `check_for_nan`, [`Error::NonFiniteIntermediate`] from the
    /// recorded values.
    pub fn record(
        mu: &DenseMatrix<F>,
        cov: &Covariance<F>,
        is_prec: bool,
        x_at: &DenseMatrix<F>,
        options: &TapeOptions,
    ) -> Result<Self> {
        cov.check_with(x_at, mu)?;
        let (k, n) = (x_at.nrows(), x_at.ncols());
        let (recording, inputs) = Recording::begin(x_at.as_slice())?;

        let x = DenseMatrix::from_col_major(k, n, inputs)?;
        let mu = mu.map(Active::constant);
        let factor = cov.map(Active::constant).factor(options.ordering)?;
        let densities = mvn_logpdf(&x, &mu, &factor, is_prec)?;

        let outputs = match options.output {
            OutputMode::PerObservation => densities,
            OutputMode::Sum => densities.into_iter().reduce(|a, b| a + b).into_iter().collect(),
        };
        let mut tape = recording.end(&outputs)?;

        if options.optimize {
            tape.optimize();
        }
        tape.set_check_for_nan(options.check_for_nan);
        if options.check_for_nan {
            tape.validate()?;
        }
        log::debug!(
            "recorded mvn tape: k={k}, N={n}, {} outputs, {} entries",
            tape.num_outputs(),
            tape.num_ops()
        );

        Ok(MvnTape { tape, k, n })
    }

    /// The underlying tape, for queries beyond the observation-block helpers.
    pub fn tape(&self) -> &BytecodeTape<F> {
        &self.tape
    }

    /// Give up the shape bookkeeping and keep the tape.
    pub fn into_tape(self) -> BytecodeTape<F> {
        self.tape
    }

    /// Whether the tape was optimized after recording.
    pub fn state(&self) -> TapeState {
        self.tape.state()
    }

    /// `(k, N)` of the recorded observation block.
    pub fn shape(&self) -> (usize, usize) {
        (self.k, self.n)
    }

    fn flat<'x>(&self, x: &'x DenseMatrix<F>) -> Result<&'x [F]> {
        if x.nrows() != self.k || x.ncols() != self.n {
            return Err(Error::DimensionMismatch {
                what: "observation block",
                expected: self.k * self.n,
                found: x.nrows() * x.ncols(),
            });
        }
        Ok(x.as_slice())
    }

    /// Output values at a new observation block.
    pub fn forward(&self, x: &DenseMatrix<F>) -> Result<Vec<F>> {
        self.tape.forward(self.flat(x)?)
    }

    /// Outputs × (k·N) Jacobian.
    pub fn jacobian(&self, x: &DenseMatrix<F>) -> Result<Vec<Vec<F>>> {
        self.tape.jacobian(self.flat(x)?)
    }

    /// (k·N) × (k·N) Hessian of output `output`.
    pub fn hessian(&self, x: &DenseMatrix<F>, output: usize) -> Result<Vec<Vec<F>>> {
        self.tape.hessian(self.flat(x)?, output)
    }

    #[cfg(feature = "parallel")]
    pub fn jacobian_par(&self, x: &DenseMatrix<F>) -> Result<Vec<Vec<F>>> {
        self.tape.jacobian_par(self.flat(x)?)
    }

    #[cfg(feature = "parallel")]
    pub fn hessian_par(&self, x: &DenseMatrix<F>, output: usize) -> Result<Vec<Vec<F>>> {
        self.tape.hessian_par(self.flat(x)?, output)
    }
}

/// Direct value and tape derivatives at one point.
#[derive(Clone, Debug, PartialEq)]
pub struct MvnDerivatives<F> {
    /// The kernel evaluated on plain floats (summed under [`OutputMode::Sum`]).
    pub f_direct: Vec<F>,
    /// Tape forward values at the same point.
    pub f_ad: Vec<F>,
    /// Outputs × (k·N).
    pub jacobian: Vec<Vec<F>>,
    /// (k·N) × (k·N), of output 0.
    pub hessian: Vec<Vec<F>>,
}

/// Evaluate the kernel directly, record it, and query value, Jacobian and
/// Hessian at `x`.
///
/// # Errors
///
/// Shape and finiteness errors come first, before any factorization or
/// recording; then everything [`MvnTape::record`] raises.
pub fn mvn_derivatives<F: TapeThreadLocal>(
    x: &DenseMatrix<F>,
    mu: &DenseMatrix<F>,
    cov: &Covariance<F>,
    is_prec: bool,
    options: &TapeOptions,
) -> Result<MvnDerivatives<F>> {
    cov.check_with(x, mu)?;
    let factor = cov.factor(options.ordering)?;
    let densities = mvn_logpdf(x, mu, &factor, is_prec)?;
    let f_direct = match options.output {
        OutputMode::PerObservation => densities,
        OutputMode::Sum => vec![densities.into_iter().fold(F::zero(), |a, b| a + b)],
    };

    let tape = MvnTape::record(mu, cov, is_prec, x, options)?;
    Ok(MvnDerivatives {
        f_direct,
        f_ad: tape.forward(x)?,
        jacobian: tape.jacobian(x)?,
        hessian: tape.hessian(x, 0)?,
    })
}
