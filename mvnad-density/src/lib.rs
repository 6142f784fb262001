//! Multivariate Gaussian log-densities and their derivatives with respect to
//! the observations.
//!
//! The kernel is written once against [`mvnad::Scalar`]: it runs on plain
//! floats for direct evaluation and on [`mvnad::Active`] values while a
//! [`mvnad::Recording`] is open, which yields a tape that answers forward,
//! Jacobian and Hessian queries.
//!
//! ```
//! use mvnad_density::{mvn_derivatives, Covariance, DenseMatrix, TapeOptions};
//!
//! let x = DenseMatrix::from_rows(&[vec![1.0, 3.0], vec![2.0, 4.0]])?;
//! let mu = DenseMatrix::from_rows(&[vec![0.1, 0.2], vec![0.3, 0.4]])?;
//! let g = DenseMatrix::from_rows(&[vec![0.5, 0.1], vec![0.1, 2.0]])?;
//!
//! let d = mvn_derivatives(&x, &mu, &Covariance::Dense(g), false, &TapeOptions::default())?;
//! assert_eq!(d.jacobian.len(), 1);
//! assert_eq!(d.hessian.len(), 4);
//! # Ok::<(), mvnad::Error>(())
//! ```

pub mod linalg;
pub mod logpdf;
pub mod matrix;
pub mod pipeline;

pub mod faer_support;

pub use linalg::{CholeskyFactor, CovarianceFactor, DenseCholesky, Ordering, SparseCholesky};
pub use logpdf::{dense_mvn_logpdf, mvn_logpdf, mvn_logpdf_into, sparse_mvn_logpdf};
#[cfg(feature = "parallel")]
pub use logpdf::mvn_logpdf_par;
pub use matrix::{DenseMatrix, SparseSymmetric};
pub use pipeline::{mvn_derivatives, Covariance, MvnDerivatives, MvnTape, OutputMode, TapeOptions};
pub use mvnad::{Error, Result};
