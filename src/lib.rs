//! Multivariate-normal log-density derivatives through a bytecode tape.
//!
//! `mvnad` is the differentiation engine: an Active Scalar capability trait
//! ([`Scalar`]) with interchangeable backends (`f32`/`f64`, [`Dual`],
//! [`Active`]), and a [`BytecodeTape`] that records arithmetic on [`Active`]
//! values once and answers forward, Jacobian and Hessian queries at any
//! number of input points afterwards.
//!
//! ```
//! use mvnad::Recording;
//!
//! let (rec, x) = Recording::<f64>::begin(&[1.0, 2.0])?;
//! let y = (x[0] * x[1]).exp();
//! let mut tape = rec.end(&[y])?;
//! tape.optimize();
//!
//! let h = tape.hessian(&[1.0, 2.0], 0)?;
//! assert!((h[0][1] - h[1][0]).abs() < 1e-12);
//! # Ok::<(), mvnad::Error>(())
//! ```
//!
//! The Gaussian kernel itself lives in the `mvnad-density` crate.

pub mod active;
pub mod api;
pub mod bytecode_tape;
pub mod dual;
pub mod error;
pub mod float;
pub mod opcode;
pub mod scalar;
pub mod special;
mod traits;

#[cfg(feature = "faer")]
pub mod faer_support;
#[cfg(feature = "nalgebra")]
pub mod nalgebra_support;

pub use active::Active;
pub use api::{jvp, record, record_multi};
pub use bytecode_tape::{is_recording, BytecodeTape, Recording, TapeState, TapeThreadLocal};
pub use dual::Dual;
pub use error::{Error, Result};
pub use float::Float;
pub use opcode::OpCode;
pub use scalar::{Real, Scalar};
pub use special::{is_finite, log_mvgamma};

/// Type alias for forward-mode dual numbers over `f64`.
pub type Dual64 = Dual<f64>;
/// Type alias for forward-mode dual numbers over `f32`.
pub type Dual32 = Dual<f32>;
/// Type alias for tape-recording variables over `f64`.
pub type Active64 = Active<f64>;
/// Type alias for tape-recording variables over `f32`.
pub type Active32 = Active<f32>;
