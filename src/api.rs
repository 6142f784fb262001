//! Closure-based entry points.

use crate::active::Active;
use crate::bytecode_tape::{BytecodeTape, Recording, TapeThreadLocal};
use crate::dual::Dual;
use crate::error::{Error, Result};
use crate::float::Float;

/// Record a scalar function into a [`BytecodeTape`].
///
/// Returns the tape and the output value from the recording pass.
///
/// ```
/// let (tape, value) = mvnad::record(|x: &[mvnad::Active<f64>]| x[0] * x[1] + x[0], &[2.0, 3.0])?;
/// assert_eq!(value, 8.0);
/// assert_eq!(tape.gradient(&[2.0, 3.0], 0)?, vec![4.0, 2.0]);
/// # Ok::<(), mvnad::Error>(())
/// ```
///
/// # Errors
///
/// [`Error::RecordingActive`] if this thread is already recording.
pub fn record<F: TapeThreadLocal>(
    f: impl FnOnce(&[Active<F>]) -> Active<F>,
    x: &[F],
) -> Result<(BytecodeTape<F>, F)> {
    let (recording, inputs) = Recording::begin(x)?;
    let output = f(&inputs);
    let tape = recording.end(&[output])?;
    Ok((tape, output.value))
}

/// Record a multi-output function into a [`BytecodeTape`].
///
/// Like [`record`] but for vector-valued functions `f : R^n → R^m`.
/// Returns the tape and the output values from the recording pass.
pub fn record_multi<F: TapeThreadLocal>(
    f: impl FnOnce(&[Active<F>]) -> Vec<Active<F>>,
    x: &[F],
) -> Result<(BytecodeTape<F>, Vec<F>)> {
    let (recording, inputs) = Recording::begin(x)?;
    let outputs = f(&inputs);
    let values = outputs.iter().map(|o| o.value).collect();
    let tape = recording.end(&outputs)?;
    Ok((tape, values))
}

/// Jacobian-vector product (forward mode): `(f(x), J·v)`.
///
/// Evaluates `f` at `x` and computes the directional derivative in direction `v`.
pub fn jvp<F: Float>(
    f: impl Fn(&[Dual<F>]) -> Vec<Dual<F>>,
    x: &[F],
    v: &[F],
) -> Result<(Vec<F>, Vec<F>)> {
    if x.len() != v.len() {
        return Err(Error::DimensionMismatch {
            what: "jvp direction",
            expected: x.len(),
            found: v.len(),
        });
    }
    let inputs: Vec<Dual<F>> = x
        .iter()
        .zip(v)
        .map(|(&xi, &vi)| Dual::new(xi, vi))
        .collect();
    let outputs = f(&inputs);
    let values = outputs.iter().map(|d| d.re).collect();
    let tangents = outputs.iter().map(|d| d.eps).collect();
    Ok((values, tangents))
}
