//! nalgebra adapters for tape queries.
//!
//! Thin wrappers accepting `DVector<F>` and returning `DVector<F>` / `DMatrix<F>`.

use nalgebra::{DMatrix, DVector};

use crate::active::Active;
use crate::bytecode_tape::{BytecodeTape, TapeThreadLocal};
use crate::error::Result;
use crate::float::Float;

fn rows_to_matrix<F: Float>(rows: Vec<Vec<F>>, ncols: usize) -> DMatrix<F> {
    let nrows = rows.len();
    let flat: Vec<F> = rows.into_iter().flatten().collect();
    DMatrix::from_row_slice(nrows, ncols, &flat)
}

/// Record a function, compute value and gradient, returning `(value, DVector)`.
pub fn grad_nalgebra<F: TapeThreadLocal>(
    f: impl FnOnce(&[Active<F>]) -> Active<F>,
    x: &DVector<F>,
) -> Result<(F, DVector<F>)> {
    let xs = x.as_slice();
    let (tape, val) = crate::api::record(f, xs)?;
    let g = tape.gradient(xs, 0)?;
    Ok((val, DVector::from_vec(g)))
}

/// Compute the Jacobian of a multi-output function, returning `DMatrix<F>`.
///
/// Returns `J[(i, j)] = ∂f_i/∂x_j`.
pub fn jacobian_nalgebra<F: TapeThreadLocal>(
    f: impl FnOnce(&[Active<F>]) -> Vec<Active<F>>,
    x: &DVector<F>,
) -> Result<DMatrix<F>> {
    let xs = x.as_slice();
    let (tape, _) = crate::api::record_multi(f, xs)?;
    let jac = tape.jacobian(xs)?;
    Ok(rows_to_matrix(jac, xs.len()))
}

/// Evaluate outputs on a pre-recorded tape.
pub fn tape_forward_nalgebra<F: Float>(tape: &BytecodeTape<F>, x: &DVector<F>) -> Result<DVector<F>> {
    Ok(DVector::from_vec(tape.forward(x.as_slice())?))
}

/// Evaluate the Jacobian on a pre-recorded tape.
pub fn tape_jacobian_nalgebra<F: Float>(tape: &BytecodeTape<F>, x: &DVector<F>) -> Result<DMatrix<F>> {
    let jac = tape.jacobian(x.as_slice())?;
    Ok(rows_to_matrix(jac, x.len()))
}

/// Evaluate the Hessian of output `output` on a pre-recorded tape.
pub fn tape_hessian_nalgebra<F: Float>(
    tape: &BytecodeTape<F>,
    x: &DVector<F>,
    output: usize,
) -> Result<DMatrix<F>> {
    let hess = tape.hessian(x.as_slice(), output)?;
    Ok(rows_to_matrix(hess, x.len()))
}
