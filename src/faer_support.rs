//! faer adapters for tape queries.
//!
//! Thin wrappers accepting `faer::Col<f64>` and returning `faer::Col<f64>` / `faer::Mat<f64>`.

use faer::{Col, Mat};

use crate::active::Active;
use crate::bytecode_tape::BytecodeTape;
use crate::error::Result;

fn to_vec(x: &Col<f64>) -> Vec<f64> {
    (0..x.nrows()).map(|i| x[i]).collect()
}

fn rows_to_mat(rows: &[Vec<f64>], ncols: usize) -> Mat<f64> {
    Mat::from_fn(rows.len(), ncols, |i, j| rows[i][j])
}

/// Record a function and compute its gradient, returning `(value, gradient)`.
pub fn grad_faer(
    f: impl FnOnce(&[Active<f64>]) -> Active<f64>,
    x: &Col<f64>,
) -> Result<(f64, Col<f64>)> {
    let xs = to_vec(x);
    let (tape, val) = crate::api::record(f, &xs)?;
    let g = tape.gradient(&xs, 0)?;
    Ok((val, Col::from_fn(g.len(), |i| g[i])))
}

/// Compute the Jacobian of a multi-output function, returning `Mat<f64>`.
pub fn jacobian_faer(
    f: impl FnOnce(&[Active<f64>]) -> Vec<Active<f64>>,
    x: &Col<f64>,
) -> Result<Mat<f64>> {
    let xs = to_vec(x);
    let (tape, _) = crate::api::record_multi(f, &xs)?;
    let jac = tape.jacobian(&xs)?;
    Ok(rows_to_mat(&jac, xs.len()))
}

/// Evaluate outputs on a pre-recorded tape.
pub fn tape_forward_faer(tape: &BytecodeTape<f64>, x: &Col<f64>) -> Result<Col<f64>> {
    let y = tape.forward(&to_vec(x))?;
    Ok(Col::from_fn(y.len(), |i| y[i]))
}

/// Evaluate the Jacobian on a pre-recorded tape.
pub fn tape_jacobian_faer(tape: &BytecodeTape<f64>, x: &Col<f64>) -> Result<Mat<f64>> {
    let xs = to_vec(x);
    let jac = tape.jacobian(&xs)?;
    Ok(rows_to_mat(&jac, xs.len()))
}

/// Evaluate the Hessian of output `output` on a pre-recorded tape.
pub fn tape_hessian_faer(
    tape: &BytecodeTape<f64>,
    x: &Col<f64>,
    output: usize,
) -> Result<Mat<f64>> {
    let xs = to_vec(x);
    let hess = tape.hessian(&xs, output)?;
    Ok(rows_to_mat(&hess, xs.len()))
}
