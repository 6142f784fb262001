//! Bytecode tape for re-evaluable reverse-mode AD.
//!
//! The tape is an arena of indexed entries: parallel vectors of opcodes,
//! argument index pairs and primal values. Every argument index points to an
//! earlier entry, so the recorded graph is acyclic by construction and the
//! optimizer's liveness pass is a single backward walk.
//!
//! Lifecycle: [`Recording::begin`] → [`Recording::end`] yields a tape in
//! [`TapeState::Recorded`]; [`optimize`](BytecodeTape::optimize) moves it to
//! [`TapeState::Optimized`]. Queries ([`forward`](BytecodeTape::forward),
//! [`jacobian`](BytecodeTape::jacobian), [`hessian`](BytecodeTape::hessian))
//! take `&self` and may be issued from several threads at once.
//!
//! # Limitations
//!
//! The tape records one execution path. If the recorded function contains
//! branches (`if x > 0 { ... } else { ... }`), re-evaluating at inputs that
//! take a different branch produces incorrect results.

use crate::error::{Error, Result};
use crate::float::Float;
use crate::opcode::{OpCode, UNUSED};

mod forward;
mod jacobian;
mod optimize;
mod recording;
mod reverse;
mod tangent;
mod validate;

#[cfg(feature = "parallel")]
mod parallel;
#[cfg(feature = "serde")]
mod serde_support;

mod thread_local;
pub use self::recording::Recording;
pub use self::thread_local::{is_recording, with_active_tape, TapeThreadLocal};

/// Sentinel index for constant entries (not tracked).
pub const CONSTANT: u32 = u32::MAX;

/// Where a tape sits in its lifecycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TapeState {
    /// Outputs fixed, graph as recorded.
    Recorded,
    /// CSE and DCE applied.
    Optimized,
}

/// A bytecode tape that can be re-evaluated at different inputs.
///
/// Created via [`Recording`] or [`crate::api::record`].
pub struct BytecodeTape<F: Float> {
    pub(crate) opcodes: Vec<OpCode>,
    pub(crate) arg_indices: Vec<[u32; 2]>,
    pub(crate) values: Vec<F>,
    pub(crate) num_inputs: u32,
    pub(crate) num_variables: u32,
    /// Indices of the dependent variables, in the order they were passed to `end`.
    pub(crate) output_indices: Vec<u32>,
    pub(crate) state: TapeState,
    /// Validate every forward sweep a query performs.
    pub(crate) check_for_nan: bool,
}

impl<F: Float> BytecodeTape<F> {
    /// Create an empty bytecode tape.
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Create a bytecode tape with pre-allocated capacity.
    pub fn with_capacity(est_ops: usize) -> Self {
        BytecodeTape {
            opcodes: Vec::with_capacity(est_ops),
            arg_indices: Vec::with_capacity(est_ops),
            values: Vec::with_capacity(est_ops),
            num_inputs: 0,
            num_variables: 0,
            output_indices: Vec::new(),
            state: TapeState::Recorded,
            check_for_nan: false,
        }
    }

    /// Register a new input variable. Returns its index.
    ///
    /// Inputs must be registered before any other entry so that input `i`
    /// lives at tape index `i`.
    #[inline]
    pub fn new_input(&mut self, value: F) -> u32 {
        debug_assert_eq!(
            self.num_inputs, self.num_variables,
            "inputs must precede all other tape entries"
        );
        let idx = self.num_variables;
        self.num_variables += 1;
        self.num_inputs += 1;
        self.opcodes.push(OpCode::Input);
        self.arg_indices.push([UNUSED, UNUSED]);
        self.values.push(value);
        idx
    }

    /// Register a scalar constant. Returns its index.
    #[inline]
    pub fn push_const(&mut self, value: F) -> u32 {
        let idx = self.num_variables;
        self.num_variables += 1;
        self.opcodes.push(OpCode::Const);
        self.arg_indices.push([UNUSED, UNUSED]);
        self.values.push(value);
        idx
    }

    /// Record an operation. Returns the result index.
    ///
    /// **Constant folding**: if all operands point to `Const` entries (not `Input`),
    /// the operation is replaced by a single `Const` with the already-computed value.
    ///
    /// **Algebraic simplification**: identity patterns (`x + 0 → x`, `x * 1 → x`,
    /// etc.) and absorbing patterns (`x * 0 → 0`, `x - x → 0`, `x / x → 1`) are
    /// detected and short-circuited. Absorbing patterns are guarded by a value check
    /// to handle NaN/Inf edge cases correctly.
    #[inline]
    pub fn push_op(&mut self, op: OpCode, arg0: u32, arg1: u32, value: F) -> u32 {
        let arg0_const = self.opcodes[arg0 as usize] == OpCode::Const;
        let arg1_const = arg1 == UNUSED || self.opcodes[arg1 as usize] == OpCode::Const;
        if arg0_const && arg1_const {
            return self.push_const(value);
        }

        if (arg0_const || arg1_const) && arg1 != UNUSED {
            if let Some(idx) =
                self.try_algebraic_simplify(op, arg0, arg1, arg0_const, arg1_const, value)
            {
                return idx;
            }
        }

        if arg0 == arg1 && arg1 != UNUSED {
            if let Some(idx) = self.try_same_index_simplify(op, value) {
                return idx;
            }
        }

        let idx = self.num_variables;
        self.num_variables += 1;
        self.opcodes.push(op);
        self.arg_indices.push([arg0, arg1]);
        self.values.push(value);
        idx
    }

    /// Try to simplify a binary op where exactly one argument is a known constant.
    ///
    /// Identity patterns (`x + 0`, `x * 1`, etc.) return the original index
    /// whose value is correct. Absorbing patterns (`x * 0`) use
    /// `push_const(value)` to keep IEEE 754 signed zeros, and are guarded by
    /// `value == expected` (`NaN * 0 = NaN`, not `0`).
    #[inline(never)]
    fn try_algebraic_simplify(
        &mut self,
        op: OpCode,
        arg0: u32,
        arg1: u32,
        arg0_const: bool,
        arg1_const: bool,
        value: F,
    ) -> Option<u32> {
        let zero = F::zero();
        let one = F::one();
        let c0 = arg0_const.then(|| self.values[arg0 as usize]);
        let c1 = arg1_const.then(|| self.values[arg1 as usize]);
        match op {
            OpCode::Add => {
                if c1 == Some(zero) {
                    return Some(arg0);
                }
                if c0 == Some(zero) {
                    return Some(arg1);
                }
            }
            OpCode::Sub => {
                if c1 == Some(zero) {
                    return Some(arg0);
                }
            }
            OpCode::Mul => {
                if c1 == Some(one) {
                    return Some(arg0);
                }
                if c0 == Some(one) {
                    return Some(arg1);
                }
                if (c0 == Some(zero) || c1 == Some(zero)) && value == zero {
                    return Some(self.push_const(value));
                }
            }
            OpCode::Div => {
                if c1 == Some(one) {
                    return Some(arg0);
                }
            }
            _ => {}
        }
        None
    }

    /// Try to simplify a binary op where both arguments are the same index.
    ///
    /// `x - x → 0` is guarded (Inf - Inf = NaN, not 0).
    /// `x / x → 1` is guarded (0/0 = NaN, not 1).
    #[inline(never)]
    fn try_same_index_simplify(&mut self, op: OpCode, value: F) -> Option<u32> {
        match op {
            OpCode::Sub if value == F::zero() => Some(self.push_const(value)),
            OpCode::Div if value == F::one() => Some(self.push_const(value)),
            _ => None,
        }
    }

    /// Mark the dependent variables. Fixes the tape's output count.
    pub fn set_outputs(&mut self, indices: &[u32]) {
        self.output_indices = indices.to_vec();
    }

    /// Number of input variables.
    #[inline]
    pub fn num_inputs(&self) -> usize {
        self.num_inputs as usize
    }

    /// Number of output variables.
    #[inline]
    pub fn num_outputs(&self) -> usize {
        self.output_indices.len()
    }

    /// Number of tape entries (including inputs and constants).
    #[inline]
    pub fn num_ops(&self) -> usize {
        self.opcodes.len()
    }

    /// Output values at the point the tape was recorded (or last
    /// [`replay`](Self::replay)ed at).
    pub fn output_values(&self) -> Vec<F> {
        self.output_indices
            .iter()
            .map(|&idx| self.values[idx as usize])
            .collect()
    }

    /// Indices of all output entries in the tape buffer.
    #[inline]
    pub fn output_indices(&self) -> &[u32] {
        &self.output_indices
    }

    #[inline]
    pub fn state(&self) -> TapeState {
        self.state
    }

    /// Make every query validate the forward sweep it performs, failing with
    /// [`Error::NonFiniteIntermediate`] on the first NaN/Inf entry.
    pub fn set_check_for_nan(&mut self, check: bool) {
        self.check_for_nan = check;
    }

    #[inline]
    pub fn check_for_nan(&self) -> bool {
        self.check_for_nan
    }

    /// Slice view of all opcodes in the tape.
    #[inline]
    pub fn opcodes_slice(&self) -> &[OpCode] {
        &self.opcodes
    }

    /// Slice view of all argument index pairs `[arg0, arg1]`.
    #[inline]
    pub fn arg_indices_slice(&self) -> &[[u32; 2]] {
        &self.arg_indices
    }

    /// Slice view of all primal values in the tape.
    #[inline]
    pub fn values_slice(&self) -> &[F] {
        &self.values
    }

    /// Fail unless `x` has one entry per independent input.
    #[inline]
    pub(crate) fn check_inputs(&self, x: &[F]) -> Result<()> {
        if x.len() != self.num_inputs as usize {
            return Err(Error::DimensionMismatch {
                what: "tape inputs",
                expected: self.num_inputs as usize,
                found: x.len(),
            });
        }
        Ok(())
    }

    /// Resolve an output position to its tape index.
    #[inline]
    pub(crate) fn output_entry(&self, output: usize) -> Result<u32> {
        self.output_indices
            .get(output)
            .copied()
            .ok_or(Error::DimensionMismatch {
                what: "output index",
                expected: self.output_indices.len(),
                found: output,
            })
    }
}

impl<F: Float> Default for BytecodeTape<F> {
    fn default() -> Self {
        Self::new()
    }
}
