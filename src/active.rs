//! Tape-recording Active Scalar.
//!
//! [`Active<F>`] pairs a primal value with the index of the tape entry that
//! produced it. Operations on tracked values append opcodes to the thread's
//! active [`BytecodeTape`](crate::BytecodeTape); operations whose operands are
//! all constants are evaluated directly and never touch a tape, so constant
//! set-up work (such as factoring a fixed covariance) runs with or without an
//! open recording.

use std::fmt::{self, Display};

use crate::bytecode_tape::{self, TapeThreadLocal, CONSTANT};
use crate::float::Float;
use crate::opcode::{OpCode, UNUSED};
use crate::scalar::Scalar;

/// Tape-recording Active Scalar.
///
/// `Copy`, 12 bytes for `f64`.
#[derive(Clone, Copy, Debug)]
pub struct Active<F: Float> {
    pub(crate) value: F,
    pub(crate) index: u32,
}

impl<F: Float> Active<F> {
    /// Create a constant (not tracked on tape).
    #[inline]
    pub fn constant(value: F) -> Self {
        Active {
            value,
            index: CONSTANT,
        }
    }

    /// Create from a tape allocation (internal use).
    #[inline]
    pub(crate) fn from_tape(value: F, index: u32) -> Self {
        Active { value, index }
    }

    /// Get the tape index ([`CONSTANT`] for untracked values).
    #[inline]
    pub fn index(&self) -> u32 {
        self.index
    }

    /// Whether this value depends on a recorded input.
    #[inline]
    pub fn is_tracked(&self) -> bool {
        self.index != CONSTANT
    }

    /// Primal value.
    #[inline]
    pub fn value(&self) -> F {
        self.value
    }
}

/// Record a unary op. A constant operand yields a constant result.
#[inline]
pub(crate) fn record_unary<F: TapeThreadLocal>(x: Active<F>, op: OpCode, value: F) -> Active<F> {
    if x.index == CONSTANT {
        return Active::constant(value);
    }
    let index = bytecode_tape::with_active_tape(|t| t.push_op(op, x.index, UNUSED, value));
    Active { value, index }
}

/// Record a binary op, promoting a constant operand to a `Const` entry.
/// Two constant operands yield a constant result.
#[inline]
pub(crate) fn record_binary<F: TapeThreadLocal>(
    lhs: Active<F>,
    rhs: Active<F>,
    op: OpCode,
    value: F,
) -> Active<F> {
    if lhs.index == CONSTANT && rhs.index == CONSTANT {
        return Active::constant(value);
    }
    let index = bytecode_tape::with_active_tape(|t| {
        let li = if lhs.index == CONSTANT {
            t.push_const(lhs.value)
        } else {
            lhs.index
        };
        let ri = if rhs.index == CONSTANT {
            t.push_const(rhs.value)
        } else {
            rhs.index
        };
        t.push_op(op, li, ri, value)
    });
    Active { value, index }
}

impl<F: TapeThreadLocal> Active<F> {
    #[inline]
    pub fn sqrt(self) -> Self {
        record_unary(self, OpCode::Sqrt, num_traits::Float::sqrt(self.value))
    }

    #[inline]
    pub fn exp(self) -> Self {
        record_unary(self, OpCode::Exp, num_traits::Float::exp(self.value))
    }

    #[inline]
    pub fn ln(self) -> Self {
        record_unary(self, OpCode::Ln, num_traits::Float::ln(self.value))
    }

    #[inline]
    pub fn abs(self) -> Self {
        record_unary(self, OpCode::Abs, num_traits::Float::abs(self.value))
    }

    #[inline]
    pub fn recip(self) -> Self {
        record_unary(self, OpCode::Recip, num_traits::Float::recip(self.value))
    }

    #[inline]
    pub fn lgamma(self) -> Self {
        record_unary(self, OpCode::Lgamma, Scalar::lgamma(self.value))
    }
}

impl<F: Float> Display for Active<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value)
    }
}

impl<F: Float> Default for Active<F> {
    fn default() -> Self {
        Active::constant(F::zero())
    }
}
