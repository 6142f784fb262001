//! Bytecode opcodes for the bytecode tape.
//!
//! Each opcode represents an elementary operation. The [`eval_forward`] and
//! [`reverse_partials`] functions evaluate / differentiate a single opcode.
//! Both are generic over [`Real`] so the second-order sweeps can run them on
//! [`Dual<F>`](crate::Dual).

use crate::scalar::Real;

/// Sentinel used in `arg_indices[1]` for unary ops (the second argument slot is unused).
pub const UNUSED: u32 = u32::MAX;

/// Elementary operation codes for the bytecode tape.
///
/// Binary ops use both `arg_indices` slots; unary ops use slot 0 only
/// (slot 1 = [`UNUSED`]).
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum OpCode {
    // ── Structural ──
    /// Input variable (leaf node).
    Input,
    /// Scalar constant.
    Const,

    // ── Binary arithmetic ──
    Add,
    Sub,
    Mul,
    Div,

    // ── Unary ──
    Neg,
    Recip,
    Sqrt,
    Exp,
    Ln,
    Abs,
    /// `ln|Γ(a)|`; partials via digamma, second order via trigamma.
    Lgamma,
}

impl OpCode {
    /// Whether `op(a, b) == op(b, a)`; used to canonicalize CSE keys.
    #[inline]
    pub fn is_commutative(self) -> bool {
        matches!(self, OpCode::Add | OpCode::Mul)
    }

    /// Whether the opcode reads `arg_indices[1]`.
    #[inline]
    pub fn is_binary(self) -> bool {
        matches!(self, OpCode::Add | OpCode::Sub | OpCode::Mul | OpCode::Div)
    }
}

/// Evaluate a single opcode in the forward direction.
///
/// For binary ops, `a` and `b` are the two operand values.
/// For unary ops, `a` is the operand value and `b` is ignored.
#[inline]
pub fn eval_forward<T: Real>(op: OpCode, a: T, b: T) -> T {
    match op {
        OpCode::Input | OpCode::Const => {
            // values are already set during tape setup
            unreachable!("Input/Const should not be re-evaluated via eval_forward")
        }

        OpCode::Add => a + b,
        OpCode::Sub => a - b,
        OpCode::Mul => a * b,
        OpCode::Div => a / b,

        OpCode::Neg => -a,
        OpCode::Recip => a.recip(),
        OpCode::Sqrt => a.sqrt(),
        OpCode::Exp => a.exp(),
        OpCode::Ln => a.ln(),
        OpCode::Abs => a.abs(),
        OpCode::Lgamma => a.lgamma(),
    }
}

/// Compute reverse-mode partial derivatives for a single opcode.
///
/// Returns `(∂result/∂arg0, ∂result/∂arg1)`.
/// For unary ops the second partial is zero.
///
/// `a`, `b` are the operand values (at recording or re-evaluation time).
/// `r` is the result value.
#[inline]
pub fn reverse_partials<T: Real>(op: OpCode, a: T, b: T, r: T) -> (T, T) {
    let zero = T::lit(0.0);
    let one = T::lit(1.0);
    match op {
        OpCode::Input | OpCode::Const => (zero, zero),

        OpCode::Add => (one, one),
        OpCode::Sub => (one, -one),
        OpCode::Mul => (b, a),
        OpCode::Div => {
            let inv = one / b;
            (inv, -a * inv * inv)
        }

        OpCode::Neg => (-one, zero),
        OpCode::Recip => {
            // d/da (1/a) = -1/a²
            let inv = one / a;
            (-inv * inv, zero)
        }
        OpCode::Sqrt => (one / (T::lit(2.0) * r), zero),
        OpCode::Exp => (r, zero), // d/da e^a = e^a = r
        OpCode::Ln => (one / a, zero),
        OpCode::Abs => (a.signum(), zero),
        OpCode::Lgamma => (a.digamma(), zero),
    }
}
