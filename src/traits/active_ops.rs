//! `std::ops` implementations for [`Active<F>`].
//!
//! Each operator records an opcode to the active bytecode tape unless both
//! operands are constants.

use std::cmp::Ordering;
use std::ops::{Add, AddAssign, Div, DivAssign, Mul, MulAssign, Neg, Sub, SubAssign};

use crate::active::{record_binary, record_unary, Active};
use crate::bytecode_tape::TapeThreadLocal;
use crate::float::Float;
use crate::opcode::OpCode;

// ──────────────────────────────────────────────
//  Active<F> ↔ Active<F> operators
// ──────────────────────────────────────────────

impl<F: TapeThreadLocal> Add for Active<F> {
    type Output = Self;
    #[inline]
    fn add(self, rhs: Self) -> Self {
        record_binary(self, rhs, OpCode::Add, self.value + rhs.value)
    }
}

impl<F: TapeThreadLocal> Sub for Active<F> {
    type Output = Self;
    #[inline]
    fn sub(self, rhs: Self) -> Self {
        record_binary(self, rhs, OpCode::Sub, self.value - rhs.value)
    }
}

impl<F: TapeThreadLocal> Mul for Active<F> {
    type Output = Self;
    #[inline]
    fn mul(self, rhs: Self) -> Self {
        record_binary(self, rhs, OpCode::Mul, self.value * rhs.value)
    }
}

impl<F: TapeThreadLocal> Div for Active<F> {
    type Output = Self;
    #[inline]
    fn div(self, rhs: Self) -> Self {
        record_binary(self, rhs, OpCode::Div, self.value / rhs.value)
    }
}

impl<F: TapeThreadLocal> Neg for Active<F> {
    type Output = Self;
    #[inline]
    fn neg(self) -> Self {
        record_unary(self, OpCode::Neg, -self.value)
    }
}

// Assign variants delegate to the binary ops.
impl<F: TapeThreadLocal> AddAssign for Active<F> {
    #[inline]
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl<F: TapeThreadLocal> SubAssign for Active<F> {
    #[inline]
    fn sub_assign(&mut self, rhs: Self) {
        *self = *self - rhs;
    }
}

impl<F: TapeThreadLocal> MulAssign for Active<F> {
    #[inline]
    fn mul_assign(&mut self, rhs: Self) {
        *self = *self * rhs;
    }
}

impl<F: TapeThreadLocal> DivAssign for Active<F> {
    #[inline]
    fn div_assign(&mut self, rhs: Self) {
        *self = *self / rhs;
    }
}

// ──────────────────────────────────────────────
//  Mixed ops: Active<F> with primitive floats
// ──────────────────────────────────────────────

// The primitive is treated as an untracked constant and promoted to a `Const`
// entry only if the other operand is tracked.
macro_rules! impl_active_scalar_ops {
    ($f:ty) => {
        impl Add<$f> for Active<$f> {
            type Output = Active<$f>;
            #[inline]
            fn add(self, rhs: $f) -> Active<$f> {
                self + Active::constant(rhs)
            }
        }

        impl Add<Active<$f>> for $f {
            type Output = Active<$f>;
            #[inline]
            fn add(self, rhs: Active<$f>) -> Active<$f> {
                Active::constant(self) + rhs
            }
        }

        impl Sub<$f> for Active<$f> {
            type Output = Active<$f>;
            #[inline]
            fn sub(self, rhs: $f) -> Active<$f> {
                self - Active::constant(rhs)
            }
        }

        impl Sub<Active<$f>> for $f {
            type Output = Active<$f>;
            #[inline]
            fn sub(self, rhs: Active<$f>) -> Active<$f> {
                Active::constant(self) - rhs
            }
        }

        impl Mul<$f> for Active<$f> {
            type Output = Active<$f>;
            #[inline]
            fn mul(self, rhs: $f) -> Active<$f> {
                self * Active::constant(rhs)
            }
        }

        impl Mul<Active<$f>> for $f {
            type Output = Active<$f>;
            #[inline]
            fn mul(self, rhs: Active<$f>) -> Active<$f> {
                Active::constant(self) * rhs
            }
        }

        impl Div<$f> for Active<$f> {
            type Output = Active<$f>;
            #[inline]
            fn div(self, rhs: $f) -> Active<$f> {
                self / Active::constant(rhs)
            }
        }

        impl Div<Active<$f>> for $f {
            type Output = Active<$f>;
            #[inline]
            fn div(self, rhs: Active<$f>) -> Active<$f> {
                Active::constant(self) / rhs
            }
        }
    };
}

impl_active_scalar_ops!(f32);
impl_active_scalar_ops!(f64);

// Comparisons look at the primal value only; they are not recorded.
impl<F: Float> PartialEq for Active<F> {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl<F: Float> PartialOrd for Active<F> {
    #[inline]
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.value.partial_cmp(&other.value)
    }
}
