//! The [`Scalar`] capability trait for writing AD-generic numeric code.
//!
//! Functions written as `fn f<T: Scalar>(x: T) -> T` work transparently with plain
//! `f64`, `Dual<f64>`, and the tape-recording `Active<f64>`. The log-density
//! kernel, the Cholesky factorizations and [`log_mvgamma`](crate::log_mvgamma)
//! are written once against this trait and run both for direct evaluation and
//! for recording.

use std::fmt::{Debug, Display};
use std::ops::{Add, AddAssign, Div, DivAssign, Mul, MulAssign, Neg, Sub, SubAssign};

use crate::active::Active;
use crate::bytecode_tape::TapeThreadLocal;
use crate::dual::Dual;
use crate::float::{Float, IsAllZero};

/// The central trait for AD-generic numeric code.
///
/// Provides arithmetic, comparison (on the primal value), and the handful of
/// elementary functions the Gaussian kernel needs.
pub trait Scalar:
    Copy
    + Default
    + Debug
    + Display
    + PartialEq
    + PartialOrd
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<Output = Self>
    + Div<Output = Self>
    + Neg<Output = Self>
    + AddAssign
    + SubAssign
    + MulAssign
    + DivAssign
    + 'static
{
    /// The underlying primitive float type.
    type Float: Float;

    /// Lift a plain float to this scalar (constant, zero derivative).
    fn from_f(val: Self::Float) -> Self;

    /// Extract the primal value.
    fn value(&self) -> Self::Float;

    /// Lift an `f64` literal (constant).
    fn lit(val: f64) -> Self;

    fn sqrt(self) -> Self;
    fn exp(self) -> Self;
    fn ln(self) -> Self;
    fn abs(self) -> Self;
    fn recip(self) -> Self;
    /// Natural log of the absolute value of the gamma function.
    fn lgamma(self) -> Self;
}

/// Scalars the opcode evaluators can run on: the primal floats and the
/// tangent-carrying [`Dual`] used by the second-order sweeps.
///
/// Adds the derivatives of `lgamma` that the reverse partials need.
pub trait Real: Scalar + IsAllZero {
    fn digamma(self) -> Self;
    fn trigamma(self) -> Self;
    fn signum(self) -> Self;
}

macro_rules! impl_primitive_scalar {
    ($f:ty, $lgamma:path) => {
        impl Scalar for $f {
            type Float = $f;

            #[inline]
            fn from_f(val: $f) -> Self {
                val
            }

            #[inline]
            fn value(&self) -> $f {
                *self
            }

            #[inline]
            fn lit(val: f64) -> Self {
                val as $f
            }

            #[inline]
            fn sqrt(self) -> Self {
                <$f>::sqrt(self)
            }

            #[inline]
            fn exp(self) -> Self {
                <$f>::exp(self)
            }

            #[inline]
            fn ln(self) -> Self {
                <$f>::ln(self)
            }

            #[inline]
            fn abs(self) -> Self {
                <$f>::abs(self)
            }

            #[inline]
            fn recip(self) -> Self {
                <$f>::recip(self)
            }

            #[inline]
            fn lgamma(self) -> Self {
                $lgamma(self)
            }
        }

        impl Real for $f {
            #[inline]
            fn digamma(self) -> Self {
                Float::polygamma(self, 0)
            }

            #[inline]
            fn trigamma(self) -> Self {
                Float::polygamma(self, 1)
            }

            #[inline]
            fn signum(self) -> Self {
                <$f>::signum(self)
            }
        }
    };
}

impl_primitive_scalar!(f32, libm::lgammaf);
impl_primitive_scalar!(f64, libm::lgamma);

impl<F: Float> Scalar for Dual<F> {
    type Float = F;

    #[inline]
    fn from_f(val: F) -> Self {
        Dual::constant(val)
    }

    #[inline]
    fn value(&self) -> F {
        self.re
    }

    #[inline]
    fn lit(val: f64) -> Self {
        Dual::constant(F::lit(val))
    }

    #[inline]
    fn sqrt(self) -> Self {
        Dual::sqrt(self)
    }

    #[inline]
    fn exp(self) -> Self {
        Dual::exp(self)
    }

    #[inline]
    fn ln(self) -> Self {
        Dual::ln(self)
    }

    #[inline]
    fn abs(self) -> Self {
        Dual::abs(self)
    }

    #[inline]
    fn recip(self) -> Self {
        Dual::recip(self)
    }

    #[inline]
    fn lgamma(self) -> Self {
        Dual::lgamma(self)
    }
}

impl<F: Float> Real for Dual<F> {
    #[inline]
    fn digamma(self) -> Self {
        Dual::digamma(self)
    }

    #[inline]
    fn trigamma(self) -> Self {
        Dual::trigamma(self)
    }

    #[inline]
    fn signum(self) -> Self {
        Dual::constant(num_traits::Float::signum(self.re))
    }
}

impl<F: Float + TapeThreadLocal> Scalar for Active<F> {
    type Float = F;

    #[inline]
    fn from_f(val: F) -> Self {
        Active::constant(val)
    }

    #[inline]
    fn value(&self) -> F {
        self.value
    }

    #[inline]
    fn lit(val: f64) -> Self {
        Active::constant(F::lit(val))
    }

    #[inline]
    fn sqrt(self) -> Self {
        Active::sqrt(self)
    }

    #[inline]
    fn exp(self) -> Self {
        Active::exp(self)
    }

    #[inline]
    fn ln(self) -> Self {
        Active::ln(self)
    }

    #[inline]
    fn abs(self) -> Self {
        Active::abs(self)
    }

    #[inline]
    fn recip(self) -> Self {
        Active::recip(self)
    }

    #[inline]
    fn lgamma(self) -> Self {
        Active::lgamma(self)
    }
}
