use std::fmt::{Debug, Display};

use num_traits::{Float as NumFloat, FloatConst, FromPrimitive};

use crate::dual::Dual;
use crate::scalar::Real;
use crate::special;

/// Marker trait for base floating-point types (`f32`, `f64`).
///
/// Bundles the numeric and utility traits needed throughout mvnad, plus the
/// special functions the `Lgamma` opcode needs on the primal type.
/// Only primitive float types implement this; AD wrapper types do not.
pub trait Float:
    NumFloat
    + FloatConst
    + FromPrimitive
    + Real<Float = Self>
    + Copy
    + Send
    + Sync
    + Default
    + Debug
    + Display
    + 'static
{
    /// Polygamma function `ψ⁽ⁿ⁾(x)` for `n ∈ {0, 1, 2}`.
    fn polygamma(self, n: u32) -> Self;
}

impl Float for f32 {
    #[inline]
    fn polygamma(self, n: u32) -> Self {
        special::polygamma(n, self as f64) as f32
    }
}

impl Float for f64 {
    #[inline]
    fn polygamma(self, n: u32) -> Self {
        special::polygamma(n, self)
    }
}

/// Zero test that sees every lane of a tangent-carrying number.
///
/// The reverse tangent sweep skips entries whose adjoint is zero; for
/// [`Dual`] the skip is only valid when the tangent is zero too.
pub trait IsAllZero {
    fn is_all_zero(&self) -> bool;
}

impl IsAllZero for f32 {
    #[inline]
    fn is_all_zero(&self) -> bool {
        *self == 0.0
    }
}

impl IsAllZero for f64 {
    #[inline]
    fn is_all_zero(&self) -> bool {
        *self == 0.0
    }
}

impl<F: Float> IsAllZero for Dual<F> {
    #[inline]
    fn is_all_zero(&self) -> bool {
        self.re == F::zero() && self.eps == F::zero()
    }
}
