use std::fmt::{self, Display};

use crate::scalar::Scalar;
use crate::Float;

/// Forward-mode dual number: a value paired with its tangent (derivative).
///
/// `Dual { re, eps }` represents `re + eps·ε` where `ε² = 0`. The tape's
/// second-order sweeps run the opcode evaluators on `Dual<F>` to carry a
/// Hessian direction through the reverse pass.
#[derive(Clone, Copy, Debug, Default)]
pub struct Dual<F: Float> {
    /// Primal (real) value.
    pub re: F,
    /// Tangent (derivative) value.
    pub eps: F,
}

impl<F: Float> Display for Dual<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} + {}ε", self.re, self.eps)
    }
}

impl<F: Float> Dual<F> {
    /// Create a new dual number.
    #[inline]
    pub fn new(re: F, eps: F) -> Self {
        Dual { re, eps }
    }

    /// Create a constant (zero derivative).
    #[inline]
    pub fn constant(re: F) -> Self {
        Dual { re, eps: F::zero() }
    }

    /// Create a variable (unit derivative) for differentiation.
    #[inline]
    pub fn variable(re: F) -> Self {
        Dual { re, eps: F::one() }
    }

    /// Apply the chain rule: given `f(self.re)` and `f'(self.re)`, produce the dual result.
    #[inline]
    fn chain(self, f_val: F, f_deriv: F) -> Self {
        Dual {
            re: f_val,
            eps: self.eps * f_deriv,
        }
    }

    #[inline]
    pub fn recip(self) -> Self {
        let inv = F::one() / self.re;
        self.chain(inv, -inv * inv)
    }

    #[inline]
    pub fn sqrt(self) -> Self {
        let s = num_traits::Float::sqrt(self.re);
        let two = F::one() + F::one();
        self.chain(s, F::one() / (two * s))
    }

    #[inline]
    pub fn exp(self) -> Self {
        let e = num_traits::Float::exp(self.re);
        self.chain(e, e)
    }

    #[inline]
    pub fn ln(self) -> Self {
        self.chain(num_traits::Float::ln(self.re), F::one() / self.re)
    }

    #[inline]
    pub fn abs(self) -> Self {
        self.chain(
            num_traits::Float::abs(self.re),
            num_traits::Float::signum(self.re),
        )
    }

    // ── Gamma family ──

    #[inline]
    pub fn lgamma(self) -> Self {
        self.chain(Scalar::lgamma(self.re), self.re.polygamma(0))
    }

    #[inline]
    pub fn digamma(self) -> Self {
        self.chain(self.re.polygamma(0), self.re.polygamma(1))
    }

    #[inline]
    pub fn trigamma(self) -> Self {
        self.chain(self.re.polygamma(1), self.re.polygamma(2))
    }
}
