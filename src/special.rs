//! Special functions: the polygamma family behind the `Lgamma` opcode, the
//! multivariate log-gamma function, and the finiteness predicate used by
//! input checks and tape validation.

use crate::scalar::Scalar;

/// `ln(√π)`.
pub const LN_SQRT_PI: f64 = 0.572_364_942_924_700_1;

/// Below this argument the polygamma recurrence shifts `x` upward before the
/// asymptotic series is applied.
const ASYMPTOTIC_THRESHOLD: f64 = 10.0;

/// Polygamma function `ψ⁽ⁿ⁾(x)` for `n ∈ {0, 1, 2}` (digamma, trigamma, tetragamma).
///
/// Uses the upward recurrence `ψ⁽ⁿ⁾(x) = ψ⁽ⁿ⁾(x+1) − (−1)ⁿ n! / xⁿ⁺¹` until
/// `x ≥ 10`, then the asymptotic expansion in Bernoulli numbers. Negative
/// arguments are first reflected to `1 − x`:
///
/// - `ψ(x) = ψ(1−x) − π·cot(πx)`
/// - `ψ′(x) = −ψ′(1−x) + π²/sin²(πx)`
/// - `ψ″(x) = ψ″(1−x) − 2π³·cot(πx)/sin²(πx)`
///
/// Poles at the non-positive integers give `+∞` for the even-signed trigamma
/// and `NaN` otherwise.
///
/// # Panics
///
/// Panics if `n > 2`.
pub fn polygamma(n: u32, x: f64) -> f64 {
    assert!(n <= 2, "polygamma order {n} not supported");
    if x.is_nan() {
        return f64::NAN;
    }
    if x.is_infinite() {
        return match (n, x > 0.0) {
            (0, true) => f64::INFINITY,
            (_, true) => 0.0,
            _ => f64::NAN,
        };
    }
    if x <= 0.0 && x == x.floor() {
        return if n == 1 { f64::INFINITY } else { f64::NAN };
    }
    if x < 0.0 {
        return reflect(n, x);
    }

    let mut x = x;
    let mut acc = 0.0;
    while x < ASYMPTOTIC_THRESHOLD {
        match n {
            0 => acc -= 1.0 / x,
            1 => acc += 1.0 / (x * x),
            _ => acc -= 2.0 / (x * x * x),
        }
        x += 1.0;
    }

    let inv = 1.0 / x;
    let inv2 = inv * inv;
    let series = match n {
        0 => {
            x.ln() - 0.5 * inv
                - inv2
                    * (1.0 / 12.0
                        - inv2
                            * (1.0 / 120.0
                                - inv2 * (1.0 / 252.0 - inv2 * (1.0 / 240.0 - inv2 / 132.0))))
        }
        1 => {
            inv + 0.5 * inv2
                + inv
                    * inv2
                    * (1.0 / 6.0
                        - inv2 * (1.0 / 30.0 - inv2 * (1.0 / 42.0 - inv2 * (1.0 / 30.0 - inv2 * 5.0 / 66.0))))
        }
        _ => {
            -inv2
                - inv * inv2
                - inv2
                    * inv2
                    * (0.5 - inv2 * (1.0 / 6.0 - inv2 * (1.0 / 6.0 - inv2 * (0.3 - inv2 * 5.0 / 6.0))))
        }
    };
    acc + series
}

fn reflect(n: u32, x: f64) -> f64 {
    use std::f64::consts::PI;

    // Reduce to r ∈ [−½, ½]; cot(πx) and sin²(πx) have period 1 in x.
    let r = x - x.round();
    let (sin, cos) = (PI * r).sin_cos();
    let cot = cos / sin;
    let csc2 = 1.0 / (sin * sin);
    let mirrored = polygamma(n, 1.0 - x);
    match n {
        0 => mirrored - PI * cot,
        1 => -mirrored + PI * PI * csc2,
        _ => mirrored - 2.0 * PI * PI * PI * cot * csc2,
    }
}

/// Multivariate log-gamma function
///
/// `log Γ_k(v) = ¼·k·(k−1)·log π + Σ_{j=1..k} lgamma(v + (1−j)/2)`,
/// written against [`Scalar`] so it can be recorded on a tape. Arguments that
/// land on a non-positive integer yield `+∞`; a recorded tape catches that in
/// [`validate`](crate::BytecodeTape::validate).
pub fn log_mvgamma<T: Scalar>(v: T, k: usize) -> T {
    let kf = k as f64;
    let mut res = T::lit(0.5 * kf * (kf - 1.0) * LN_SQRT_PI);
    for j in 1..=k {
        res += (v + T::lit(0.5 * (1.0 - j as f64))).lgamma();
    }
    res
}

/// `true` iff `|x|` does not exceed the largest representable value and `x`
/// equals itself, i.e. excludes `NaN` and `±∞`.
#[inline]
pub fn is_finite<T: Scalar>(x: &T) -> bool {
    let v = x.value();
    let max: T::Float = num_traits::Float::max_value();
    num_traits::Float::abs(v) <= max && !num_traits::Float::is_nan(v)
}
