//! Numerically stable log-cosh over complex pre-activations.
//!
//! The log-amplitude of the ansatz is a sum of `ln(cosh(theta_h))` terms over
//! hidden units. Pre-activations routinely reach magnitudes where `cosh`
//! overflows an `f64`, so the reduction never forms `cosh` directly. Instead
//! it uses the factorization
//!
//! ```text
//! cosh(x + iy) = cosh(x) * (cos(y) + i tanh(x) sin(y))
//! ```
//!
//! whose first factor has the closed-form stable logarithm
//! `|x| - ln 2 + ln(1 + e^(-2|x|))` and whose second factor has modulus
//! close to one.

use num_complex::Complex64;
use std::f64::consts::LN_2;

/// Stable `ln(cosh(x))` for real `x`.
#[inline]
#[must_use]
pub fn logcosh_real(x: f64) -> f64 {
    let x = x.abs();
    x + (-2.0 * x).exp().ln_1p() - LN_2
}

/// Stable `ln(cosh(z))` for complex `z`.
#[inline]
#[must_use]
pub fn logcosh(z: Complex64) -> Complex64 {
    let bounded = Complex64::new(z.im.cos(), z.re.tanh() * z.im.sin());
    Complex64::new(logcosh_real(z.re), 0.0) + bounded.ln()
}

/// Sum of `ln(cosh(theta_h))` over all hidden units.
#[must_use]
pub fn sum_logcosh(theta: &[Complex64]) -> Complex64 {
    theta
        .iter()
        .fold(Complex64::new(0.0, 0.0), |acc, &t| acc + logcosh(t))
}
