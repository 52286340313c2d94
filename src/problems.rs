//! Classic test problems used to validate the minimizers in this crate.
//!
//! Both functions take the point as an `ArrayView1<f64>` so they can be
//! handed straight to [`Minimizer::minimize`](crate::minimizer::Minimizer::minimize).
use ndarray::prelude::*;

/// Starting guess for Rosenbrock's function.
pub const ROSENBROCK_START: [f64; 2] = [-1.2, 1.0];

/// Starting guess for the Woods function.
pub const WOODS_START: [f64; 4] = [-3.0, -1.0, -3.0, -1.0];

/// Step shrink factor used for the Woods problem.
///
/// Hooke-Jeeves is sensitive to `rho` on this function: 0.5 converges to the
/// true minimum, 0.6 stalls on the way there and 0.8 does better again.
pub const RHO_WOODS: f64 = 0.6;

/// Rosenbrock's classic parabolic valley ("banana") function of two
/// variables. Global minimum f(1, 1) = 0.
///
/// # Panics
///
/// Panics if `x` has fewer than 2 elements.
pub fn rosenbrock(x: ArrayView1<f64>) -> f64 {
    let a = x[0];
    let b = x[1];
    let c = 100.0 * (b - a * a) * (b - a * a);
    c + (1.0 - a) * (1.0 - a)
}

/// The Woods function of four variables, as given by More, Garbow and
/// Hillstrom (TOMS algorithm 566). Global minimum f(1, 1, 1, 1) = 0.
///
/// # Panics
///
/// Panics if `x` has fewer than 4 elements.
pub fn woods(x: ArrayView1<f64>) -> f64 {
    let s1 = x[1] - x[0] * x[0];
    let s2 = 1.0 - x[0];
    let s3 = x[1] - 1.0;
    let t1 = x[3] - x[2] * x[2];
    let t2 = 1.0 - x[2];
    let t3 = x[3] - 1.0;
    let t4 = s3 + t3;
    let t5 = s3 - t3;

    100.0 * (s1 * s1) + s2 * s2 + 90.0 * (t1 * t1) + t2 * t2 + 10.0 * (t4 * t4) + t5 * t5 / 10.0
}
