//! Derivative-free minimization of a scalar function of several real
//! variables with the direct search method of Hooke and Jeeves, plus the
//! Nelder-Mead simplex method for comparison.
//!
//! The search needs nothing but function values, handles any objective of
//! the form `Fn(ArrayView1<f64>) -> f64` and works on up to
//! [`vector::VARS`] variables. There is no support for constraints.
//!
//! ```
//! use hooke_jeeves::minimizer::Minimizer;
//! use hooke_jeeves::problems::{woods, WOODS_START};
//! use hooke_jeeves::vector::HookeJeeves;
//! use ndarray::aview1;
//!
//! let minimizer = HookeJeeves { rho: 0.5, ..HookeJeeves::default() };
//! let res = minimizer.minimize(woods, aview1(&WOODS_START)).unwrap();
//! assert!(res.minimum_value < 1e-4);
//! ```
//!
//! Both [`vector::HookeJeeves`] and [`vector::NelderMead`] implement
//! [`minimizer::Minimizer`]. Use [`vector::HookeJeeves::hooke`] directly to
//! share an evaluation counter with the caller or to follow the search
//! iteration by iteration.

pub mod error;
pub mod minimizer;
pub mod problems;
pub mod utils;
pub mod vector;

pub use crate::error::{Error, Result};
