//! This module provides the base framework for all minimizers present in this crate, such as the
//! base trait and return type.
use ndarray::prelude::*;
use std::time::Duration;

use crate::error::Result;

/// Minimizer states at the end of the run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    /// The convergence criterion was met: the step length for Hooke-Jeeves, the spread
    /// of the simplex function values for Nelder-Mead.
    Converged,
    /// The iteration cap was exhausted before the step length converged.
    MaxIterReached,
    /// The function evaluation budget was used up before convergence.
    MaxFunReached,
    /// An observer asked the run to stop early.
    Stopped,
}

/// A minimization result, storing various details of the run and the final results.
#[derive(Debug, Clone, PartialEq)]
pub struct OptimResult {
    /// The runtime of the minimization according to the system clock.
    pub runtime: Duration,
    /// The number of function evaluations performed, including the initial one.
    pub f_evals: usize,
    /// The number of outer iterations run.
    pub iterations: usize,
    /// The number of times the search was restarted from its best point.
    pub restarts: usize,
    /// The parameter values with the smallest found function value.
    pub minimum: Array1<f64>,
    /// The function value at `minimum`.
    pub minimum_value: f64,
    /// Why the run ended.
    pub status: RunStatus,
}

impl OptimResult {
    /// Whether the run ended because its convergence criterion was met.
    pub fn converged(&self) -> bool {
        self.status == RunStatus::Converged
    }
}

/// A general minimizer trait.
pub trait Minimizer {
    /// Minimizes the given function returned scalar value by exploring the parameter space,
    /// starting from `x0`. Fails only if the run parameters are rejected up front.
    fn minimize<F: Fn(ArrayView1<f64>) -> f64>(
        &self,
        func: F,
        x0: ArrayView1<f64>,
    ) -> Result<OptimResult>;
}
