//! Errors reported before a minimization run starts.
use thiserror::Error;

/// Rejected run parameters. A run that starts never fails; exhausting the
/// iteration cap is reported through [`RunStatus`](crate::minimizer::RunStatus).
#[derive(Debug, Error, Clone, Copy, PartialEq)]
pub enum Error {
    /// The point has no coordinates or more than the supported maximum.
    #[error("number of variables must be between 1 and {max}, got {nvars}")]
    Dimension { nvars: usize, max: usize },

    /// The step shrink factor must lie strictly between 0 and 1.
    #[error("rho must be finite and in (0, 1), got {0}")]
    Rho(f64),

    /// The minimum step length must be positive.
    #[error("epsilon must be finite and positive, got {0}")]
    Epsilon(f64),

    /// The variance limit of the simplex function values must be positive.
    #[error("reqmin must be finite and positive, got {0}")]
    Reqmin(f64),

    /// The convergence check interval must be at least one iteration.
    #[error("konvge must be at least 1")]
    Konvge,

    /// The initial simplex steps do not match the number of variables.
    #[error("expected {expected} initial steps, got {got}")]
    Step { expected: usize, got: usize },
}

pub type Result<T> = std::result::Result<T, Error>;
