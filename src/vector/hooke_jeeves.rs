//! This implementation of the Hooke-Jeeves direct search is based on
//!
//! Hooke, R. and Jeeves, T. A. "Direct Search" Solution of Numerical and
//! Statistical Problems. 1961. Journal of the ACM. 8:2, pp 212--229
//!
//! and on the Algol procedure of Kaupe, A. F. Algorithm 178: Direct Search.
//! 1963. Communications of the ACM. 6:6, pp 313--314.
//!
//! # Use case
//!
//! Hooke-Jeeves needs neither a gradient nor a hessian, only function
//! values. Around the current base point it tries each coordinate in turn
//! (the exploratory search, see [`best_nearby`]). Whenever that finds an
//! improvement the step taken is doubled along the same direction (a pattern
//! move) and explored again. When no improvement is found the step sizes are
//! shrunk by `rho`, and the search ends once the step length falls to
//! `epsilon` or below.
//!
//! The search only finds a local minimum, and the result can depend a lot
//! on `rho`.
//!
//! # Examples
//!
//! ```
//! # use hooke_jeeves::minimizer::Minimizer;
//! # use hooke_jeeves::problems::rosenbrock;
//! # use hooke_jeeves::vector::HookeJeevesBuilder;
//! # use ndarray::array;
//! let minimizer = HookeJeevesBuilder::default()
//!     .rho(0.5)
//!     .epsilon(1e-6)
//!     .itermax(5000)
//!     .build()
//!     .unwrap();
//! let args = array![-1.2, 1.0];
//! let res = minimizer.minimize(rosenbrock, args.view()).unwrap();
//! println!("res: {}", res.minimum);
//! assert!(res.converged());
//! assert!((res.minimum[0] - 1.0).abs() < 1e-4);
//! ```

use derive_builder::Builder;
use ndarray::prelude::*;
use ndarray::Zip;
use std::ops::ControlFlow;
use std::time::Instant;
use tracing::{debug, info, trace, warn};

use crate::error::{Error, Result};
use crate::minimizer::{Minimizer, OptimResult, RunStatus};
use crate::utils::{FunEvals, WrappedFunction};

/// The maximum number of variables a point may have.
pub const VARS: usize = 250;

#[derive(Builder, Debug, Clone, PartialEq)]
#[builder(build_fn(validate = "Self::validate"))]
/// A minimizer for a scalar function of one or more variables using the Hooke-Jeeves
/// pattern search.
pub struct HookeJeeves {
    /// Geometric shrink factor of the step sizes, in (0, 1). Larger values
    /// shrink more slowly, which is more thorough but needs more evaluations.
    #[builder(default = "0.5")]
    pub rho: f64,

    /// The step length at or below which the search is considered converged.
    #[builder(default = "1e-6")]
    pub epsilon: f64,

    /// The maximum number of outer iterations.
    #[builder(default = "5000")]
    pub itermax: usize,
}

impl HookeJeevesBuilder {
    fn validate(&self) -> std::result::Result<(), String> {
        if let Some(rho) = self.rho {
            check_rho(rho).map_err(|e| e.to_string())?;
        }
        if let Some(epsilon) = self.epsilon {
            check_epsilon(epsilon).map_err(|e| e.to_string())?;
        }
        Ok(())
    }
}

impl Default for HookeJeeves {
    fn default() -> Self {
        HookeJeeves {
            rho: 0.5,
            epsilon: 1e-6,
            itermax: 5000,
        }
    }
}

/// The state reported to an observer at the start of every outer iteration,
/// before exploring around `point`.
#[derive(Debug, Clone)]
pub struct Iteration<'a> {
    /// 1-based index of the iteration about to run.
    pub iteration: usize,
    /// Function evaluations performed so far.
    pub f_evals: usize,
    /// Function value at `point`.
    pub value: f64,
    /// The current base point.
    pub point: ArrayView1<'a, f64>,
}

fn check_rho(rho: f64) -> Result<()> {
    if rho.is_finite() && rho > 0.0 && rho < 1.0 {
        Ok(())
    } else {
        Err(Error::Rho(rho))
    }
}

fn check_epsilon(epsilon: f64) -> Result<()> {
    if epsilon.is_finite() && epsilon > 0.0 {
        Ok(())
    } else {
        Err(Error::Epsilon(epsilon))
    }
}

pub(crate) fn check_dimension(nvars: usize) -> Result<()> {
    if nvars == 0 || nvars > VARS {
        Err(Error::Dimension { nvars, max: VARS })
    } else {
        Ok(())
    }
}

/// The step sizes a search starting from `x0` begins with: `|x0[i] * rho|`,
/// or `rho` itself where that product is zero.
pub fn initial_steps(x0: ArrayView1<f64>, rho: f64) -> Array1<f64> {
    x0.mapv(|xi| {
        let step = (xi * rho).abs();
        if step == 0.0 {
            rho
        } else {
            step
        }
    })
}

/// Given a point, look for a better one nearby, one coordinate at a time.
///
/// Coordinate `i` is first moved by `delta[i]`; if that does not lower the
/// best value found so far the sign of `delta[i]` is flipped and the opposite
/// move is tried. A coordinate where neither move is strictly better keeps its
/// original value (and the flipped sign). On return `point` holds the explored
/// point and the returned value is its function value, which is never larger
/// than `prevbest`.
///
/// `prevbest` must be the function value at `point`. Every coordinate costs
/// one evaluation if the move along `delta[i]` improves and two otherwise.
///
/// # Panics
///
/// Panics if `delta` and `point` differ in length or have more than
/// [`VARS`] elements.
pub fn best_nearby<F>(
    mut delta: ArrayViewMut1<f64>,
    mut point: ArrayViewMut1<f64>,
    prevbest: f64,
    func: &mut WrappedFunction<'_, F>,
) -> f64
where
    F: Fn(ArrayView1<f64>) -> f64,
{
    let nvars = point.len();
    assert_eq!(delta.len(), nvars, "delta and point must have the same length");
    assert!(nvars <= VARS, "at most {} variables are supported, got {}", VARS, nvars);

    let mut minf = prevbest;
    let mut z = point.to_owned();

    for i in 0..nvars {
        z[i] = point[i] + delta[i];
        let ftmp = func.call(z.view());
        if ftmp < minf {
            minf = ftmp;
            continue;
        }

        delta[i] = -delta[i];
        z[i] = point[i] + delta[i];
        let ftmp = func.call(z.view());
        if ftmp < minf {
            minf = ftmp;
        } else {
            z[i] = point[i];
        }
    }

    point.assign(&z);
    minf
}

impl HookeJeeves {
    fn check(&self, nvars: usize) -> Result<()> {
        check_dimension(nvars)?;
        check_rho(self.rho)?;
        check_epsilon(self.epsilon)
    }

    /// Search for the value minimizing `func` starting from `x0`.
    ///
    /// `evals` is reset and then counts every evaluation of `func` made by
    /// this run. `observer` is called once per outer iteration before the
    /// exploratory search; returning `ControlFlow::Break(())` ends the run
    /// with [`RunStatus::Stopped`], keeping the best point found so far.
    ///
    /// Running out of iterations is not an error: check the returned status,
    /// or compare `iterations` with `itermax`.
    pub fn hooke<F, O>(
        &self,
        func: F,
        x0: ArrayView1<f64>,
        evals: &mut FunEvals,
        mut observer: O,
    ) -> Result<OptimResult>
    where
        F: Fn(ArrayView1<f64>) -> f64,
        O: FnMut(&Iteration<'_>) -> ControlFlow<()>,
    {
        self.check(x0.len())?;
        let start = Instant::now();
        let rho = self.rho;

        evals.reset();
        let mut func = WrappedFunction::new(func, evals);

        let mut xbefore = x0.to_owned();
        let mut newx = x0.to_owned();
        let mut delta = initial_steps(x0, rho);
        let mut steplength = rho;
        let mut iters = 0;
        let mut stopped = false;

        let mut fbefore = func.call(xbefore.view());

        while iters < self.itermax && steplength > self.epsilon {
            let record = Iteration {
                iteration: iters + 1,
                f_evals: func.num(),
                value: fbefore,
                point: xbefore.view(),
            };
            debug!(
                iteration = record.iteration,
                f_evals = record.f_evals,
                value = record.value,
                "starting iteration"
            );
            if observer(&record).is_break() {
                stopped = true;
                break;
            }
            iters += 1;

            newx.assign(&xbefore);
            let mut newf = best_nearby(delta.view_mut(), newx.view_mut(), fbefore, &mut func);

            // keep moving along the improving direction
            let mut keep = true;
            while newf < fbefore && keep {
                Zip::from(&mut delta)
                    .and(&mut xbefore)
                    .and(&mut newx)
                    .for_each(|d, xb, nx| {
                        *d = if *nx <= *xb { -d.abs() } else { d.abs() };
                        let tmp = *xb;
                        *xb = *nx;
                        *nx = *nx + *nx - tmp;
                    });

                fbefore = newf;
                newf = best_nearby(delta.view_mut(), newx.view_mut(), fbefore, &mut func);

                if newf >= fbefore {
                    break;
                }
                trace!(value = fbefore, improved = newf, "pattern move accepted");

                // an improvement without any real displacement is roundoff
                keep = newx
                    .iter()
                    .zip(xbefore.iter())
                    .zip(delta.iter())
                    .any(|((nx, xb), d)| (nx - xb).abs() > 0.5 * d.abs());
            }

            if steplength >= self.epsilon && newf >= fbefore {
                steplength *= rho;
                delta *= rho;
            }
        }

        let status = if stopped {
            RunStatus::Stopped
        } else if steplength <= self.epsilon {
            RunStatus::Converged
        } else {
            RunStatus::MaxIterReached
        };
        let f_evals = func.num();

        match status {
            RunStatus::MaxIterReached => warn!(
                iterations = iters,
                f_evals,
                value = fbefore,
                steplength,
                "iteration limit reached before convergence"
            ),
            _ => info!(
                iterations = iters,
                f_evals,
                value = fbefore,
                status = ?status,
                "hooke-jeeves finished"
            ),
        }

        Ok(OptimResult {
            runtime: start.elapsed(),
            f_evals,
            iterations: iters,
            restarts: 0,
            minimum: xbefore,
            minimum_value: fbefore,
            status,
        })
    }
}

impl Minimizer for HookeJeeves {
    fn minimize<F>(&self, func: F, x0: ArrayView1<f64>) -> Result<OptimResult>
    where
        F: Fn(ArrayView1<f64>) -> f64,
    {
        let mut evals = FunEvals::new();
        self.hooke(func, x0, &mut evals, |_| ControlFlow::Continue(()))
    }
}

#[cfg(test)]
mod tests {

    use super::*;
    use crate::problems::{rosenbrock, woods, RHO_WOODS, ROSENBROCK_START, WOODS_START};
    use float_cmp::approx_eq;
    use ndarray::array;
    use std::cell::Cell;
    use std::fmt;
    use std::sync::{Arc, Mutex};
    use tracing::field::{Field, Visit};
    use tracing::{Event, Subscriber};
    use tracing_subscriber::layer::{Context, Layer};
    use tracing_subscriber::prelude::*;

    fn sphere(x: ArrayView1<f64>) -> f64 {
        x.mapv(|xi| xi * xi).sum()
    }

    fn silent(_: &Iteration<'_>) -> ControlFlow<()> {
        ControlFlow::Continue(())
    }

    #[test]
    fn best_nearby_flips_failing_direction() {
        let mut evals = FunEvals::new();
        let mut func = WrappedFunction::new(sphere, &mut evals);
        let mut point = array![1.0, -1.0];
        let mut delta = array![-0.5, -0.5];

        let f = best_nearby(delta.view_mut(), point.view_mut(), 2.0, &mut func);

        assert_eq!(f, 0.5);
        assert_eq!(point, array![0.5, -0.5]);
        assert_eq!(delta, array![-0.5, 0.5]);
        // first coordinate improved on the first try, second needed both
        assert_eq!(func.num(), 3);
    }

    #[test]
    fn best_nearby_plateau_keeps_point() {
        let mut evals = FunEvals::new();
        let mut func = WrappedFunction::new(|_: ArrayView1<f64>| 1.0, &mut evals);
        let mut point = array![0.0, 3.0, -2.0];
        let mut delta = array![0.1, 0.2, -0.3];

        let f = best_nearby(delta.view_mut(), point.view_mut(), 1.0, &mut func);

        assert_eq!(f, 1.0);
        assert_eq!(point, array![0.0, 3.0, -2.0]);
        assert_eq!(delta, array![-0.1, -0.2, 0.3]);
        assert_eq!(func.num(), 6);
    }

    #[test]
    fn best_nearby_never_worsens() {
        let mut evals = FunEvals::new();
        let mut func = WrappedFunction::new(rosenbrock, &mut evals);
        let cases = [
            (-1.2, 1.0, 0.6),
            (1.0, 1.0, 0.5),
            (0.3, -2.0, 1e-3),
            (5.0, 25.0, 2.0),
        ];
        for &(x, y, step) in &cases {
            let mut point = array![x, y];
            let mut delta = array![step, -step];
            let prevbest = rosenbrock(point.view());
            let f = best_nearby(delta.view_mut(), point.view_mut(), prevbest, &mut func);
            assert!(f <= prevbest);
            assert_eq!(f, rosenbrock(point.view()));
        }
    }

    #[test]
    fn best_nearby_zero_delta_is_idempotent() {
        let mut evals = FunEvals::new();
        let mut func = WrappedFunction::new(woods, &mut evals);
        let mut point = array![0.5, -0.5, 1.5, 2.0];
        let mut delta = array![0.25, 0.25, 0.25, 0.25];
        let prevbest = woods(point.view());
        let f = best_nearby(delta.view_mut(), point.view_mut(), prevbest, &mut func);

        let explored = point.clone();
        let mut zero = Array1::<f64>::zeros(4);
        let again = best_nearby(zero.view_mut(), point.view_mut(), f, &mut func);
        assert_eq!(again, f);
        assert_eq!(point, explored);
    }

    #[test]
    #[should_panic]
    fn best_nearby_rejects_mismatched_lengths() {
        let mut evals = FunEvals::new();
        let mut func = WrappedFunction::new(sphere, &mut evals);
        let mut point = array![1.0, 2.0];
        let mut delta = array![1.0];
        best_nearby(delta.view_mut(), point.view_mut(), 5.0, &mut func);
    }

    #[test]
    fn zero_coordinate_starts_with_rho() {
        let steps = initial_steps(array![0.0, 2.0, -3.0].view(), 0.5);
        assert_eq!(steps, array![0.5, 1.0, 1.5]);
    }

    #[test]
    fn rosenbrock_converges() {
        let minimizer = HookeJeevesBuilder::default()
            .rho(0.5)
            .epsilon(1e-6)
            .itermax(5000)
            .build()
            .unwrap();
        let res = minimizer
            .minimize(rosenbrock, aview1(&ROSENBROCK_START))
            .unwrap();
        println!("res: {:?}", res);
        assert_eq!(res.status, RunStatus::Converged);
        assert!(res.iterations < 5000);
        assert!(approx_eq!(f64, res.minimum[0], 1.0, epsilon = 1e-4));
        assert!(approx_eq!(f64, res.minimum[1], 1.0, epsilon = 1e-4));
        assert!(res.minimum_value < 1e-4);
        assert_eq!(res.minimum_value, rosenbrock(res.minimum.view()));
    }

    #[test]
    fn woods_with_half_rho() {
        let minimizer = HookeJeevesBuilder::default().rho(0.5).build().unwrap();
        let res = minimizer.minimize(woods, aview1(&WOODS_START)).unwrap();
        assert!(res.converged());
        for &xi in res.minimum.iter() {
            assert!(approx_eq!(f64, xi, 1.0, epsilon = 1e-3));
        }
        assert!(res.minimum_value < 1e-4);
    }

    #[test]
    fn woods_reference_rho_terminates() {
        let minimizer = HookeJeevesBuilder::default().rho(RHO_WOODS).build().unwrap();
        let res = minimizer.minimize(woods, aview1(&WOODS_START)).unwrap();
        assert!(res.iterations <= 5000);
        assert!(res.minimum_value < woods(aview1(&WOODS_START)));
        assert_eq!(res.minimum_value, woods(res.minimum.view()));
    }

    #[test]
    fn values_never_increase_between_iterations() {
        let minimizer = HookeJeeves::default();
        let mut values = Vec::new();
        let mut evals = FunEvals::new();
        let res = minimizer
            .hooke(rosenbrock, aview1(&ROSENBROCK_START), &mut evals, |it| {
                values.push(it.value);
                ControlFlow::Continue(())
            })
            .unwrap();
        assert_eq!(values.len(), res.iterations);
        assert!(values.windows(2).all(|w| w[1] <= w[0]));
        assert!(res.minimum_value <= values[values.len() - 1]);
    }

    /// Collects `(value, improved)` of every "pattern move accepted" event.
    #[derive(Clone, Default)]
    struct PatternMoves(Arc<Mutex<Vec<(f64, f64)>>>);

    #[derive(Default)]
    struct MoveFields {
        message: String,
        value: Option<f64>,
        improved: Option<f64>,
    }

    impl Visit for MoveFields {
        fn record_f64(&mut self, field: &Field, v: f64) {
            match field.name() {
                "value" => self.value = Some(v),
                "improved" => self.improved = Some(v),
                _ => {}
            }
        }

        fn record_debug(&mut self, field: &Field, v: &dyn fmt::Debug) {
            if field.name() == "message" {
                self.message = format!("{:?}", v);
            }
        }
    }

    impl<S: Subscriber> Layer<S> for PatternMoves {
        fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
            let mut fields = MoveFields::default();
            event.record(&mut fields);
            if fields.message == "pattern move accepted" {
                if let (Some(value), Some(improved)) = (fields.value, fields.improved) {
                    self.0.lock().unwrap().push((value, improved));
                }
            }
        }
    }

    #[test]
    fn pattern_move_events_report_improvements_only() {
        let moves = PatternMoves::default();
        let subscriber = tracing_subscriber::registry().with(moves.clone());
        let res = tracing::subscriber::with_default(subscriber, || {
            HookeJeeves::default()
                .minimize(rosenbrock, aview1(&ROSENBROCK_START))
                .unwrap()
        });
        assert!(res.converged());

        let moves = moves.0.lock().unwrap();
        println!("accepted pattern moves: {}", moves.len());
        assert!(!moves.is_empty());
        assert!(moves.iter().all(|(value, improved)| improved < value));
    }

    #[test]
    fn no_iterations_returns_start() {
        let minimizer = HookeJeevesBuilder::default().itermax(0).build().unwrap();
        let start = array![-1.2, 1.0];
        let res = minimizer.minimize(rosenbrock, start.view()).unwrap();
        assert_eq!(res.iterations, 0);
        assert_eq!(res.minimum, start);
        assert_eq!(res.f_evals, 1);
        assert_eq!(res.status, RunStatus::MaxIterReached);
    }

    #[test]
    fn iteration_cap_is_respected() {
        let minimizer = HookeJeevesBuilder::default().itermax(3).build().unwrap();
        let res = minimizer.minimize(woods, aview1(&WOODS_START)).unwrap();
        assert_eq!(res.iterations, 3);
        assert_eq!(res.status, RunStatus::MaxIterReached);
        assert!(!res.converged());
    }

    #[test]
    fn counts_every_evaluation() {
        let calls = Cell::new(0);
        let mut evals = FunEvals::new();
        evals.set(100);
        let res = HookeJeeves::default()
            .hooke(
                |x| {
                    calls.set(calls.get() + 1);
                    rosenbrock(x)
                },
                aview1(&ROSENBROCK_START),
                &mut evals,
                silent,
            )
            .unwrap();
        assert_eq!(res.f_evals, calls.get());
        assert_eq!(evals.get(), calls.get());
    }

    #[test]
    fn observer_sees_evaluation_count() {
        let mut seen = Vec::new();
        let mut evals = FunEvals::new();
        HookeJeeves::default()
            .hooke(sphere, array![2.0, -1.0, 0.0].view(), &mut evals, |it| {
                seen.push((it.iteration, it.f_evals));
                ControlFlow::Continue(())
            })
            .unwrap();
        assert_eq!(seen[0], (1, 1));
        assert!(seen.windows(2).all(|w| w[1].0 == w[0].0 + 1 && w[1].1 > w[0].1));
    }

    #[test]
    fn observer_can_stop_the_run() {
        let mut evals = FunEvals::new();
        let res = HookeJeeves::default()
            .hooke(rosenbrock, aview1(&ROSENBROCK_START), &mut evals, |it| {
                if it.iteration > 2 {
                    ControlFlow::Break(())
                } else {
                    ControlFlow::Continue(())
                }
            })
            .unwrap();
        assert_eq!(res.iterations, 2);
        assert_eq!(res.status, RunStatus::Stopped);
        assert!(res.minimum_value < rosenbrock(aview1(&ROSENBROCK_START)));
    }

    #[test]
    fn builder_rejects_degenerate_parameters() {
        assert!(HookeJeevesBuilder::default().rho(1.0).build().is_err());
        assert!(HookeJeevesBuilder::default().rho(1.5).build().is_err());
        assert!(HookeJeevesBuilder::default().rho(0.0).build().is_err());
        assert!(HookeJeevesBuilder::default().rho(f64::NAN).build().is_err());
        assert!(HookeJeevesBuilder::default().epsilon(0.0).build().is_err());
        assert!(HookeJeevesBuilder::default().epsilon(-1e-6).build().is_err());
        assert_eq!(HookeJeevesBuilder::default().build().unwrap(), HookeJeeves::default());
    }

    #[test]
    fn minimize_rechecks_parameters() {
        let mut minimizer = HookeJeeves::default();
        minimizer.rho = 2.0;
        let err = minimizer.minimize(sphere, array![1.0].view()).unwrap_err();
        assert_eq!(err, Error::Rho(2.0));

        minimizer.rho = 0.5;
        minimizer.epsilon = 0.0;
        let err = minimizer.minimize(sphere, array![1.0].view()).unwrap_err();
        assert_eq!(err, Error::Epsilon(0.0));
    }

    #[test]
    fn rejects_bad_dimensions() {
        let minimizer = HookeJeeves::default();
        let too_many = Array1::<f64>::zeros(VARS + 1);
        let err = minimizer.minimize(sphere, too_many.view()).unwrap_err();
        assert_eq!(err, Error::Dimension { nvars: VARS + 1, max: VARS });

        let empty = Array1::<f64>::zeros(0);
        let err = minimizer.minimize(sphere, empty.view()).unwrap_err();
        assert_eq!(err, Error::Dimension { nvars: 0, max: VARS });

        let largest = Array1::<f64>::ones(VARS);
        assert!(minimizer.minimize(sphere, largest.view()).is_ok());
    }
}
