//! This implementation of Nelder-Mead follows
//!
//! O'Neill, R. Algorithm AS 47: Function Minimization Using a Simplex
//! Procedure. 1971. Applied Statistics. 20:3, pp 338--345
//!
//! with the later remarks of Chambers and Ertel (1974), Benyon (1976) and
//! Hill (1978). It does not fit a quadratic surface to check convergence.
//!
//! # Use case
//!
//! Like Hooke-Jeeves, Nelder-Mead only needs function values. It moves a
//! simplex of `n + 1` points through the parameter space by reflecting,
//! expanding and contracting its worst vertex, and shrinks the whole simplex
//! towards its best vertex when none of those help. Every `konvge`
//! iterations the spread of the function values over the simplex is compared
//! with `reqmin`. Once it is small enough, the best vertex is checked a
//! little along every axis; if any trial point is lower, the search restarts from
//! there with a small simplex.
//!
//! # Examples
//!
//! ```
//! # use hooke_jeeves::minimizer::Minimizer;
//! # use hooke_jeeves::problems::rosenbrock;
//! # use hooke_jeeves::vector::NelderMeadBuilder;
//! # use ndarray::array;
//! let minimizer = NelderMeadBuilder::default()
//!     .reqmin(1e-8)
//!     .step(array![1.0, 1.0])
//!     .konvge(10)
//!     .kcount(500)
//!     .build()
//!     .unwrap();
//! let args = array![-1.2, 1.0];
//! let res = minimizer.minimize(rosenbrock, args.view()).unwrap();
//! println!("res: {}", res.minimum);
//! assert!(res.converged());
//! assert!((res.minimum[0] - 1.0).abs() < 1e-2);
//! ```

use derive_builder::Builder;
use ndarray::prelude::*;
use std::time::Instant;
use tracing::{debug, info, warn};

use super::hooke_jeeves::check_dimension;
use crate::error::{Error, Result};
use crate::minimizer::{Minimizer, OptimResult, RunStatus};
use crate::utils::{FunEvals, WrappedFunction};

const REFLECTION: f64 = 1.0;
const EXPANSION: f64 = 2.0;
const CONTRACTION: f64 = 0.5;

/// Relative size of the local minimum check and of the restart simplex.
const EPS: f64 = 1e-3;

#[derive(Builder, Debug, Clone, PartialEq)]
#[builder(build_fn(validate = "Self::validate"))]
/// A minimizer for a scalar function of one or more variables using the Nelder-Mead algorithm.
pub struct NelderMead {
    /// Terminating limit for the sum of squared deviations of the function
    /// values over the simplex from their mean, per variable.
    #[builder(default = "1e-8")]
    pub reqmin: f64,

    /// Size and shape of the initial simplex: vertex `i` is the start point
    /// moved by `step[i]` along axis `i`. The relative magnitudes should
    /// reflect the units of the variables. Defaults to 1 along every axis.
    #[builder(default = "None")]
    #[builder(setter(into))]
    pub step: Option<Array1<f64>>,

    /// The convergence check is carried out every `konvge` iterations.
    #[builder(default = "10")]
    pub konvge: usize,

    /// The maximum number of function evaluations.
    #[builder(default = "500")]
    pub kcount: usize,
}

impl NelderMeadBuilder {
    fn validate(&self) -> std::result::Result<(), String> {
        if let Some(reqmin) = self.reqmin {
            check_reqmin(reqmin).map_err(|e| e.to_string())?;
        }
        if let Some(0) = self.konvge {
            return Err(Error::Konvge.to_string());
        }
        Ok(())
    }
}

impl Default for NelderMead {
    fn default() -> Self {
        NelderMead {
            reqmin: 1e-8,
            step: None,
            konvge: 10,
            kcount: 500,
        }
    }
}

fn check_reqmin(reqmin: f64) -> Result<()> {
    if reqmin.is_finite() && reqmin > 0.0 {
        Ok(())
    } else {
        Err(Error::Reqmin(reqmin))
    }
}

/// Index of the first smallest value.
fn lowest(values: &Array1<f64>) -> usize {
    let mut best = 0;
    for i in 1..values.len() {
        if values[i] < values[best] {
            best = i;
        }
    }
    best
}

/// Index of the first largest value.
fn highest(values: &Array1<f64>) -> usize {
    let mut worst = 0;
    for i in 1..values.len() {
        if values[worst] < values[i] {
            worst = i;
        }
    }
    worst
}

/// Centroid of all vertices but `skip`.
fn centroid(simplex: &Array2<f64>, skip: usize) -> Array1<f64> {
    let n = simplex.ncols();
    let mut sum = Array1::<f64>::zeros(n);
    for vertex in simplex.outer_iter() {
        sum += &vertex;
    }
    sum -= &simplex.row(skip);
    sum / n as f64
}

/// Sum of squared deviations of the values from their mean.
fn spread(values: &Array1<f64>) -> f64 {
    let mean = values.iter().sum::<f64>() / values.len() as f64;
    values.iter().map(|v| (v - mean) * (v - mean)).sum()
}

fn replace(
    simplex: &mut Array2<f64>,
    values: &mut Array1<f64>,
    i: usize,
    x: Array1<f64>,
    fx: f64,
) {
    simplex.row_mut(i).assign(&x);
    values[i] = fx;
}

impl NelderMead {
    fn check(&self, nvars: usize) -> Result<Array1<f64>> {
        check_dimension(nvars)?;
        check_reqmin(self.reqmin)?;
        if self.konvge == 0 {
            return Err(Error::Konvge);
        }
        match &self.step {
            None => Ok(Array1::ones(nvars)),
            Some(step) if step.len() == nvars => Ok(step.clone()),
            Some(step) => Err(Error::Step {
                expected: nvars,
                got: step.len(),
            }),
        }
    }

    /// Search for the value minimizing `func` starting from `x0`.
    ///
    /// `evals` is reset and then counts every evaluation of `func` made by
    /// this run. The run converges when the spread of the simplex values
    /// drops to `reqmin * n` and the best vertex survives the local minimum
    /// check. It stops with [`RunStatus::MaxFunReached`] once more than
    /// `kcount` evaluations were needed, returning the best vertex so far.
    pub fn nelmin<F>(
        &self,
        func: F,
        x0: ArrayView1<f64>,
        evals: &mut FunEvals,
    ) -> Result<OptimResult>
    where
        F: Fn(ArrayView1<f64>) -> f64,
    {
        let step = self.check(x0.len())?;
        let start_time = Instant::now();
        let n = x0.len();
        let rq = self.reqmin * n as f64;

        evals.reset();
        let mut func = WrappedFunction::new(func, evals);

        let mut start = x0.to_owned();
        let mut scale = 1.0;
        let mut iterations = 0;
        let mut restarts = 0;

        let (minimum, minimum_value, status) = loop {
            let (mut simplex, mut values) =
                self.initial_simplex(&mut func, &mut start, &step, scale);
            let mut best = lowest(&values);
            let mut countdown = self.konvge;

            while func.num() < self.kcount {
                iterations += 1;

                let worst = highest(&values);
                let centroid = centroid(&simplex, worst);
                let x_worst = simplex.row(worst).to_owned();

                let reflected = &centroid + &(REFLECTION * (&centroid - &x_worst));
                let f_reflected = func.call(reflected.view());

                if f_reflected < values[best] {
                    // try expanding beyond the reflected point
                    let expanded = &centroid + &(EXPANSION * (&reflected - &centroid));
                    let f_expanded = func.call(expanded.view());
                    if f_reflected < f_expanded {
                        replace(&mut simplex, &mut values, worst, reflected, f_reflected);
                    } else {
                        replace(&mut simplex, &mut values, worst, expanded, f_expanded);
                    }
                } else {
                    let beaten = values.iter().filter(|&&v| f_reflected < v).count();
                    if beaten > 1 {
                        replace(&mut simplex, &mut values, worst, reflected, f_reflected);
                    } else if beaten == 0 {
                        // contraction on the worst side of the centroid
                        let contracted = &centroid + &(CONTRACTION * (&x_worst - &centroid));
                        let f_contracted = func.call(contracted.view());
                        if values[worst] < f_contracted {
                            self.shrink(&mut simplex, &mut values, best, &mut func);
                            best = lowest(&values);
                            continue;
                        }
                        replace(&mut simplex, &mut values, worst, contracted, f_contracted);
                    } else {
                        // contraction on the reflected side of the centroid
                        let contracted = &centroid + &(CONTRACTION * (&reflected - &centroid));
                        let f_contracted = func.call(contracted.view());
                        if f_contracted <= f_reflected {
                            replace(&mut simplex, &mut values, worst, contracted, f_contracted);
                        } else {
                            replace(&mut simplex, &mut values, worst, reflected, f_reflected);
                        }
                    }
                }

                if values[worst] < values[best] {
                    best = worst;
                }

                countdown -= 1;
                if countdown > 0 {
                    continue;
                }
                countdown = self.konvge;
                if func.num() <= self.kcount && spread(&values) <= rq {
                    break;
                }
            }

            let mut xmin = simplex.row(best).to_owned();
            let ynewlo = values[best];

            if self.kcount < func.num() {
                break (xmin, ynewlo, RunStatus::MaxFunReached);
            }
            if self.is_local_minimum(&mut func, xmin.view_mut(), ynewlo, &step) {
                break (xmin, ynewlo, RunStatus::Converged);
            }

            restarts += 1;
            debug!(restarts, f_evals = func.num(), value = ynewlo, "restarting simplex");
            start = xmin;
            scale = EPS;
        };

        let f_evals = func.num();
        match status {
            RunStatus::MaxFunReached => warn!(
                iterations,
                f_evals,
                value = minimum_value,
                "evaluation limit reached before convergence"
            ),
            _ => info!(
                iterations,
                restarts,
                f_evals,
                value = minimum_value,
                "nelder-mead finished"
            ),
        }

        Ok(OptimResult {
            runtime: start_time.elapsed(),
            f_evals,
            iterations,
            restarts,
            minimum,
            minimum_value,
            status,
        })
    }

    /// Build the simplex around `start`: the last vertex is `start` itself,
    /// vertex `j` is `start` moved by `step[j] * scale` along axis `j`.
    /// `start` is left unchanged.
    fn initial_simplex<F>(
        &self,
        func: &mut WrappedFunction<'_, F>,
        start: &mut Array1<f64>,
        step: &Array1<f64>,
        scale: f64,
    ) -> (Array2<f64>, Array1<f64>)
    where
        F: Fn(ArrayView1<f64>) -> f64,
    {
        let n = start.len();
        let mut simplex = Array2::zeros((n + 1, n));
        let mut values = Array1::zeros(n + 1);

        simplex.row_mut(n).assign(&*start);
        values[n] = func.call(start.view());

        for j in 0..n {
            let x = start[j];
            start[j] += step[j] * scale;
            simplex.row_mut(j).assign(&*start);
            values[j] = func.call(start.view());
            start[j] = x;
        }
        (simplex, values)
    }

    /// Shrink all vertices halfway towards the vertex `best`.
    /// Costs `n + 1` function evaluations.
    fn shrink<F>(
        &self,
        simplex: &mut Array2<f64>,
        values: &mut Array1<f64>,
        best: usize,
        func: &mut WrappedFunction<'_, F>,
    ) where
        F: Fn(ArrayView1<f64>) -> f64,
    {
        let x_best = simplex.row(best).to_owned();
        for (mut vertex, fx) in simplex.outer_iter_mut().zip(values.iter_mut()) {
            vertex += &x_best;
            vertex *= 0.5;
            *fx = func.call(vertex.view());
        }
    }

    /// Try `xmin` moved by `step[i] * EPS` in both directions along every axis.
    /// Returns false at the first trial point lower than `fmin`, leaving
    /// `xmin` there.
    fn is_local_minimum<F>(
        &self,
        func: &mut WrappedFunction<'_, F>,
        mut xmin: ArrayViewMut1<f64>,
        fmin: f64,
        step: &Array1<f64>,
    ) -> bool
    where
        F: Fn(ArrayView1<f64>) -> f64,
    {
        for i in 0..xmin.len() {
            let del = step[i] * EPS;
            xmin[i] += del;
            if func.call(xmin.view()) < fmin {
                return false;
            }
            xmin[i] -= del + del;
            if func.call(xmin.view()) < fmin {
                return false;
            }
            xmin[i] += del;
        }
        true
    }
}

impl Minimizer for NelderMead {
    fn minimize<F>(&self, func: F, x0: ArrayView1<f64>) -> Result<OptimResult>
    where
        F: Fn(ArrayView1<f64>) -> f64,
    {
        let mut evals = FunEvals::new();
        self.nelmin(func, x0, &mut evals)
    }
}
