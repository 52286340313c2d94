use ndarray::prelude::*;

/// Number of objective evaluations performed during a run.
///
/// The counter is owned by whoever drives the run and is lent to the
/// optimizer, so the same count can be inspected by the objective's caller
/// between runs or from an observer.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct FunEvals {
    count: usize,
}

impl FunEvals {
    pub fn new() -> Self {
        Self { count: 0 }
    }

    pub fn get(&self) -> usize {
        self.count
    }

    pub fn set(&mut self, count: usize) {
        self.count = count;
    }

    pub fn increment(&mut self) {
        self.count += 1;
    }

    /// Start counting from zero for a new run.
    pub fn reset(&mut self) {
        self.count = 0;
    }
}

/// An objective function that records every call in a borrowed [`FunEvals`].
pub struct WrappedFunction<'a, F: Fn(ArrayView1<f64>) -> f64> {
    pub evals: &'a mut FunEvals,
    pub func: F,
}

impl<'a, F: Fn(ArrayView1<f64>) -> f64> WrappedFunction<'a, F> {
    pub fn new(func: F, evals: &'a mut FunEvals) -> Self {
        WrappedFunction { evals, func }
    }

    pub fn call(&mut self, arg: ArrayView1<f64>) -> f64 {
        self.evals.increment();
        (self.func)(arg)
    }

    /// Evaluations counted so far.
    pub fn num(&self) -> usize {
        self.evals.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn counts_every_call() {
        let mut evals = FunEvals::new();
        {
            let mut func = WrappedFunction::new(|x: ArrayView1<f64>| x.sum(), &mut evals);
            let x = array![1.0, 2.0];
            assert_eq!(func.call(x.view()), 3.0);
            assert_eq!(func.call(x.view()), 3.0);
            assert_eq!(func.num(), 2);
        }
        assert_eq!(evals.get(), 2);
    }

    #[test]
    fn set_and_reset() {
        let mut evals = FunEvals::new();
        evals.set(41);
        evals.increment();
        assert_eq!(evals.get(), 42);
        evals.reset();
        assert_eq!(evals, FunEvals::default());
    }
}
