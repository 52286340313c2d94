//! Minimizes Rosenbrock's function and the Woods function with the
//! Nelder-Mead simplex method. Set `RUST_LOG=debug` for the tracing events.
#[allow(dead_code)]
mod common;

use common::sci;
use hooke_jeeves::minimizer::OptimResult;
use hooke_jeeves::problems::{rosenbrock, woods, ROSENBROCK_START, WOODS_START};
use hooke_jeeves::utils::FunEvals;
use hooke_jeeves::vector::NelderMeadBuilder;
use ndarray::{array, aview1};
use tracing_subscriber::EnvFilter;

fn report(start_value: f64, res: &OptimResult) {
    println!("\n  Initial value F(X) = {}", sci(start_value, 14, 6));
    println!("\n  Return status = {:?}", res.status);
    println!("\n  Estimate of minimizing value X*:\n");
    for xi in res.minimum.iter() {
        println!("  {}", sci(*xi, 14, 6));
    }
    println!("\n  F(X*) = {}", sci(res.minimum_value, 14, 6));
    println!("\n  Number of evaluations = {}", res.f_evals);
    println!("  Number of restarts =    {}", res.restarts);
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let mut evals = FunEvals::new();

    println!("\nRosenbrock's function, 2 variables");
    let minimizer = NelderMeadBuilder::default()
        .reqmin(1e-8)
        .step(array![1.0, 1.0])
        .konvge(10)
        .kcount(500)
        .build()?;
    let res = minimizer.nelmin(rosenbrock, aview1(&ROSENBROCK_START), &mut evals)?;
    report(rosenbrock(aview1(&ROSENBROCK_START)), &res);

    println!("\nWoods function, 4 variables");
    let minimizer = NelderMeadBuilder::default()
        .reqmin(1e-8)
        .step(array![1.0, 1.0, 1.0, 1.0])
        .konvge(10)
        .kcount(500)
        .build()?;
    let res = minimizer.nelmin(woods, aview1(&WOODS_START), &mut evals)?;
    report(woods(aview1(&WOODS_START)), &res);
    println!("True answer: f(1, 1, 1, 1) = 0.");
    Ok(())
}
