//! Minimizes Rosenbrock's function from the classic starting guess and
//! prints the search trace. Set `RUST_LOG=debug` for the tracing events.
mod common;

use common::{print_iteration, sci};
use hooke_jeeves::problems::{rosenbrock, ROSENBROCK_START};
use hooke_jeeves::utils::FunEvals;
use hooke_jeeves::vector::HookeJeevesBuilder;
use ndarray::aview1;
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let minimizer = HookeJeevesBuilder::default()
        .rho(0.5)
        .epsilon(1e-6)
        .itermax(5000)
        .build()?;

    let mut evals = FunEvals::new();
    let res = minimizer.hooke(
        rosenbrock,
        aview1(&ROSENBROCK_START),
        &mut evals,
        print_iteration,
    )?;

    println!("\n\n\nHOOKE USED {} ITERATIONS, AND RETURNED", res.iterations);
    for (i, xi) in res.minimum.iter().enumerate() {
        println!("x[{:3}] = {} ", i, sci(*xi, 15, 7));
    }
    Ok(())
}
