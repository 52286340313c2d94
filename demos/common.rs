//! Printing helpers shared by the demos.
use hooke_jeeves::vector::Iteration;
use std::ops::ControlFlow;

/// Formats `x` in scientific notation with a signed exponent of at least two
/// digits, right-aligned to `width`. `sci(1.5, 0, 2)` gives `1.50e+00`.
pub fn sci(x: f64, width: usize, precision: usize) -> String {
    if !x.is_finite() {
        return format!("{:>width$}", x, width = width);
    }
    let s = format!("{:.*e}", precision, x);
    let (mantissa, exp) = s.split_once('e').unwrap_or((&s, "0"));
    let exp: i32 = exp.parse().unwrap_or(0);
    let sign = if exp < 0 { '-' } else { '+' };
    let formatted = format!("{}e{}{:02}", mantissa, sign, exp.abs());
    format!("{:>width$}", formatted, width = width)
}

pub fn print_iteration(it: &Iteration<'_>) -> ControlFlow<()> {
    println!("\nAfter {:5} funevals, f(x) =  {} at", it.f_evals, sci(it.value, 0, 4));
    for (j, xj) in it.point.iter().enumerate() {
        println!("   x[{:2}] = {}", j, sci(*xj, 0, 4));
    }
    ControlFlow::Continue(())
}

#[cfg(test)]
mod tests {
    use super::sci;

    #[test]
    fn exponent_is_signed_and_two_digits_wide() {
        assert_eq!(sci(1.0000008, 15, 7), "  1.0000008e+00");
        assert_eq!(sci(2.5e-11, 0, 4), "2.5000e-11");
        assert_eq!(sci(-3.0e105, 0, 1), "-3.0e+105");
        assert_eq!(sci(0.0, 0, 2), "0.00e+00");
    }
}
