// src/equation.rs
//! Right-hand sides and closed-form solutions
//!
//! The engine never looks inside an equation: it only asks for `f(x, y)`
//! (and, for the reference comparator, `g(x)`). Plain closures work out of
//! the box; anything that can fail at a point (a parsed formula hitting a
//! division by zero, say) implements the traits directly and returns
//! [`OdeError::EvaluationFailure`].

use crate::error::{OdeError, OdeResult};

/// Right-hand side of `y' = f(x, y)`
pub trait Equation {
    fn slope(&self, x: f64, y: f64) -> OdeResult<f64>;
}

/// Closed-form solution `g(x)` used as a reference
pub trait ExactSolution {
    fn value(&self, x: f64) -> OdeResult<f64>;
}

impl<F> Equation for F
where
    F: Fn(f64, f64) -> f64,
{
    fn slope(&self, x: f64, y: f64) -> OdeResult<f64> {
        let value = self(x, y);
        if value.is_finite() {
            Ok(value)
        } else {
            Err(OdeError::EvaluationFailure {
                x,
                y,
                reason: format!("f(x, y) = {}", value),
            })
        }
    }
}

impl<G> ExactSolution for G
where
    G: Fn(f64) -> f64,
{
    fn value(&self, x: f64) -> OdeResult<f64> {
        let value = self(x);
        if value.is_finite() {
            Ok(value)
        } else {
            Err(OdeError::EvaluationFailure {
                x,
                y: f64::NAN,
                reason: format!("g(x) = {}", value),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn closure_equation_evaluates() {
        let f = |x: f64, y: f64| x + y;
        assert_eq!(f.slope(1.0, 2.0), Ok(3.0));
    }

    #[test]
    fn non_finite_slope_is_an_evaluation_failure() {
        let f = |x: f64, _y: f64| 1.0 / x;
        match f.slope(0.0, 1.0) {
            Err(OdeError::EvaluationFailure { x, y, .. }) => {
                assert_eq!(x, 0.0);
                assert_eq!(y, 1.0);
            }
            other => panic!("expected evaluation failure, got {:?}", other),
        }
    }

    #[test]
    fn closure_solution_reports_nan() {
        let g = |x: f64| x.ln();
        assert!(g.value(-1.0).is_err());
        assert_eq!(g.value(1.0), Ok(0.0));
    }
}
