// src/solvers/euler.rs
//! Explicit Euler Scheme
//!
//! # Mathematical Framework
//!
//! For the initial value problem `y' = f(x, y)`, `y(x_0) = y_0`:
//! ```text
//! y_{n+1} = y_n + h f(x_n, y_n)
//! ```
//!
//! # Convergence Properties
//!
//! - **Local error**: O(h²)
//! - **Global error**: O(h), so the Runge divisor is `2^1 - 1 = 1`
//! - **Cost**: one evaluation of `f` per step

use crate::equation::Equation;
use crate::error::OdeResult;

/// Explicit Euler scheme
pub struct Euler;

/// Result of one Euler step
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EulerStep {
    pub y_next: f64,
    /// Slope `f(x_n, y_n)` the step was taken along
    pub f_xy: f64,
}

impl Euler {
    /// Single Euler step from `(x, y)` with step size `h`
    ///
    /// Errors raised by `equation` are propagated unchanged.
    pub fn step<E: Equation + ?Sized>(equation: &E, x: f64, y: f64, h: f64) -> OdeResult<EulerStep> {
        let f_xy = equation.slope(x, y)?;
        Ok(EulerStep {
            y_next: y + h * f_xy,
            f_xy,
        })
    }
}
