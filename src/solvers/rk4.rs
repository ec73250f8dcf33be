// src/solvers/rk4.rs
//! Classical Fourth-Order Runge-Kutta Scheme
//!
//! # Mathematical Framework
//!
//! ```text
//! k1 = h f(x_n,         y_n)
//! k2 = h f(x_n + h / 2, y_n + k1 / 2)
//! k3 = h f(x_n + h / 2, y_n + k2 / 2)
//! k4 = h f(x_n + h,     y_n + k3)
//! y_{n+1} = y_n + (k1 + 2 k2 + 2 k3 + k4) / 6
//! ```
//!
//! # Convergence Properties
//!
//! - **Global error**: O(h⁴), Runge divisor `2^4 - 1 = 15`
//! - **Cost**: four evaluations of `f` per step
//!
//! The same step bootstraps the history of the Milne predictor-corrector.

use crate::equation::Equation;
use crate::error::OdeResult;

/// Classical RK4 scheme
pub struct RungeKutta4;

/// Result of one RK4 step, with the stage increments kept for display
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rk4Step {
    pub y_next: f64,
    pub k1: f64,
    pub k2: f64,
    pub k3: f64,
    pub k4: f64,
}

impl RungeKutta4 {
    /// Single RK4 step from `(x, y)` with step size `h`
    pub fn step<E: Equation + ?Sized>(equation: &E, x: f64, y: f64, h: f64) -> OdeResult<Rk4Step> {
        let half = h / 2.0;
        let k1 = h * equation.slope(x, y)?;
        let k2 = h * equation.slope(x + half, y + k1 / 2.0)?;
        let k3 = h * equation.slope(x + half, y + k2 / 2.0)?;
        let k4 = h * equation.slope(x + h, y + k3)?;

        Ok(Rk4Step {
            y_next: y + (k1 + 2.0 * k2 + 2.0 * k3 + k4) / 6.0,
            k1,
            k2,
            k3,
            k4,
        })
    }
}
