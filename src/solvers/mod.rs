// src/solvers/mod.rs
//! Step functions for the three integration methods
//!
//! Each method exposes a single elementary step. Driving a step across an
//! interval is the job of [`crate::integrator`]; error control lives in
//! [`crate::adaptive`].

pub mod euler;
pub mod milne;
pub mod rk4;

use serde::{Deserialize, Serialize};
use std::fmt;

pub use euler::{Euler, EulerStep};
pub use milne::{Correction, MilneHistory};
pub use rk4::{Rk4Step, RungeKutta4};

/// Integration method selector
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Method {
    Euler,
    RungeKutta4,
    Milne,
}

impl Method {
    pub const ALL: [Method; 3] = [Method::Euler, Method::RungeKutta4, Method::Milne];

    /// Order of convergence `p` (global error is O(h^p))
    pub fn order(self) -> u32 {
        match self {
            Method::Euler => 1,
            Method::RungeKutta4 | Method::Milne => 4,
        }
    }

    /// Divisor `2^p - 1` of Runge's step-doubling estimate
    pub fn runge_divisor(self) -> f64 {
        crate::math_utils::runge_divisor(self.order())
    }

    pub fn name(self) -> &'static str {
        match self {
            Method::Euler => "Euler",
            Method::RungeKutta4 => "Runge-Kutta 4",
            Method::Milne => "Milne",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
