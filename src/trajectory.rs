// src/trajectory.rs
use crate::error::{OdeError, OdeResult};
use crate::solvers::Method;

/// Method-specific values recorded for the step that produced a sample
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Diagnostics {
    /// The initial condition; no step was taken
    Initial,
    Euler {
        f_xy: f64,
    },
    /// RK4 steps, including the Milne startup
    RungeKutta4 {
        k1: f64,
        k2: f64,
        k3: f64,
        k4: f64,
    },
    Milne {
        predicted: f64,
        corrected: f64,
        iterations: usize,
    },
}

impl Diagnostics {
    /// Named values in display order
    pub fn entries(&self) -> Vec<(&'static str, f64)> {
        match *self {
            Diagnostics::Initial => Vec::new(),
            Diagnostics::Euler { f_xy } => vec![("f_xy", f_xy)],
            Diagnostics::RungeKutta4 { k1, k2, k3, k4 } => {
                vec![("k1", k1), ("k2", k2), ("k3", k3), ("k4", k4)]
            }
            Diagnostics::Milne {
                predicted,
                corrected,
                iterations,
            } => vec![
                ("predicted", predicted),
                ("corrected", corrected),
                ("iterations", iterations as f64),
            ],
        }
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.entries()
            .into_iter()
            .find(|(key, _)| *key == name)
            .map(|(_, value)| value)
    }
}

/// One point of a numerical solution
#[derive(Clone, Debug, PartialEq)]
pub struct Sample {
    pub iteration: usize,
    pub x: f64,
    pub y: f64,
    pub diagnostics: Diagnostics,
    /// `|y - g(x)|` against the reference solution, when one is available
    pub abs_error: Option<f64>,
    /// Runge estimate at this point, filled by the adaptive controller
    pub runge_error: Option<f64>,
}

impl Sample {
    pub(crate) fn new(iteration: usize, x: f64, y: f64, diagnostics: Diagnostics) -> Self {
        Sample {
            iteration,
            x,
            y,
            diagnostics,
            abs_error: None,
            runge_error: None,
        }
    }
}

/// Samples of one complete pass at one step size
#[derive(Clone, Debug, PartialEq)]
pub struct Trajectory {
    pub method: Method,
    pub step: f64,
    pub samples: Vec<Sample>,
    /// The iteration ceiling stopped the pass before `x_end`
    pub truncated: bool,
}

impl Trajectory {
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn first(&self) -> Option<&Sample> {
        self.samples.first()
    }

    pub fn last(&self) -> Option<&Sample> {
        self.samples.last()
    }

    pub fn xs(&self) -> Vec<f64> {
        self.samples.iter().map(|s| s.x).collect()
    }

    pub fn ys(&self) -> Vec<f64> {
        self.samples.iter().map(|s| s.y).collect()
    }

    /// `(x, y)` pairs, the form a plotting frontend consumes
    pub fn points(&self) -> Vec<(f64, f64)> {
        self.samples.iter().map(|s| (s.x, s.y)).collect()
    }

    /// Fail with `IterationLimitExceeded` if the pass was truncated
    pub fn ensure_complete(&self, limit: usize) -> OdeResult<&Self> {
        if self.truncated {
            Err(OdeError::IterationLimitExceeded {
                method: self.method,
                step: self.step,
                limit,
            })
        } else {
            Ok(self)
        }
    }
}
