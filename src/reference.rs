// src/reference.rs
//! Comparison against a closed-form solution

use crate::equation::ExactSolution;
use crate::error::OdeError;
use crate::trajectory::Trajectory;

/// Reference solution attached to a solve
///
/// Keeps "nothing was supplied" apart from "something was supplied but could
/// not be built", so a caller can tell the user why the error column is
/// empty.
#[derive(Clone, Copy)]
pub enum Reference<'a> {
    Absent,
    /// The reference text failed to parse
    Unavailable(&'a OdeError),
    Exact(&'a (dyn ExactSolution + Sync)),
}

impl<'a> Reference<'a> {
    pub fn is_available(&self) -> bool {
        matches!(self, Reference::Exact(_))
    }

    /// `|y - g(x)|`, or `None` when no usable reference exists at `x`
    pub fn abs_error(&self, x: f64, y: f64) -> Option<f64> {
        match self {
            Reference::Exact(solution) => match solution.value(x) {
                Ok(exact) => Some((y - exact).abs()),
                Err(e) => {
                    log::debug!("reference solution unavailable at x = {}: {}", x, e);
                    None
                }
            },
            Reference::Absent | Reference::Unavailable(_) => None,
        }
    }
}

impl<'a> std::fmt::Debug for Reference<'a> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Reference::Absent => f.write_str("Absent"),
            Reference::Unavailable(e) => f.debug_tuple("Unavailable").field(e).finish(),
            Reference::Exact(_) => f.write_str("Exact(..)"),
        }
    }
}

/// Fill `abs_error` on every sample of `trajectory`
pub fn annotate(trajectory: &mut Trajectory, reference: &Reference<'_>) {
    for sample in &mut trajectory.samples {
        sample.abs_error = reference.abs_error(sample.x, sample.y);
    }
}

/// Largest absolute error over the samples that have one
pub fn max_abs_error(trajectory: &Trajectory) -> Option<f64> {
    trajectory
        .samples
        .iter()
        .filter_map(|s| s.abs_error)
        .fold(None, |acc, e| Some(acc.map_or(e, |m: f64| m.max(e))))
}
