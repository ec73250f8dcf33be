// src/adaptive.rs
//! Adaptive Step Control by Runge's Rule
//!
//! # Mathematical Framework
//!
//! For a method of order `p`, integrating once at `h` and once at `h / 2`
//! gives the error estimate
//! ```text
//! R(x) = |y_h(x) - y_{h/2}(x)| / (2^p - 1)
//! ```
//! at every x the two grids share (coarse index `i`, fine index `2i`).
//!
//! # Refinement Policy
//!
//! Each attempt is an explicit two-pass computation: one coarse pass, one
//! fine pass, a pointwise comparison. If the estimate exceeds `epsilon`
//! anywhere, every sample is discarded and the whole interval is solved
//! again from `x_start` with `h` halved. The refinement is global, not
//! local: the returned trajectory has one uniform step.
//!
//! The number of halvings is capped by `max_halvings`. A pass that runs into
//! the iteration ceiling cannot be checked against its fine counterpart, so
//! refinement stops there with [`OdeError::IterationLimitExceeded`].

use crate::config::SolverConfig;
use crate::equation::Equation;
use crate::error::{OdeError, OdeResult};
use crate::integrator::{integrate, integrate_steps};
use crate::solvers::Method;
use crate::trajectory::Trajectory;

/// Accepted solution of the adaptive controller
#[derive(Clone, Debug, PartialEq)]
pub struct AdaptiveSolution {
    /// Coarse trajectory at the accepted step, samples carry `runge_error`
    pub trajectory: Trajectory,
    pub requested_step: f64,
    /// Number of global restarts that were needed
    pub halvings: u32,
    /// Runge estimate at the last sample, accepted `h` against `h / 2`
    pub runge_estimate: f64,
}

impl AdaptiveSolution {
    pub fn method(&self) -> Method {
        self.trajectory.method
    }

    pub fn effective_step(&self) -> f64 {
        self.trajectory.step
    }
}

/// Pointwise Runge estimates of `coarse` against `fine`
///
/// `fine` must have been computed at half the step of `coarse` from the
/// same start and cover every coarse sample, otherwise
/// [`OdeError::GridMismatch`] is returned.
pub fn runge_estimates(coarse: &Trajectory, fine: &Trajectory) -> OdeResult<Vec<f64>> {
    let divisor = coarse.method.runge_divisor();

    if fine.method != coarse.method || fine.step * 2.0 != coarse.step {
        return Err(OdeError::InvalidConfiguration {
            field: "fine".to_string(),
            reason: format!(
                "expected a {} pass at h = {:e}, got {} at h = {:e}",
                coarse.method,
                coarse.step / 2.0,
                fine.method,
                fine.step
            ),
        });
    }

    let required = 2 * coarse.len().saturating_sub(1) + 1;
    if fine.len() < required {
        return Err(OdeError::GridMismatch {
            method: fine.method,
            step: fine.step,
            fine_samples: fine.len(),
            required,
        });
    }

    Ok(coarse
        .samples
        .iter()
        .zip(fine.samples.iter().step_by(2))
        .map(|(sample, shared)| (sample.y - shared.y).abs() / divisor)
        .collect())
}

/// Global Runge estimate at the end of the interval for step `step`
///
/// Used to check the order of a method: halving `step` should shrink the
/// result by roughly `2^p`.
pub fn runge_estimate<E: Equation + ?Sized>(
    method: Method,
    equation: &E,
    config: &SolverConfig,
    step: f64,
) -> OdeResult<f64> {
    let (coarse, fine) = paired_passes(method, equation, config, step)?;
    let estimates = runge_estimates(&coarse, &fine)?;
    Ok(estimates.last().copied().unwrap_or(0.0))
}

fn paired_passes<E: Equation + ?Sized>(
    method: Method,
    equation: &E,
    config: &SolverConfig,
    step: f64,
) -> OdeResult<(Trajectory, Trajectory)> {
    let coarse = integrate(method, equation, config, step)?;
    coarse.ensure_complete(config.max_iterations)?;
    // twice the coarse step count, so both passes end on the same x
    let steps = coarse.len().saturating_sub(1).saturating_mul(2);
    let fine = integrate_steps(method, equation, config, step / 2.0, steps)?;
    fine.ensure_complete(config.max_iterations)?;
    Ok((coarse, fine))
}

/// Solve with Runge's rule, halving the step until every local estimate is
/// within `config.epsilon`
///
/// # Errors
///
/// - anything [`integrate`] reports for either pass
/// - [`OdeError::IterationLimitExceeded`] when a pass hits the ceiling
/// - [`OdeError::ToleranceNotMet`] after `max_halvings` unsuccessful halvings
pub fn solve_adaptive<E: Equation + ?Sized>(
    method: Method,
    equation: &E,
    config: &SolverConfig,
) -> OdeResult<AdaptiveSolution> {
    config.validate()?;

    let mut step = config.step;
    let mut worst = f64::NAN;

    for halvings in 0..=config.max_halvings {
        let (mut coarse, fine) = paired_passes(method, equation, config, step)?;
        let estimates = runge_estimates(&coarse, &fine)?;
        worst = estimates.iter().copied().fold(0.0, f64::max);

        if worst <= config.epsilon {
            for (sample, estimate) in coarse.samples.iter_mut().zip(&estimates) {
                sample.runge_error = Some(*estimate);
            }
            let runge_estimate = estimates.last().copied().unwrap_or(0.0);
            log::debug!(
                "{} accepted h = {:e} after {} halvings (max estimate {:e})",
                method,
                step,
                halvings,
                worst
            );
            return Ok(AdaptiveSolution {
                trajectory: coarse,
                requested_step: config.step,
                halvings,
                runge_estimate,
            });
        }

        log::debug!(
            "{} rejected h = {:e}: estimate {:e} > epsilon {:e}, restarting at h = {:e}",
            method,
            step,
            worst,
            config.epsilon,
            step / 2.0
        );
        step /= 2.0;
    }

    Err(OdeError::ToleranceNotMet {
        method,
        epsilon: config.epsilon,
        halvings: config.max_halvings,
        estimate: worst,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn exp_config(step: f64, epsilon: f64) -> SolverConfig {
        SolverConfig {
            x_start: 0.0,
            x_end: 1.0,
            step,
            epsilon,
            initial_y: 1.0,
            ..Default::default()
        }
    }

    #[test]
    fn test_estimates_start_at_zero() {
        let f = |_x: f64, y: f64| y;
        let config = exp_config(0.25, 1e-6);
        let coarse = integrate(Method::RungeKutta4, &f, &config, 0.25).unwrap();
        let fine = integrate(Method::RungeKutta4, &f, &config, 0.125).unwrap();
        let estimates = runge_estimates(&coarse, &fine).unwrap();

        assert_eq!(estimates.len(), coarse.len());
        assert_eq!(estimates[0], 0.0);
        assert!(estimates[1..].iter().all(|e| *e > 0.0));
    }

    #[test]
    fn test_mismatched_passes_rejected() {
        let f = |_x: f64, y: f64| y;
        let config = exp_config(0.25, 1e-6);
        let coarse = integrate(Method::RungeKutta4, &f, &config, 0.25).unwrap();
        let other = integrate(Method::RungeKutta4, &f, &config, 0.1).unwrap();
        assert!(runge_estimates(&coarse, &other).is_err());
    }

    #[test]
    fn test_fine_pass_follows_coarse_grid_at_boundary() {
        // the last coarse point sits just inside the slack at h but would
        // fall outside it at h / 2
        let f = |_x: f64, y: f64| y;
        let step = 1.0 / (3.0 - 7e-10);
        let config = exp_config(step, 1e-4);

        let solution = solve_adaptive(Method::RungeKutta4, &f, &config).unwrap();
        assert_eq!(solution.halvings, 0);
        assert_eq!(solution.trajectory.len(), 4);
        assert!((solution.trajectory.last().unwrap().x - 1.0).abs() < 1e-9);
        assert!(solution.runge_estimate > 0.0 && solution.runge_estimate <= 1e-4);

        let estimate = runge_estimate(Method::RungeKutta4, &f, &config, step).unwrap();
        assert_eq!(estimate, solution.runge_estimate);
    }

    #[test]
    fn test_short_fine_pass_is_grid_mismatch() {
        let f = |_x: f64, y: f64| y;
        let step = 1.0 / (3.0 - 7e-10);
        let config = exp_config(step, 1e-4);
        let coarse = integrate(Method::RungeKutta4, &f, &config, step).unwrap();
        let fine = integrate(Method::RungeKutta4, &f, &config, step / 2.0).unwrap();

        assert_eq!(
            runge_estimates(&coarse, &fine),
            Err(OdeError::GridMismatch {
                method: Method::RungeKutta4,
                step: step / 2.0,
                fine_samples: 6,
                required: 7,
            })
        );
    }

    #[test]
    fn test_accepts_requested_step_when_accurate() {
        let f = |_x: f64, y: f64| y;
        let solution = solve_adaptive(Method::RungeKutta4, &f, &exp_config(0.25, 1e-4)).unwrap();
        assert_eq!(solution.halvings, 0);
        assert_eq!(solution.effective_step(), 0.25);
        assert!(solution
            .trajectory
            .samples
            .iter()
            .all(|s| s.runge_error.map_or(false, |e| e <= 1e-4)));
    }

    #[test]
    fn test_halves_until_tolerance() {
        let f = |_x: f64, y: f64| y;
        let solution = solve_adaptive(Method::RungeKutta4, &f, &exp_config(0.5, 1e-6)).unwrap();
        assert_eq!(solution.halvings, 2);
        assert_eq!(solution.effective_step(), 0.125);
        assert_eq!(solution.requested_step, 0.5);
        assert!(solution.runge_estimate <= 1e-6);
    }

    #[test]
    fn test_halving_cap() {
        let f = |_x: f64, y: f64| y;
        let config = SolverConfig {
            max_halvings: 3,
            ..exp_config(0.5, 1e-300)
        };
        match solve_adaptive(Method::RungeKutta4, &f, &config) {
            Err(OdeError::ToleranceNotMet { halvings, estimate, .. }) => {
                assert_eq!(halvings, 3);
                assert!(estimate > 0.0);
            }
            other => panic!("expected ToleranceNotMet, got {:?}", other),
        }
    }

    #[test]
    fn test_ceiling_stops_refinement() {
        // Euler needs h ~ 1e-6 here, far beyond 2000 steps on [0, 1]
        let f = |_x: f64, y: f64| y;
        let result = solve_adaptive(Method::Euler, &f, &exp_config(0.25, 1e-6));
        assert!(matches!(result, Err(OdeError::IterationLimitExceeded { .. })));
    }
}
