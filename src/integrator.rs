// src/integrator.rs
//! Fixed-Step Integration
//!
//! Drives one of the step functions from `x_start` to `x_end` on the grid
//! ```text
//! x_i = x_start + i h,   i = 0, 1, ...   while x_i <= x_end
//! ```
//! Grid points are computed from the index rather than accumulated, so the
//! fine pass of the adaptive controller (step `h / 2`) lands on exactly the
//! same coordinates as the coarse pass at every other index.
//!
//! A pass that would need more than `max_iterations` steps is cut short and
//! flagged as truncated; that is a valid (partial) result, not an error.

use crate::config::SolverConfig;
use crate::equation::Equation;
use crate::error::{validation::*, OdeResult};
use crate::solvers::{Euler, Method, MilneHistory, RungeKutta4};
use crate::trajectory::{Diagnostics, Sample, Trajectory};

/// Relative slack (in units of `h`) for deciding whether a grid point is
/// still inside `[x_start, x_end]`
pub const GRID_SLACK: f64 = 1e-9;

/// x-coordinate of grid point `index`
#[inline]
pub fn grid_x(x_start: f64, step: f64, index: usize) -> f64 {
    x_start + index as f64 * step
}

/// Number of whole steps of size `step` that fit in `[x_start, x_end]`
pub fn grid_steps(config: &SolverConfig, step: f64) -> usize {
    let span = config.x_end - config.x_start;
    ((span + step * GRID_SLACK) / step).floor() as usize
}

/// Number of samples for `steps` steps and whether the iteration ceiling
/// cuts the grid short
pub fn capped_len(config: &SolverConfig, steps: usize) -> (usize, bool) {
    if steps > config.max_iterations {
        (config.max_iterations + 1, true)
    } else {
        (steps + 1, false)
    }
}

/// Number of samples for `step` and whether the iteration ceiling cuts the
/// grid short
pub fn grid_len(config: &SolverConfig, step: f64) -> (usize, bool) {
    capped_len(config, grid_steps(config, step))
}

/// Integrate at a constant step size
///
/// # Parameters
/// - `method`: which step function to drive
/// - `equation`: right-hand side `f(x, y)`
/// - `config`: interval, initial value, tolerance and limits
/// - `step`: the step size actually used (`config.step` is not read)
///
/// # Errors
///
/// Invalid configuration, evaluation failures of `f`, and (Milne only)
/// corrector divergence. Hitting the iteration ceiling is reported through
/// [`Trajectory::truncated`].
pub fn integrate<E: Equation + ?Sized>(
    method: Method,
    equation: &E,
    config: &SolverConfig,
    step: f64,
) -> OdeResult<Trajectory> {
    config.validate()?;
    validate_finite("step", step)?;
    validate_positive("step", step)?;

    integrate_steps(method, equation, config, step, grid_steps(config, step))
}

/// Integrate exactly `steps` steps of size `step` (subject to the iteration
/// ceiling)
///
/// The adaptive controller uses this for its fine pass, whose grid must be
/// the coarse grid refined rather than recomputed at `h / 2`.
pub(crate) fn integrate_steps<E: Equation + ?Sized>(
    method: Method,
    equation: &E,
    config: &SolverConfig,
    step: f64,
    steps: usize,
) -> OdeResult<Trajectory> {
    let (count, truncated) = capped_len(config, steps);
    if truncated {
        log::warn!(
            "{} pass at h = {:e} truncated after {} steps before reaching x = {}",
            method,
            step,
            config.max_iterations,
            config.x_end
        );
    }

    let samples = match method {
        Method::Euler => march(config, step, count, |x, y| {
            let s = Euler::step(equation, x, y, step)?;
            Ok((s.y_next, Diagnostics::Euler { f_xy: s.f_xy }))
        })?,
        Method::RungeKutta4 => march(config, step, count, |x, y| {
            let s = RungeKutta4::step(equation, x, y, step)?;
            Ok((s.y_next, rk4_diagnostics(s.k1, s.k2, s.k3, s.k4)))
        })?,
        Method::Milne => milne_pass(equation, config, step, count)?,
    };

    Ok(Trajectory {
        method,
        step,
        samples,
        truncated,
    })
}

fn rk4_diagnostics(k1: f64, k2: f64, k3: f64, k4: f64) -> Diagnostics {
    Diagnostics::RungeKutta4 { k1, k2, k3, k4 }
}

/// Single-step driver shared by Euler and RK4
fn march<F>(config: &SolverConfig, step: f64, count: usize, mut advance: F) -> OdeResult<Vec<Sample>>
where
    F: FnMut(f64, f64) -> OdeResult<(f64, Diagnostics)>,
{
    let mut samples = Vec::with_capacity(count);
    let mut y = config.initial_y;
    samples.push(Sample::new(0, config.x_start, y, Diagnostics::Initial));

    for i in 1..count {
        let (y_next, diagnostics) = advance(grid_x(config.x_start, step, i - 1), y)?;
        y = y_next;
        samples.push(Sample::new(i, grid_x(config.x_start, step, i), y, diagnostics));
    }

    Ok(samples)
}

/// RK4 startup followed by predict-correct steps
fn milne_pass<E: Equation + ?Sized>(
    equation: &E,
    config: &SolverConfig,
    step: f64,
    count: usize,
) -> OdeResult<Vec<Sample>> {
    let mut samples = Vec::with_capacity(count);
    let mut y = config.initial_y;
    samples.push(Sample::new(0, config.x_start, y, Diagnostics::Initial));
    if count == 1 {
        return Ok(samples);
    }

    let mut history = MilneHistory::new(y, equation.slope(config.x_start, y)?);

    for i in 1..count {
        let x_prev = grid_x(config.x_start, step, i - 1);
        let x_next = grid_x(config.x_start, step, i);

        let diagnostics = if history.is_ready() {
            let c = history.predict_correct(
                equation,
                x_next,
                step,
                config.epsilon,
                config.max_corrector_iterations,
            )?;
            history.push(c.corrected, c.f_next);
            y = c.corrected;
            Diagnostics::Milne {
                predicted: c.predicted,
                corrected: c.corrected,
                iterations: c.iterations,
            }
        } else {
            let s = RungeKutta4::step(equation, x_prev, y, step)?;
            history.push(s.y_next, equation.slope(x_next, s.y_next)?);
            y = s.y_next;
            rk4_diagnostics(s.k1, s.k2, s.k3, s.k4)
        };

        samples.push(Sample::new(i, x_next, y, diagnostics));
    }

    Ok(samples)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::OdeError;
    use approx::assert_relative_eq;

    fn exp_config(step: f64) -> SolverConfig {
        SolverConfig {
            x_start: 0.0,
            x_end: 1.0,
            step,
            epsilon: 1e-8,
            initial_y: 1.0,
            ..Default::default()
        }
    }

    #[test]
    fn test_grid_includes_boundary() {
        assert_eq!(grid_len(&exp_config(0.25), 0.25), (5, false));
        // 0.1 does not divide 1.0 exactly in binary
        assert_eq!(grid_len(&exp_config(0.1), 0.1), (11, false));
        assert_eq!(grid_len(&exp_config(0.3), 0.3), (4, false));
    }

    #[test]
    fn test_grid_respects_ceiling() {
        let config = SolverConfig {
            max_iterations: 10,
            ..exp_config(0.01)
        };
        assert_eq!(grid_len(&config, 0.01), (11, true));
    }

    #[test]
    fn test_euler_concrete_scenario() {
        let f = |_x: f64, y: f64| y;
        let trajectory = integrate(Method::Euler, &f, &exp_config(0.25), 0.25).unwrap();
        assert_eq!(trajectory.ys(), vec![1.0, 1.25, 1.5625, 1.953125, 2.44140625]);
        assert_eq!(trajectory.xs(), vec![0.0, 0.25, 0.5, 0.75, 1.0]);
        assert_eq!(trajectory.samples[0].diagnostics, Diagnostics::Initial);
        assert_eq!(trajectory.samples[1].diagnostics.get("f_xy"), Some(1.0));
        assert!(!trajectory.truncated);
    }

    #[test]
    fn test_rk4_reaches_e() {
        let f = |_x: f64, y: f64| y;
        let trajectory = integrate(Method::RungeKutta4, &f, &exp_config(0.25), 0.25).unwrap();
        let last = trajectory.last().unwrap();
        assert_relative_eq!(last.x, 1.0);
        assert!((last.y - std::f64::consts::E).abs() < 1e-3);
    }

    #[test]
    fn test_step_argument_overrides_config() {
        let f = |_x: f64, y: f64| y;
        let trajectory = integrate(Method::Euler, &f, &exp_config(0.25), 0.125).unwrap();
        assert_eq!(trajectory.len(), 9);
        assert_eq!(trajectory.step, 0.125);
    }

    #[test]
    fn test_truncation_is_not_an_error() {
        let f = |_x: f64, y: f64| y;
        let config = SolverConfig {
            max_iterations: 3,
            ..exp_config(0.1)
        };
        let trajectory = integrate(Method::RungeKutta4, &f, &config, 0.1).unwrap();
        assert!(trajectory.truncated);
        assert_eq!(trajectory.len(), 4);
        assert!(trajectory.ensure_complete(config.max_iterations).is_err());
    }

    #[test]
    fn test_short_milne_pass_is_pure_rk4() {
        let f = |x: f64, y: f64| x * y;
        let config = SolverConfig {
            x_end: 0.2,
            ..exp_config(0.1)
        };
        let milne = integrate(Method::Milne, &f, &config, 0.1).unwrap();
        let rk4 = integrate(Method::RungeKutta4, &f, &config, 0.1).unwrap();
        assert_eq!(milne.ys(), rk4.ys());
    }

    #[test]
    fn test_milne_diagnostics_switch_after_startup() {
        let f = |_x: f64, y: f64| y;
        let trajectory = integrate(Method::Milne, &f, &exp_config(0.1), 0.1).unwrap();
        for sample in &trajectory.samples[1..=3] {
            assert!(matches!(sample.diagnostics, Diagnostics::RungeKutta4 { .. }));
        }
        for sample in &trajectory.samples[4..] {
            match sample.diagnostics {
                Diagnostics::Milne {
                    corrected,
                    iterations,
                    ..
                } => {
                    assert_eq!(corrected, sample.y);
                    assert!(iterations >= 1);
                }
                other => panic!("expected Milne diagnostics, got {:?}", other),
            }
        }
    }

    #[test]
    fn test_evaluation_failure_propagates() {
        // f blows up at x = 0.5
        let f = |x: f64, _y: f64| 1.0 / (x - 0.5);
        let result = integrate(Method::Euler, &f, &exp_config(0.25), 0.25);
        assert!(matches!(result, Err(OdeError::EvaluationFailure { .. })));
    }

    #[test]
    fn test_invalid_step_rejected() {
        let f = |_x: f64, y: f64| y;
        assert!(integrate(Method::Euler, &f, &exp_config(0.25), 0.0).is_err());
        assert!(integrate(Method::Euler, &f, &exp_config(0.25), f64::NAN).is_err());
    }
}
