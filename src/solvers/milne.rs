// src/solvers/milne.rs
//! Milne Predictor-Corrector Scheme
//!
//! # Mathematical Framework
//!
//! A four-step method that works on a window of past values, ordered
//! most-recent-first (`y[0] = y_n`, `f[0] = f(x_n, y_n)`, ...).
//!
//! 1. **Predictor** (open Newton-Cotes):
//!    ```text
//!    y* = y[3] + 4h/3 (2 f[0] - f[1] + 2 f[2])
//!    ```
//!
//! 2. **Corrector** (Simpson's rule), iterated to a fixed point:
//!    ```text
//!    y_{n+1} = y[1] + h/3 (f[1] + 4 f[0] + f(x_{n+1}, y*))
//!    ```
//!    `y*` is replaced by the corrected value until two successive iterates
//!    differ by less than epsilon.
//!
//! # Startup
//!
//! The window needs four entries, so the first three steps are taken with
//! [`RungeKutta4`](super::RungeKutta4). The driver lives in
//! [`crate::integrator`].
//!
//! # Convergence Properties
//!
//! - **Global error**: O(h⁴), Runge divisor 15
//! - The corrector is a contraction only while `h |∂f/∂y| / 3 < 1`; outside
//!   that range (stiff problems, large steps) it diverges and the iteration
//!   cap turns the hang into [`OdeError::CorrectorDivergence`].

use crate::equation::Equation;
use crate::error::{OdeError, OdeResult};
use std::collections::VecDeque;

/// Number of past points the predictor reaches back to
pub const HISTORY_LEN: usize = 4;

/// Bounded look-back window of `y` and `f` values, most recent first
#[derive(Clone, Debug)]
pub struct MilneHistory {
    y: VecDeque<f64>,
    f: VecDeque<f64>,
}

/// Outcome of a converged predict-correct step
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Correction {
    pub predicted: f64,
    pub corrected: f64,
    /// `f(x_{n+1}, corrected)`, the entry pushed into the history
    pub f_next: f64,
    pub iterations: usize,
}

impl MilneHistory {
    /// Seed the window with the initial condition
    pub fn new(y0: f64, f0: f64) -> Self {
        let mut y = VecDeque::with_capacity(HISTORY_LEN);
        let mut f = VecDeque::with_capacity(HISTORY_LEN);
        y.push_front(y0);
        f.push_front(f0);
        MilneHistory { y, f }
    }

    pub fn len(&self) -> usize {
        self.y.len()
    }

    pub fn is_empty(&self) -> bool {
        self.y.is_empty()
    }

    /// True once enough points are stored to predict
    pub fn is_ready(&self) -> bool {
        self.y.len() == HISTORY_LEN
    }

    /// Push a new point to the front, evicting the oldest one at capacity
    pub fn push(&mut self, y: f64, f: f64) {
        if self.y.len() == HISTORY_LEN {
            self.y.pop_back();
            self.f.pop_back();
        }
        self.y.push_front(y);
        self.f.push_front(f);
    }

    /// Stored `y` values, most recent first
    pub fn y_values(&self) -> impl Iterator<Item = f64> + '_ {
        self.y.iter().copied()
    }

    /// Stored `f` values, most recent first
    pub fn f_values(&self) -> impl Iterator<Item = f64> + '_ {
        self.f.iter().copied()
    }

    /// Milne predictor; `None` until the window is full
    pub fn predict(&self, h: f64) -> Option<f64> {
        if !self.is_ready() {
            return None;
        }
        Some(self.y[3] + 4.0 * h / 3.0 * (2.0 * self.f[0] - self.f[1] + 2.0 * self.f[2]))
    }

    /// Predict, then iterate the corrector at `x_next` until successive
    /// iterates differ by less than `epsilon`
    ///
    /// The history is left untouched; call [`MilneHistory::push`] with the
    /// accepted values.
    pub fn predict_correct<E: Equation + ?Sized>(
        &self,
        equation: &E,
        x_next: f64,
        h: f64,
        epsilon: f64,
        max_iterations: usize,
    ) -> OdeResult<Correction> {
        let predicted = self.predict(h).ok_or_else(|| OdeError::InvalidConfiguration {
            field: "history".to_string(),
            reason: format!("Milne predictor needs {} points, have {}", HISTORY_LEN, self.len()),
        })?;

        let base = self.y[1];
        let weighted = self.f[1] + 4.0 * self.f[0];
        let mut current = predicted;

        let mut last_change = f64::NAN;

        for iteration in 1..=max_iterations {
            // past the first pass `current` is a corrector iterate, and a
            // failure to evaluate it means the iteration ran away
            let f_new = match equation.slope(x_next, current) {
                Ok(f) => f,
                Err(e) if iteration == 1 => return Err(e),
                Err(_) => {
                    return Err(OdeError::CorrectorDivergence {
                        x: x_next,
                        iterations: iteration - 1,
                        last_change,
                    })
                }
            };
            let corrected = base + h / 3.0 * (weighted + f_new);
            let change = (corrected - current).abs();

            if !corrected.is_finite() {
                return Err(OdeError::CorrectorDivergence {
                    x: x_next,
                    iterations: iteration,
                    last_change: change,
                });
            }

            if change < epsilon {
                return Ok(Correction {
                    predicted,
                    corrected,
                    f_next: equation.slope(x_next, corrected)?,
                    iterations: iteration,
                });
            }

            if iteration == max_iterations {
                return Err(OdeError::CorrectorDivergence {
                    x: x_next,
                    iterations: iteration,
                    last_change: change,
                });
            }
            current = corrected;
            last_change = change;
        }

        // max_iterations == 0
        Err(OdeError::CorrectorDivergence {
            x: x_next,
            iterations: 0,
            last_change: f64::NAN,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn full_history() -> MilneHistory {
        // y' = y sampled exactly at x = 0, 0.1, 0.2, 0.3
        let mut history = MilneHistory::new(1.0, 1.0);
        for i in 1..=3 {
            let y = (0.1 * i as f64).exp();
            history.push(y, y);
        }
        history
    }

    #[test]
    fn test_history_is_bounded() {
        let mut history = MilneHistory::new(0.0, 0.0);
        for i in 1..10 {
            history.push(i as f64, -(i as f64));
            assert!(history.len() <= HISTORY_LEN);
        }
        let ys: Vec<f64> = history.y_values().collect();
        let fs: Vec<f64> = history.f_values().collect();
        assert_eq!(ys, vec![9.0, 8.0, 7.0, 6.0]);
        assert_eq!(fs, vec![-9.0, -8.0, -7.0, -6.0]);
    }

    #[test]
    fn test_predict_needs_full_window() {
        let mut history = MilneHistory::new(1.0, 1.0);
        history.push(2.0, 2.0);
        assert!(history.predict(0.1).is_none());

        let f = |_x: f64, y: f64| y;
        let result = history.predict_correct(&f, 0.2, 0.1, 1e-8, 10);
        assert!(matches!(result, Err(OdeError::InvalidConfiguration { .. })));
    }

    #[test]
    fn test_predict_correct_exponential() {
        let history = full_history();
        let f = |_x: f64, y: f64| y;
        let correction = history.predict_correct(&f, 0.4, 0.1, 1e-12, 100).unwrap();

        assert_relative_eq!(correction.predicted, 0.4f64.exp(), epsilon = 1e-5);
        assert_relative_eq!(correction.corrected, 0.4f64.exp(), epsilon = 1e-6);
        assert_eq!(correction.f_next, correction.corrected);
        assert!(correction.iterations >= 2);
    }

    #[test]
    fn test_corrector_divergence_is_reported() {
        let history = full_history();
        // h |df/dy| / 3 = 10, the fixed-point map expands
        let f = |_x: f64, y: f64| -300.0 * y;
        let result = history.predict_correct(&f, 0.4, 0.1, 1e-10, 25);
        match result {
            Err(OdeError::CorrectorDivergence { iterations, .. }) => assert_eq!(iterations, 25),
            other => panic!("expected divergence, got {:?}", other),
        }
    }

    #[test]
    fn test_runaway_iterate_is_divergence_not_evaluation_failure() {
        let history = full_history();
        // undefined once the iterates have blown up, long before the cap
        let f = |_x: f64, y: f64| if y.abs() > 1e6 { f64::NAN } else { -300.0 * y };
        match history.predict_correct(&f, 0.4, 0.1, 1e-10, 25) {
            Err(OdeError::CorrectorDivergence { iterations, last_change, .. }) => {
                assert!(iterations > 0 && iterations < 25);
                assert!(last_change > 1e5);
            }
            other => panic!("expected divergence, got {:?}", other),
        }
    }

    #[test]
    fn test_failure_at_predicted_point_is_evaluation_failure() {
        let history = full_history();
        let f = |x: f64, y: f64| if x > 0.35 { f64::NAN } else { y };
        let result = history.predict_correct(&f, 0.4, 0.1, 1e-10, 25);
        assert!(matches!(result, Err(OdeError::EvaluationFailure { .. })));
    }
}
