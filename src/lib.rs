//! # ode-lab: Classical Solvers for Scalar ODEs
//!
//! Numerical solutions of a first-order initial value problem
//! ```text
//! y' = f(x, y),   y(x_0) = y_0,   x ∈ [x_0, x_1]
//! ```
//! with three classical methods compared side by side, optionally against a
//! known closed-form solution.
//!
//! ## Key Features
//!
//! - **Three methods**: explicit Euler, classical Runge-Kutta 4, Milne predictor-corrector
//! - **Runge's rule**: step-doubling error estimates with global step halving
//! - **Reference comparison**: per-sample absolute error against `g(x)`
//! - **Independent solves**: methods run in parallel, failures stay local
//! - **Diagnostics**: per-step slopes, stage increments and corrector counts
//!
//! ## Quick Start
//!
//! ```rust
//! use ode_lab::{solve, Method, Reference, SolverConfig};
//!
//! // y' = y, y(0) = 1 on [0, 1]
//! let config = SolverConfig {
//!     x_start: 0.0,
//!     x_end: 1.0,
//!     step: 0.25,
//!     epsilon: 1e-6,
//!     initial_y: 1.0,
//!     ..Default::default()
//! };
//!
//! let f = |_x: f64, y: f64| y;
//! let g = |x: f64| x.exp();
//!
//! let solution = solve(Method::RungeKutta4, &f, &Reference::Exact(&g), &config)
//!     .expect("Valid configuration");
//! let last = solution.trajectory.last().unwrap();
//! println!("y(1) = {:.6}, h = {}", last.y, solution.effective_step());
//! ```
//!
//! ## Error Control
//!
//! Every attempt integrates twice, at `h` and `h / 2`, and estimates the error
//! at shared points as `|y_h - y_{h/2}| / (2^p - 1)` with `p` the order of the
//! method. Any estimate above epsilon restarts the whole interval at half the
//! step.

// Module declarations
pub mod adaptive;
pub mod compare;
pub mod config;
pub mod equation;
pub mod error;
pub mod integrator;
pub mod math_utils;
pub mod output;
pub mod reference;
pub mod solvers;
pub mod trajectory;

// Re-export commonly used types for convenience
pub use adaptive::{runge_estimate, solve_adaptive, AdaptiveSolution};
pub use compare::{compare_formulas, compare_methods, solve, ExpressionParser, MethodOutcome, MethodSet};
pub use config::{load_config, SolverConfig};
pub use equation::{Equation, ExactSolution};
pub use error::{OdeError, OdeResult};
pub use integrator::integrate;
pub use reference::Reference;
pub use solvers::Method;
pub use trajectory::{Diagnostics, Sample, Trajectory};
