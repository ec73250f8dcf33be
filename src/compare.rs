// src/compare.rs
//! Running several methods on one problem
//!
//! Each method is an independent solve: its own passes, its own buffers, its
//! own `Result`. `compare_methods` hands one task per method to rayon, so a
//! slow or failing method never delays or spoils the others.

use crate::adaptive::{solve_adaptive, AdaptiveSolution};
use crate::config::SolverConfig;
use crate::equation::{Equation, ExactSolution};
use crate::error::OdeResult;
use crate::reference::{annotate, Reference};
use crate::solvers::Method;
use bitflags::bitflags;
use rayon::prelude::*;

bitflags! {
    /// Selection of methods to run together
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct MethodSet: u32 {
        const EULER         = 1 << 0;
        const RUNGE_KUTTA_4 = 1 << 1;
        const MILNE         = 1 << 2;
    }
}

impl MethodSet {
    /// Selected methods in canonical order
    pub fn methods(self) -> Vec<Method> {
        Method::ALL
            .into_iter()
            .filter(|m| self.contains(MethodSet::from(*m)))
            .collect()
    }
}

impl From<Method> for MethodSet {
    fn from(method: Method) -> Self {
        match method {
            Method::Euler => MethodSet::EULER,
            Method::RungeKutta4 => MethodSet::RUNGE_KUTTA_4,
            Method::Milne => MethodSet::MILNE,
        }
    }
}

/// Result of one method within a comparison
#[derive(Debug)]
pub struct MethodOutcome {
    pub method: Method,
    pub result: OdeResult<AdaptiveSolution>,
}

/// Boundary to an expression evaluator
///
/// The engine ships no parser; a host plugs one in here.
pub trait ExpressionParser {
    fn parse_equation(&self, formula: &str) -> OdeResult<Box<dyn Equation + Send + Sync>>;
    fn parse_solution(&self, formula: &str) -> OdeResult<Box<dyn ExactSolution + Send + Sync>>;
}

/// Adaptive solve of one method, annotated against `reference`
pub fn solve<E: Equation + ?Sized>(
    method: Method,
    equation: &E,
    reference: &Reference<'_>,
    config: &SolverConfig,
) -> OdeResult<AdaptiveSolution> {
    let mut solution = solve_adaptive(method, equation, config)?;
    annotate(&mut solution.trajectory, reference);
    Ok(solution)
}

/// Solve every method in `methods` independently, in parallel
pub fn compare_methods<E: Equation + Sync + ?Sized>(
    methods: MethodSet,
    equation: &E,
    reference: &Reference<'_>,
    config: &SolverConfig,
) -> Vec<MethodOutcome> {
    methods
        .methods()
        .into_par_iter()
        .map(|method| {
            let result = solve(method, equation, reference, config);
            if let Err(e) = &result {
                log::warn!("{} solve failed: {}", method, e);
            }
            MethodOutcome { method, result }
        })
        .collect()
}

/// Parse the formulas, then compare methods
///
/// An equation that fails to parse makes the whole comparison unavailable.
/// A reference that fails to parse only empties the error column.
pub fn compare_formulas<P: ExpressionParser + ?Sized>(
    parser: &P,
    equation_text: &str,
    reference_text: Option<&str>,
    methods: MethodSet,
    config: &SolverConfig,
) -> OdeResult<Vec<MethodOutcome>> {
    let equation = parser.parse_equation(equation_text)?;
    let parsed_reference = reference_text.map(|text| parser.parse_solution(text));

    let reference = match &parsed_reference {
        None => Reference::Absent,
        Some(Ok(solution)) => Reference::Exact(&**solution),
        Some(Err(e)) => {
            log::warn!("reference solution unavailable: {}", e);
            Reference::Unavailable(e)
        }
    };

    Ok(compare_methods(methods, &*equation, &reference, config))
}
