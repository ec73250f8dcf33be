// demos/compare_methods.rs
//
// cargo run --example compare_methods [-- configs/riccati.yaml]
use ode_lab::output::{write_outcomes, write_summary_to_csv};
use ode_lab::{
    compare_formulas, load_config, Equation, ExactSolution, ExpressionParser, MethodSet, OdeError,
    OdeResult, SolverConfig,
};
use std::io;

/// Stand-in for a real expression evaluator: knows a handful of formulas
struct FormulaCatalog;

impl ExpressionParser for FormulaCatalog {
    fn parse_equation(&self, formula: &str) -> OdeResult<Box<dyn Equation + Send + Sync>> {
        match formula.replace(' ', "").as_str() {
            "y+(1+x)*y*y" => Ok(Box::new(|x: f64, y: f64| y + (1.0 + x) * y * y)),
            "y" => Ok(Box::new(|_x: f64, y: f64| y)),
            "x+y" => Ok(Box::new(|x: f64, y: f64| x + y)),
            _ => Err(OdeError::Parse {
                formula: formula.to_string(),
                reason: "unknown formula".to_string(),
            }),
        }
    }

    fn parse_solution(&self, formula: &str) -> OdeResult<Box<dyn ExactSolution + Send + Sync>> {
        match formula.replace(' ', "").as_str() {
            "-1/x" => Ok(Box::new(|x: f64| -1.0 / x)),
            "exp(x)" => Ok(Box::new(|x: f64| x.exp())),
            "2*exp(x)-x-1" => Ok(Box::new(|x: f64| 2.0 * x.exp() - x - 1.0)),
            _ => Err(OdeError::Parse {
                formula: formula.to_string(),
                reason: "unknown formula".to_string(),
            }),
        }
    }
}

fn main() {
    env_logger::init();

    let config = match std::env::args().nth(1) {
        Some(path) => match load_config(&path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("{}", e);
                std::process::exit(1);
            }
        },
        None => SolverConfig::default(),
    };

    println!("ode-lab method comparison");
    println!("=========================\n");
    println!(
        "y' = y + (1 + x) y^2 on [{}, {}], y({}) = {}, h = {}, epsilon = {:e}\n",
        config.x_start, config.x_end, config.x_start, config.initial_y, config.step, config.epsilon
    );

    let stdout = io::stdout();
    let mut out = stdout.lock();

    match compare_formulas(
        &FormulaCatalog,
        "y + (1 + x) * y * y",
        Some("-1/x"),
        MethodSet::all(),
        &config,
    ) {
        Ok(outcomes) => {
            if let Err(e) = write_outcomes(&mut out, &outcomes) {
                eprintln!("Could not print report: {}", e);
            }
            for outcome in &outcomes {
                if let Ok(solution) = &outcome.result {
                    let points = solution.trajectory.points();
                    let head: Vec<String> = points
                        .iter()
                        .take(4)
                        .map(|(x, y)| format!("({:.4}, {:.6})", x, y))
                        .collect();
                    println!(
                        "{} curve, {} points: {}{}",
                        outcome.method,
                        points.len(),
                        head.join(" "),
                        if points.len() > 4 { " ..." } else { "" }
                    );
                }
            }
            match write_summary_to_csv("comparison_summary.csv", &outcomes) {
                Ok(()) => println!("Summary written to comparison_summary.csv"),
                Err(e) => eprintln!("Could not write summary: {}", e),
            }
        }
        Err(e) => eprintln!("Comparison unavailable: {}", e),
    }

    // A reference that cannot be parsed only empties the error column
    println!("\nWith an unparsable reference:");
    let exp_config = SolverConfig {
        x_start: 0.0,
        x_end: 1.0,
        step: 0.25,
        epsilon: 1e-6,
        initial_y: 1.0,
        ..Default::default()
    };
    match compare_formulas(
        &FormulaCatalog,
        "y",
        Some("exp(x"),
        MethodSet::RUNGE_KUTTA_4 | MethodSet::MILNE,
        &exp_config,
    ) {
        Ok(outcomes) => {
            if let Err(e) = write_outcomes(&mut out, &outcomes) {
                eprintln!("Could not print report: {}", e);
            }
        }
        Err(e) => eprintln!("Comparison unavailable: {}", e),
    }

    // An equation that cannot be parsed makes the comparison unavailable
    if let Err(e) = compare_formulas(&FormulaCatalog, "y +* x", None, MethodSet::all(), &config) {
        println!("\nRejected equation: {}", e);
    }
}
