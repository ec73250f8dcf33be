// scripts/benchmark.rs
use ode_lab::math_utils::Timer;
use ode_lab::reference::max_abs_error;
use ode_lab::{compare_methods, solve, Method, MethodSet, Reference, SolverConfig};
use std::env;
use std::fs::File;
use std::io::{self, BufWriter, Write};

/// What the parallel comparison timings depend on
struct Machine {
    os: &'static str,
    cpu_cores: usize,
    rayon_threads: usize,
}

impl Machine {
    fn detect() -> Self {
        Machine {
            os: env::consts::OS,
            cpu_cores: num_cpus::get(),
            rayon_threads: rayon::current_num_threads(),
        }
    }
}

#[derive(Debug)]
struct BenchmarkResult {
    name: String,
    epsilon: f64,
    time_ms: f64,
    samples: usize,
    step: Option<f64>,
    halvings: Option<u32>,
    max_abs_error: Option<f64>,
    failure: Option<String>,
}

// y' = y + (1 + x) y², y(1) = -1, exact solution y = -1/x
fn riccati(x: f64, y: f64) -> f64 {
    y + (1.0 + x) * y * y
}

fn riccati_exact(x: f64) -> f64 {
    -1.0 / x
}

fn run_tolerance_sweep() -> Vec<BenchmarkResult> {
    let mut results = Vec::new();
    let epsilons = [1e-2, 1e-4, 1e-6, 1e-8];

    for &epsilon in &epsilons {
        println!("Running adaptive solves with epsilon = {:e}...", epsilon);
        let config = SolverConfig {
            epsilon,
            max_iterations: 200_000,
            ..Default::default()
        };

        for method in Method::ALL {
            let mut timer = Timer::new();
            timer.start();
            let result = solve(method, &riccati, &Reference::Exact(&riccati_exact), &config);
            let time_ms = timer.elapsed_ms();

            results.push(match result {
                Ok(solution) => BenchmarkResult {
                    name: method.to_string(),
                    epsilon,
                    time_ms,
                    samples: solution.trajectory.len(),
                    step: Some(solution.effective_step()),
                    halvings: Some(solution.halvings),
                    max_abs_error: max_abs_error(&solution.trajectory),
                    failure: None,
                },
                Err(e) => BenchmarkResult {
                    name: method.to_string(),
                    epsilon,
                    time_ms,
                    samples: 0,
                    step: None,
                    halvings: None,
                    max_abs_error: None,
                    failure: Some(e.to_string()),
                },
            });
        }

        let mut timer = Timer::new();
        timer.start();
        let outcomes = compare_methods(
            MethodSet::all(),
            &riccati,
            &Reference::Exact(&riccati_exact),
            &config,
        );
        let time_ms = timer.elapsed_ms();
        let failures: Vec<String> = outcomes
            .iter()
            .filter_map(|o| o.result.as_ref().err().map(|e| format!("{}: {}", o.method, e)))
            .collect();

        results.push(BenchmarkResult {
            name: "All methods (parallel)".to_string(),
            epsilon,
            time_ms,
            samples: outcomes
                .iter()
                .filter_map(|o| o.result.as_ref().ok())
                .map(|s| s.trajectory.len())
                .sum(),
            step: None,
            halvings: None,
            max_abs_error: None,
            failure: if failures.is_empty() {
                None
            } else {
                Some(failures.join("; "))
            },
        });
    }

    results
}

fn optional<T: std::fmt::Display>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_else(|| "N/A".to_string())
}

fn write_results_to_csv(
    results: &[BenchmarkResult],
    machine: &Machine,
    filename: &str,
) -> io::Result<()> {
    let mut file = BufWriter::new(File::create(filename)?);

    writeln!(
        file,
        "# {} cores on {}, {} rayon threads",
        machine.cpu_cores, machine.os, machine.rayon_threads
    )?;
    writeln!(
        file,
        "# Benchmark Date: {}",
        chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC")
    )?;
    writeln!(file, "#")?;

    writeln!(
        file,
        "Benchmark,Epsilon,Time_ms,Samples,Step,Halvings,Max_Abs_Error,Failure"
    )?;
    for result in results {
        writeln!(
            file,
            "{},{:e},{:.3},{},{},{},{},{}",
            result.name,
            result.epsilon,
            result.time_ms,
            result.samples,
            optional(result.step),
            optional(result.halvings),
            optional(result.max_abs_error),
            result
                .failure
                .as_deref()
                .unwrap_or("")
                .replace(',', ";")
        )?;
    }
    file.flush()
}

fn main() {
    env_logger::init();

    println!("ode-lab Benchmark Suite");
    println!("=======================\n");

    let machine = Machine::detect();
    println!(
        "{} cores on {}, {} rayon threads\n",
        machine.cpu_cores, machine.os, machine.rayon_threads
    );

    let results = run_tolerance_sweep();

    println!("\n{:=<96}", "");
    println!("BENCHMARK RESULTS");
    println!("{:=<96}", "");
    println!(
        "{:<24} {:>10} {:>12} {:>10} {:>12} {:>9} {:>14}",
        "Benchmark", "Epsilon", "Time (ms)", "Samples", "Step", "Halvings", "Max abs error"
    );
    println!("{:-<96}", "");

    for result in &results {
        println!(
            "{:<24} {:>10.0e} {:>12.3} {:>10} {:>12} {:>9} {:>14}",
            result.name,
            result.epsilon,
            result.time_ms,
            result.samples,
            result
                .step
                .map(|h| format!("{:.3e}", h))
                .unwrap_or_else(|| "N/A".to_string()),
            optional(result.halvings),
            result
                .max_abs_error
                .map(|e| format!("{:.3e}", e))
                .unwrap_or_else(|| "N/A".to_string())
        );
        if let Some(failure) = &result.failure {
            println!("    failed: {}", failure);
        }
    }
    println!("{:=<96}", "");

    let timestamp = chrono::Utc::now().format("%Y%m%d_%H%M%S");
    let filename = format!("benchmark_results_{}.csv", timestamp);
    match write_results_to_csv(&results, &machine, &filename) {
        Ok(()) => println!("\nResults saved to: {}", filename),
        Err(e) => eprintln!("\nCould not write {}: {}", filename, e),
    }
}
