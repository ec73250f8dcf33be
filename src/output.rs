// src/output.rs
//! Diagnostic tables and CSV export
//!
//! The text layout is for people reading a terminal; nothing parses it back.

use crate::adaptive::AdaptiveSolution;
use crate::compare::MethodOutcome;
use crate::reference::max_abs_error;
use crate::solvers::Method;
use crate::trajectory::{Sample, Trajectory};
use chrono::Utc;
use std::fs::File;
use std::io::{self, BufWriter, Write};

/// Method-specific columns, in display order
pub fn diagnostic_columns(method: Method) -> &'static [&'static str] {
    match method {
        Method::Euler => &["f_xy"],
        Method::RungeKutta4 => &["k1", "k2", "k3", "k4"],
        Method::Milne => &["predicted", "corrected", "iterations"],
    }
}

fn optional(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{:>12.3e}", v),
        None => format!("{:>12}", "-"),
    }
}

fn diagnostic_cell(sample: &Sample, column: &str) -> String {
    match sample.diagnostics.get(column) {
        Some(v) if column == "iterations" => format!("{:>12}", v as usize),
        Some(v) => format!("{:>12.6}", v),
        None => format!("{:>12}", "-"),
    }
}

/// Table header line for `method`
pub fn format_header(method: Method) -> String {
    let mut line = format!("{:>5} {:>12} {:>12}", "i", "x_i", "y_i");
    for column in diagnostic_columns(method) {
        line.push_str(&format!(" {:>12}", column));
    }
    line.push_str(&format!(" {:>12} {:>12}", "abs_err", "runge"));
    line
}

/// One table row
pub fn format_row(method: Method, sample: &Sample) -> String {
    let mut line = format!("{:>5} {:>12.6} {:>12.6}", sample.iteration, sample.x, sample.y);
    for column in diagnostic_columns(method) {
        line.push(' ');
        line.push_str(&diagnostic_cell(sample, column));
    }
    line.push(' ');
    line.push_str(&optional(sample.abs_error));
    line.push(' ');
    line.push_str(&optional(sample.runge_error));
    line
}

/// Full table of an accepted solution
pub fn write_table<W: Write>(out: &mut W, solution: &AdaptiveSolution) -> io::Result<()> {
    let trajectory = &solution.trajectory;
    writeln!(out, "Solving {}:", trajectory.method)?;
    writeln!(out, "{}", format_header(trajectory.method))?;
    for sample in &trajectory.samples {
        writeln!(out, "{}", format_row(trajectory.method, sample))?;
    }
    writeln!(
        out,
        "h = {:e} (requested {:e}, {} halvings), Runge estimate = {:e}, max abs error = {}",
        trajectory.step,
        solution.requested_step,
        solution.halvings,
        solution.runge_estimate,
        optional(max_abs_error(trajectory)).trim()
    )
}

pub fn format_table(solution: &AdaptiveSolution) -> String {
    let mut buffer = Vec::new();
    // writing into a Vec cannot fail
    let _ = write_table(&mut buffer, solution);
    String::from_utf8_lossy(&buffer).into_owned()
}

/// Tables for every outcome; failed methods get a one-line notice
pub fn write_outcomes<W: Write>(out: &mut W, outcomes: &[MethodOutcome]) -> io::Result<()> {
    for outcome in outcomes {
        match &outcome.result {
            Ok(solution) => write_table(out, solution)?,
            Err(e) => writeln!(out, "{}: unavailable ({})", outcome.method, e)?,
        }
        writeln!(out)?;
    }
    Ok(())
}

/// Write the samples of a trajectory as CSV
pub fn write_trajectory_csv<W: Write>(out: &mut W, trajectory: &Trajectory) -> io::Result<()> {
    let columns = diagnostic_columns(trajectory.method);
    write!(out, "iteration,x,y,abs_error,runge_error")?;
    for column in columns {
        write!(out, ",{}", column)?;
    }
    writeln!(out)?;

    for sample in &trajectory.samples {
        write!(
            out,
            "{},{},{},{},{}",
            sample.iteration,
            sample.x,
            sample.y,
            sample.abs_error.map_or(String::new(), |v| v.to_string()),
            sample.runge_error.map_or(String::new(), |v| v.to_string())
        )?;
        for column in columns {
            let value = sample.diagnostics.get(column);
            write!(out, ",{}", value.map_or(String::new(), |v| v.to_string()))?;
        }
        writeln!(out)?;
    }
    Ok(())
}

pub fn write_trajectory_to_csv(filename: &str, trajectory: &Trajectory) -> io::Result<()> {
    let mut file = BufWriter::new(File::create(filename)?);
    write_trajectory_csv(&mut file, trajectory)?;
    file.flush()
}

/// Key/value summary of a comparison
pub fn summary_rows(outcomes: &[MethodOutcome]) -> Vec<(String, String)> {
    let mut rows = vec![("generated_at".to_string(), Utc::now().to_rfc3339())];
    for outcome in outcomes {
        let prefix = format!("{:?}", outcome.method).to_lowercase();
        match &outcome.result {
            Ok(solution) => {
                let trajectory = &solution.trajectory;
                if let Some(last) = trajectory.last() {
                    rows.push((format!("{}.x_end", prefix), last.x.to_string()));
                    rows.push((format!("{}.y_end", prefix), last.y.to_string()));
                }
                rows.push((format!("{}.step", prefix), trajectory.step.to_string()));
                rows.push((format!("{}.halvings", prefix), solution.halvings.to_string()));
                rows.push((
                    format!("{}.runge_estimate", prefix),
                    solution.runge_estimate.to_string(),
                ));
                if let Some(err) = max_abs_error(trajectory) {
                    rows.push((format!("{}.max_abs_error", prefix), err.to_string()));
                }
            }
            Err(e) => rows.push((format!("{}.error", prefix), e.to_string().replace(',', ";"))),
        }
    }
    rows
}

pub fn write_summary_to_csv(filename: &str, outcomes: &[MethodOutcome]) -> io::Result<()> {
    let mut file = BufWriter::new(File::create(filename)?);
    for (key, value) in summary_rows(outcomes) {
        writeln!(file, "{},{}", key, value)?;
    }
    file.flush()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trajectory::Diagnostics;

    #[test]
    fn test_header_columns_per_method() {
        assert!(format_header(Method::Euler).contains("f_xy"));
        let rk = format_header(Method::RungeKutta4);
        assert!(rk.contains("k1") && rk.contains("k4"));
        assert!(format_header(Method::Milne).contains("iterations"));
    }

    #[test]
    fn test_row_marks_missing_values() {
        let sample = Sample::new(0, 0.0, 1.0, Diagnostics::Initial);
        let row = format_row(Method::RungeKutta4, &sample);
        // four k columns plus abs_err and runge
        assert_eq!(row.matches(" -").count(), 6);
    }

    #[test]
    fn test_row_prints_iteration_count_as_integer() {
        let sample = Sample::new(
            5,
            0.5,
            1.6,
            Diagnostics::Milne {
                predicted: 1.59,
                corrected: 1.6,
                iterations: 3,
            },
        );
        let row = format_row(Method::Milne, &sample);
        assert!(row.split_whitespace().any(|cell| cell == "3"));
        assert!(row.contains("1.590000"));
    }

    #[test]
    fn test_table_and_csv_for_solution() {
        let f = |_x: f64, y: f64| y;
        let config = crate::config::SolverConfig {
            x_start: 0.0,
            x_end: 1.0,
            step: 0.25,
            epsilon: 1e-4,
            initial_y: 1.0,
            ..Default::default()
        };
        let solution = crate::adaptive::solve_adaptive(Method::RungeKutta4, &f, &config).unwrap();

        let table = format_table(&solution);
        assert!(table.starts_with("Solving Runge-Kutta 4:"));
        // title, header, five samples, footer
        assert_eq!(table.lines().count(), 8);

        let mut csv = Vec::new();
        write_trajectory_csv(&mut csv, &solution.trajectory).unwrap();
        let csv = String::from_utf8(csv).unwrap();
        let mut lines = csv.lines();
        assert_eq!(
            lines.next(),
            Some("iteration,x,y,abs_error,runge_error,k1,k2,k3,k4")
        );
        assert_eq!(lines.next(), Some("0,0,1,,0,,,,"));
        assert_eq!(lines.count(), 4);
    }
}
