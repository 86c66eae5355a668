//! JSON report of a solve, for scripting and CI.

use mva_core::{MvaError, Solution};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Outcome class of a solve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SolveStatus {
    Converged,
    NotConverged,
    Diverged,
    Failed,
}

/// Complete record of one solve.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SolveReport {
    pub status: SolveStatus,

    /// Number of tasks N
    pub tasks: usize,

    /// Number of service centers C
    pub centers: usize,

    /// Convergence tolerance
    pub tolerance: f64,

    /// Iterations run (converged, or up to the failure)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iterations: Option<usize>,

    /// Total response time (converged, or the last one computed)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total: Option<f64>,

    /// Total response time after each iteration
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub history: Vec<f64>,

    /// Converged per-task, per-center response times, one row per task
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub response: Vec<Vec<f64>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SolveReport {
    /// Builds a report from the outcome of a solve.
    pub fn new(
        tasks: usize,
        centers: usize,
        tolerance: f64,
        outcome: &Result<Solution, MvaError>,
    ) -> Self {
        let mut report = Self {
            status: SolveStatus::Failed,
            tasks,
            centers,
            tolerance,
            iterations: None,
            total: None,
            history: Vec::new(),
            response: Vec::new(),
            error: None,
        };

        match outcome {
            Ok(solution) => {
                report.status = SolveStatus::Converged;
                report.iterations = Some(solution.iterations);
                report.total = Some(solution.total);
                report.history = solution.history.clone();
                report.response = solution
                    .response
                    .row_iter()
                    .map(|row| row.iter().copied().collect())
                    .collect();
            }
            Err(e) => {
                match e {
                    MvaError::NonConvergence { iterations, last_total } => {
                        report.status = SolveStatus::NotConverged;
                        report.iterations = Some(*iterations);
                        report.total = Some(*last_total);
                    }
                    MvaError::Diverged { iteration, .. } => {
                        report.status = SolveStatus::Diverged;
                        report.iterations = Some(*iteration);
                    }
                    _ => {}
                }
                report.error = Some(e.to_string());
            }
        }

        report
    }

    /// The one-line result printed by the command line tool.
    pub fn summary_line(&self) -> Option<String> {
        match self.status {
            SolveStatus::Converged => self.total.map(|total| format!("R: {:.6}", total)),
            _ => None,
        }
    }

    /// Writes to a JSON file.
    pub fn write_to_file(&self, path: impl AsRef<Path>) -> std::io::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        let mut file = File::create(path)?;
        file.write_all(json.as_bytes())?;
        Ok(())
    }
}
