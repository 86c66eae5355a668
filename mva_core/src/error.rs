//! Error types for the MVA solver.

use std::path::PathBuf;
use thiserror::Error;

use crate::loader::Table;

/// Iteration step in which a residence-time normalizer was found to be zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResidenceStage {
    /// Step 1: reduced-population residence times
    Reduction,

    /// Step 2: queue-length normalization
    QueueLength,
}

impl std::fmt::Display for ResidenceStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResidenceStage::Reduction => write!(f, "residence-time reduction"),
            ResidenceStage::QueueLength => write!(f, "queue-length normalization"),
        }
    }
}

/// Errors that can occur while loading a network or solving it.
#[derive(Debug, Error)]
pub enum MvaError {
    /// Non-positive dimensions, bad tolerance, zero iteration budget or
    /// mismatched matrix shapes. Raised before any iteration runs.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// An input table ran out of values before it was filled
    #[error("Malformed {table} table: expected {expected} values, found {found}")]
    ShortTable {
        table: Table,
        expected: usize,
        found: usize,
    },

    /// An input table contains something that is not a number
    #[error("Malformed {table} table: token #{position} '{token}' is not a number")]
    InvalidToken {
        table: Table,
        position: usize,
        token: String,
    },

    /// Reading an input table failed
    #[error("I/O error at '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A task's total residence time is exactly zero, so it cannot be
    /// used as a normalizer
    #[error("Degenerate network: task {task} has zero total residence time during {stage}")]
    DegenerateResidence { task: usize, stage: ResidenceStage },

    /// The iteration budget ran out before the tolerance was met
    #[error("No convergence after {iterations} iterations (last total response time {last_total})")]
    NonConvergence { iterations: usize, last_total: f64 },

    /// The total response time stopped being a finite number
    #[error("Solver diverged at iteration {iteration} (total response time {total})")]
    Diverged { iteration: usize, total: f64 },
}

impl MvaError {
    /// Creates a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }

    /// Creates an I/O error for the given path.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// True for the outcomes where the iteration itself failed to settle.
    pub fn is_convergence_failure(&self) -> bool {
        matches!(self, MvaError::NonConvergence { .. } | MvaError::Diverged { .. })
    }
}
