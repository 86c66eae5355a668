//! Table loader for whitespace-separated numeric input files.
//!
//! Each table is a stream of floating-point tokens in row-major order.
//! A table must supply every cell: a short table is an error, never a
//! matrix padded with zeros.

use std::fs;
use std::path::{Path, PathBuf};

use nalgebra::DMatrix;
use tracing::{debug, warn};

use crate::error::MvaError;
use crate::model::NetworkModel;

/// The three input tables of a network.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Table {
    /// Initial response times, N x C
    ResponseTimes,

    /// Service demands, N x C
    ServiceDemands,

    /// Task overlap coefficients, N x N
    Overlap,
}

impl Table {
    /// Returns the table name used in messages.
    pub fn name(&self) -> &'static str {
        match self {
            Table::ResponseTimes => "response time",
            Table::ServiceDemands => "service demand",
            Table::Overlap => "overlap",
        }
    }
}

impl std::fmt::Display for Table {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Upper bound on values reserved before the input proves it holds them.
const MAX_PREALLOCATED_VALUES: usize = 4096;

/// Number of cells in a `rows x cols` table, rejecting sizes that overflow.
fn cell_count(table: Table, rows: usize, cols: usize) -> Result<usize, MvaError> {
    rows.checked_mul(cols).ok_or_else(|| {
        MvaError::config(format!("{} table of {}x{} values is too large", table, rows, cols))
    })
}

/// Parses a `rows x cols` table from text.
///
/// Tokens beyond the first `rows * cols` are ignored.
pub fn parse_table(
    text: &str,
    table: Table,
    rows: usize,
    cols: usize,
) -> Result<DMatrix<f64>, MvaError> {
    let expected = cell_count(table, rows, cols)?;
    let mut tokens = text.split_whitespace();
    let mut values = Vec::with_capacity(expected.min(MAX_PREALLOCATED_VALUES));

    for position in 1..=expected {
        let token = match tokens.next() {
            Some(token) => token,
            None => {
                return Err(MvaError::ShortTable {
                    table,
                    expected,
                    found: values.len(),
                })
            }
        };
        let value = token.parse::<f64>().map_err(|_| MvaError::InvalidToken {
            table,
            position,
            token: token.to_string(),
        })?;
        values.push(value);
    }

    let surplus = tokens.count();
    if surplus > 0 {
        warn!("Ignoring {} surplus values in {} table", surplus, table);
    }

    Ok(DMatrix::from_row_slice(rows, cols, &values))
}

/// Reads a `rows x cols` table from a file.
pub fn load_table(
    path: impl AsRef<Path>,
    table: Table,
    rows: usize,
    cols: usize,
) -> Result<DMatrix<f64>, MvaError> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).map_err(|e| MvaError::io(path, e))?;
    debug!("Loading {} table ({}x{}) from {}", table, rows, cols, path.display());
    parse_table(&text, table, rows, cols)
}

/// Locations of the three input tables.
#[derive(Debug, Clone)]
pub struct ModelPaths {
    /// Initial response times for each task
    pub response: PathBuf,

    /// Service demands for each task
    pub demand: PathBuf,

    /// Task overlap matrix
    pub overlap: PathBuf,
}

impl ModelPaths {
    pub fn new(
        response: impl Into<PathBuf>,
        demand: impl Into<PathBuf>,
        overlap: impl Into<PathBuf>,
    ) -> Self {
        Self {
            response: response.into(),
            demand: demand.into(),
            overlap: overlap.into(),
        }
    }

    /// Loads all three tables and builds a validated model.
    ///
    /// Dimensions are checked before any file is opened.
    pub fn load(&self, tasks: usize, centers: usize) -> Result<NetworkModel, MvaError> {
        check_dimensions(tasks, centers)?;

        let response = load_table(&self.response, Table::ResponseTimes, tasks, centers)?;
        let demand = load_table(&self.demand, Table::ServiceDemands, tasks, centers)?;
        let overlap = load_table(&self.overlap, Table::Overlap, tasks, tasks)?;

        NetworkModel::new(overlap, demand, response)
    }
}

/// Builds a model from in-memory table text, with the same checks as
/// [`ModelPaths::load`].
pub fn parse_model(
    tasks: usize,
    centers: usize,
    response: &str,
    demand: &str,
    overlap: &str,
) -> Result<NetworkModel, MvaError> {
    check_dimensions(tasks, centers)?;

    let response = parse_table(response, Table::ResponseTimes, tasks, centers)?;
    let demand = parse_table(demand, Table::ServiceDemands, tasks, centers)?;
    let overlap = parse_table(overlap, Table::Overlap, tasks, tasks)?;

    NetworkModel::new(overlap, demand, response)
}

fn check_dimensions(tasks: usize, centers: usize) -> Result<(), MvaError> {
    if tasks == 0 {
        return Err(MvaError::config("number of tasks must be positive"));
    }
    if centers == 0 {
        return Err(MvaError::config("number of centers must be positive"));
    }
    cell_count(Table::ResponseTimes, tasks, centers)?;
    cell_count(Table::Overlap, tasks, tasks)?;
    Ok(())
}
