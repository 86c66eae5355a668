//! The closed queueing network handed to the solver.

use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};

use crate::error::MvaError;

/// Fully-formed numeric description of a closed multi-task network.
///
/// Rows index tasks, columns index service centers. All three matrices
/// are fixed once the model is built; the solver copies the initial
/// response times into its own working buffer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkModel {
    /// Task overlap coefficients θ (N x N)
    overlap: DMatrix<f64>,

    /// Service demands D (N x C)
    demand: DMatrix<f64>,

    /// Measured or estimated response times used as the starting point (N x C)
    initial_response: DMatrix<f64>,
}

impl NetworkModel {
    /// Builds a model, checking that the matrix shapes agree.
    ///
    /// # Arguments
    /// * `overlap` - θ, N x N
    /// * `demand` - D, N x C
    /// * `initial_response` - starting R, N x C
    pub fn new(
        overlap: DMatrix<f64>,
        demand: DMatrix<f64>,
        initial_response: DMatrix<f64>,
    ) -> Result<Self, MvaError> {
        let tasks = demand.nrows();
        let centers = demand.ncols();

        if tasks == 0 {
            return Err(MvaError::config("number of tasks must be positive"));
        }
        if centers == 0 {
            return Err(MvaError::config("number of centers must be positive"));
        }
        if initial_response.shape() != (tasks, centers) {
            return Err(MvaError::config(format!(
                "response time matrix is {}x{}, expected {}x{}",
                initial_response.nrows(),
                initial_response.ncols(),
                tasks,
                centers
            )));
        }
        if overlap.shape() != (tasks, tasks) {
            return Err(MvaError::config(format!(
                "overlap matrix is {}x{}, expected {}x{}",
                overlap.nrows(),
                overlap.ncols(),
                tasks,
                tasks
            )));
        }

        Ok(Self {
            overlap,
            demand,
            initial_response,
        })
    }

    /// Builds a model from row-major slices.
    pub fn from_row_slices(
        tasks: usize,
        centers: usize,
        overlap: &[f64],
        demand: &[f64],
        initial_response: &[f64],
    ) -> Result<Self, MvaError> {
        let too_large = || MvaError::config(format!("{tasks}x{centers} network is too large"));
        let square = tasks.checked_mul(tasks).ok_or_else(too_large)?;
        let cells = tasks.checked_mul(centers).ok_or_else(too_large)?;

        check_len("overlap", overlap.len(), square)?;
        check_len("service demand", demand.len(), cells)?;
        check_len("response time", initial_response.len(), cells)?;

        Self::new(
            DMatrix::from_row_slice(tasks, tasks, overlap),
            DMatrix::from_row_slice(tasks, centers, demand),
            DMatrix::from_row_slice(tasks, centers, initial_response),
        )
    }

    /// Number of tasks N.
    pub fn tasks(&self) -> usize {
        self.demand.nrows()
    }

    /// Number of service centers C.
    pub fn centers(&self) -> usize {
        self.demand.ncols()
    }

    pub fn overlap(&self) -> &DMatrix<f64> {
        &self.overlap
    }

    pub fn demand(&self) -> &DMatrix<f64> {
        &self.demand
    }

    pub fn initial_response(&self) -> &DMatrix<f64> {
        &self.initial_response
    }

    /// Total of the initial response times; the first `R_prev`.
    pub fn initial_total(&self) -> f64 {
        self.initial_response.sum()
    }
}

fn check_len(name: &str, actual: usize, expected: usize) -> Result<(), MvaError> {
    if actual != expected {
        return Err(MvaError::config(format!(
            "{name} data has {actual} values, expected {expected}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_dimensions() {
        let model = NetworkModel::from_row_slices(
            2,
            3,
            &[1.0, 0.5, 0.5, 1.0],
            &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0],
            &[1.0; 6],
        )
        .unwrap();

        assert_eq!(model.tasks(), 2);
        assert_eq!(model.centers(), 3);
        assert_eq!(model.demand()[(1, 2)], 6.0);
        assert_eq!(model.overlap()[(0, 1)], 0.5);
        assert_eq!(model.initial_total(), 6.0);
    }

    #[test]
    fn test_rejects_empty_dimensions() {
        let err = NetworkModel::new(
            DMatrix::zeros(0, 0),
            DMatrix::zeros(0, 2),
            DMatrix::zeros(0, 2),
        )
        .unwrap_err();
        assert!(matches!(err, MvaError::InvalidConfig(_)));

        let err = NetworkModel::new(
            DMatrix::identity(2, 2),
            DMatrix::zeros(2, 0),
            DMatrix::zeros(2, 0),
        )
        .unwrap_err();
        assert!(matches!(err, MvaError::InvalidConfig(_)));
    }

    #[test]
    fn test_rejects_mismatched_shapes() {
        let err = NetworkModel::new(
            DMatrix::identity(3, 3),
            DMatrix::zeros(2, 2),
            DMatrix::zeros(2, 2),
        )
        .unwrap_err();
        assert!(err.to_string().contains("overlap matrix is 3x3"));

        let err = NetworkModel::new(
            DMatrix::identity(2, 2),
            DMatrix::zeros(2, 2),
            DMatrix::zeros(2, 3),
        )
        .unwrap_err();
        assert!(err.to_string().contains("response time matrix is 2x3"));

        let err = NetworkModel::from_row_slices(2, 2, &[1.0; 4], &[1.0; 3], &[1.0; 4]).unwrap_err();
        assert!(matches!(err, MvaError::InvalidConfig(_)));

        let err = NetworkModel::from_row_slices(usize::MAX, 2, &[], &[], &[]).unwrap_err();
        assert!(err.to_string().contains("too large"));
    }
}
