//! The approximate MVA fixed-point solver.
//!
//! One iteration runs four passes over the working matrices, always in
//! this order:
//!
//! 1. **Reduction**: each task's residence times are reduced by the share
//!    already accounted for by overlapping tasks. `j` is the outer loop,
//!    `i` the inner one, and `R` is updated in place, so a later `j` sees
//!    rows already reduced earlier in the same pass.
//! 2. **Queue length**: `Q[j][k] = R[j][k] / Σ_k R[j][k]`.
//! 3. **Arrival queue length**: `A = θ · Q`.
//! 4. **Response time**: `R[i][k] = D[i][k] · (1 + A[i][k])`.
//!
//! The solve stops when the total of `R` moves by less than the tolerance
//! between two iterations, or fails once the iteration budget is spent.

use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::SolverConfig;
use crate::error::{MvaError, ResidenceStage};
use crate::model::NetworkModel;

/// Converged result of a solve.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Solution {
    /// Total expected response time of the job
    pub total: f64,

    /// Number of full iterations run
    pub iterations: usize,

    /// Total response time after each iteration
    pub history: Vec<f64>,

    /// Per-task, per-center response times at convergence (N x C)
    pub response: DMatrix<f64>,
}

/// Working buffers owned by a single solve.
#[derive(Debug, Clone)]
pub struct IterationState {
    /// R: current response-time estimates
    pub response: DMatrix<f64>,

    /// Q: share of each task's residence time spent at each center
    pub queue_length: DMatrix<f64>,

    /// A: queue length each task sees on arrival at each center
    pub arrival_queue: DMatrix<f64>,
}

impl IterationState {
    /// Allocates the buffers, starting from the model's initial response times.
    pub fn new(model: &NetworkModel) -> Self {
        let (tasks, centers) = (model.tasks(), model.centers());
        Self {
            response: model.initial_response().clone(),
            queue_length: DMatrix::zeros(tasks, centers),
            arrival_queue: DMatrix::zeros(tasks, centers),
        }
    }

    /// Runs one full iteration and returns the new total response time.
    pub fn advance(&mut self, model: &NetworkModel) -> Result<f64, MvaError> {
        reduce_residence_times(&mut self.response, model.overlap(), model.demand())?;
        normalize_queue_lengths(&self.response, &mut self.queue_length)?;
        aggregate_arrival_queues(model.overlap(), &self.queue_length, &mut self.arrival_queue);
        recompute_response_times(model.demand(), &self.arrival_queue, &mut self.response);
        Ok(self.total())
    }

    /// Sum of all response times.
    pub fn total(&self) -> f64 {
        self.response.sum()
    }
}

/// Step 1: reduced-population residence times.
///
/// For every target task `j` and every task `i` (including `j` itself):
/// `R[j][k] -= θ[j][i] / N * D[j][k] * R[i][k] / Σ_k R[i][k]`.
/// The normalizer is read from `R` as it stands at that moment.
pub fn reduce_residence_times(
    response: &mut DMatrix<f64>,
    overlap: &DMatrix<f64>,
    demand: &DMatrix<f64>,
) -> Result<(), MvaError> {
    let tasks = response.nrows();
    let centers = response.ncols();
    let population = tasks as f64;

    for j in 0..tasks {
        for i in 0..tasks {
            let s = response.row(i).sum();
            if s == 0.0 {
                return Err(MvaError::DegenerateResidence {
                    task: i,
                    stage: ResidenceStage::Reduction,
                });
            }

            let weight = overlap[(j, i)] / population;
            for k in 0..centers {
                let reduction = weight * demand[(j, k)] * response[(i, k)] / s;
                response[(j, k)] -= reduction;
            }
        }
    }

    Ok(())
}

/// Step 2: each task's residence times as a distribution over centers.
pub fn normalize_queue_lengths(
    response: &DMatrix<f64>,
    queue_length: &mut DMatrix<f64>,
) -> Result<(), MvaError> {
    for j in 0..response.nrows() {
        let s = response.row(j).sum();
        if s == 0.0 {
            return Err(MvaError::DegenerateResidence {
                task: j,
                stage: ResidenceStage::QueueLength,
            });
        }
        for k in 0..response.ncols() {
            queue_length[(j, k)] = response[(j, k)] / s;
        }
    }

    Ok(())
}

/// Step 3: `A[i][k] = Σ_j θ[i][j] * Q[j][k]`.
pub fn aggregate_arrival_queues(
    overlap: &DMatrix<f64>,
    queue_length: &DMatrix<f64>,
    arrival_queue: &mut DMatrix<f64>,
) {
    overlap.mul_to(queue_length, arrival_queue);
}

/// Step 4: `R[i][k] = D[i][k] * (1 + A[i][k])`.
pub fn recompute_response_times(
    demand: &DMatrix<f64>,
    arrival_queue: &DMatrix<f64>,
    response: &mut DMatrix<f64>,
) {
    for ((r, d), a) in response
        .iter_mut()
        .zip(demand.iter())
        .zip(arrival_queue.iter())
    {
        *r = d * (1.0 + a);
    }
}

/// Iterates a network model to its fixed point.
#[derive(Debug, Clone)]
pub struct MvaSolver<'a> {
    model: &'a NetworkModel,
    config: SolverConfig,
}

impl<'a> MvaSolver<'a> {
    /// Creates a solver, rejecting an invalid configuration up front.
    pub fn new(model: &'a NetworkModel, config: SolverConfig) -> Result<Self, MvaError> {
        config.validate()?;
        Ok(Self { model, config })
    }

    /// Runs the fixed-point loop.
    ///
    /// Returns the converged [`Solution`], or fails with
    /// [`MvaError::NonConvergence`] when the budget is spent,
    /// [`MvaError::Diverged`] when the total is no longer finite, or
    /// [`MvaError::DegenerateResidence`] on a zero normalizer.
    pub fn solve(&self) -> Result<Solution, MvaError> {
        info!(
            "Solving closed network: {} tasks, {} centers (eps={:e}, max_iterations={})",
            self.model.tasks(),
            self.model.centers(),
            self.config.tolerance,
            self.config.max_iterations
        );

        let mut state = IterationState::new(self.model);
        let mut previous_total = self.model.initial_total();
        let mut history = Vec::new();

        for iteration in 1..=self.config.max_iterations {
            let total = state.advance(self.model)?;

            if !total.is_finite() {
                warn!("Total response time became {} at iteration {}", total, iteration);
                return Err(MvaError::Diverged { iteration, total });
            }
            history.push(total);

            let delta = (previous_total - total).abs();
            debug!("  iter={} | R={:.6} | delta={:.3e}", iteration, total, delta);

            if delta < self.config.tolerance {
                info!("Converged after {} iterations: R = {:.6}", iteration, total);
                return Ok(Solution {
                    total,
                    iterations: iteration,
                    history,
                    response: state.response,
                });
            }

            previous_total = total;
        }

        warn!(
            "Iteration budget of {} exhausted without convergence (last R = {:.6})",
            self.config.max_iterations, previous_total
        );
        Err(MvaError::NonConvergence {
            iterations: self.config.max_iterations,
            last_total: previous_total,
        })
    }
}

/// Solves `model` with `config`.
pub fn solve(model: &NetworkModel, config: SolverConfig) -> Result<Solution, MvaError> {
    MvaSolver::new(model, config)?.solve()
}
