//! MAKVA Core - Approximate Mean Value Analysis for closed queueing networks
//!
//! Estimates the total response time of a job made of several concurrent
//! tasks that contend for the same service centers, following the modified
//! MVA of Mak & Lundstrom (1990) and Liang & Tripathi (2000):
//! 1. **Load**: task/center counts, tolerance, overlap θ, demands D, initial R
//! 2. **Iterate**: reduction, queue length, arrival queue length, response time
//! 3. **Report**: the converged total response time
//!
//! ```ignore
//! use mva_core::{ModelPaths, SolverConfig, solve};
//!
//! let model = ModelPaths::new("response.txt", "demand.txt", "overlap.txt").load(4, 1)?;
//! let solution = solve(&model, SolverConfig::new(1e-6))?;
//! println!("R: {:.6}", solution.total);
//! ```

pub mod config;
pub mod error;
pub mod loader;
pub mod model;
pub mod solver;

// Re-export key types for convenience
pub use config::SolverConfig;
pub use error::{MvaError, ResidenceStage};
pub use loader::{ModelPaths, Table};
pub use model::NetworkModel;
pub use solver::{solve, IterationState, MvaSolver, Solution};
