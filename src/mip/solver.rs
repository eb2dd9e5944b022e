//! Solver interface.
//!
//! Any integer/linear programming backend can be plugged in by
//! implementing [`MilpSolver`]. The seating model only submits a
//! [`LinearProgram`] and reads back one value per variable.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

use super::LinearProgram;

/// Terminal status of a solve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SolveStatus {
    /// Proven optimal.
    Optimal,
    /// No feasible point exists.
    Infeasible,
    /// Objective unbounded below.
    Unbounded,
    /// Stopped by the time limit before proving optimality. Values are
    /// present if a feasible point was found first.
    TimeLimit,
}

/// Result of a solve that ran to a terminal status.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MilpSolution {
    /// Terminal status.
    pub status: SolveStatus,
    /// One value per variable (indexed by `VarId`); empty when no
    /// feasible point is known.
    pub values: Vec<f64>,
    /// Objective value at `values`.
    pub objective: f64,
}

impl MilpSolution {
    /// An optimal solution.
    pub fn optimal(values: Vec<f64>, objective: f64) -> Self {
        Self {
            status: SolveStatus::Optimal,
            values,
            objective,
        }
    }

    /// The best feasible point found before the time limit.
    pub fn incumbent(values: Vec<f64>, objective: f64) -> Self {
        Self {
            status: SolveStatus::TimeLimit,
            values,
            objective,
        }
    }

    /// A terminal status without a usable point.
    pub fn without_values(status: SolveStatus) -> Self {
        Self {
            status,
            values: Vec::new(),
            objective: f64::NAN,
        }
    }

    /// Whether the solution is optimal.
    #[inline]
    pub fn is_optimal(&self) -> bool {
        self.status == SolveStatus::Optimal
    }

    /// Whether a feasible point is attached.
    #[inline]
    pub fn has_values(&self) -> bool {
        !self.values.is_empty()
    }

    /// Reads a binary variable (threshold 0.5).
    #[inline]
    pub fn is_set(&self, var: super::VarId) -> bool {
        self.values.get(var.0).copied().unwrap_or(0.0) > 0.5
    }
}

/// Solve limits.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SolverLimits {
    /// Wall-clock limit. `None` = unbounded.
    pub time_limit: Option<Duration>,
}

impl SolverLimits {
    /// Limits from an optional millisecond budget.
    pub fn from_ms(limit_ms: Option<u64>) -> Self {
        Self {
            time_limit: limit_ms.map(Duration::from_millis),
        }
    }
}

/// Failure to obtain any terminal status from a backend.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SolverError {
    /// The backend is not compiled in or could not start.
    #[error("solver unavailable: {0}")]
    Unavailable(String),
    /// The backend failed with an error of its own.
    #[error("solver backend error: {0}")]
    Backend(String),
}

/// A mixed-integer linear program solver (always minimizes).
pub trait MilpSolver: Send + Sync {
    /// Backend name, for logging.
    fn name(&self) -> &'static str;

    /// Solves `program` within `limits`.
    fn solve(&self, program: &LinearProgram, limits: &SolverLimits)
        -> Result<MilpSolution, SolverError>;
}

/// A solver stand-in that is never available.
///
/// Used when no backend is compiled in, and to exercise fallback paths.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnavailableSolver;

impl MilpSolver for UnavailableSolver {
    fn name(&self) -> &'static str {
        "unavailable"
    }

    fn solve(
        &self,
        _program: &LinearProgram,
        _limits: &SolverLimits,
    ) -> Result<MilpSolution, SolverError> {
        Err(SolverError::Unavailable(
            "no MILP backend compiled in (enable the `microlp` feature)".into(),
        ))
    }
}
