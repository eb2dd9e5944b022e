//! Crate error type.
//!
//! `InvalidInput` and `InfeasiblePlan` are raised before any solver call.
//! `SolverUnavailable` is the only kind a caller may recover from by
//! switching to the greedy heuristic; everything else propagates.

use thiserror::Error;

use crate::mip::SolveStatus;
use crate::validation::ValidationError;

/// Errors produced while planning a seating schedule.
#[derive(Debug, Clone, Error)]
pub enum SeatingError {
    /// The population or configuration failed validation.
    #[error("invalid input: {}", join_messages(.0))]
    InvalidInput(Vec<ValidationError>),

    /// The size bounds cannot partition the population into tables.
    #[error("infeasible plan for {participants} participants: {reason}")]
    InfeasiblePlan {
        /// Population size.
        participants: usize,
        /// Why no table count works.
        reason: String,
    },

    /// The exact solver is missing or failed to initialize.
    #[error("exact solver unavailable: {0}")]
    SolverUnavailable(String),

    /// The solver ran but produced no usable solution.
    #[error("solve failed: {message}")]
    SolveFailed {
        /// Terminal status reported by the backend; `None` if the backend
        /// errored before reaching one.
        status: Option<SolveStatus>,
        /// Backend detail.
        message: String,
    },

    /// A solved assignment could not be turned into a valid schedule.
    #[error("inconsistent assignment: {0}")]
    Inconsistent(String),
}

impl SeatingError {
    /// Whether a caller may fall back to the heuristic for this error.
    pub fn is_fallback_eligible(&self) -> bool {
        matches!(self, Self::SolverUnavailable(_))
    }

    pub(crate) fn infeasible(participants: usize, reason: impl Into<String>) -> Self {
        Self::InfeasiblePlan {
            participants,
            reason: reason.into(),
        }
    }
}

fn join_messages(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| e.message.as_str())
        .collect::<Vec<_>>()
        .join("; ")
}
