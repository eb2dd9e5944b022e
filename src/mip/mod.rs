//! Exact mixed-integer formulation of the seating problem.
//!
//! The model is assembled into a backend-neutral [`LinearProgram`] and
//! handed to a [`MilpSolver`]. The bundled backend ([`MicroLpSolver`],
//! feature `microlp`) runs `good_lp` over a pure-Rust branch and bound;
//! any other backend plugs in behind the same trait.
//!
//! # Modules
//!
//! - **`program`**: variables, sparse expressions, constraints
//! - **`solver`**: the [`MilpSolver`] seam, statuses, and limits
//! - **`builder`**: the seating formulation and its decoding
//!
//! # Reference
//! Wolsey (1998), "Integer Programming"

mod builder;
#[cfg(feature = "microlp")]
mod microlp;
mod program;
mod solver;

pub use builder::{
    DeviationReading, DeviationTerm, DeviationVars, ExactOutcome, SeatingMilpBuilder, SeatingModel,
};
#[cfg(feature = "microlp")]
pub use microlp::MicroLpSolver;
pub use program::{LinearConstraint, LinearExpr, LinearProgram, Relation, VarDef, VarId, VarKind};
pub use solver::{MilpSolution, MilpSolver, SolveStatus, SolverError, SolverLimits, UnavailableSolver};

/// The default exact solver for this build, if any backend is compiled in.
pub fn default_solver() -> Box<dyn MilpSolver> {
    #[cfg(feature = "microlp")]
    {
        Box::new(MicroLpSolver::new())
    }
    #[cfg(not(feature = "microlp"))]
    {
        Box::new(UnavailableSolver)
    }
}
