//! Multi-round table seating for the U-Engine ecosystem.
//!
//! Seats a population at tables over one or more rounds so that every
//! table carries a balanced mix of each categorical trait and, across
//! rounds, participants meet as few repeat partners as the objective
//! weights dictate.
//!
//! # Modules
//!
//! - **`models`**: Domain types: `Participant`, `Population`,
//!   `CapacityPlan`, `TraitCatalog`, `Assignment`, `SeatingSchedule`
//! - **`validation`**: Input integrity checks (missing or duplicate ids,
//!   population range, size bounds)
//! - **`mip`**: Exact MILP formulation and the `MilpSolver` backend seam
//! - **`scheduler`**: Greedy assigner and seating KPIs
//! - **`planner`**: End-to-end runs and the exact/heuristic fallback policy
//!
//! # Flow
//!
//! `CapacityPlan` → `TraitCatalog` → {`SeatingMilpBuilder` | `GreedyAssigner`}
//! → `SeatingSchedule`
//!
//! # Reference
//! Wolsey (1998), "Integer Programming"

pub mod config;
pub mod error;
pub mod mip;
pub mod models;
pub mod planner;
pub mod scheduler;
pub mod validation;

pub use config::{PenaltyWeights, PopulationBounds, SizeBounds, SolveConfig, Strategy, TraitSpec};
pub use error::SeatingError;
pub use models::Record;
pub use planner::{plan_seating, SeatingPlan, SeatingPlanner, SolveMethod};
