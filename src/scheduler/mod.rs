//! Greedy seating and KPI evaluation.
//!
//! Provides the heuristic assigner used when no exact solver is available
//! (or not wanted), and seating quality metrics for any assignment.
//!
//! # Algorithm
//!
//! `GreedyAssigner` seats participants rarest-first, each at the open
//! table where their values are least represented. It is fast and always
//! respects planned capacities, but it is not optimal and does not avoid
//! repeat meetings across rounds.
//!
//! # KPI
//!
//! `SeatingKpi` computes diversity, deviation penalty, and pair-meeting
//! counts.

mod greedy;
mod kpi;

pub use greedy::GreedyAssigner;
pub use kpi::SeatingKpi;
