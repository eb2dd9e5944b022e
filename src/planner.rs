//! End-to-end seating runs.
//!
//! Wires the stages together: ingestion and validation, capacity
//! planning, trait catalog, exact or greedy assignment, and extraction.
//! The fallback policy lives here and nowhere else: only a
//! `SolverUnavailable` error under [`Strategy::ExactOrHeuristic`] switches
//! to the heuristic; every other error propagates. A time limit that
//! passes after a feasible point was found keeps that point and marks the
//! plan [`SolveMethod::ExactTimeLimited`]; one that passes before is a
//! `SolveFailed` error.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::config::{SolveConfig, Strategy};
use crate::error::SeatingError;
use crate::mip::{default_solver, MilpSolver, SeatingMilpBuilder, SolverLimits};
use crate::models::{
    Assignment, CapacityPlan, Population, Record, ScheduleScore, SeatingSchedule, TraitCatalog,
};
use crate::scheduler::{GreedyAssigner, SeatingKpi};

/// How an assignment was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SolveMethod {
    /// Proven optimum of the exact model.
    Exact,
    /// Best feasible point of the exact model found before the time limit.
    ExactTimeLimited,
    /// Greedy heuristic.
    Heuristic,
}

/// Result of a seating run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeatingPlan {
    /// Extracted schedule tables and score.
    pub schedule: SeatingSchedule,
    /// The raw assignment.
    pub assignment: Assignment,
    /// Table count and capacities used.
    pub capacity: CapacityPlan,
    /// Quality metrics of the assignment.
    pub kpi: SeatingKpi,
    /// Which method produced the assignment.
    pub method: SolveMethod,
    /// Why the heuristic replaced the exact solver, if it did.
    pub fallback_reason: Option<String>,
}

impl SeatingPlan {
    /// Whether the result falls short of a proven exact optimum that was
    /// asked for: the heuristic replaced the solver, or the solver stopped
    /// at its time limit.
    pub fn is_degraded(&self) -> bool {
        self.fallback_reason.is_some() || self.method == SolveMethod::ExactTimeLimited
    }
}

/// Runs seating plans under one configuration.
///
/// # Example
///
/// ```
/// use u_seating::{Record, SeatingPlanner, SolveConfig, Strategy};
///
/// let records: Vec<Record> = (0..8)
///     .map(|i| {
///         Record::from([
///             ("Participant_ID".to_string(), format!("P{i}")),
///             ("Color".to_string(), if i % 2 == 0 { "Red" } else { "Blue" }.to_string()),
///         ])
///     })
///     .collect();
/// let config = SolveConfig::new()
///     .with_table_size(4, 4)
///     .with_strategy(Strategy::Heuristic);
///
/// let plan = SeatingPlanner::new(config).plan(&records).unwrap();
/// assert_eq!(plan.capacity.table_count(), 2);
/// assert_eq!(plan.schedule.participants.len(), 8);
/// ```
pub struct SeatingPlanner {
    config: SolveConfig,
    solver: Box<dyn MilpSolver>,
}

impl SeatingPlanner {
    /// Creates a planner using the default backend of this build.
    pub fn new(config: SolveConfig) -> Self {
        Self {
            config,
            solver: default_solver(),
        }
    }

    /// Replaces the exact solver backend.
    pub fn with_solver<S: MilpSolver + 'static>(mut self, solver: S) -> Self {
        self.solver = Box::new(solver);
        self
    }

    /// The configuration in use.
    pub fn config(&self) -> &SolveConfig {
        &self.config
    }

    /// Validates `records` and plans a schedule.
    ///
    /// # Errors
    /// - `InvalidInput` before any solve for bad ids, population size, or
    ///   configuration
    /// - `InfeasiblePlan` if the bounds cannot seat the population
    /// - `SolverUnavailable` / `SolveFailed` from the exact solver, unless
    ///   the fallback applies
    ///
    /// The exact solve is bounded by `time_limit_ms`; see
    /// [`SolveMethod::ExactTimeLimited`].
    /// - `Inconsistent` if the assignment cannot be turned into a schedule
    pub fn plan(&self, records: &[Record]) -> Result<SeatingPlan, SeatingError> {
        let population = Population::from_records(records, &self.config)?;
        self.plan_population(&population)
    }

    /// Plans a schedule for an already-built population.
    ///
    /// Configuration and population-range checks still apply.
    pub fn plan_population(&self, population: &Population) -> Result<SeatingPlan, SeatingError> {
        self.check_population(population)?;

        let config = &self.config;
        let n = population.len();
        let capacity = match config.table_count {
            Some(tables) => CapacityPlan::fixed(n, config.table_size, tables)?,
            None => CapacityPlan::plan(n, config.table_size, config.centering_divisor)?,
        };
        info!(
            participants = n,
            tables = capacity.table_count(),
            rounds = config.rounds,
            fallback_count = capacity.fallback,
            "capacity planned"
        );

        let catalog = TraitCatalog::build(population, &config.traits, capacity.table_count());

        let (assignment, score, method, fallback_reason) = match config.strategy {
            Strategy::Heuristic => {
                let (a, s) = self.run_greedy(&catalog, &capacity)?;
                (a, s, SolveMethod::Heuristic, None)
            }
            Strategy::Exact => {
                let (a, s, m) = self.run_exact(&catalog, &capacity)?;
                (a, s, m, None)
            }
            Strategy::ExactOrHeuristic => match self.run_exact(&catalog, &capacity) {
                Ok((a, s, m)) => (a, s, m, None),
                Err(e) if e.is_fallback_eligible() => {
                    warn!(error = %e, "exact solver unavailable, seating greedily");
                    let (a, s) = self.run_greedy(&catalog, &capacity)?;
                    (a, s, SolveMethod::Heuristic, Some(e.to_string()))
                }
                Err(e) => return Err(e),
            },
        };

        let schedule = SeatingSchedule::extract(population, &assignment, score)?;
        let kpi = SeatingKpi::calculate(&catalog, &assignment, &config.penalties);
        info!(
            method = ?method,
            diversity = kpi.diversity,
            ever_met_pairs = kpi.ever_met_pairs,
            "seating planned"
        );

        Ok(SeatingPlan {
            schedule,
            assignment,
            capacity,
            kpi,
            method,
            fallback_reason,
        })
    }

    fn run_exact(
        &self,
        catalog: &TraitCatalog,
        capacity: &CapacityPlan,
    ) -> Result<(Assignment, ScheduleScore, SolveMethod), SeatingError> {
        let outcome = SeatingMilpBuilder::new(catalog, capacity)
            .with_rounds(self.config.rounds)
            .with_penalties(self.config.penalties)
            .solve(self.solver.as_ref(), &SolverLimits::from_ms(self.config.time_limit_ms))?;
        let method = if outcome.is_proven_optimal() {
            SolveMethod::Exact
        } else {
            SolveMethod::ExactTimeLimited
        };
        let objective = outcome.objective();
        Ok((outcome.assignment, ScheduleScore::Objective(objective), method))
    }

    fn run_greedy(
        &self,
        catalog: &TraitCatalog,
        capacity: &CapacityPlan,
    ) -> Result<(Assignment, ScheduleScore), SeatingError> {
        let assignment = GreedyAssigner::new()
            .with_seed(self.config.seed)
            .assign(catalog, capacity, self.config.rounds)?;
        let score = ScheduleScore::Diversity(crate::models::diversity_score(catalog, &assignment));
        Ok((assignment, score))
    }

    /// Re-applies the record checks that do not need raw records.
    fn check_population(&self, population: &Population) -> Result<(), SeatingError> {
        let records: Vec<Record> = population
            .participants
            .iter()
            .map(|p| Record::from([(self.config.id_column.clone(), p.id.clone())]))
            .collect();
        crate::validation::validate_records(&records, &self.config)
            .map_err(SeatingError::InvalidInput)
    }
}

/// Plans a schedule with the default backend.
///
/// Shorthand for `SeatingPlanner::new(config.clone()).plan(records)`.
pub fn plan_seating(records: &[Record], config: &SolveConfig) -> Result<SeatingPlan, SeatingError> {
    SeatingPlanner::new(config.clone()).plan(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mip::{
        LinearProgram, MilpSolution, SolveStatus, SolverError, UnavailableSolver,
    };

    /// Gives up at the time limit before finding any point.
    struct StalledSolver;

    impl MilpSolver for StalledSolver {
        fn name(&self) -> &'static str {
            "stalled"
        }

        fn solve(
            &self,
            _program: &LinearProgram,
            _limits: &SolverLimits,
        ) -> Result<MilpSolution, SolverError> {
            Ok(MilpSolution::without_values(SolveStatus::TimeLimit))
        }
    }

    fn records(colors: &[&str]) -> Vec<Record> {
        colors
            .iter()
            .enumerate()
            .map(|(i, c)| {
                Record::from([
                    ("Participant_ID".to_string(), format!("P{i:02}")),
                    ("Color".to_string(), c.to_string()),
                ])
            })
            .collect()
    }

    #[test]
    fn test_heuristic_strategy_skips_solver() {
        let config = SolveConfig::new()
            .with_table_size(2, 2)
            .with_strategy(Strategy::Heuristic);
        let plan = SeatingPlanner::new(config)
            .with_solver(UnavailableSolver)
            .plan(&records(&["Red", "Red", "Blue", "Blue"]))
            .unwrap();
        assert_eq!(plan.method, SolveMethod::Heuristic);
        assert!(!plan.is_degraded());
        assert!(matches!(plan.schedule.score, ScheduleScore::Diversity(4)));
    }

    #[test]
    fn test_fallback_records_reason() {
        let config = SolveConfig::new().with_table_size(2, 2);
        let plan = SeatingPlanner::new(config)
            .with_solver(UnavailableSolver)
            .plan(&records(&["Red", "Red", "Blue", "Blue"]))
            .unwrap();
        assert_eq!(plan.method, SolveMethod::Heuristic);
        assert!(plan.is_degraded());
        assert!(plan
            .fallback_reason
            .as_deref()
            .unwrap()
            .contains("unavailable"));
    }

    #[test]
    fn test_exact_strategy_does_not_fall_back() {
        let config = SolveConfig::new()
            .with_table_size(2, 2)
            .with_strategy(Strategy::Exact);
        let err = SeatingPlanner::new(config)
            .with_solver(UnavailableSolver)
            .plan(&records(&["Red", "Red", "Blue", "Blue"]))
            .unwrap_err();
        assert!(matches!(err, SeatingError::SolverUnavailable(_)));
    }

    #[test]
    fn test_infeasible_plan_is_not_fallback() {
        // 5 people at tables of exactly 2 cannot be seated
        let config = SolveConfig::new().with_table_size(2, 2);
        let err = SeatingPlanner::new(config)
            .with_solver(UnavailableSolver)
            .plan(&records(&["Red", "Red", "Blue", "Blue", "Red"]))
            .unwrap_err();
        assert!(matches!(err, SeatingError::InfeasiblePlan { .. }));
    }

    #[test]
    fn test_population_checks_apply_to_built_population() {
        use crate::config::PopulationBounds;
        use crate::models::Participant;

        let config = SolveConfig::new()
            .with_population(PopulationBounds::new(24, 36))
            .with_strategy(Strategy::Heuristic);
        let pop = Population::new(
            (0..4).map(|i| Participant::new(format!("P{i}"))).collect(),
            Vec::new(),
        );
        let err = SeatingPlanner::new(config).plan_population(&pop).unwrap_err();
        assert!(matches!(err, SeatingError::InvalidInput(_)));
    }

    #[test]
    fn test_time_limit_without_point_does_not_fall_back() {
        let config = SolveConfig::new()
            .with_table_size(2, 2)
            .with_time_limit_ms(10);
        let err = SeatingPlanner::new(config)
            .with_solver(StalledSolver)
            .plan(&records(&["Red", "Red", "Blue", "Blue"]))
            .unwrap_err();
        assert!(matches!(
            err,
            SeatingError::SolveFailed {
                status: Some(SolveStatus::TimeLimit),
                ..
            }
        ));
    }
}
