//! Seating quality metrics (KPIs).
//!
//! Computes indicators from any assignment, exact or heuristic, so both
//! can be inspected side by side. The two solve modes optimize different
//! measures; these numbers are for inspection and are not a common score.
//!
//! # Metrics
//!
//! | Metric | Definition |
//! |--------|-----------|
//! | Diversity | Σ over rounds, used tables, traits of distinct values seated |
//! | Deviation penalty | Σ convex penalty of `actual - count/G` per (trait, value, table, round) |
//! | Max deviation | Largest `|actual - count/G|` |
//! | Ever-met pairs | Pairs sharing a table in at least one round |
//! | Repeat pairs | Pairs sharing a table in more than one round |
//! | Penalized objective | Deviation penalty + λ · ever-met pairs (multi-round only) |
//!
//! The deviation penalty splits each gap into a first unit (weight `w1`)
//! and the remainder (weight `w2`), the cheapest split the exact model
//! admits. For an optimal exact solve the penalized objective equals the
//! solver's objective.

use serde::{Deserialize, Serialize};

use crate::config::PenaltyWeights;
use crate::models::{diversity_score, Assignment, TraitCatalog};

/// Seating performance indicators.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeatingKpi {
    /// Distinct-value diversity score.
    pub diversity: usize,
    /// Convex deviation penalty over all (trait, value, table, round).
    pub deviation_penalty: f64,
    /// Largest absolute gap between a table's count and its target.
    pub max_deviation: f64,
    /// Pairs that share a table in at least one round.
    pub ever_met_pairs: usize,
    /// Pairs that share a table in two or more rounds.
    pub repeat_pairs: usize,
    /// Deviation penalty plus the repeat-meeting term.
    pub penalized_objective: f64,
    /// `occupancy[round][table]`.
    pub occupancy: Vec<Vec<usize>>,
}

impl SeatingKpi {
    /// Computes KPIs for `assignment`.
    ///
    /// # Arguments
    /// * `catalog` - Trait domains and targets the assignment was built for.
    /// * `assignment` - The assignment to measure.
    /// * `penalties` - Weights for the deviation and repeat-meeting terms.
    pub fn calculate(
        catalog: &TraitCatalog,
        assignment: &Assignment,
        penalties: &PenaltyWeights,
    ) -> Self {
        let rounds = assignment.round_count();
        let tables = assignment.table_count();
        let n = assignment.participant_count();

        let mut deviation_penalty = 0.0;
        let mut max_deviation: f64 = 0.0;
        for r in 0..rounds {
            for g in 0..tables {
                let members = assignment.members(r, g);
                for (k, domain) in catalog.traits.iter().enumerate() {
                    let mut counts = vec![0usize; domain.values.len()];
                    for &i in &members {
                        counts[catalog.code(i, k)] += 1;
                    }
                    for (a, &actual) in counts.iter().enumerate() {
                        let gap = (actual as f64 - catalog.target(k, a)).abs();
                        max_deviation = max_deviation.max(gap);
                        deviation_penalty += gap_penalty(gap, penalties);
                    }
                }
            }
        }

        let mut ever_met_pairs = 0;
        let mut repeat_pairs = 0;
        for i in 0..n {
            for j in (i + 1)..n {
                match assignment.meetings(i, j) {
                    0 => {}
                    1 => ever_met_pairs += 1,
                    _ => {
                        ever_met_pairs += 1;
                        repeat_pairs += 1;
                    }
                }
            }
        }

        let penalized_objective = if rounds > 1 {
            deviation_penalty + penalties.repeat_meeting * ever_met_pairs as f64
        } else {
            deviation_penalty
        };

        Self {
            diversity: diversity_score(catalog, assignment),
            deviation_penalty,
            max_deviation,
            ever_met_pairs,
            repeat_pairs,
            penalized_objective,
            occupancy: (0..rounds).map(|r| assignment.occupancy(r)).collect(),
        }
    }

    /// Whether every table stays within `max_deviation` of its targets and
    /// no pair meets more than once.
    pub fn meets_thresholds(&self, max_deviation: f64) -> bool {
        self.max_deviation <= max_deviation && self.repeat_pairs == 0
    }
}

/// Cheapest penalty of a gap under the first-unit / extra-unit split.
fn gap_penalty(gap: f64, weights: &PenaltyWeights) -> f64 {
    if weights.first_unit <= weights.extra_unit {
        let first = gap.min(1.0);
        weights.first_unit * first + weights.extra_unit * (gap - first)
    } else {
        weights.extra_unit * gap
    }
}
