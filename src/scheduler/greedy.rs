//! Rarity-first greedy seating.
//!
//! # Algorithm
//!
//! Per round:
//! 1. Rarity of each participant: Σ over traits of `1 / frequency(value)`.
//! 2. Shuffle participants with the seeded RNG, then stable-sort by
//!    descending rarity (the shuffle only breaks ties).
//! 3. Walk the order once. For each participant, score every table that
//!    still has a free seat by Σ over traits of `(same_value_count + 1)²`
//!    and seat them at the lowest-scoring table (first on ties).
//! 4. Update the running per-table value counts.
//!
//! Every participant is placed and no table exceeds its planned capacity.
//! There is no repeat-avoidance across rounds and no optimality guarantee;
//! each round is a fresh pass with the RNG continuing from the previous one.
//!
//! # Complexity
//! O(R · N · G · K) where K = number of traits.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use tracing::debug;

use crate::error::SeatingError;
use crate::models::{Assignment, CapacityPlan, TraitCatalog};

/// Deterministic greedy assigner.
///
/// # Example
///
/// ```
/// use u_seating::config::SizeBounds;
/// use u_seating::models::{CapacityPlan, Participant, Population, TraitCatalog};
/// use u_seating::scheduler::GreedyAssigner;
///
/// let people = (0..8)
///     .map(|i| Participant::new(format!("P{i}")).with_trait("Color", if i % 2 == 0 { "Red" } else { "Blue" }))
///     .collect();
/// let population = Population::new(people, vec!["Color".into()]);
/// let plan = CapacityPlan::fixed(8, SizeBounds::new(4, 4), 2).unwrap();
/// let catalog = TraitCatalog::build(&population, &[], plan.table_count());
///
/// let assignment = GreedyAssigner::new().assign(&catalog, &plan, 1).unwrap();
/// assert_eq!(assignment.occupancy(0), vec![4, 4]);
/// ```
#[derive(Debug, Clone)]
pub struct GreedyAssigner {
    seed: u64,
}

impl GreedyAssigner {
    /// Creates an assigner with the default seed (42).
    pub fn new() -> Self {
        Self { seed: 42 }
    }

    /// Sets the tie-break seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Seats everyone for `rounds` rounds.
    ///
    /// # Errors
    /// - `InfeasiblePlan` if a planned capacity lies outside the size
    ///   bounds (the greedy pass fills tables exactly to capacity)
    /// - `InvalidInput` if the catalog and plan disagree on N or G
    pub fn assign(
        &self,
        catalog: &TraitCatalog,
        plan: &CapacityPlan,
        rounds: usize,
    ) -> Result<Assignment, SeatingError> {
        let n = catalog.participant_count();
        if n == 0 {
            return Err(SeatingError::infeasible(0, "no participants to seat"));
        }
        check_shape(catalog, plan, n, rounds)?;
        if !plan.capacities_within_bounds() {
            return Err(SeatingError::infeasible(
                n,
                format!(
                    "planned capacities {:?} fall outside {}-{} seats",
                    plan.capacities, plan.bounds.min, plan.bounds.max
                ),
            ));
        }

        let rarity: Vec<f64> = (0..n).map(|i| catalog.rarity(i)).collect();
        let mut rng = StdRng::seed_from_u64(self.seed);
        let mut tables = Vec::with_capacity(rounds);

        for round in 0..rounds {
            let mut order: Vec<usize> = (0..n).collect();
            order.shuffle(&mut rng);
            order.sort_by(|&a, &b| rarity[b].total_cmp(&rarity[a]));

            tables.push(self.seat_round(catalog, plan, &order));
            debug!(round, "greedy round seated");
        }

        Assignment::new(tables, plan.table_count())
    }

    /// Seats one round following `order`.
    fn seat_round(&self, catalog: &TraitCatalog, plan: &CapacityPlan, order: &[usize]) -> Vec<usize> {
        let table_count = plan.table_count();
        let trait_count = catalog.trait_count();

        // counts[g][k][a]: participants at table g holding value a of trait k
        let mut counts: Vec<Vec<Vec<usize>>> = (0..table_count)
            .map(|_| {
                catalog
                    .traits
                    .iter()
                    .map(|d| vec![0; d.values.len()])
                    .collect()
            })
            .collect();
        let mut occupancy = vec![0usize; table_count];
        let mut seats = vec![0usize; order.len()];

        for &person in order {
            let mut best: Option<(usize, usize)> = None;
            for g in 0..table_count {
                if occupancy[g] >= plan.capacities[g] {
                    continue;
                }
                let score: usize = (0..trait_count)
                    .map(|k| {
                        let c = counts[g][k][catalog.code(person, k)] + 1;
                        c * c
                    })
                    .sum();
                if best.map_or(true, |(_, s)| score < s) {
                    best = Some((g, score));
                }
            }

            // Capacities sum to N, so a free seat always exists.
            let g = best.map_or(0, |(g, _)| g);
            seats[person] = g;
            occupancy[g] += 1;
            for k in 0..trait_count {
                counts[g][k][catalog.code(person, k)] += 1;
            }
        }

        seats
    }
}

impl Default for GreedyAssigner {
    fn default() -> Self {
        Self::new()
    }
}

fn check_shape(
    catalog: &TraitCatalog,
    plan: &CapacityPlan,
    n: usize,
    rounds: usize,
) -> Result<(), SeatingError> {
    use crate::validation::{ValidationError, ValidationErrorKind};

    let mut errors = Vec::new();
    if plan.participants != n {
        errors.push(ValidationError::new(
            ValidationErrorKind::PopulationOutOfRange,
            format!("Plan covers {} participants, catalog has {n}", plan.participants),
        ));
    }
    if catalog.table_count() != plan.table_count() {
        errors.push(ValidationError::new(
            ValidationErrorKind::InvalidTableSize,
            format!(
                "Targets computed for {} tables, plan has {}",
                catalog.table_count(),
                plan.table_count()
            ),
        ));
    }
    if rounds == 0 {
        errors.push(ValidationError::new(
            ValidationErrorKind::InvalidRoundCount,
            "At least one round is required",
        ));
    }
    if errors.is_empty() {
        Ok(())
    } else {
        Err(SeatingError::InvalidInput(errors))
    }
}
