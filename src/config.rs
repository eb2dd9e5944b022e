//! Solve configuration.
//!
//! Everything a run needs is carried here and passed explicitly into each
//! stage; nothing is read from process-wide state.

use serde::{Deserialize, Serialize};

/// Default identifier column.
pub const DEFAULT_ID_COLUMN: &str = "Participant_ID";

/// Default wall-clock budget for the exact solve (ms).
pub const DEFAULT_TIME_LIMIT_MS: u64 = 30_000;

/// A configured trait, optionally with a canonical seed domain.
///
/// Seed values are unioned with the values observed in the population,
/// seeds first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraitSpec {
    /// Column name (e.g. "Expertise").
    pub name: String,
    /// Values always present in the domain, even if nobody holds them.
    pub seed_values: Vec<String>,
}

impl TraitSpec {
    /// Creates a trait whose domain is derived purely from the data.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            seed_values: Vec::new(),
        }
    }

    /// Sets the canonical seed domain.
    pub fn with_seed_values<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.seed_values = values.into_iter().map(Into::into).collect();
        self
    }
}

/// Occupancy bounds for a used table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SizeBounds {
    /// Minimum occupancy of a used table.
    pub min: usize,
    /// Maximum occupancy of a table.
    pub max: usize,
}

impl SizeBounds {
    /// Creates bounds `[min, max]`.
    pub fn new(min: usize, max: usize) -> Self {
        Self { min, max }
    }

    /// Whether `occupancy` is acceptable for a used table.
    #[inline]
    pub fn admits(&self, occupancy: usize) -> bool {
        occupancy >= self.min && occupancy <= self.max
    }

    /// Whether `tables` used tables can seat exactly `participants` people.
    #[inline]
    pub fn can_seat(&self, tables: usize, participants: usize) -> bool {
        tables * self.min <= participants && participants <= tables * self.max
    }
}

impl Default for SizeBounds {
    fn default() -> Self {
        Self { min: 4, max: 6 }
    }
}

/// Accepted population size range (inclusive).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PopulationBounds {
    /// Fewest participants accepted.
    pub min: usize,
    /// Most participants accepted.
    pub max: usize,
}

impl PopulationBounds {
    /// Creates an inclusive range.
    pub fn new(min: usize, max: usize) -> Self {
        Self { min, max }
    }

    /// Whether `n` lies inside the range.
    #[inline]
    pub fn contains(&self, n: usize) -> bool {
        n >= self.min && n <= self.max
    }
}

/// Objective weights.
///
/// The deviation penalty is convex: the first unit of over- or underuse
/// costs `first_unit`, every further unit costs `extra_unit`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PenaltyWeights {
    /// Weight of the first unit of deviation (w1).
    pub first_unit: f64,
    /// Weight of each additional unit of deviation (w2).
    pub extra_unit: f64,
    /// Flat penalty per pair that shares a table in any round (λ).
    /// Only used when more than one round is planned.
    pub repeat_meeting: f64,
}

impl Default for PenaltyWeights {
    fn default() -> Self {
        Self {
            first_unit: 10.0,
            extra_unit: 20.0,
            repeat_meeting: 50.0,
        }
    }
}

/// How the planner produces an assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Strategy {
    /// Exact MILP only; a missing solver is an error.
    Exact,
    /// Greedy heuristic only; no solver is consulted.
    Heuristic,
    /// Exact MILP, falling back to the heuristic only when the solver is
    /// unavailable.
    #[default]
    ExactOrHeuristic,
}

/// Full configuration of a seating run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolveConfig {
    /// Identifier column in the input records.
    pub id_column: String,
    /// Traits to balance. Empty means every non-id column is a trait.
    pub traits: Vec<TraitSpec>,
    /// Table occupancy bounds.
    pub table_size: SizeBounds,
    /// Number of rounds (R).
    pub rounds: usize,
    /// Fixed table count. `None` lets the capacity planner choose.
    pub table_count: Option<usize>,
    /// Divisor used to center the table count (`round(N / divisor)`).
    pub centering_divisor: usize,
    /// Objective weights.
    pub penalties: PenaltyWeights,
    /// Tie-break seed for the heuristic.
    pub seed: u64,
    /// Accepted population size range. `None` accepts any non-empty input.
    pub population: Option<PopulationBounds>,
    /// Exact, heuristic, or exact-with-fallback.
    pub strategy: Strategy,
    /// Wall-clock limit for the exact solve (ms). `None` = unbounded.
    /// When it passes, the best feasible point found so far is kept.
    pub time_limit_ms: Option<u64>,
}

impl Default for SolveConfig {
    fn default() -> Self {
        Self {
            id_column: DEFAULT_ID_COLUMN.to_string(),
            traits: Vec::new(),
            table_size: SizeBounds::default(),
            rounds: 1,
            table_count: None,
            centering_divisor: 5,
            penalties: PenaltyWeights::default(),
            seed: 42,
            population: None,
            strategy: Strategy::default(),
            time_limit_ms: Some(DEFAULT_TIME_LIMIT_MS),
        }
    }
}

impl SolveConfig {
    /// Creates the default single-round configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// World-café event preset: three traits, three rounds, 24-36 people
    /// at tables of 4-6, exact solve capped at [`DEFAULT_TIME_LIMIT_MS`].
    pub fn world_cafe() -> Self {
        Self::default()
            .with_traits(vec![
                TraitSpec::new("Expertise").with_seed_values([
                    "Social_Science",
                    "Computational_Math",
                    "Real_World",
                ]),
                TraitSpec::new("Lived_Experience"),
                TraitSpec::new("Minnesota"),
            ])
            .with_rounds(3)
            .with_population(PopulationBounds::new(24, 36))
            .with_time_limit_ms(DEFAULT_TIME_LIMIT_MS)
    }

    /// Sets the identifier column.
    pub fn with_id_column(mut self, column: impl Into<String>) -> Self {
        self.id_column = column.into();
        self
    }

    /// Sets the traits to balance.
    pub fn with_traits(mut self, traits: Vec<TraitSpec>) -> Self {
        self.traits = traits;
        self
    }

    /// Adds a data-derived trait by name.
    pub fn with_trait(mut self, name: impl Into<String>) -> Self {
        self.traits.push(TraitSpec::new(name));
        self
    }

    /// Sets the table occupancy bounds.
    pub fn with_table_size(mut self, min: usize, max: usize) -> Self {
        self.table_size = SizeBounds::new(min, max);
        self
    }

    /// Sets the number of rounds.
    pub fn with_rounds(mut self, rounds: usize) -> Self {
        self.rounds = rounds;
        self
    }

    /// Fixes the table count instead of letting the planner choose.
    pub fn with_table_count(mut self, tables: usize) -> Self {
        self.table_count = Some(tables);
        self
    }

    /// Sets the centering divisor.
    pub fn with_centering_divisor(mut self, divisor: usize) -> Self {
        self.centering_divisor = divisor;
        self
    }

    /// Sets the objective weights.
    pub fn with_penalties(mut self, penalties: PenaltyWeights) -> Self {
        self.penalties = penalties;
        self
    }

    /// Sets the heuristic seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Restricts the accepted population size.
    pub fn with_population(mut self, bounds: PopulationBounds) -> Self {
        self.population = Some(bounds);
        self
    }

    /// Sets the solving strategy.
    pub fn with_strategy(mut self, strategy: Strategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Bounds the exact solve by wall-clock time (ms).
    pub fn with_time_limit_ms(mut self, limit_ms: u64) -> Self {
        self.time_limit_ms = Some(limit_ms);
        self
    }

    /// Lets the exact solve run until it proves optimality.
    pub fn without_time_limit(mut self) -> Self {
        self.time_limit_ms = None;
        self
    }
}
