//! Exact seating formulation.
//!
//! Bridges the seating domain models to a backend-neutral
//! [`LinearProgram`], solves it through any [`MilpSolver`], and decodes
//! the solution back into an [`Assignment`].
//!
//! # Formulation
//!
//! Sets: participants `i`, tables `g`, rounds `r`, traits `k` with values `a`.
//!
//! - `member[i,g,r]` ∈ {0,1}: participant `i` sits at table `g` in round `r`
//! - `used[g,r]` ∈ {0,1}: table `g` is occupied in round `r`
//! - `l·used[g,r] <= Σ_i member[i,g,r] <= u·used[g,r]`
//! - `Σ_g member[i,g,r] = 1`
//! - `member[0,0,0] = 1`, `used[g,r] >= used[g+1,r]` (symmetry breaking)
//! - `Σ_{i has a} member[i,g,r] - o1 - o2 + u1 + u2 = target[k,a]`,
//!   `o1 <= 1`, `u1 <= 1`, all four `>= 0`
//! - when `R > 1`: `met[i,j,r] >= member[i,g,r] + member[j,g,r] - 1` for
//!   every `g`, and `ever[i,j] >= met[i,j,r]` for every `r`
//!
//! Objective: `Σ (w1·o1 + w2·o2 + w1·u1 + w2·u2) + λ·Σ_{i<j} ever[i,j]`.
//!
//! Deviation terms are binary/integer when the target is integral and
//! continuous otherwise, so the decomposition always reconstructs the
//! true gap exactly.
//!
//! # Reference
//! - Wolsey (1998), "Integer Programming", Ch. 1 (AND-linearization)
//! - Margot (2010), "Symmetry in Integer Linear Programming"

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::{
    LinearExpr, LinearProgram, MilpSolution, MilpSolver, Relation, SolveStatus, SolverError,
    SolverLimits, VarId, VarKind,
};
use crate::config::PenaltyWeights;
use crate::error::SeatingError;
use crate::models::{Assignment, CapacityPlan, TraitCatalog};

const INTEGRAL_TOL: f64 = 1e-9;

/// The four deviation variables of one (trait, value, table, round).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviationVars {
    /// First unit of overuse (<= 1).
    pub over_first: VarId,
    /// Further units of overuse.
    pub over_extra: VarId,
    /// First unit of underuse (<= 1).
    pub under_first: VarId,
    /// Further units of underuse.
    pub under_extra: VarId,
}

/// One deviation row of the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviationTerm {
    /// Trait index into the catalog.
    pub trait_index: usize,
    /// Value index into the trait's domain.
    pub value_index: usize,
    /// 0-based table.
    pub table: usize,
    /// 0-based round.
    pub round: usize,
    /// Per-table target (count / G).
    pub target: f64,
    /// Decomposition variables.
    pub vars: DeviationVars,
}

/// Deviation of a solved model, read back from variable values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviationReading {
    /// Trait index.
    pub trait_index: usize,
    /// Value index.
    pub value_index: usize,
    /// 0-based table.
    pub table: usize,
    /// 0-based round.
    pub round: usize,
    /// Realized count of the value at the table.
    pub actual: usize,
    /// Target count.
    pub target: f64,
    /// `o1`.
    pub over_first: f64,
    /// `o2`.
    pub over_extra: f64,
    /// `u1`.
    pub under_first: f64,
    /// `u2`.
    pub under_extra: f64,
}

impl DeviationReading {
    /// `o1 + o2 - u1 - u2`.
    pub fn decomposed_gap(&self) -> f64 {
        self.over_first + self.over_extra - self.under_first - self.under_extra
    }

    /// `actual - target`.
    pub fn true_gap(&self) -> f64 {
        self.actual as f64 - self.target
    }
}

/// An assembled seating program with its variable handles.
#[derive(Debug, Clone)]
pub struct SeatingModel {
    /// The program submitted to the solver.
    pub program: LinearProgram,
    participants: usize,
    tables: usize,
    rounds: usize,
    member: Vec<VarId>,
    used: Vec<VarId>,
    deviations: Vec<DeviationTerm>,
    pairs: Vec<(usize, usize)>,
    met: Vec<VarId>,
    ever_met: Vec<VarId>,
}

impl SeatingModel {
    /// Membership variable of `(i, g, r)`.
    #[inline]
    pub fn member(&self, i: usize, g: usize, r: usize) -> VarId {
        self.member[(r * self.tables + g) * self.participants + i]
    }

    /// Table-used variable of `(g, r)`.
    #[inline]
    pub fn used(&self, g: usize, r: usize) -> VarId {
        self.used[r * self.tables + g]
    }

    /// Deviation rows.
    pub fn deviations(&self) -> &[DeviationTerm] {
        &self.deviations
    }

    /// Participant pairs `(i, j)`, `i < j`, with meeting variables.
    pub fn pairs(&self) -> &[(usize, usize)] {
        &self.pairs
    }

    /// Whether pairwise meeting variables were built.
    pub fn tracks_meetings(&self) -> bool {
        !self.ever_met.is_empty()
    }

    fn pair_index(&self, i: usize, j: usize) -> Option<usize> {
        let (a, b) = if i < j { (i, j) } else { (j, i) };
        if a == b || b >= self.participants {
            return None;
        }
        // Pairs are laid out row by row: (0,1), (0,2), ..., (1,2), ...
        let n = self.participants;
        Some(a * (2 * n - a - 1) / 2 + (b - a - 1))
    }

    /// Meeting variable of pair `{i, j}` in round `r`, when tracked.
    pub fn met(&self, i: usize, j: usize, r: usize) -> Option<VarId> {
        if !self.tracks_meetings() {
            return None;
        }
        self.pair_index(i, j).map(|p| self.met[p * self.rounds + r])
    }

    /// Ever-met variable of pair `{i, j}`, when tracked.
    pub fn ever_met(&self, i: usize, j: usize) -> Option<VarId> {
        if !self.tracks_meetings() {
            return None;
        }
        self.pair_index(i, j).map(|p| self.ever_met[p])
    }

    /// Number of participant pairs with an ever-met variable set.
    pub fn ever_met_count(&self, solution: &MilpSolution) -> usize {
        self.ever_met.iter().filter(|&&v| solution.is_set(v)).count()
    }

    /// Decodes membership variables into an assignment.
    ///
    /// # Errors
    /// `Inconsistent` if any participant sits at zero or several tables in
    /// a round, or the solution does not cover every variable.
    pub fn decode(&self, solution: &MilpSolution) -> Result<Assignment, SeatingError> {
        if solution.values.len() != self.program.variable_count() {
            return Err(SeatingError::Inconsistent(format!(
                "solution has {} values for {} variables",
                solution.values.len(),
                self.program.variable_count()
            )));
        }

        let mut tables = Vec::with_capacity(self.rounds);
        for r in 0..self.rounds {
            let mut round = Vec::with_capacity(self.participants);
            for i in 0..self.participants {
                let seats: Vec<usize> = (0..self.tables)
                    .filter(|&g| solution.is_set(self.member(i, g, r)))
                    .collect();
                match seats.as_slice() {
                    [g] => round.push(*g),
                    [] => {
                        return Err(SeatingError::Inconsistent(format!(
                            "participant {i} has no table in round {}",
                            r + 1
                        )))
                    }
                    _ => {
                        return Err(SeatingError::Inconsistent(format!(
                            "participant {i} sits at {} tables in round {}",
                            seats.len(),
                            r + 1
                        )))
                    }
                }
            }
            tables.push(round);
        }
        Assignment::new(tables, self.tables)
    }

    /// Reads every deviation row back from a solution.
    pub fn read_deviations(
        &self,
        catalog: &TraitCatalog,
        assignment: &Assignment,
        solution: &MilpSolution,
    ) -> Vec<DeviationReading> {
        let value = |v: VarId| solution.values.get(v.0).copied().unwrap_or(0.0);
        self.deviations
            .iter()
            .map(|d| {
                let actual = assignment
                    .members(d.round, d.table)
                    .into_iter()
                    .filter(|&i| catalog.has_value(i, d.trait_index, d.value_index))
                    .count();
                DeviationReading {
                    trait_index: d.trait_index,
                    value_index: d.value_index,
                    table: d.table,
                    round: d.round,
                    actual,
                    target: d.target,
                    over_first: value(d.vars.over_first),
                    over_extra: value(d.vars.over_extra),
                    under_first: value(d.vars.under_first),
                    under_extra: value(d.vars.under_extra),
                }
            })
            .collect()
    }
}

/// Result of an exact solve: the proven optimum, or the best feasible
/// point found before the time limit.
#[derive(Debug, Clone)]
pub struct ExactOutcome {
    /// The solved model (for reading variables back).
    pub model: SeatingModel,
    /// Raw solver output.
    pub solution: MilpSolution,
    /// Decoded assignment.
    pub assignment: Assignment,
}

impl ExactOutcome {
    /// Objective value of the decoded assignment.
    pub fn objective(&self) -> f64 {
        self.solution.objective
    }

    /// Whether the solver proved the assignment optimal.
    pub fn is_proven_optimal(&self) -> bool {
        self.solution.is_optimal()
    }
}

/// Builds the exact seating program.
///
/// # Example
/// ```
/// use u_seating::config::SizeBounds;
/// use u_seating::mip::{SeatingMilpBuilder, SolverLimits, UnavailableSolver};
/// use u_seating::models::{CapacityPlan, Participant, Population, TraitCatalog};
///
/// let people = (0..30)
///     .map(|i| Participant::new(format!("P{i}")).with_trait("Color", ["Red", "Blue", "Green"][i % 3]))
///     .collect();
/// let population = Population::new(people, vec!["Color".into()]);
/// let plan = CapacityPlan::plan(30, SizeBounds::new(4, 6), 5).unwrap();
/// let catalog = TraitCatalog::build(&population, &[], plan.table_count());
///
/// let builder = SeatingMilpBuilder::new(&catalog, &plan).with_rounds(3);
/// let model = builder.build().unwrap();
/// assert_eq!(model.deviations().len(), 3 * 6 * 3);
///
/// let err = builder.solve(&UnavailableSolver, &SolverLimits::default()).unwrap_err();
/// assert!(err.is_fallback_eligible());
/// ```
pub struct SeatingMilpBuilder<'a> {
    catalog: &'a TraitCatalog,
    plan: &'a CapacityPlan,
    rounds: usize,
    penalties: PenaltyWeights,
}

impl<'a> SeatingMilpBuilder<'a> {
    /// Creates a single-round builder with default penalties.
    pub fn new(catalog: &'a TraitCatalog, plan: &'a CapacityPlan) -> Self {
        Self {
            catalog,
            plan,
            rounds: 1,
            penalties: PenaltyWeights::default(),
        }
    }

    /// Sets the number of rounds.
    pub fn with_rounds(mut self, rounds: usize) -> Self {
        self.rounds = rounds;
        self
    }

    /// Sets the objective weights.
    pub fn with_penalties(mut self, penalties: PenaltyWeights) -> Self {
        self.penalties = penalties;
        self
    }

    /// Builds the program.
    ///
    /// # Errors
    /// - `InfeasiblePlan` if nobody is to be seated or no count of used
    ///   tables `k <= G` satisfies `k·l <= N <= k·u`
    /// - `InvalidInput` if the catalog and plan disagree on N or G, or
    ///   no rounds were requested
    pub fn build(&self) -> Result<SeatingModel, SeatingError> {
        let n = self.catalog.participant_count();
        let tables = self.plan.table_count();
        let rounds = self.rounds;
        let bounds = self.plan.bounds;

        if n == 0 {
            return Err(SeatingError::infeasible(0, "no participants to seat"));
        }
        self.check_shape(n, tables)?;
        self.plan.ensure_seatable()?;

        let mut program = LinearProgram::new();

        // Membership and table-usage variables
        let mut member = Vec::with_capacity(n * tables * rounds);
        for r in 0..rounds {
            for g in 0..tables {
                for i in 0..n {
                    member.push(program.add_variable(
                        format!("member_{i}_{g}_{r}"),
                        VarKind::Binary,
                        0.0,
                    ));
                }
            }
        }
        let member_at = |i: usize, g: usize, r: usize| member[(r * tables + g) * n + i];

        let mut used = Vec::with_capacity(tables * rounds);
        for r in 0..rounds {
            for g in 0..tables {
                used.push(program.add_variable(format!("used_{g}_{r}"), VarKind::Binary, 0.0));
            }
        }
        let used_at = |g: usize, r: usize| used[r * tables + g];

        // Capacity: l·used <= occupancy <= u·used
        for r in 0..rounds {
            for g in 0..tables {
                let occupancy = LinearExpr::sum((0..n).map(|i| member_at(i, g, r)));
                program.add_constraint(
                    format!("lower_bound_{g}_{r}"),
                    occupancy.clone().with(used_at(g, r), -(bounds.min as f64)),
                    Relation::GreaterEq,
                    0.0,
                );
                program.add_constraint(
                    format!("upper_bound_{g}_{r}"),
                    occupancy.with(used_at(g, r), -(bounds.max as f64)),
                    Relation::LessEq,
                    0.0,
                );
            }
        }

        // Exactly one table per participant per round
        for r in 0..rounds {
            for i in 0..n {
                program.add_constraint(
                    format!("assign_{i}_{r}"),
                    LinearExpr::sum((0..tables).map(|g| member_at(i, g, r))),
                    Relation::Equal,
                    1.0,
                );
            }
        }

        // Symmetry breaking: anchor participant 0, fill tables in order
        program.add_constraint(
            "anchor",
            LinearExpr::sum([member_at(0, 0, 0)]),
            Relation::Equal,
            1.0,
        );
        for r in 0..rounds {
            for g in 0..tables.saturating_sub(1) {
                program.add_constraint(
                    format!("order_tables_{g}_{r}"),
                    LinearExpr::new()
                        .with(used_at(g, r), 1.0)
                        .with(used_at(g + 1, r), -1.0),
                    Relation::GreaterEq,
                    0.0,
                );
            }
        }

        // Deviation from per-table targets
        let mut objective = LinearExpr::new();
        let mut deviations = Vec::new();
        for (k, domain) in self.catalog.traits.iter().enumerate() {
            for a in 0..domain.values.len() {
                let target = self.catalog.target(k, a);
                let integral = (target - target.round()).abs() < INTEGRAL_TOL;
                let (first_kind, extra_kind) = if integral {
                    (VarKind::Binary, VarKind::Integer)
                } else {
                    (VarKind::Continuous, VarKind::Continuous)
                };
                let holders: Vec<usize> =
                    (0..n).filter(|&i| self.catalog.has_value(i, k, a)).collect();

                for r in 0..rounds {
                    for g in 0..tables {
                        let tag = format!("{k}_{a}_{g}_{r}");
                        let vars = DeviationVars {
                            over_first: program.add_variable(
                                format!("over_first_{tag}"),
                                first_kind,
                                0.0,
                            ),
                            over_extra: program.add_variable(
                                format!("over_extra_{tag}"),
                                extra_kind,
                                0.0,
                            ),
                            under_first: program.add_variable(
                                format!("under_first_{tag}"),
                                first_kind,
                                0.0,
                            ),
                            under_extra: program.add_variable(
                                format!("under_extra_{tag}"),
                                extra_kind,
                                0.0,
                            ),
                        };

                        let count = LinearExpr::sum(holders.iter().map(|&i| member_at(i, g, r)));
                        program.add_constraint(
                            format!("deviation_{tag}"),
                            count
                                .with(vars.over_first, -1.0)
                                .with(vars.over_extra, -1.0)
                                .with(vars.under_first, 1.0)
                                .with(vars.under_extra, 1.0),
                            Relation::Equal,
                            target,
                        );
                        program.add_constraint(
                            format!("over_first_cap_{tag}"),
                            LinearExpr::sum([vars.over_first]),
                            Relation::LessEq,
                            1.0,
                        );
                        program.add_constraint(
                            format!("under_first_cap_{tag}"),
                            LinearExpr::sum([vars.under_first]),
                            Relation::LessEq,
                            1.0,
                        );

                        objective
                            .add(vars.over_first, self.penalties.first_unit)
                            .add(vars.over_extra, self.penalties.extra_unit)
                            .add(vars.under_first, self.penalties.first_unit)
                            .add(vars.under_extra, self.penalties.extra_unit);

                        deviations.push(DeviationTerm {
                            trait_index: k,
                            value_index: a,
                            table: g,
                            round: r,
                            target,
                            vars,
                        });
                    }
                }
            }
        }

        // Pairwise meetings across rounds
        let mut pairs = Vec::new();
        let mut met = Vec::new();
        let mut ever_met = Vec::new();
        if rounds > 1 {
            for i in 0..n {
                for j in (i + 1)..n {
                    pairs.push((i, j));
                    let ever = program.add_variable(
                        format!("ever_met_{i}_{j}"),
                        VarKind::Binary,
                        0.0,
                    );
                    for r in 0..rounds {
                        let m = program.add_variable(
                            format!("met_{i}_{j}_{r}"),
                            VarKind::Binary,
                            0.0,
                        );
                        for g in 0..tables {
                            program.add_constraint(
                                format!("pair_meet_{i}_{j}_{g}_{r}"),
                                LinearExpr::new()
                                    .with(m, 1.0)
                                    .with(member_at(i, g, r), -1.0)
                                    .with(member_at(j, g, r), -1.0),
                                Relation::GreaterEq,
                                -1.0,
                            );
                        }
                        program.add_constraint(
                            format!("ever_met_{i}_{j}_{r}"),
                            LinearExpr::new().with(ever, 1.0).with(m, -1.0),
                            Relation::GreaterEq,
                            0.0,
                        );
                        met.push(m);
                    }
                    objective.add(ever, self.penalties.repeat_meeting);
                    ever_met.push(ever);
                }
            }
        }

        program.set_objective(objective);

        debug!(
            participants = n,
            tables,
            rounds,
            variables = program.variable_count(),
            constraints = program.constraint_count(),
            "built seating program"
        );

        Ok(SeatingModel {
            program,
            participants: n,
            tables,
            rounds,
            member,
            used,
            deviations,
            pairs,
            met,
            ever_met,
        })
    }

    /// Builds, solves, and decodes.
    ///
    /// A solve cut short by the time limit is accepted when it carries a
    /// feasible point; check [`ExactOutcome::is_proven_optimal`].
    ///
    /// # Errors
    /// - errors of [`build`](Self::build)
    /// - `SolverUnavailable` if the backend cannot run
    /// - `SolveFailed` for infeasible or unbounded programs, a time limit
    ///   reached before any feasible point, or a backend error
    /// - `Inconsistent` if the solution does not decode to a valid schedule
    pub fn solve<S: MilpSolver + ?Sized>(
        &self,
        solver: &S,
        limits: &SolverLimits,
    ) -> Result<ExactOutcome, SeatingError> {
        let model = self.build()?;
        let solution = solver
            .solve(&model.program, limits)
            .map_err(|e| match e {
                SolverError::Unavailable(msg) => SeatingError::SolverUnavailable(msg),
                SolverError::Backend(msg) => SeatingError::SolveFailed {
                    status: None,
                    message: msg,
                },
            })?;

        let usable = solution.is_optimal()
            || (solution.status == SolveStatus::TimeLimit && solution.has_values());
        if !usable {
            return Err(SeatingError::SolveFailed {
                status: Some(solution.status),
                message: format!("{} returned {:?}", solver.name(), solution.status),
            });
        }

        let assignment = model.decode(&solution)?;
        assignment.check_bounds(self.plan.bounds)?;

        if solution.is_optimal() {
            info!(
                solver = solver.name(),
                objective = solution.objective,
                "exact seating solved to optimality"
            );
        } else {
            warn!(
                solver = solver.name(),
                objective = solution.objective,
                "exact seating stopped at the time limit, keeping best feasible point"
            );
        }

        Ok(ExactOutcome {
            model,
            solution,
            assignment,
        })
    }

    fn check_shape(&self, n: usize, tables: usize) -> Result<(), SeatingError> {
        use crate::validation::{ValidationError, ValidationErrorKind};

        let mut errors = Vec::new();
        if self.plan.participants != n {
            errors.push(ValidationError::new(
                ValidationErrorKind::PopulationOutOfRange,
                format!(
                    "Plan covers {} participants, catalog has {n}",
                    self.plan.participants
                ),
            ));
        }
        if self.catalog.table_count() != tables {
            errors.push(ValidationError::new(
                ValidationErrorKind::InvalidTableSize,
                format!(
                    "Targets computed for {} tables, plan has {tables}",
                    self.catalog.table_count()
                ),
            ));
        }
        if self.rounds == 0 {
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
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SizeBounds;
    use crate::mip::UnavailableSolver;
    use crate::models::{Participant, Population};

    fn colored(n_per_color: usize, colors: &[&str]) -> Population {
        let mut people = Vec::new();
        for color in colors {
            for _ in 0..n_per_color {
                let id = format!("P{:02}", people.len());
                people.push(Participant::new(id).with_trait("Color", color));
            }
        }
        Population::new(people, vec!["Color".into()])
    }

    fn setup(pop: &Population, bounds: SizeBounds, tables: usize) -> (TraitCatalog, CapacityPlan) {
        let plan = CapacityPlan::fixed(pop.len(), bounds, tables).unwrap();
        let catalog = TraitCatalog::build(pop, &[], plan.table_count());
        (catalog, plan)
    }

    /// A solver that returns a canned solution.
    struct FixedSolver(MilpSolution);

    impl MilpSolver for FixedSolver {
        fn name(&self) -> &'static str {
            "fixed"
        }

        fn solve(
            &self,
            _program: &LinearProgram,
            _limits: &SolverLimits,
        ) -> Result<MilpSolution, SolverError> {
            Ok(self.0.clone())
        }
    }

    #[test]
    fn test_single_round_model_size() {
        let pop = colored(2, &["Red", "Blue", "Green"]); // 6 people
        let (catalog, plan) = setup(&pop, SizeBounds::new(3, 3), 2);
        let model = SeatingMilpBuilder::new(&catalog, &plan).build().unwrap();

        // 12 member + 2 used + 3 values × 2 tables × 4 deviation vars
        assert_eq!(model.program.variable_count(), 12 + 2 + 24);
        // 4 capacity + 6 assign + 1 anchor + 1 order + 6 × 3 deviation rows
        assert_eq!(model.program.constraint_count(), 4 + 6 + 1 + 1 + 18);
        assert!(!model.tracks_meetings());
        assert!(model.met(0, 1, 0).is_none());
    }

    #[test]
    fn test_multi_round_adds_pair_tracking() {
        let pop = colored(2, &["Red", "Blue"]); // 4 people
        let (catalog, plan) = setup(&pop, SizeBounds::new(2, 2), 2);
        let model = SeatingMilpBuilder::new(&catalog, &plan)
            .with_rounds(2)
            .build()
            .unwrap();

        assert!(model.tracks_meetings());
        // 6 pairs: 1 ever + 2 met each
        assert!(model.ever_met(0, 3).is_some());
        assert_eq!(model.ever_met(2, 1), model.ever_met(1, 2));
        assert!(model.ever_met(1, 1).is_none());
        assert_ne!(model.met(0, 1, 0), model.met(0, 1, 1));
        assert_eq!(model.pairs.len(), 6);
        assert_eq!(model.met.len(), 12);
    }

    #[test]
    fn test_pair_index_layout() {
        let pop = colored(5, &["Red"]);
        let (catalog, plan) = setup(&pop, SizeBounds::new(1, 5), 2);
        let model = SeatingMilpBuilder::new(&catalog, &plan)
            .with_rounds(2)
            .build()
            .unwrap();
        for (p, &(i, j)) in model.pairs.iter().enumerate() {
            assert_eq!(model.pair_index(i, j), Some(p));
        }
    }

    #[test]
    fn test_integral_targets_use_integer_deviations() {
        let pop = colored(2, &["Red", "Blue"]);
        let (catalog, plan) = setup(&pop, SizeBounds::new(2, 2), 2); // target 1
        let model = SeatingMilpBuilder::new(&catalog, &plan).build().unwrap();
        let d = &model.deviations()[0];
        assert_eq!(model.program.variables[d.vars.over_first.0].kind, VarKind::Binary);
        assert_eq!(model.program.variables[d.vars.over_extra.0].kind, VarKind::Integer);

        let pop = colored(5, &["Red", "Blue"]);
        let (catalog, plan) = setup(&pop, SizeBounds::new(3, 4), 3); // target 5/3
        let model = SeatingMilpBuilder::new(&catalog, &plan).build().unwrap();
        let d = &model.deviations()[0];
        assert_eq!(
            model.program.variables[d.vars.over_first.0].kind,
            VarKind::Continuous
        );
        assert!((d.target - 5.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_infeasible_bounds_rejected_before_solve() {
        let pop = colored(7, &["Red"]);
        // 2 tables of at most 3 cannot seat 7
        let (catalog, plan) = setup(&pop, SizeBounds::new(2, 3), 2);
        let err = SeatingMilpBuilder::new(&catalog, &plan).build().unwrap_err();
        assert!(matches!(err, SeatingError::InfeasiblePlan { participants: 7, .. }));
    }

    #[test]
    fn test_mismatched_catalog_rejected() {
        let pop = colored(2, &["Red", "Blue"]);
        let plan = CapacityPlan::fixed(4, SizeBounds::new(2, 2), 2).unwrap();
        let catalog = TraitCatalog::build(&pop, &[], 3);
        let err = SeatingMilpBuilder::new(&catalog, &plan).build().unwrap_err();
        assert!(matches!(err, SeatingError::InvalidInput(_)));
    }

    #[test]
    fn test_unavailable_solver_maps_to_error() {
        let pop = colored(2, &["Red", "Blue"]);
        let (catalog, plan) = setup(&pop, SizeBounds::new(2, 2), 2);
        let err = SeatingMilpBuilder::new(&catalog, &plan)
            .solve(&UnavailableSolver, &SolverLimits::default())
            .unwrap_err();
        assert!(err.is_fallback_eligible());
    }

    #[test]
    fn test_time_limit_without_point_is_failure() {
        let pop = colored(2, &["Red", "Blue"]);
        let (catalog, plan) = setup(&pop, SizeBounds::new(2, 2), 2);
        let solver = FixedSolver(MilpSolution::without_values(SolveStatus::TimeLimit));
        let err = SeatingMilpBuilder::new(&catalog, &plan)
            .solve(&solver, &SolverLimits::default())
            .unwrap_err();
        assert!(matches!(
            err,
            SeatingError::SolveFailed {
                status: Some(SolveStatus::TimeLimit),
                ..
            }
        ));
        assert!(!err.is_fallback_eligible());
    }

    #[test]
    fn test_time_limit_keeps_feasible_point() {
        let pop = colored(2, &["Red", "Blue"]);
        let (catalog, plan) = setup(&pop, SizeBounds::new(2, 2), 2);
        let builder = SeatingMilpBuilder::new(&catalog, &plan);
        let model = builder.build().unwrap();

        // Clustered seating: both Reds at table 0
        let mut values = vec![0.0; model.program.variable_count()];
        for (i, g) in [(0, 0), (1, 0), (2, 1), (3, 1)] {
            values[model.member(i, g, 0).0] = 1.0;
        }
        values[model.used(0, 0).0] = 1.0;
        values[model.used(1, 0).0] = 1.0;

        let solver = FixedSolver(MilpSolution::incumbent(values, 40.0));
        let outcome = builder.solve(&solver, &SolverLimits::default()).unwrap();
        assert!(!outcome.is_proven_optimal());
        assert_eq!(outcome.assignment.round(0), &[0, 0, 1, 1]);
        assert!((outcome.objective() - 40.0).abs() < 1e-12);
    }

    #[test]
    fn test_decode_rejects_unseated_participant() {
        let pop = colored(2, &["Red", "Blue"]);
        let (catalog, plan) = setup(&pop, SizeBounds::new(2, 2), 2);
        let model = SeatingMilpBuilder::new(&catalog, &plan).build().unwrap();
        let zeros = MilpSolution::optimal(vec![0.0; model.program.variable_count()], 0.0);
        assert!(matches!(
            model.decode(&zeros),
            Err(SeatingError::Inconsistent(_))
        ));
    }

    #[test]
    fn test_decode_reads_membership() {
        let pop = colored(2, &["Red", "Blue"]);
        let (catalog, plan) = setup(&pop, SizeBounds::new(2, 2), 2);
        let model = SeatingMilpBuilder::new(&catalog, &plan).build().unwrap();

        let mut values = vec![0.0; model.program.variable_count()];
        for (i, g) in [(0, 0), (1, 1), (2, 0), (3, 1)] {
            values[model.member(i, g, 0).0] = 1.0;
        }
        values[model.used(0, 0).0] = 1.0;
        values[model.used(1, 0).0] = 1.0;
        let a = model
            .decode(&MilpSolution::optimal(values, 0.0))
            .unwrap();
        assert_eq!(a.round(0), &[0, 1, 0, 1]);
    }

    #[cfg(feature = "microlp")]
    #[test]
    fn test_exact_balances_colors() {
        use crate::mip::MicroLpSolver;

        let pop = colored(2, &["Red", "Blue", "Green"]);
        let (catalog, plan) = setup(&pop, SizeBounds::new(3, 3), 2);
        let outcome = SeatingMilpBuilder::new(&catalog, &plan)
            .solve(&MicroLpSolver::new(), &SolverLimits::default())
            .unwrap();

        assert!(outcome.objective().abs() < 1e-6);
        assert_eq!(outcome.assignment.occupancy(0), vec![3, 3]);
        assert_eq!(outcome.assignment.table_of(0, 0), 0);
        for reading in outcome
            .model
            .read_deviations(&catalog, &outcome.assignment, &outcome.solution)
        {
            assert_eq!(reading.actual, 1);
            assert!((reading.decomposed_gap() - reading.true_gap()).abs() < 1e-6);
        }
        assert!(outcome
            .model
            .program
            .violated(&outcome.solution.values, 1e-6)
            .is_empty());
    }

    #[cfg(feature = "microlp")]
    #[test]
    fn test_exact_pair_never_meets_at_single_seats() {
        use crate::mip::MicroLpSolver;

        let pop = colored(1, &["Red", "Blue"]);
        let (catalog, plan) = setup(&pop, SizeBounds::new(1, 1), 2);
        let outcome = SeatingMilpBuilder::new(&catalog, &plan)
            .with_rounds(2)
            .solve(&MicroLpSolver::new(), &SolverLimits::default())
            .unwrap();

        assert_eq!(outcome.assignment.round_count(), 2);
        assert!(!outcome.assignment.ever_met(0, 1));
        assert_eq!(outcome.model.ever_met_count(&outcome.solution), 0);
        for r in 0..2 {
            assert_ne!(
                outcome.assignment.table_of(0, r),
                outcome.assignment.table_of(1, r)
            );
        }
    }
}
