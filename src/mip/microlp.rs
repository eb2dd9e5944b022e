//! Bundled backend: `good_lp` over the pure-Rust `microlp` engine.
//!
//! The time limit is passed down to microlp, which checks it inside its
//! simplex and branch-and-bound loops and returns on the calling thread.
//! A search cut short keeps its best feasible point, reported with
//! [`SolveStatus::TimeLimit`]; if none was found the solution carries no
//! values.

use good_lp::{
    constraint, variable, Expression, ProblemVariables, ResolutionError, Solution,
    SolutionStatus, SolverModel, Variable, WithTimeLimit,
};
use tracing::{debug, warn};

use super::{
    LinearExpr, LinearProgram, MilpSolution, MilpSolver, Relation, SolveStatus, SolverError,
    SolverLimits, VarKind,
};

/// MILP solver backed by `microlp`.
#[derive(Debug, Clone, Copy, Default)]
pub struct MicroLpSolver;

impl MicroLpSolver {
    /// Creates the solver.
    pub fn new() -> Self {
        Self
    }
}

impl MilpSolver for MicroLpSolver {
    fn name(&self) -> &'static str {
        "microlp"
    }

    fn solve(
        &self,
        program: &LinearProgram,
        limits: &SolverLimits,
    ) -> Result<MilpSolution, SolverError> {
        debug!(
            variables = program.variable_count(),
            integers = program.integer_count(),
            constraints = program.constraint_count(),
            time_limit_ms = limits.time_limit.map(|d| d.as_millis() as u64),
            "submitting program to microlp"
        );

        let mut problem = ProblemVariables::new();
        let handles: Vec<Variable> = program
            .variables
            .iter()
            .map(|def| {
                let definition = match def.kind {
                    VarKind::Binary => variable().binary(),
                    VarKind::Integer => variable().integer().min(def.lower),
                    VarKind::Continuous => variable().min(def.lower),
                };
                problem.add(definition)
            })
            .collect();

        let objective = to_expression(&program.objective, &handles);
        let mut model = problem.minimise(objective).using(good_lp::microlp);
        if let Some(limit) = limits.time_limit {
            model = model.with_time_limit(limit.as_secs_f64());
        }
        for c in &program.constraints {
            let lhs = to_expression(&c.expr, &handles);
            let rhs = Expression::from_other_affine(c.rhs);
            let row = match c.relation {
                Relation::LessEq => constraint::leq(lhs, rhs),
                Relation::GreaterEq => constraint::geq(lhs, rhs),
                Relation::Equal => constraint::eq(lhs, rhs),
            };
            model.add_constraint(row);
        }

        match model.solve() {
            Ok(solution) => {
                let values: Vec<f64> = handles.iter().map(|&v| solution.value(v)).collect();
                let objective = program.objective.eval(&values);
                match solution.status() {
                    SolutionStatus::Optimal => Ok(MilpSolution::optimal(values, objective)),
                    SolutionStatus::TimeLimit | SolutionStatus::GapLimit => {
                        warn!(objective, "microlp stopped early with a feasible point");
                        Ok(MilpSolution::incumbent(values, objective))
                    }
                }
            }
            Err(ResolutionError::Infeasible) => {
                Ok(MilpSolution::without_values(SolveStatus::Infeasible))
            }
            Err(ResolutionError::Unbounded) => {
                Ok(MilpSolution::without_values(SolveStatus::Unbounded))
            }
            // Raised only when the deadline passes before any feasible point.
            Err(ResolutionError::Other(msg)) if limits.time_limit.is_some() => {
                warn!(reason = msg, "microlp hit the time limit without a feasible point");
                Ok(MilpSolution::without_values(SolveStatus::TimeLimit))
            }
            Err(other) => Err(SolverError::Backend(other.to_string())),
        }
    }
}

fn to_expression(expr: &LinearExpr, handles: &[Variable]) -> Expression {
    let mut out = Expression::with_capacity(expr.terms.len());
    for &(var, coef) in &expr.terms {
        out.add_mul(coef, handles[var.0]);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SizeBounds;
    use crate::mip::SeatingMilpBuilder;
    use crate::models::{CapacityPlan, Participant, Population, TraitCatalog};
    use std::time::{Duration, Instant};

    fn knapsack() -> LinearProgram {
        // min -5x - 4y - 3z  s.t. 2x + 3y + z <= 5, binaries
        let mut lp = LinearProgram::new();
        let x = lp.add_variable("x", VarKind::Binary, 0.0);
        let y = lp.add_variable("y", VarKind::Binary, 0.0);
        let z = lp.add_variable("z", VarKind::Binary, 0.0);
        lp.add_constraint(
            "weight",
            LinearExpr::new().with(x, 2.0).with(y, 3.0).with(z, 1.0),
            Relation::LessEq,
            5.0,
        );
        lp.set_objective(LinearExpr::new().with(x, -5.0).with(y, -4.0).with(z, -3.0));
        lp
    }

    #[test]
    fn test_solves_small_binary_program() {
        let sol = MicroLpSolver::new()
            .solve(&knapsack(), &SolverLimits::default())
            .unwrap();
        assert!(sol.is_optimal());
        // x + y (weight 5, value 9) beats x + z (weight 3, value 8)
        assert!((sol.objective - (-9.0)).abs() < 1e-6);
    }

    #[test]
    fn test_reports_infeasible() {
        let mut lp = LinearProgram::new();
        let x = lp.add_variable("x", VarKind::Binary, 0.0);
        lp.add_constraint("too_big", LinearExpr::sum([x]), Relation::GreaterEq, 2.0);
        lp.set_objective(LinearExpr::sum([x]));

        let sol = MicroLpSolver::new()
            .solve(&lp, &SolverLimits::default())
            .unwrap();
        assert_eq!(sol.status, SolveStatus::Infeasible);
        assert!(sol.values.is_empty());
    }

    #[test]
    fn test_generous_time_limit_returns_result() {
        let limits = SolverLimits {
            time_limit: Some(Duration::from_secs(30)),
        };
        let sol = MicroLpSolver::new().solve(&knapsack(), &limits).unwrap();
        assert!(sol.is_optimal());
    }

    fn thirty_people_three_rounds() -> LinearProgram {
        let people = (0..30)
            .map(|i| {
                Participant::new(format!("P{i:02}"))
                    .with_trait("Color", ["Red", "Blue", "Green"][i / 10])
            })
            .collect();
        let pop = Population::new(people, vec!["Color".into()]);
        let plan = CapacityPlan::plan(30, SizeBounds::new(4, 6), 5).unwrap();
        let catalog = TraitCatalog::build(&pop, &[], plan.table_count());
        SeatingMilpBuilder::new(&catalog, &plan)
            .with_rounds(3)
            .build()
            .unwrap()
            .program
    }

    #[test]
    fn test_time_limit_stops_search_on_calling_thread() {
        let program = thirty_people_three_rounds();
        let limits = SolverLimits::from_ms(Some(50));

        let start = Instant::now();
        let sol = MicroLpSolver::new().solve(&program, &limits).unwrap();
        let elapsed = start.elapsed();

        assert_eq!(sol.status, SolveStatus::TimeLimit);
        // The search has returned, not been left running in the background
        assert!(elapsed < Duration::from_secs(10), "solve took {elapsed:?}");
        if sol.has_values() {
            assert_eq!(sol.values.len(), program.variable_count());
            assert!(program.violated(&sol.values, 1e-6).is_empty());
        }
    }

    #[test]
    fn test_repeated_time_limits_return_promptly() {
        let program = thirty_people_three_rounds();
        let limits = SolverLimits::from_ms(Some(20));
        let start = Instant::now();
        for _ in 0..3 {
            let sol = MicroLpSolver::new().solve(&program, &limits).unwrap();
            assert_eq!(sol.status, SolveStatus::TimeLimit);
        }
        assert!(start.elapsed() < Duration::from_secs(15));
    }

    #[test]
    fn test_equality_and_continuous() {
        // min a  s.t. a + b == 2.5, b <= 1, a, b >= 0
        let mut lp = LinearProgram::new();
        let a = lp.add_variable("a", VarKind::Continuous, 0.0);
        let b = lp.add_variable("b", VarKind::Continuous, 0.0);
        lp.add_constraint("sum", LinearExpr::sum([a, b]), Relation::Equal, 2.5);
        lp.add_constraint("cap", LinearExpr::sum([b]), Relation::LessEq, 1.0);
        lp.set_objective(LinearExpr::sum([a]));

        let sol = MicroLpSolver::new()
            .solve(&lp, &SolverLimits::default())
            .unwrap();
        assert!((sol.values[0] - 1.5).abs() < 1e-6);
        assert!(lp.violated(&sol.values, 1e-6).is_empty());
    }
}
