#![cfg(feature = "microlp")]

use u_seating::config::{PenaltyWeights, SizeBounds};
use u_seating::mip::{MicroLpSolver, SeatingMilpBuilder, SolverLimits};
use u_seating::models::{CapacityPlan, Participant, Population, TraitCatalog};
use u_seating::scheduler::SeatingKpi;

fn population(colors: &[&str]) -> Population {
    let people = colors
        .iter()
        .enumerate()
        .map(|(i, c)| Participant::new(format!("P{i}")).with_trait("Color", c))
        .collect();
    Population::new(people, vec!["Color".into()])
}

fn setup(pop: &Population, bounds: SizeBounds) -> (TraitCatalog, CapacityPlan) {
    let plan = CapacityPlan::plan(pop.len(), bounds, 5).unwrap();
    let catalog = TraitCatalog::build(pop, &[], plan.table_count());
    (catalog, plan)
}

#[test]
fn test_fractional_targets_reconstruct_exactly() {
    // 5 Red, 2 Blue over 2 tables: targets 2.5 and 1.0
    let pop = population(&["Red", "Red", "Red", "Red", "Red", "Blue", "Blue"]);
    let (catalog, plan) = setup(&pop, SizeBounds::new(3, 4));
    assert_eq!(plan.table_count(), 2);

    let outcome = SeatingMilpBuilder::new(&catalog, &plan)
        .solve(&MicroLpSolver::new(), &SolverLimits::default())
        .unwrap();

    for reading in outcome
        .model
        .read_deviations(&catalog, &outcome.assignment, &outcome.solution)
    {
        assert!((reading.decomposed_gap() - reading.true_gap()).abs() < 1e-6);
        assert!(reading.over_first >= -1e-9 && reading.over_first <= 1.0 + 1e-9);
        assert!(reading.under_first >= -1e-9 && reading.under_first <= 1.0 + 1e-9);
        assert!(reading.over_extra >= -1e-9 && reading.under_extra >= -1e-9);
    }

    // Optimum splits Blue 1/1 and Red 3/2: two Red gaps of 0.5 at 10 each
    assert!((outcome.objective() - 10.0).abs() < 1e-6);
    let kpi = SeatingKpi::calculate(&catalog, &outcome.assignment, &PenaltyWeights::default());
    assert!((kpi.penalized_objective - outcome.objective()).abs() < 1e-6);
}

#[test]
fn test_ever_met_matches_realized_meetings() {
    let pop = population(&["Red", "Red", "Blue", "Blue"]);
    let (catalog, plan) = setup(&pop, SizeBounds::new(2, 2));

    let outcome = SeatingMilpBuilder::new(&catalog, &plan)
        .with_rounds(2)
        .solve(&MicroLpSolver::new(), &SolverLimits::default())
        .unwrap();
    let model = &outcome.model;
    let a = &outcome.assignment;

    for &(i, j) in model.pairs() {
        let ever = model.ever_met(i, j).unwrap();
        assert_eq!(outcome.solution.is_set(ever), a.ever_met(i, j), "pair ({i}, {j})");
        for r in 0..2 {
            if a.met(i, j, r) {
                let met = model.met(i, j, r).unwrap();
                assert!(outcome.solution.is_set(met));
            }
        }
    }

    // Every table mixes colors in both rounds
    for r in 0..2 {
        for g in 0..2 {
            let members = a.members(r, g);
            assert_eq!(members.len(), 2);
            assert_ne!(catalog.code(members[0], 0), catalog.code(members[1], 0));
        }
    }

    // Minimizing distinct partners keeps the same pairs in round 2
    let kpi = SeatingKpi::calculate(&catalog, a, &PenaltyWeights::default());
    assert_eq!(kpi.ever_met_pairs, 2);
    assert!((outcome.objective() - 100.0).abs() < 1e-6);
}

#[test]
fn test_ever_met_is_monotonic_in_rounds() {
    let pop = population(&["Red", "Red", "Blue", "Blue"]);
    let (catalog, plan) = setup(&pop, SizeBounds::new(2, 2));
    let outcome = SeatingMilpBuilder::new(&catalog, &plan)
        .with_rounds(2)
        .solve(&MicroLpSolver::new(), &SolverLimits::default())
        .unwrap();

    let first = outcome.assignment.truncated(1);
    for i in 0..4 {
        for j in (i + 1)..4 {
            if first.ever_met(i, j) {
                assert!(outcome.assignment.ever_met(i, j));
            }
        }
    }
}

#[test]
fn test_unused_tables_allowed_when_bounds_permit() {
    // 4 people, fixed 3 tables of 2: one table stays empty
    let pop = population(&["Red", "Blue", "Red", "Blue"]);
    let plan = CapacityPlan::fixed(4, SizeBounds::new(2, 2), 3).unwrap();
    let catalog = TraitCatalog::build(&pop, &[], 3);

    let outcome = SeatingMilpBuilder::new(&catalog, &plan)
        .solve(&MicroLpSolver::new(), &SolverLimits::default())
        .unwrap();

    // Tables fill in index order
    assert_eq!(outcome.assignment.occupancy(0), vec![2, 2, 0]);
    assert!(outcome.solution.is_set(outcome.model.used(0, 0)));
    assert!(!outcome.solution.is_set(outcome.model.used(2, 0)));
}
