//! Schedule (solution) tables.
//!
//! A schedule is the caller-facing rendering of an [`Assignment`]:
//! - a participant-indexed table with one 1-based table column per round
//! - a round/table roster sorted by (round, table, participant id)
//! - the score of the solve that produced it

use serde::{Deserialize, Serialize};

use super::{Assignment, Population, TraitCatalog};
use crate::error::SeatingError;

/// Score attached to a schedule.
///
/// The two variants come from different objectives and are not comparable.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ScheduleScore {
    /// Objective value of an optimal exact solve (lower is better).
    Objective(f64),
    /// Sum over rounds, used tables, and traits of distinct values seated
    /// together (higher is better).
    Diversity(usize),
}

/// One participant's tables across all rounds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParticipantRow {
    /// Participant identifier.
    #[serde(rename = "Participant_ID")]
    pub participant_id: String,
    /// 1-based table number per round.
    pub tables: Vec<usize>,
}

/// One roster line: who sits where in which round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterEntry {
    /// 1-based round number.
    #[serde(rename = "Round")]
    pub round: usize,
    /// 1-based table number.
    #[serde(rename = "Table")]
    pub table: usize,
    /// Participant identifier.
    #[serde(rename = "Participant_ID")]
    pub participant_id: String,
}

/// A complete seating schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeatingSchedule {
    /// Participant-indexed rows, in input order.
    pub participants: Vec<ParticipantRow>,
    /// Round/table roster; only used tables appear.
    pub roster: Vec<RosterEntry>,
    /// Score of the producing solve.
    pub score: ScheduleScore,
}

impl SeatingSchedule {
    /// Renders an assignment into schedule tables.
    ///
    /// # Errors
    /// `Inconsistent` if the assignment does not seat exactly the
    /// population's participants.
    pub fn extract(
        population: &Population,
        assignment: &Assignment,
        score: ScheduleScore,
    ) -> Result<Self, SeatingError> {
        if assignment.participant_count() != population.len() {
            return Err(SeatingError::Inconsistent(format!(
                "assignment seats {} participants, population has {}",
                assignment.participant_count(),
                population.len()
            )));
        }

        let rounds = assignment.round_count();
        let participants = population
            .participants
            .iter()
            .enumerate()
            .map(|(i, p)| ParticipantRow {
                participant_id: p.id.clone(),
                tables: (0..rounds).map(|r| assignment.table_of(i, r) + 1).collect(),
            })
            .collect();

        let mut roster = Vec::with_capacity(rounds * population.len());
        for r in 0..rounds {
            for t in 0..assignment.table_count() {
                for i in assignment.members(r, t) {
                    roster.push(RosterEntry {
                        round: r + 1,
                        table: t + 1,
                        participant_id: population.participants[i].id.clone(),
                    });
                }
            }
        }
        roster.sort_by(|a, b| {
            (a.round, a.table, &a.participant_id).cmp(&(b.round, b.table, &b.participant_id))
        });

        Ok(Self {
            participants,
            roster,
            score,
        })
    }

    /// Number of rounds.
    pub fn round_count(&self) -> usize {
        self.participants.first().map(|p| p.tables.len()).unwrap_or(0)
    }

    /// Header of the participant table: `Participant_ID, Round_1_Table, ...`.
    pub fn participant_header(&self) -> Vec<String> {
        std::iter::once("Participant_ID".to_string())
            .chain((1..=self.round_count()).map(|r| format!("Round_{r}_Table")))
            .collect()
    }

    /// Participant table as text cells, matching [`participant_header`].
    ///
    /// [`participant_header`]: Self::participant_header
    pub fn participant_table(&self) -> Vec<Vec<String>> {
        self.participants
            .iter()
            .map(|row| {
                std::iter::once(row.participant_id.clone())
                    .chain(row.tables.iter().map(|t| t.to_string()))
                    .collect()
            })
            .collect()
    }

    /// Participant ids at a 1-based table in a 1-based round.
    pub fn table_members(&self, round: usize, table: usize) -> Vec<&str> {
        self.roster
            .iter()
            .filter(|e| e.round == round && e.table == table)
            .map(|e| e.participant_id.as_str())
            .collect()
    }

    /// Row for a participant id.
    pub fn row_for(&self, participant_id: &str) -> Option<&ParticipantRow> {
        self.participants
            .iter()
            .find(|p| p.participant_id == participant_id)
    }
}

/// Diversity score: Σ over rounds, used tables, and traits of the number
/// of distinct values seated at that table.
pub fn diversity_score(catalog: &TraitCatalog, assignment: &Assignment) -> usize {
    let mut score = 0;
    for r in 0..assignment.round_count() {
        for t in 0..assignment.table_count() {
            let members = assignment.members(r, t);
            if members.is_empty() {
                continue;
            }
            for k in 0..catalog.trait_count() {
                let mut seen = vec![false; catalog.traits[k].values.len()];
                for &i in &members {
                    seen[catalog.code(i, k)] = true;
                }
                score += seen.iter().filter(|&&s| s).count();
            }
        }
    }
    score
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Participant;

    fn sample() -> (Population, Assignment) {
        let people = ["d", "b", "c", "a"]
            .iter()
            .zip(["Red", "Red", "Blue", "Blue"])
            .map(|(id, color)| Participant::new(*id).with_trait("Color", color))
            .collect();
        let pop = Population::new(people, vec!["Color".into()]);
        let assignment =
            Assignment::new(vec![vec![0, 0, 1, 1], vec![1, 0, 1, 0]], 3).unwrap();
        (pop, assignment)
    }

    #[test]
    fn test_participant_rows_are_one_based() {
        let (pop, a) = sample();
        let s = SeatingSchedule::extract(&pop, &a, ScheduleScore::Diversity(0)).unwrap();
        assert_eq!(s.participants[0].participant_id, "d");
        assert_eq!(s.participants[0].tables, vec![1, 2]);
        assert_eq!(s.round_count(), 2);
        assert_eq!(s.row_for("a").unwrap().tables, vec![2, 1]);
    }

    #[test]
    fn test_roster_sorted_and_used_tables_only() {
        let (pop, a) = sample();
        let s = SeatingSchedule::extract(&pop, &a, ScheduleScore::Diversity(0)).unwrap();
        assert_eq!(s.roster.len(), 8);
        assert!(s.roster.iter().all(|e| e.table <= 2));
        let first: Vec<_> = s.roster[..2]
            .iter()
            .map(|e| (e.round, e.table, e.participant_id.as_str()))
            .collect();
        assert_eq!(first, vec![(1, 1, "b"), (1, 1, "d")]);
        assert_eq!(s.table_members(2, 1), vec!["a", "b"]);
    }

    #[test]
    fn test_participant_table() {
        let (pop, a) = sample();
        let s = SeatingSchedule::extract(&pop, &a, ScheduleScore::Objective(1.5)).unwrap();
        assert_eq!(
            s.participant_header(),
            vec!["Participant_ID", "Round_1_Table", "Round_2_Table"]
        );
        assert_eq!(s.participant_table()[2], vec!["c", "2", "2"]);
    }

    #[test]
    fn test_extract_rejects_mismatched_population() {
        let (pop, _) = sample();
        let a = Assignment::new(vec![vec![0, 0]], 1).unwrap();
        assert!(matches!(
            SeatingSchedule::extract(&pop, &a, ScheduleScore::Diversity(0)),
            Err(SeatingError::Inconsistent(_))
        ));
    }

    #[test]
    fn test_roster_serializes_with_column_names() {
        let entry = RosterEntry {
            round: 1,
            table: 2,
            participant_id: "P7".into(),
        };
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["Round"], 1);
        assert_eq!(json["Table"], 2);
        assert_eq!(json["Participant_ID"], "P7");
    }

    #[test]
    fn test_diversity_score() {
        let (pop, a) = sample();
        let catalog = TraitCatalog::build(&pop, &[], 3);
        // Round 1: {Red, Red}, {Blue, Blue} → 1 + 1
        // Round 2: {b Red, a Blue}, {d Red, c Blue} → 2 + 2
        assert_eq!(diversity_score(&catalog, &a), 6);
    }
}
