//! Assignment model: (participant, round) → table.
//!
//! The assignment is the one artifact a solve produces. Pair meetings are
//! derived from it, never stored.

use serde::{Deserialize, Serialize};

use crate::config::SizeBounds;
use crate::error::SeatingError;

/// A total map from (participant, round) to a 0-based table index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignment {
    /// `tables[round][person]` = table index.
    tables: Vec<Vec<usize>>,
    /// Number of tables available per round (G).
    table_count: usize,
}

impl Assignment {
    /// Wraps per-round table vectors, checking that every entry is a valid
    /// table and that all rounds cover the same participants.
    ///
    /// # Errors
    /// `Inconsistent` on ragged rounds or out-of-range tables.
    pub fn new(tables: Vec<Vec<usize>>, table_count: usize) -> Result<Self, SeatingError> {
        let people = tables.first().map(Vec::len).unwrap_or(0);
        for (r, round) in tables.iter().enumerate() {
            if round.len() != people {
                return Err(SeatingError::Inconsistent(format!(
                    "round {} seats {} participants, expected {people}",
                    r + 1,
                    round.len()
                )));
            }
            if let Some((i, &t)) = round.iter().enumerate().find(|&(_, &t)| t >= table_count) {
                return Err(SeatingError::Inconsistent(format!(
                    "participant {i} assigned to table {} of {table_count} in round {}",
                    t + 1,
                    r + 1
                )));
            }
        }
        Ok(Self {
            tables,
            table_count,
        })
    }

    /// Number of rounds (R).
    #[inline]
    pub fn round_count(&self) -> usize {
        self.tables.len()
    }

    /// Number of participants (N).
    #[inline]
    pub fn participant_count(&self) -> usize {
        self.tables.first().map(Vec::len).unwrap_or(0)
    }

    /// Number of tables per round (G).
    #[inline]
    pub fn table_count(&self) -> usize {
        self.table_count
    }

    /// Table of `person` in `round`.
    #[inline]
    pub fn table_of(&self, person: usize, round: usize) -> usize {
        self.tables[round][person]
    }

    /// Table vector of one round.
    pub fn round(&self, round: usize) -> &[usize] {
        &self.tables[round]
    }

    /// Participants seated at `table` in `round`, ascending.
    pub fn members(&self, round: usize, table: usize) -> Vec<usize> {
        self.tables[round]
            .iter()
            .enumerate()
            .filter(|&(_, &t)| t == table)
            .map(|(i, _)| i)
            .collect()
    }

    /// Occupancy of every table in `round`.
    pub fn occupancy(&self, round: usize) -> Vec<usize> {
        let mut counts = vec![0; self.table_count];
        for &t in &self.tables[round] {
            counts[t] += 1;
        }
        counts
    }

    /// Whether `i` and `j` share a table in `round`.
    #[inline]
    pub fn met(&self, i: usize, j: usize, round: usize) -> bool {
        self.tables[round][i] == self.tables[round][j]
    }

    /// Whether `i` and `j` share a table in any round.
    pub fn ever_met(&self, i: usize, j: usize) -> bool {
        (0..self.round_count()).any(|r| self.met(i, j, r))
    }

    /// Number of rounds in which `i` and `j` share a table.
    pub fn meetings(&self, i: usize, j: usize) -> usize {
        (0..self.round_count()).filter(|&r| self.met(i, j, r)).count()
    }

    /// The first `rounds` rounds of this assignment.
    pub fn truncated(&self, rounds: usize) -> Self {
        Self {
            tables: self.tables.iter().take(rounds).cloned().collect(),
            table_count: self.table_count,
        }
    }

    /// Checks occupancy bounds: every used table holds `[min, max]` people.
    ///
    /// # Errors
    /// `Inconsistent` naming the first offending round and table.
    pub fn check_bounds(&self, bounds: SizeBounds) -> Result<(), SeatingError> {
        for r in 0..self.round_count() {
            for (t, &n) in self.occupancy(r).iter().enumerate() {
                if n > 0 && !bounds.admits(n) {
                    return Err(SeatingError::Inconsistent(format!(
                        "table {} in round {} seats {n}, outside [{}, {}]",
                        t + 1,
                        r + 1,
                        bounds.min,
                        bounds.max
                    )));
                }
            }
        }
        Ok(())
    }
}
