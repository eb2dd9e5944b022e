//! Table-count and capacity planning.
//!
//! # Algorithm
//!
//! 1. Feasibility window: `ceil(N/u) <= G <= floor(N/l)`.
//! 2. Pick the `G` in the window closest to `round(N / divisor)`
//!    (smaller `G` on ties). An empty window falls back to
//!    `max(1, round(N/u))`.
//! 3. Capacities: `N div G` seats per table, plus one extra seat for the
//!    first `N mod G` tables.

use serde::{Deserialize, Serialize};

use crate::config::SizeBounds;
use crate::error::SeatingError;

/// Table count and per-table target occupancy for one population.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapacityPlan {
    /// Population size (N).
    pub participants: usize,
    /// Occupancy bounds of a used table.
    pub bounds: SizeBounds,
    /// Target occupancy per table; `capacities.len()` is the table count.
    pub capacities: Vec<usize>,
    /// Whether the feasibility window was empty and the fallback count used.
    pub fallback: bool,
}

impl CapacityPlan {
    /// Plans tables for `participants` people.
    ///
    /// # Errors
    /// `InfeasiblePlan` if `participants == 0`.
    pub fn plan(
        participants: usize,
        bounds: SizeBounds,
        centering_divisor: usize,
    ) -> Result<Self, SeatingError> {
        if participants == 0 {
            return Err(SeatingError::infeasible(0, "no participants to seat"));
        }
        let n = participants as f64;
        let lo = participants.div_ceil(bounds.max.max(1));
        let hi = participants / bounds.min.max(1);

        let (tables, fallback) = if lo <= hi && hi > 0 {
            let center = (n / centering_divisor.max(1) as f64).round() as usize;
            let best = (lo..=hi)
                .min_by_key(|&g| g.abs_diff(center))
                .unwrap_or(lo);
            (best, false)
        } else {
            let g = (n / bounds.max.max(1) as f64).round() as usize;
            (g.max(1), true)
        };

        Ok(Self::with_table_count(participants, bounds, tables, fallback))
    }

    /// Plans a fixed number of tables.
    ///
    /// # Errors
    /// `InfeasiblePlan` if `participants == 0` or `tables == 0`.
    pub fn fixed(
        participants: usize,
        bounds: SizeBounds,
        tables: usize,
    ) -> Result<Self, SeatingError> {
        if participants == 0 {
            return Err(SeatingError::infeasible(0, "no participants to seat"));
        }
        if tables == 0 {
            return Err(SeatingError::infeasible(participants, "table count must be positive"));
        }
        Ok(Self::with_table_count(participants, bounds, tables, false))
    }

    fn with_table_count(
        participants: usize,
        bounds: SizeBounds,
        tables: usize,
        fallback: bool,
    ) -> Self {
        let base = participants / tables;
        let extra = participants % tables;
        let capacities = (0..tables)
            .map(|g| if g < extra { base + 1 } else { base })
            .collect();
        Self {
            participants,
            bounds,
            capacities,
            fallback,
        }
    }

    /// Number of tables (G).
    #[inline]
    pub fn table_count(&self) -> usize {
        self.capacities.len()
    }

    /// Whether some number of used tables `k <= G` can seat everyone
    /// within the bounds.
    pub fn is_seatable(&self) -> bool {
        (1..=self.table_count()).any(|k| self.bounds.can_seat(k, self.participants))
    }

    /// Whether every planned capacity itself lies within the bounds.
    pub fn capacities_within_bounds(&self) -> bool {
        self.capacities.iter().all(|&c| self.bounds.admits(c))
    }

    /// Fails with `InfeasiblePlan` unless the bounds admit a partition.
    pub fn ensure_seatable(&self) -> Result<(), SeatingError> {
        if self.is_seatable() {
            Ok(())
        } else {
            Err(SeatingError::infeasible(
                self.participants,
                format!(
                    "{} tables with {}-{} seats cannot seat everyone",
                    self.table_count(),
                    self.bounds.min,
                    self.bounds.max
                ),
            ))
        }
    }
}
