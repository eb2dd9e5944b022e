//! Trait catalog: value domains, frequencies, and per-table targets.
//!
//! Built in a first phase from the population; the model builder and the
//! greedy assigner are then parameterized over the derived domains.

use serde::{Deserialize, Serialize};

use super::Population;
use crate::config::TraitSpec;

/// One trait and its value domain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraitDomain {
    /// Trait name.
    pub name: String,
    /// Distinct values: seed values first, then observed values in order
    /// of first appearance.
    pub values: Vec<String>,
    /// Number of participants holding each value (parallel to `values`).
    pub counts: Vec<usize>,
}

impl TraitDomain {
    /// Index of `value` in the domain.
    pub fn index_of(&self, value: &str) -> Option<usize> {
        self.values.iter().position(|v| v == value)
    }
}

/// Trait domains and encoded participant values for one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraitCatalog {
    /// Traits, in population order.
    pub traits: Vec<TraitDomain>,
    /// `codes[person][trait]` = index into `traits[trait].values`.
    codes: Vec<Vec<usize>>,
    /// Number of tables the targets are spread over (G).
    table_count: usize,
}

impl TraitCatalog {
    /// Derives domains and targets from a population.
    ///
    /// `specs` supplies optional seed domains by trait name; traits without
    /// a matching spec are purely data-derived.
    pub fn build(population: &Population, specs: &[TraitSpec], table_count: usize) -> Self {
        let mut traits: Vec<TraitDomain> = population
            .trait_names
            .iter()
            .map(|name| {
                let mut values: Vec<String> = Vec::new();
                if let Some(spec) = specs.iter().find(|s| &s.name == name) {
                    for seed in &spec.seed_values {
                        if !values.contains(seed) {
                            values.push(seed.clone());
                        }
                    }
                }
                TraitDomain {
                    name: name.clone(),
                    values,
                    counts: Vec::new(),
                }
            })
            .collect();

        let mut codes = Vec::with_capacity(population.len());
        for participant in &population.participants {
            let mut row = Vec::with_capacity(traits.len());
            for domain in traits.iter_mut() {
                let value = participant.value(&domain.name);
                let idx = match domain.index_of(value) {
                    Some(idx) => idx,
                    None => {
                        domain.values.push(value.to_string());
                        domain.values.len() - 1
                    }
                };
                row.push(idx);
            }
            codes.push(row);
        }

        for (k, domain) in traits.iter_mut().enumerate() {
            domain.counts = vec![0; domain.values.len()];
            for row in &codes {
                domain.counts[row[k]] += 1;
            }
        }

        Self {
            traits,
            codes,
            table_count,
        }
    }

    /// Number of traits.
    #[inline]
    pub fn trait_count(&self) -> usize {
        self.traits.len()
    }

    /// Number of tables targets are computed for.
    #[inline]
    pub fn table_count(&self) -> usize {
        self.table_count
    }

    /// Number of participants encoded.
    #[inline]
    pub fn participant_count(&self) -> usize {
        self.codes.len()
    }

    /// Value index of `person` for trait `k`.
    #[inline]
    pub fn code(&self, person: usize, k: usize) -> usize {
        self.codes[person][k]
    }

    /// Whether `person` holds value `a` of trait `k`.
    #[inline]
    pub fn has_value(&self, person: usize, k: usize, a: usize) -> bool {
        self.codes[person][k] == a
    }

    /// Population count of value `a` of trait `k`.
    #[inline]
    pub fn frequency(&self, k: usize, a: usize) -> usize {
        self.traits[k].counts[a]
    }

    /// Per-table target for value `a` of trait `k`: count / G, unrounded.
    pub fn target(&self, k: usize, a: usize) -> f64 {
        if self.table_count == 0 {
            return 0.0;
        }
        self.frequency(k, a) as f64 / self.table_count as f64
    }

    /// Rarity of a participant: Σ over traits of 1 / frequency(value).
    pub fn rarity(&self, person: usize) -> f64 {
        (0..self.trait_count())
            .map(|k| {
                let freq = self.frequency(k, self.code(person, k));
                if freq == 0 {
                    0.0
                } else {
                    1.0 / freq as f64
                }
            })
            .sum()
    }
}
