//! Participant and population models.
//!
//! A participant is an identifier plus one normalized value per trait.
//! Values are trimmed; blank or missing cells become [`UNKNOWN_VALUE`].

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::config::SolveConfig;
use crate::error::SeatingError;
use crate::validation::validate_records;

/// Sentinel for blank trait values.
pub const UNKNOWN_VALUE: &str = "Unknown";

/// One input row: column name → cell text.
pub type Record = BTreeMap<String, String>;

/// Normalizes a raw trait cell (trim, blank → "Unknown", case kept).
pub fn normalize_value(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        UNKNOWN_VALUE.to_string()
    } else {
        trimmed.to_string()
    }
}

/// A person to be seated. Immutable once loaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    /// Unique, non-blank identifier.
    pub id: String,
    /// Normalized value per trait name.
    pub traits: BTreeMap<String, String>,
}

impl Participant {
    /// Creates a participant with no traits.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            traits: BTreeMap::new(),
        }
    }

    /// Sets a trait value (normalized).
    pub fn with_trait(mut self, name: impl Into<String>, value: &str) -> Self {
        self.traits.insert(name.into(), normalize_value(value));
        self
    }

    /// The participant's value for `trait_name`, or "Unknown".
    pub fn value(&self, trait_name: &str) -> &str {
        self.traits
            .get(trait_name)
            .map(String::as_str)
            .unwrap_or(UNKNOWN_VALUE)
    }
}

/// The validated set of people for one run, in input order.
///
/// Person indices used throughout the crate are positions in
/// `participants`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Population {
    /// Participants in input order.
    pub participants: Vec<Participant>,
    /// Trait names, in configuration order (or sorted when derived).
    pub trait_names: Vec<String>,
}

impl Population {
    /// Builds a population from raw records.
    ///
    /// Validates identifiers, population size, and configuration first
    /// (see [`validate_records`]). When `config.traits` is empty, every
    /// column except the id column is treated as a trait.
    ///
    /// # Errors
    /// `SeatingError::InvalidInput` with every detected issue.
    pub fn from_records(records: &[Record], config: &SolveConfig) -> Result<Self, SeatingError> {
        validate_records(records, config).map_err(SeatingError::InvalidInput)?;

        let trait_names: Vec<String> = if config.traits.is_empty() {
            let columns: BTreeSet<&String> = records
                .iter()
                .flat_map(|r| r.keys())
                .filter(|k| **k != config.id_column)
                .collect();
            columns.into_iter().cloned().collect()
        } else {
            config.traits.iter().map(|t| t.name.clone()).collect()
        };

        let participants = records
            .iter()
            .map(|record| {
                let id = record
                    .get(&config.id_column)
                    .map(|v| v.trim().to_string())
                    .unwrap_or_default();
                let traits = trait_names
                    .iter()
                    .map(|name| {
                        let raw = record.get(name).map(String::as_str).unwrap_or("");
                        (name.clone(), normalize_value(raw))
                    })
                    .collect();
                Participant { id, traits }
            })
            .collect();

        Ok(Self {
            participants,
            trait_names,
        })
    }

    /// Wraps already-normalized participants.
    pub fn new(participants: Vec<Participant>, trait_names: Vec<String>) -> Self {
        Self {
            participants,
            trait_names,
        }
    }

    /// Number of participants (N).
    #[inline]
    pub fn len(&self) -> usize {
        self.participants.len()
    }

    /// Whether the population is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.participants.is_empty()
    }

    /// Participant by index.
    pub fn get(&self, index: usize) -> Option<&Participant> {
        self.participants.get(index)
    }

    /// Index of the participant with `id`.
    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.participants.iter().position(|p| p.id == id)
    }
}
