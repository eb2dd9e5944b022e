//! Input validation for seating problems.
//!
//! Checks structural integrity of the participant table and the
//! configuration before any model is built. Detects:
//! - Empty populations
//! - Blank or missing identifiers
//! - Duplicate identifiers
//! - Population sizes outside the configured range
//! - Unusable table-size bounds or round counts
//!
//! All issues are collected; validation never stops at the first one.

use std::collections::HashSet;

use crate::config::SolveConfig;
use crate::models::Record;

/// Validation result.
pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// A validation error.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    /// Error category.
    pub kind: ValidationErrorKind,
    /// Human-readable description.
    pub message: String,
}

/// Categories of validation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationErrorKind {
    /// No participant rows at all.
    EmptyPopulation,
    /// A row has a blank or missing identifier.
    MissingId,
    /// Two rows share the same identifier.
    DuplicateId,
    /// Population size is outside the accepted range.
    PopulationOutOfRange,
    /// Table-size bounds are zero or inverted.
    InvalidTableSize,
    /// Round count is zero.
    InvalidRoundCount,
}

impl ValidationError {
    pub(crate) fn new(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Validates participant records against a configuration.
///
/// Checks:
/// 1. At least one row
/// 2. Every row has a non-blank identifier (after trimming)
/// 3. No identifier occurs twice
/// 4. Row count lies in `config.population`, when set
/// 5. `1 <= table_size.min <= table_size.max`
/// 6. `rounds >= 1`
///
/// # Returns
/// `Ok(())` if all checks pass, `Err(errors)` with all detected issues.
pub fn validate_records(records: &[Record], config: &SolveConfig) -> ValidationResult {
    let mut errors = Vec::new();

    if records.is_empty() {
        errors.push(ValidationError::new(
            ValidationErrorKind::EmptyPopulation,
            "No participants provided",
        ));
    }

    let mut seen = HashSet::new();
    for (row, record) in records.iter().enumerate() {
        let id = record
            .get(&config.id_column)
            .map(|v| v.trim())
            .unwrap_or("");
        if id.is_empty() {
            errors.push(ValidationError::new(
                ValidationErrorKind::MissingId,
                format!("Row {} is missing {}", row + 1, config.id_column),
            ));
        } else if !seen.insert(id) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate {}: {id}", config.id_column),
            ));
        }
    }

    if let Some(bounds) = config.population {
        if !records.is_empty() && !bounds.contains(records.len()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::PopulationOutOfRange,
                format!(
                    "Expected {}-{} participants, got {}",
                    bounds.min,
                    bounds.max,
                    records.len()
                ),
            ));
        }
    }

    errors.extend(validate_config(config));

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Checks configuration values that do not depend on the population.
fn validate_config(config: &SolveConfig) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    let size = config.table_size;

    if size.min == 0 || size.min > size.max {
        errors.push(ValidationError::new(
            ValidationErrorKind::InvalidTableSize,
            format!("Invalid table size bounds [{}, {}]", size.min, size.max),
        ));
    }
    if config.rounds == 0 {
        errors.push(ValidationError::new(
            ValidationErrorKind::InvalidRoundCount,
            "At least one round is required",
        ));
    }
    if config.centering_divisor == 0 {
        errors.push(ValidationError::new(
            ValidationErrorKind::InvalidTableSize,
            "Centering divisor must be positive",
        ));
    }

    errors
}
