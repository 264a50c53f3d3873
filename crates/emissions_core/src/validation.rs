//! Field validation for new records.
//!
//! The `is_valid_*` predicates are total: malformed or empty input yields
//! `false`, never an error. [`validate_submission`] applies them in a fixed
//! order and stops at the first failure.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

use crate::categories::{Category, ENERGY, TRANSPORTATION};
use crate::record::{EmissionRecord, Submission};
use crate::{EmissionsError, EmissionsStore};

pub const MAX_NAME_CHARS: usize = 100;

static ID_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d{4}$").expect("static regex"));
static TRANSPORT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+(\.\d{1,3})?$").expect("static regex"));
static ENERGY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{1,6}(\.\d{1,3})?$").expect("static regex"));

/// The input field a validation failure refers to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Field {
    Id,
    Name,
    Category(Category),
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Field::Id => f.write_str("ID"),
            Field::Name => f.write_str("Name"),
            Field::Category(c) => write!(f, "{c}"),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ValidationReason {
    /// Not exactly four digits.
    BadIdFormat,
    DuplicateId,
    /// Empty or longer than [`MAX_NAME_CHARS`].
    BadName,
    /// Not a non-negative decimal with at most three fractional digits.
    BadTransportValue,
    /// Not a non-negative decimal with at most six integer and three fractional digits.
    BadEnergyValue,
    Missing,
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("{}", self.message())]
pub struct ValidationError {
    pub field: Field,
    pub reason: ValidationReason,
}

impl ValidationError {
    pub fn new(field: Field, reason: ValidationReason) -> Self {
        Self { field, reason }
    }

    /// Message suitable for showing to the person who typed the input.
    pub fn message(&self) -> String {
        match self.reason {
            ValidationReason::BadIdFormat => "ID must be exactly four digits.".to_string(),
            ValidationReason::DuplicateId => {
                "ID exists in the database. Please enter a new ID.".to_string()
            }
            ValidationReason::BadName => format!(
                "Invalid company name. Ensure it is not empty and does not exceed {MAX_NAME_CHARS} characters."
            ),
            ValidationReason::BadTransportValue => format!(
                "Invalid value for {}. Must be a decimal or integer with at most 3 decimal places.",
                self.field
            ),
            ValidationReason::BadEnergyValue => format!(
                "{} must be a decimal or integer up to 6 digits and 3 decimal places. No alphabetic characters allowed.",
                self.field
            ),
            ValidationReason::Missing => format!("{} is required.", self.field),
        }
    }
}

pub fn is_valid_id(s: &str) -> bool {
    ID_RE.is_match(s)
}

pub fn is_valid_company_name(s: &str) -> bool {
    let len = s.chars().count();
    len > 0 && len <= MAX_NAME_CHARS
}

pub fn is_valid_transport_value(s: &str) -> bool {
    TRANSPORT_RE.is_match(s)
}

pub fn is_valid_energy_value(s: &str) -> bool {
    ENERGY_RE.is_match(s)
}

/// True when no stored record uses `id`. A dataset that does not exist yet
/// has no conflicting ids, so every id is new.
pub fn is_new_id<S>(id: &str, store: &S) -> Result<bool, EmissionsError>
where
    S: EmissionsStore + ?Sized,
{
    store.contains_id(id).map(|found| !found)
}

/// Runs the insert validation chain and converts the inputs into a record.
///
/// Order: id format, id uniqueness, name, transportation fields, energy
/// fields. Storage is only read, never written.
pub fn validate_submission<S>(
    submission: &Submission,
    store: &S,
) -> Result<EmissionRecord, EmissionsError>
where
    S: EmissionsStore + ?Sized,
{
    if !is_valid_id(&submission.id) {
        return Err(ValidationError::new(Field::Id, ValidationReason::BadIdFormat).into());
    }
    if !is_new_id(&submission.id, store)? {
        return Err(ValidationError::new(Field::Id, ValidationReason::DuplicateId).into());
    }
    if !is_valid_company_name(&submission.name) {
        return Err(ValidationError::new(Field::Name, ValidationReason::BadName).into());
    }

    let mut amounts = [0.0; Category::COUNT];
    let checks: [(&[Category], fn(&str) -> bool, ValidationReason); 2] = [
        (
            &TRANSPORTATION,
            is_valid_transport_value,
            ValidationReason::BadTransportValue,
        ),
        (&ENERGY, is_valid_energy_value, ValidationReason::BadEnergyValue),
    ];
    for (categories, is_valid, reason) in checks {
        for &category in categories {
            let field = Field::Category(category);
            let raw = submission
                .input(category)
                .ok_or(ValidationError::new(field, ValidationReason::Missing))?;
            if !is_valid(raw) {
                return Err(ValidationError::new(field, reason).into());
            }
            // The grammar above only admits plain decimals.
            let monthly: f64 = raw
                .parse()
                .map_err(|_| ValidationError::new(field, reason))?;
            let yearly = category.convert(monthly);
            if !yearly.is_finite() {
                return Err(ValidationError::new(field, reason).into());
            }
            amounts[category.index()] = yearly;
        }
    }

    Ok(EmissionRecord::new(
        submission.id.clone(),
        submission.name.clone(),
        amounts,
    ))
}
