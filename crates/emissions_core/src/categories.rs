//! Emission categories and their conversion factors.
//!
//! Every record carries one converted value per [`Category`]. Categories are
//! grouped into two fixed manifests, [`TRANSPORTATION`] and [`ENERGY`], which
//! drive validation order, CSV column order and aggregation.

use serde::{Deserialize, Serialize};

/// Months per year applied when converting a monthly input to an annual figure.
pub const MONTHS_PER_YEAR: f64 = 12.0;

/// Factor used for a column name the table does not know about.
pub const DEFAULT_FACTOR: f64 = 1.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Category {
    Car,
    Bus,
    Train,
    Bicycle,
    Walking,
    Electricity,
    NaturalGas,
    FuelOil,
    Propane,
    Coal,
}

/// Which manifest a category belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Group {
    Transportation,
    Energy,
}

pub const TRANSPORTATION: [Category; 5] = [
    Category::Car,
    Category::Bus,
    Category::Train,
    Category::Bicycle,
    Category::Walking,
];

pub const ENERGY: [Category; 5] = [
    Category::Electricity,
    Category::NaturalGas,
    Category::FuelOil,
    Category::Propane,
    Category::Coal,
];

impl Category {
    pub const COUNT: usize = 10;

    /// All categories, transportation first, in storage column order.
    pub const ALL: [Category; Category::COUNT] = [
        Category::Car,
        Category::Bus,
        Category::Train,
        Category::Bicycle,
        Category::Walking,
        Category::Electricity,
        Category::NaturalGas,
        Category::FuelOil,
        Category::Propane,
        Category::Coal,
    ];

    /// Column header used in the backing file.
    pub fn column_name(self) -> &'static str {
        match self {
            Category::Car => "Car",
            Category::Bus => "Bus",
            Category::Train => "Train",
            Category::Bicycle => "Bicycle",
            Category::Walking => "Walking",
            Category::Electricity => "Electricity",
            Category::NaturalGas => "Natural Gas",
            Category::FuelOil => "Fuel Oil",
            Category::Propane => "Propane",
            Category::Coal => "Coal",
        }
    }

    pub fn from_column_name(name: &str) -> Option<Category> {
        Category::ALL
            .into_iter()
            .find(|c| c.column_name() == name.trim())
    }

    pub fn group(self) -> Group {
        if TRANSPORTATION.contains(&self) {
            Group::Transportation
        } else {
            Group::Energy
        }
    }

    /// kg CO2 per monthly input unit.
    pub fn factor(self) -> f64 {
        match self {
            Category::Electricity => 0.0005,
            Category::NaturalGas => 0.0053,
            Category::FuelOil => 2.32,
            // kg CO2 per litre
            Category::Propane => 2.75,
            // kg CO2 per kg
            Category::Coal => 2.5,
            Category::Car => 2.4,
            Category::Bus => 5.5,
            Category::Train => 3.0,
            Category::Bicycle | Category::Walking => 0.0,
        }
    }

    /// Whether the category is a zero-emission mode whose input is fixed at 0.
    pub fn is_fixed_zero(self) -> bool {
        matches!(self, Category::Bicycle | Category::Walking)
    }

    /// Converts a raw monthly input into annual kg CO2.
    pub fn convert(self, monthly: f64) -> f64 {
        monthly * MONTHS_PER_YEAR * self.factor()
    }

    pub(crate) fn index(self) -> usize {
        self as usize
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.column_name())
    }
}

/// Looks up a factor by column name, falling back to [`DEFAULT_FACTOR`].
pub fn conversion_factor(column: &str) -> f64 {
    Category::from_column_name(column)
        .map(Category::factor)
        .unwrap_or(DEFAULT_FACTOR)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manifests_partition_all_categories() {
        let mut joined: Vec<Category> = TRANSPORTATION.to_vec();
        joined.extend(ENERGY);
        assert_eq!(joined, Category::ALL.to_vec());
        assert!(TRANSPORTATION.iter().all(|c| c.group() == Group::Transportation));
        assert!(ENERGY.iter().all(|c| c.group() == Group::Energy));
    }

    #[test]
    fn index_matches_position_in_all() {
        for (i, c) in Category::ALL.iter().enumerate() {
            assert_eq!(c.index(), i);
        }
    }

    #[test]
    fn column_names_round_trip() {
        for c in Category::ALL {
            assert_eq!(Category::from_column_name(c.column_name()), Some(c));
        }
        assert_eq!(Category::from_column_name(" Natural Gas "), Some(Category::NaturalGas));
        assert_eq!(Category::from_column_name("Hydrogen"), None);
    }

    #[test]
    fn unknown_column_defaults_to_one() {
        assert_eq!(conversion_factor("Hydrogen"), 1.0);
        assert_eq!(conversion_factor("Car"), 2.4);
        assert_eq!(conversion_factor("Coal"), 2.5);
    }

    #[test]
    fn zero_emission_modes_convert_to_zero() {
        assert_eq!(Category::Bicycle.convert(40.0), 0.0);
        assert_eq!(Category::Walking.convert(12.5), 0.0);
        assert!(Category::Walking.is_fixed_zero());
        assert!(!Category::Car.is_fixed_zero());
    }

    #[test]
    fn convert_is_monthly_times_twelve_times_factor() {
        assert_eq!(Category::Car.convert(10.0), 10.0 * 12.0 * 2.4);
        assert_eq!(Category::Bus.convert(2.0), 2.0 * 12.0 * 5.5);
    }
}
