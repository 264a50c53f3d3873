use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::categories::Category;

/// One company's stored emissions row. Values are annual kg CO2, already
/// converted from the monthly inputs.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EmissionRecord {
    pub id: String,
    pub name: String,
    amounts: [f64; Category::COUNT],
}

impl EmissionRecord {
    /// Builds a record from converted values indexed like [`Category::ALL`].
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        amounts: [f64; Category::COUNT],
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            amounts,
        }
    }

    pub fn amount(&self, category: Category) -> f64 {
        self.amounts[category.index()]
    }

    /// Category values in storage column order.
    pub fn amounts(&self) -> impl Iterator<Item = (Category, f64)> + '_ {
        Category::ALL.into_iter().map(|c| (c, self.amount(c)))
    }
}

/// Raw field input for a new record, as typed by the user.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Submission {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub inputs: BTreeMap<Category, String>,
}

impl Submission {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            inputs: BTreeMap::new(),
        }
    }

    pub fn with(mut self, category: Category, raw: impl Into<String>) -> Self {
        self.inputs.insert(category, raw.into());
        self
    }

    /// Raw input for a category. Zero-emission modes read as `"0"` when the
    /// caller left them out.
    pub fn input(&self, category: Category) -> Option<&str> {
        match self.inputs.get(&category) {
            Some(raw) => Some(raw.as_str()),
            None if category.is_fixed_zero() => Some("0"),
            None => None,
        }
    }
}
