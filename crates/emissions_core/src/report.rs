//! Text summaries and recommendations.

use std::fmt::{self, Write as _};

use serde::Serialize;

use crate::aggregate::{energy_total, round2, transportation_total};
use crate::record::EmissionRecord;

/// Annual kg CO2 separating low from high emitters.
pub const MODERATE_THRESHOLD: f64 = 75.0;

pub const LISTING_HEADER: &str = "List of Companies (Ordered Alphabetically by Name):";
pub const NO_DATA: &str = "No data available.";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Recommendation {
    Low,
    Moderate,
    High,
}

impl Recommendation {
    pub fn for_total(total: f64) -> Self {
        if total < MODERATE_THRESHOLD {
            Recommendation::Low
        } else if total > MODERATE_THRESHOLD {
            Recommendation::High
        } else {
            Recommendation::Moderate
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            Recommendation::Low => "Your company's emissions are relatively low. Keep going!",
            Recommendation::Moderate => {
                "Your company's emissions are moderate. Evaluate your measures regularly."
            }
            Recommendation::High => {
                "Consider implementing measures to reduce your carbon footprint \
                 (using public transportation, carpooling, or investing in energy-efficient appliances)."
            }
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Summary {
    pub transportation: f64,
    pub energy: f64,
    pub total: f64,
    pub recommendation: Recommendation,
}

pub fn summarize(record: &EmissionRecord) -> Summary {
    let transportation = transportation_total(record);
    let energy = energy_total(record);
    let total = transportation + energy;
    Summary {
        transportation,
        energy,
        total,
        recommendation: Recommendation::for_total(total),
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Summary Reports")?;
        writeln!(
            f,
            "Total Transportation Emissions: {:.2} kg CO2",
            round2(self.transportation)
        )?;
        writeln!(f, "Total Energy Source Emissions: {:.2} kg CO2", round2(self.energy))?;
        writeln!(f, "Total Emissions: {:.2} kg CO2", round2(self.total))?;
        writeln!(f, "Suggestions for Reducing Emissions:")?;
        write!(f, "- {}", self.recommendation.message())
    }
}

/// Field-by-field dump of a stored record.
pub fn format_record(record: &EmissionRecord) -> String {
    let mut out = format!("Company ID: {}\nName: {}\n", record.id, record.name);
    for (category, amount) in record.amounts() {
        let _ = writeln!(out, "{category}: {:.2}", round2(amount));
    }
    out
}

/// Id and name of each record, in the order given, under a fixed header.
pub fn format_company_listing(records: &[EmissionRecord]) -> String {
    if records.is_empty() {
        return NO_DATA.to_string();
    }
    let id_width = records
        .iter()
        .map(|r| r.id.chars().count())
        .max()
        .unwrap_or(0)
        .max(2);
    let mut out = String::from(LISTING_HEADER);
    let _ = write!(out, "\n{:>id_width$} Name", "ID");
    for r in records {
        let _ = write!(out, "\n{:>id_width$} {}", r.id, r.name);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::categories::Category;

    fn with_total(car: f64, coal: f64) -> EmissionRecord {
        let mut amounts = [0.0; Category::COUNT];
        amounts[Category::Car.index()] = car;
        amounts[Category::Coal.index()] = coal;
        EmissionRecord::new("0001", "Acme", amounts)
    }

    #[test]
    fn threshold_branches() {
        assert_eq!(summarize(&with_total(74.99, 0.0)).recommendation, Recommendation::Low);
        assert_eq!(summarize(&with_total(75.0, 0.0)).recommendation, Recommendation::Moderate);
        assert_eq!(summarize(&with_total(50.0, 25.0)).recommendation, Recommendation::Moderate);
        assert_eq!(summarize(&with_total(75.01, 0.0)).recommendation, Recommendation::High);
    }

    #[test]
    fn summary_text_uses_two_decimals() {
        let text = summarize(&with_total(288.0, 0.6)).to_string();
        assert!(text.starts_with("Summary Reports\n"));
        assert!(text.contains("Total Transportation Emissions: 288.00 kg CO2"));
        assert!(text.contains("Total Energy Source Emissions: 0.60 kg CO2"));
        assert!(text.contains("Total Emissions: 288.60 kg CO2"));
        assert!(text.ends_with(Recommendation::High.message()));
    }

    #[test]
    fn listing_keeps_given_order() {
        let a = EmissionRecord::new("0002", "Beta", [0.0; Category::COUNT]);
        let b = EmissionRecord::new("0001", "Alpha", [0.0; Category::COUNT]);
        let text = format_company_listing(&[a, b]);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], LISTING_HEADER);
        assert_eq!(lines[1], "  ID Name");
        assert_eq!(lines[2], "0002 Beta");
        assert_eq!(lines[3], "0001 Alpha");
    }

    #[test]
    fn empty_listing() {
        assert_eq!(format_company_listing(&[]), NO_DATA);
    }

    #[test]
    fn record_dump_lists_every_category() {
        let text = format_record(&with_total(288.0, 0.0));
        assert!(text.starts_with("Company ID: 0001\nName: Acme\n"));
        assert!(text.contains("Car: 288.00\n"));
        assert!(text.contains("Natural Gas: 0.00\n"));
        assert_eq!(text.lines().count(), 2 + Category::COUNT);
    }
}
