//! Per-record and per-dataset totals.
//!
//! All sums keep full precision; [`round2`] is for display only.

use serde::Serialize;

use crate::categories::{Category, ENERGY, TRANSPORTATION};
use crate::record::EmissionRecord;

pub fn category_sum(record: &EmissionRecord, categories: &[Category]) -> f64 {
    categories.iter().map(|&c| record.amount(c)).sum()
}

pub fn energy_total(record: &EmissionRecord) -> f64 {
    category_sum(record, &ENERGY)
}

pub fn transportation_total(record: &EmissionRecord) -> f64 {
    category_sum(record, &TRANSPORTATION)
}

pub fn grand_total(record: &EmissionRecord) -> f64 {
    energy_total(record) + transportation_total(record)
}

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Totals for one record, in kg CO2 per year.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RecordTotals {
    pub id: String,
    pub name: String,
    pub transportation: f64,
    pub energy: f64,
}

impl RecordTotals {
    pub fn total(&self) -> f64 {
        self.energy + self.transportation
    }
}

pub fn totals(record: &EmissionRecord) -> RecordTotals {
    RecordTotals {
        id: record.id.clone(),
        name: record.name.clone(),
        transportation: transportation_total(record),
        energy: energy_total(record),
    }
}

/// The `n` records with the greatest combined emissions, largest first.
/// Equal totals keep their scan order. Returns fewer than `n` when the
/// dataset is smaller.
pub fn top_n(records: &[EmissionRecord], n: usize) -> Vec<RecordTotals> {
    let mut ranked: Vec<RecordTotals> = records.iter().map(totals).collect();
    ranked.sort_by(|a, b| b.total().total_cmp(&a.total()));
    ranked.truncate(n);
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str, car: f64, coal: f64) -> EmissionRecord {
        let mut amounts = [0.0; Category::COUNT];
        amounts[Category::Car.index()] = car;
        amounts[Category::Coal.index()] = coal;
        EmissionRecord::new(id, format!("Company {id}"), amounts)
    }

    #[test]
    fn sums_split_by_manifest() {
        let r = record("0001", 288.0, 0.6);
        assert_eq!(transportation_total(&r), 288.0);
        assert_eq!(energy_total(&r), 0.6);
        assert_eq!(grand_total(&r), 288.6);
        assert_eq!(category_sum(&r, &[Category::Car, Category::Coal]), 288.6);
        assert_eq!(category_sum(&r, &[]), 0.0);
    }

    #[test]
    fn top_n_orders_descending() {
        let records: Vec<EmissionRecord> = (0..15)
            .map(|i| record(&format!("{i:04}"), (i * 7 % 15) as f64, 0.5))
            .collect();
        let top = top_n(&records, 10);
        assert_eq!(top.len(), 10);
        assert!(top.windows(2).all(|w| w[0].total() > w[1].total()));
        assert_eq!(top[0].total(), 14.5);
        assert_eq!(top[9].total(), 5.5);

        let all = top_n(&records, 20);
        assert_eq!(all.len(), 15);
        assert!(all.windows(2).all(|w| w[0].total() > w[1].total()));
    }

    #[test]
    fn ties_keep_scan_order() {
        let records = vec![
            record("0001", 5.0, 0.0),
            record("0002", 9.0, 0.0),
            record("0003", 0.0, 5.0),
            record("0004", 5.0, 0.0),
        ];
        let ids: Vec<String> = top_n(&records, 4).into_iter().map(|t| t.id).collect();
        assert_eq!(ids, vec!["0002", "0001", "0003", "0004"]);
    }

    #[test]
    fn top_n_of_nothing_is_empty() {
        assert!(top_n(&[], 10).is_empty());
        assert!(top_n(&[record("0001", 1.0, 1.0)], 0).is_empty());
    }

    #[test]
    fn rounding_is_display_only() {
        let r = record("0001", 1.005, 0.0);
        assert_eq!(transportation_total(&r), 1.005);
        assert_eq!(round2(288.6000000001), 288.6);
        assert_eq!(round2(0.125), 0.13);
    }
}
