//! Inputs and file naming for generated reports.
//!
//! Chart and PDF rendering live outside this crate. What they need from the
//! registry is the aggregated data, a timestamp that sorts like time, and the
//! file names to write under the reports directory.

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use chrono::{DateTime, Local};
use serde::Serialize;

use crate::EmissionsError;
use crate::aggregate::{RecordTotals, round2, top_n, totals};
use crate::record::EmissionRecord;

pub const STAMP_FORMAT: &str = "%Y-%m-%d_%H-%M-%S";

/// Number of companies shown in the report chart.
pub const CHART_TOP_N: usize = 10;

/// File extensions listed as reports.
pub const REPORT_EXTENSIONS: &[&str] = &["pdf", "json"];

/// Zero-padded local timestamp; lexical order equals chronological order.
pub fn report_stamp(now: DateTime<Local>) -> String {
    now.format(STAMP_FORMAT).to_string()
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReportPaths {
    pub graph_pdf: PathBuf,
    pub data_pdf: PathBuf,
    pub data_json: PathBuf,
}

impl ReportPaths {
    pub fn new(dir: &Path, stamp: &str) -> Self {
        Self {
            graph_pdf: dir.join(format!("emission_report_graph_{stamp}.pdf")),
            data_pdf: dir.join(format!("emission_report_data_{stamp}.pdf")),
            data_json: dir.join(format!("emission_report_data_{stamp}.json")),
        }
    }
}

/// One company's group sums, rounded for display. Used for chart bars and
/// table rows alike.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TableRow {
    pub company: String,
    pub energy: f64,
    pub transportation: f64,
}

impl From<&RecordTotals> for TableRow {
    fn from(t: &RecordTotals) -> Self {
        Self {
            company: t.name.clone(),
            energy: round2(t.energy),
            transportation: round2(t.transportation),
        }
    }
}

/// Everything a chart/report renderer consumes for one generation run.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ReportDataset {
    pub generated_at: String,
    /// Highest emitters first.
    pub chart: Vec<TableRow>,
    /// Every company in storage order.
    pub table: Vec<TableRow>,
}

impl ReportDataset {
    pub fn build(records: &[EmissionRecord], top: usize, generated_at: String) -> Self {
        let chart = top_n(records, top).iter().map(TableRow::from).collect();
        let table = records.iter().map(|r| TableRow::from(&totals(r))).collect();
        Self {
            generated_at,
            chart,
            table,
        }
    }
}

/// Receives the dataset after every successful insert.
pub trait ReportSink: Send + Sync {
    /// Returns the path of the artifact written, if any.
    fn publish(&self, dataset: &ReportDataset) -> Result<Option<PathBuf>, EmissionsError>;
}

/// Writes the dataset as JSON next to the rendered reports.
#[derive(Clone, Debug)]
pub struct JsonReportWriter {
    dir: PathBuf,
}

impl JsonReportWriter {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl ReportSink for JsonReportWriter {
    fn publish(&self, dataset: &ReportDataset) -> Result<Option<PathBuf>, EmissionsError> {
        fs::create_dir_all(&self.dir)?;
        let body = serde_json::to_vec_pretty(dataset)?;
        let (path, mut file) = create_unique(&self.dir, &dataset.generated_at)?;
        file.write_all(&body)?;
        file.sync_all()?;
        tracing::info!(path = %path.display(), companies = dataset.table.len(), "wrote report data");
        Ok(Some(path))
    }
}

/// Opens a fresh data file for `stamp`. Runs that share a stamp get a
/// `_1`, `_2`, ... suffix instead of replacing the earlier report.
fn create_unique(dir: &Path, stamp: &str) -> Result<(PathBuf, fs::File), EmissionsError> {
    let mut suffix = 0u32;
    loop {
        let stamp = if suffix == 0 {
            stamp.to_string()
        } else {
            format!("{stamp}_{suffix}")
        };
        let path = ReportPaths::new(dir, &stamp).data_json;
        match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(file) => return Ok((path, file)),
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => suffix += 1,
            Err(e) => return Err(e.into()),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ReportEntry {
    pub file_name: String,
    #[serde(skip)]
    pub created: SystemTime,
}

/// Report files in `dir`, newest first. A missing directory has no reports.
pub fn list_reports(dir: &Path) -> Result<Vec<ReportEntry>, EmissionsError> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e.into()),
    };
    let mut reports = Vec::new();
    for entry in entries {
        let entry = entry?;
        let path = entry.path();
        let is_report = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|ext| REPORT_EXTENSIONS.contains(&ext));
        if !is_report {
            continue;
        }
        let meta = entry.metadata()?;
        if !meta.is_file() {
            continue;
        }
        let created = meta.created().or_else(|_| meta.modified())?;
        reports.push(ReportEntry {
            file_name: entry.file_name().to_string_lossy().into_owned(),
            created,
        });
    }
    reports.sort_by(|a, b| {
        b.created
            .cmp(&a.created)
            .then_with(|| b.file_name.cmp(&a.file_name))
    });
    Ok(reports)
}
