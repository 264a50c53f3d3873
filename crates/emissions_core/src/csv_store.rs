//! Comma-separated file backend for [`EmissionsStore`].
//!
//! The file is the source of truth: every scan reopens it and nothing is
//! cached between calls. Columns are located by header name, so a file
//! written with the energy columns before the transportation ones still
//! reads correctly. New files and rewrites always use [`HEADER`] order.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use csv::{ReaderBuilder, StringRecord, Trim, WriterBuilder};
use tempfile::NamedTempFile;

use crate::categories::Category;
use crate::record::EmissionRecord;
use crate::{EmissionsError, EmissionsStore, RecordStream};

pub const ID_COLUMN: &str = "ID";
pub const NAME_COLUMN: &str = "Name";

/// Canonical column order of the backing file.
pub const HEADER: [&str; 2 + Category::COUNT] = [
    ID_COLUMN,
    NAME_COLUMN,
    "Car",
    "Bus",
    "Train",
    "Bicycle",
    "Walking",
    "Electricity",
    "Natural Gas",
    "Fuel Oil",
    "Propane",
    "Coal",
];

#[derive(Clone, Debug)]
pub struct CsvEmissionsStore {
    path: PathBuf,
}

impl CsvEmissionsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn open(&self) -> Result<Option<File>, EmissionsError> {
        match File::open(&self.path) {
            Ok(f) => Ok(Some(f)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Column layout of the existing file, if it has a header.
    fn existing_layout(&self) -> Result<Option<Layout>, EmissionsError> {
        let Some(file) = self.open()? else {
            return Ok(None);
        };
        let mut reader = reader_for(file);
        let headers = reader.headers()?.clone();
        if headers.is_empty() {
            return Ok(None);
        }
        Layout::from_headers(&headers).map(Some)
    }

    fn ensure_parent_dir(&self) -> Result<(), EmissionsError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        Ok(())
    }
}

impl EmissionsStore for CsvEmissionsStore {
    fn scan_all(&self) -> Result<RecordStream<'_>, EmissionsError> {
        let Some(file) = self.open()? else {
            tracing::debug!(path = %self.path.display(), "data file absent");
            return Err(EmissionsError::NoData);
        };
        let mut reader = reader_for(file);
        let headers = reader.headers()?.clone();
        if headers.is_empty() {
            return Ok(Box::new(std::iter::empty()));
        }
        let layout = Layout::from_headers(&headers)?;
        tracing::debug!(path = %self.path.display(), "scanning data file");
        Ok(Box::new(
            reader
                .into_records()
                .map(move |row| layout.parse(&row?)),
        ))
    }

    fn append(&self, record: &EmissionRecord) -> Result<(), EmissionsError> {
        let layout = self.existing_layout()?;
        self.ensure_parent_dir()?;
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        let needs_header = file.metadata()?.len() == 0;
        let mut writer = WriterBuilder::new().has_headers(false).from_writer(file);
        if needs_header {
            writer.write_record(HEADER)?;
        }
        let row = match layout {
            Some(layout) if !needs_header => layout.render(record),
            _ => Layout::canonical().render(record),
        };
        writer.write_record(&row)?;
        writer.flush()?;
        Ok(())
    }

    /// Writes the new contents to a sibling temporary file and renames it
    /// over the data file, so readers see either the old or the new file.
    fn rewrite(&self, records: &[EmissionRecord]) -> Result<(), EmissionsError> {
        self.ensure_parent_dir()?;
        let dir = match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };
        let mut tmp = NamedTempFile::new_in(&dir)?;
        {
            let mut writer = WriterBuilder::new()
                .has_headers(false)
                .from_writer(tmp.as_file_mut());
            writer.write_record(HEADER)?;
            let layout = Layout::canonical();
            for record in records {
                writer.write_record(&layout.render(record))?;
            }
            writer.flush()?;
        }
        tmp.as_file_mut().flush()?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path).map_err(|e| EmissionsError::Io(e.error))?;
        tracing::debug!(path = %self.path.display(), rows = records.len(), "rewrote data file");
        Ok(())
    }
}

fn reader_for(file: File) -> csv::Reader<File> {
    ReaderBuilder::new()
        .trim(Trim::Headers)
        .flexible(false)
        .from_reader(file)
}

/// Position of every required column within a file's rows.
#[derive(Clone, Debug)]
struct Layout {
    width: usize,
    id: usize,
    name: usize,
    categories: [usize; Category::COUNT],
}

impl Layout {
    fn canonical() -> Self {
        let mut categories = [0; Category::COUNT];
        for (i, slot) in categories.iter_mut().enumerate() {
            *slot = i + 2;
        }
        Self {
            width: HEADER.len(),
            id: 0,
            name: 1,
            categories,
        }
    }

    fn from_headers(headers: &StringRecord) -> Result<Self, EmissionsError> {
        let find = |column: &str| {
            headers
                .iter()
                .position(|h| h == column)
                .ok_or_else(|| EmissionsError::Corrupt(format!("missing column {column:?}")))
        };
        let mut categories = [0; Category::COUNT];
        for category in Category::ALL {
            categories[category.index()] = find(category.column_name())?;
        }
        Ok(Self {
            width: headers.len(),
            id: find(ID_COLUMN)?,
            name: find(NAME_COLUMN)?,
            categories,
        })
    }

    fn parse(&self, row: &StringRecord) -> Result<EmissionRecord, EmissionsError> {
        let line = row.position().map(|p| p.line()).unwrap_or_default();
        let cell = |idx: usize| row.get(idx).unwrap_or_default();
        let mut amounts = [0.0; Category::COUNT];
        for category in Category::ALL {
            let raw = cell(self.categories[category.index()]).trim();
            amounts[category.index()] = match raw.parse::<f64>() {
                Ok(v) if v.is_finite() && v >= 0.0 => v,
                _ => {
                    return Err(EmissionsError::Corrupt(format!(
                        "line {line}: {category} value {raw:?} is not a non-negative number"
                    )));
                }
            };
        }
        // Names are stored verbatim; surrounding spaces are part of the value.
        Ok(EmissionRecord::new(cell(self.id).trim(), cell(self.name), amounts))
    }

    fn render(&self, record: &EmissionRecord) -> Vec<String> {
        let mut row = vec![String::new(); self.width];
        row[self.id] = record.id.clone();
        row[self.name] = record.name.clone();
        for (category, amount) in record.amounts() {
            row[self.categories[category.index()]] = amount.to_string();
        }
        row
    }
}
