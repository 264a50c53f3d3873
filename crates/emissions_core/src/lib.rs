//! Company emissions registry: validation, conversion, file-backed storage and reporting.

use thiserror::Error;

pub mod aggregate;
pub mod artifacts;
pub mod categories;
pub mod config;
pub mod csv_store;
pub mod observability;
pub mod record;
pub mod report;
pub mod validation;

pub use categories::{Category, ENERGY, TRANSPORTATION};
pub use record::{EmissionRecord, Submission};
pub use validation::{Field, ValidationError, ValidationReason};

#[derive(Debug, Error)]
pub enum EmissionsError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("company id {id} not found")]
    NotFound { id: String },
    #[error("invalid company id {input:?}: expected an integer")]
    Parse { input: String },
    #[error("no data available")]
    NoData,
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("corrupt data file: {0}")]
    Corrupt(String),
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("configuration error: {0}")]
    Config(String),
}

impl EmissionsError {
    /// True for failures of the backing file itself rather than of the request.
    pub fn is_storage(&self) -> bool {
        matches!(
            self,
            EmissionsError::Io(_) | EmissionsError::Csv(_) | EmissionsError::Corrupt(_)
        )
    }
}

pub type RecordStream<'a> = Box<dyn Iterator<Item = Result<EmissionRecord, EmissionsError>> + 'a>;

/// Repository over the emissions dataset.
///
/// Backends provide the three primitives; every higher-level operation is
/// expressed on top of them so that validation, aggregation and reporting do
/// not depend on how records are kept.
pub trait EmissionsStore: Send + Sync {
    /// Lazily reads every record in storage order. Each call starts over from
    /// the current contents. Returns [`EmissionsError::NoData`] when the
    /// dataset does not exist yet.
    fn scan_all(&self) -> Result<RecordStream<'_>, EmissionsError>;

    /// Appends one record, creating the dataset if needed.
    fn append(&self, record: &EmissionRecord) -> Result<(), EmissionsError>;

    /// Replaces the whole dataset with `records`.
    fn rewrite(&self, records: &[EmissionRecord]) -> Result<(), EmissionsError>;

    /// All records, with a missing dataset read as empty.
    fn records(&self) -> Result<Vec<EmissionRecord>, EmissionsError> {
        match self.scan_all() {
            Ok(stream) => stream.collect(),
            Err(EmissionsError::NoData) => Ok(Vec::new()),
            Err(e) => Err(e),
        }
    }

    fn contains_id(&self, id: &str) -> Result<bool, EmissionsError> {
        let stream = match self.scan_all() {
            Ok(stream) => stream,
            Err(EmissionsError::NoData) => return Ok(false),
            Err(e) => return Err(e),
        };
        for record in stream {
            if record?.id == id {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Validates and converts a submission, then appends it.
    fn insert(&self, submission: &Submission) -> Result<EmissionRecord, EmissionsError> {
        let record = match validation::validate_submission(submission, self) {
            Ok(record) => record,
            Err(EmissionsError::Validation(e)) => {
                metrics::counter!("emissions_validation_failures_total").increment(1);
                tracing::debug!(field = %e.field, reason = ?e.reason, "rejected submission");
                return Err(e.into());
            }
            Err(e) => return Err(e),
        };
        self.append(&record)?;
        metrics::counter!("emissions_records_inserted_total").increment(1);
        tracing::info!(id = %record.id, name = %record.name, "stored emissions record");
        Ok(record)
    }

    fn find_by_id(&self, id: &str) -> Result<EmissionRecord, EmissionsError> {
        let key = parse_lookup_key(id)?;
        for record in self.scan_all()? {
            let record = record?;
            if record.id == key {
                return Ok(record);
            }
        }
        Err(EmissionsError::NotFound { id: key.to_string() })
    }

    /// Rewrites the dataset without the record `id`. Nothing is written when
    /// no record matches. Returns how many records were dropped.
    fn rewrite_without(&self, id: &str) -> Result<usize, EmissionsError> {
        let (matching, kept): (Vec<EmissionRecord>, Vec<EmissionRecord>) = self
            .scan_all()?
            .collect::<Result<Vec<_>, _>>()?
            .into_iter()
            .partition(|r| r.id == id);
        if !matching.is_empty() {
            self.rewrite(&kept)?;
        }
        Ok(matching.len())
    }

    fn delete_by_id(&self, id: &str) -> Result<usize, EmissionsError> {
        let key = parse_lookup_key(id)?;
        let deleted = self.rewrite_without(key)?;
        if deleted == 0 {
            return Err(EmissionsError::NotFound { id: key.to_string() });
        }
        metrics::counter!("emissions_records_deleted_total").increment(deleted as u64);
        tracing::info!(id = %key, deleted, "deleted emissions record");
        Ok(deleted)
    }

    /// All records ordered by name, case-sensitive, stable on equal names.
    fn list_sorted_by_name(&self) -> Result<Vec<EmissionRecord>, EmissionsError> {
        let mut records = self.records()?;
        records.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(records)
    }
}

/// Trims a user-supplied id and checks it is an unsigned integer.
pub fn parse_lookup_key(input: &str) -> Result<&str, EmissionsError> {
    let key = input.trim();
    if key.is_empty() || !key.bytes().all(|b| b.is_ascii_digit()) {
        return Err(EmissionsError::Parse {
            input: input.to_string(),
        });
    }
    Ok(key)
}
