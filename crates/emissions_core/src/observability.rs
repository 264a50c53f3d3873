use serde::Serialize;

use crate::EmissionsStore;

/// Snapshot of the backing dataset for status displays.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Health {
    pub ready: bool,
    pub records: usize,
    pub error: Option<String>,
}

impl Health {
    /// Reads the whole dataset once. An absent dataset is ready and empty;
    /// unreadable or corrupt data is reported as not ready.
    pub fn probe<S: EmissionsStore + ?Sized>(store: &S) -> Self {
        match store.records() {
            Ok(records) => Self {
                ready: true,
                records: records.len(),
                error: None,
            },
            Err(e) => {
                tracing::warn!(error = %e, "emissions data unreadable");
                Self {
                    ready: false,
                    records: 0,
                    error: Some(e.to_string()),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::csv_store::CsvEmissionsStore;
    use tempfile::tempdir;

    #[test]
    fn readiness_without_data_file() {
        let dir = tempdir().unwrap();
        let h = Health::probe(&CsvEmissionsStore::new(dir.path().join("none.csv")));
        assert!(h.ready);
        assert_eq!(h.records, 0);
    }

    #[test]
    fn corrupt_file_is_not_ready() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("data.csv");
        std::fs::write(&path, "ID,Name\n0001,Acme\n").unwrap();
        let h = Health::probe(&CsvEmissionsStore::new(&path));
        assert!(!h.ready);
        assert!(h.error.unwrap().contains("missing column"));
    }
}
