use std::path::PathBuf;

use crate::EmissionsError;
use crate::artifacts::CHART_TOP_N;

pub const DEFAULT_DATA_FILE: &str = "emissions_data.csv";
pub const DEFAULT_REPORTS_DIR: &str = "reports";

#[derive(Clone, Debug)]
pub struct Config {
    pub data_file: PathBuf,
    pub reports_dir: PathBuf,
    pub top_n: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_file: DEFAULT_DATA_FILE.into(),
            reports_dir: DEFAULT_REPORTS_DIR.into(),
            top_n: CHART_TOP_N,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, EmissionsError> {
        Self::from_env_with(|k| std::env::var(k).ok())
    }

    /// Testable helper that reads configuration values using the provided
    /// function instead of the process environment.
    pub fn from_env_with<F>(mut get: F) -> Result<Self, EmissionsError>
    where
        F: FnMut(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let data_file = get("EMISSIONS_DATA_FILE")
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or(defaults.data_file);
        let reports_dir = get("EMISSIONS_REPORTS_DIR")
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or(defaults.reports_dir);
        let top_n = match get("EMISSIONS_TOP_N") {
            None => defaults.top_n,
            Some(raw) => match raw.trim().parse::<usize>() {
                Ok(n) if n > 0 => n,
                _ => {
                    return Err(EmissionsError::Config(format!(
                        "EMISSIONS_TOP_N must be a positive integer, got {raw:?}"
                    )));
                }
            },
        };
        Ok(Self {
            data_file,
            reports_dir,
            top_n,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_env_defaults() {
        let cfg = Config::from_env_with(|_| None).expect("cfg");
        assert_eq!(cfg.data_file, PathBuf::from("emissions_data.csv"));
        assert_eq!(cfg.reports_dir, PathBuf::from("reports"));
        assert_eq!(cfg.top_n, 10);
    }

    #[test]
    fn from_env_reads_values() {
        let get = |k: &str| match k {
            "EMISSIONS_DATA_FILE" => Some("/var/lib/emissions/data.csv".into()),
            "EMISSIONS_REPORTS_DIR" => Some("/tmp/reports".into()),
            "EMISSIONS_TOP_N" => Some(" 5 ".into()),
            _ => None,
        };
        let cfg = Config::from_env_with(get).expect("cfg");
        assert_eq!(cfg.data_file, PathBuf::from("/var/lib/emissions/data.csv"));
        assert_eq!(cfg.reports_dir, PathBuf::from("/tmp/reports"));
        assert_eq!(cfg.top_n, 5);
    }

    #[test]
    fn from_env_rejects_bad_top_n() {
        for bad in ["0", "ten", "-3"] {
            let res = Config::from_env_with(|k| (k == "EMISSIONS_TOP_N").then(|| bad.to_string()));
            assert!(matches!(res, Err(EmissionsError::Config(_))), "{bad} accepted");
        }
    }
}
