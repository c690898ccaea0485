//! Retention of daily dataset files.
//!
//! The refresh job names files after the day they were fetched
//! (`dd-mm-YYYY.json`). Files at least `keep_days` older than today are
//! removed; anything with another name is left alone.

use crate::error::{ResolveError, Result};
use chrono::{Duration, NaiveDate};
use log::{info, warn};
use std::fs;
use std::path::{Path, PathBuf};

pub const DATASET_FILE_DATE_FORMAT: &str = "%d-%m-%Y";

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PruneReport {
    pub removed: Vec<PathBuf>,
    pub kept: usize,
    pub skipped: Vec<PathBuf>,
}

/// Date encoded in a dataset file name, if it follows the naming scheme.
pub fn dataset_file_date(path: &Path) -> Option<NaiveDate> {
    if path.extension().and_then(|e| e.to_str()) != Some("json") {
        return None;
    }
    let stem = path.file_stem()?.to_str()?;
    NaiveDate::parse_from_str(stem, DATASET_FILE_DATE_FORMAT).ok()
}

/// File name the refresh job uses for `date`.
pub fn dataset_file_name(date: NaiveDate) -> String {
    format!("{}.json", date.format(DATASET_FILE_DATE_FORMAT))
}

/// Remove dataset files dated `keep_days` or more before `today`.
pub fn prune_dataset_dir(dir: &Path, keep_days: u32, today: NaiveDate) -> Result<PruneReport> {
    let cutoff = today - Duration::days(i64::from(keep_days));
    let mut report = PruneReport::default();

    let entries = fs::read_dir(dir).map_err(|e| ResolveError::io(dir, e))?;
    for entry in entries {
        let path = entry.map_err(|e| ResolveError::io(dir, e))?.path();
        if !path.is_file() {
            continue;
        }

        match dataset_file_date(&path) {
            Some(date) if date <= cutoff => {
                fs::remove_file(&path).map_err(|e| ResolveError::io(&path, e))?;
                info!("Removed old dataset file {}", path.display());
                report.removed.push(path);
            }
            Some(_) => report.kept += 1,
            None => {
                warn!("Skipping dataset file with unexpected name: {}", path.display());
                report.skipped.push(path);
            }
        }
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(d: u32, m: u32, y: i32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_file_name_round_trip() {
        let d = date(5, 3, 2026);
        assert_eq!(dataset_file_name(d), "05-03-2026.json");
        assert_eq!(dataset_file_date(Path::new("05-03-2026.json")), Some(d));
        assert_eq!(dataset_file_date(Path::new("05-03-2026.txt")), None);
        assert_eq!(dataset_file_date(Path::new("latest.json")), None);
    }

    #[test]
    fn test_prune_keeps_last_days() {
        let dir = tempfile::tempdir().unwrap();
        let today = date(14, 10, 2026);
        for back in 0..14 {
            let name = dataset_file_name(today - Duration::days(back));
            fs::write(dir.path().join(name), "{}").unwrap();
        }
        fs::write(dir.path().join("notes.json"), "{}").unwrap();

        let report = prune_dataset_dir(dir.path(), 10, today).unwrap();
        assert_eq!(report.kept, 10);
        assert_eq!(report.removed.len(), 4);
        assert_eq!(report.skipped.len(), 1);

        assert!(dir.path().join(dataset_file_name(date(5, 10, 2026))).exists());
        assert!(!dir.path().join(dataset_file_name(date(4, 10, 2026))).exists());
        assert!(dir.path().join("notes.json").exists());
    }
}
