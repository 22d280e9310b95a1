//! JSON dump of the postings found in a run.
//!
//! The file holds a JSON array of [`JobRecord`] objects in the order they
//! were reported. It is rewritten on every run.

use crate::models::JobRecord;
use std::error::Error;
use std::path::Path;
use tokio::fs;
use tracing::{error, info, instrument};

/// Write `jobs` to `path` as pretty-printed JSON, creating parent directories.
///
/// # Errors
///
/// Returns an error if serialization, directory creation or the write fails.
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub async fn write_jobs(jobs: &[JobRecord], path: &Path) -> Result<(), Box<dyn Error>> {
    let json = serde_json::to_string_pretty(jobs)?;

    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        if let Err(e) = fs::create_dir_all(dir).await {
            error!(dir = %dir.display(), error = %e, "Failed to create JSON output dir");
            return Err(e.into());
        }
    }

    fs::write(path, json).await?;
    info!(count = jobs.len(), "Wrote JSON file");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_write_jobs_creates_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("jobs.json");
        let jobs = vec![
            JobRecord::new("PM", "Acme", "Dubai", "1 hour ago", "https://example.com/1"),
            JobRecord::new("Dev", "Globex", "N/A", "N/A", ""),
        ];

        write_jobs(&jobs, &path).await.unwrap();

        let raw = std::fs::read_to_string(&path).unwrap();
        let back: Vec<JobRecord> = serde_json::from_str(&raw).unwrap();
        assert_eq!(back, jobs);
    }

    #[tokio::test]
    async fn test_write_jobs_empty_run() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("jobs.json");

        write_jobs(&[], &path).await.unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "[]");
    }
}
