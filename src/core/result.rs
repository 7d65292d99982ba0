//! Per-file copy records
//!
//! A `CopyTask` is built for every file a worker encounters and consumed
//! immediately; the `CopyResult` it produces is the only thing that outlives
//! the worker.

use crate::error::{FlattenError, Result};
use crate::fs::copy_if_absent;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// One file to be considered for copying into the flat target
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CopyTask {
    /// File inside the source tree
    pub source_path: PathBuf,
    /// `target/<file name>`
    pub destination_path: PathBuf,
}

impl CopyTask {
    /// Map `source` to its flattened location under `target`
    pub fn new(source: PathBuf, target: &Path) -> Result<Self> {
        let file_name = source.file_name().ok_or_else(|| FlattenError::Walk {
            path: source.clone(),
            message: "entry has no file name".to_string(),
        })?;
        let destination_path = target.join(file_name);

        Ok(Self {
            source_path: source,
            destination_path,
        })
    }

    /// Copy the file unless its flattened name is already taken
    pub fn execute(self) -> Result<CopyResult> {
        let outcome = copy_if_absent(&self.source_path, &self.destination_path)?;

        Ok(CopyResult {
            source_path: self.source_path,
            destination_path: self.destination_path,
            copied: outcome.is_copied(),
            bytes: outcome.bytes(),
        })
    }
}

/// Outcome of one `CopyTask`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CopyResult {
    /// File inside the source tree
    pub source_path: PathBuf,
    /// Flattened destination
    pub destination_path: PathBuf,
    /// `false` when the destination name was already taken
    pub copied: bool,
    /// Bytes written (0 when skipped)
    pub bytes: u64,
}

impl CopyResult {
    /// `OK` for copied files, `FAIL` for skipped ones
    pub fn status_label(&self) -> &'static str {
        if self.copied {
            "OK"
        } else {
            "FAIL"
        }
    }
}

impl fmt::Display for CopyResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} -> {}: {}",
            self.source_path.display(),
            self.destination_path.display(),
            self.status_label()
        )
    }
}

/// Totals over a finished flatten
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FlattenSummary {
    /// Files encountered
    pub files_seen: u64,
    /// Files written to the target
    pub files_copied: u64,
    /// Files skipped because of a name collision
    pub files_skipped: u64,
    /// Bytes written
    pub bytes_copied: u64,
    /// Wall-clock duration
    pub duration: Duration,
}

impl FlattenSummary {
    /// Aggregate a set of results
    pub fn from_results<'a>(results: impl IntoIterator<Item = &'a CopyResult>, duration: Duration) -> Self {
        let mut summary = Self {
            duration,
            ..Default::default()
        };

        for result in results {
            summary.files_seen += 1;
            if result.copied {
                summary.files_copied += 1;
                summary.bytes_copied += result.bytes;
            } else {
                summary.files_skipped += 1;
            }
        }

        summary
    }

    /// Print summary to stderr
    pub fn print_summary(&self) {
        eprintln!("\n=== Flatten Summary ===");
        eprintln!("Files seen:      {}", self.files_seen);
        eprintln!("Files copied:    {}", self.files_copied);
        eprintln!("Files skipped:   {}", self.files_skipped);
        eprintln!("Bytes copied:    {}", humansize::format_size(self.bytes_copied, humansize::BINARY));
        eprintln!("Duration:        {:.2?}", self.duration);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_task_maps_to_flat_name() {
        let task = CopyTask::new(PathBuf::from("/src/a/b/photo.jpg"), Path::new("/flat")).unwrap();
        assert_eq!(task.destination_path, PathBuf::from("/flat/photo.jpg"));
    }

    #[test]
    fn test_task_without_file_name() {
        assert!(CopyTask::new(PathBuf::from("/"), Path::new("/flat")).is_err());
    }

    #[test]
    fn test_execute_twice_skips_second_time() {
        let src = TempDir::new().unwrap();
        let dst = TempDir::new().unwrap();
        let file = src.path().join("data.txt");
        std::fs::write(&file, b"hello").unwrap();

        let first = CopyTask::new(file.clone(), dst.path()).unwrap().execute().unwrap();
        let second = CopyTask::new(file, dst.path()).unwrap().execute().unwrap();

        assert!(first.copied);
        assert_eq!(first.bytes, 5);
        assert!(!second.copied);
        assert_eq!(second.bytes, 0);
    }

    #[test]
    fn test_display_format() {
        let result = CopyResult {
            source_path: PathBuf::from("src/a/x.txt"),
            destination_path: PathBuf::from("out/x.txt"),
            copied: true,
            bytes: 1,
        };
        assert_eq!(result.to_string(), "src/a/x.txt -> out/x.txt: OK");

        let skipped = CopyResult { copied: false, bytes: 0, ..result };
        assert_eq!(skipped.to_string(), "src/a/x.txt -> out/x.txt: FAIL");
    }

    #[test]
    fn test_summary_totals() {
        let results = vec![
            CopyResult {
                source_path: PathBuf::from("a"),
                destination_path: PathBuf::from("t/a"),
                copied: true,
                bytes: 10,
            },
            CopyResult {
                source_path: PathBuf::from("b/a"),
                destination_path: PathBuf::from("t/a"),
                copied: false,
                bytes: 0,
            },
        ];

        let summary = FlattenSummary::from_results(&results, Duration::from_secs(1));
        assert_eq!(summary.files_seen, 2);
        assert_eq!(summary.files_copied, 1);
        assert_eq!(summary.files_skipped, 1);
        assert_eq!(summary.bytes_copied, 10);
    }
}
