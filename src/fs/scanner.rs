//! Directory scanning
//!
//! Walks the source tree once, top-down and in file-name order, and records
//! every directory that directly contains at least one file. Symbolic links
//! to directories are listed as subdirectories but never descended into.

use crate::error::{FlattenError, IoResultExt, Result};
use serde::{Deserialize, Serialize};
use std::fs::FileType;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use walkdir::WalkDir;

/// Immediate contents of a single directory
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DirListing {
    /// Subdirectories, sorted by name
    pub subdirectories: Vec<PathBuf>,
    /// Everything that is not a directory, sorted by name
    pub files: Vec<PathBuf>,
}

/// Result of walking a source tree
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreeScan {
    /// Root path that was scanned
    pub root: PathBuf,
    /// Directories containing at least one file, in walk order
    pub directories: Vec<PathBuf>,
    /// Total number of files across `directories`
    pub file_count: usize,
    /// Scan duration
    pub scan_duration: Duration,
}

/// List the immediate subdirectories and files of `path`
pub fn list_immediate_entries(path: &Path) -> Result<DirListing> {
    let mut listing = DirListing::default();

    for entry in std::fs::read_dir(path).with_path(path)? {
        let entry = entry.with_path(path)?;
        let entry_path = entry.path();
        let file_type = entry.file_type().with_path(&entry_path)?;

        if is_directory(&entry_path, file_type) {
            listing.subdirectories.push(entry_path);
        } else {
            listing.files.push(entry_path);
        }
    }

    listing.subdirectories.sort();
    listing.files.sort();

    Ok(listing)
}

/// Make sure `root` exists and is a directory
pub fn require_directory(root: &Path) -> Result<()> {
    let metadata = match std::fs::metadata(root) {
        Ok(m) => m,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(FlattenError::NotFound(root.to_path_buf()));
        }
        Err(e) => return Err(FlattenError::io(root, e)),
    };

    if !metadata.is_dir() {
        return Err(FlattenError::NotADirectory(root.to_path_buf()));
    }

    Ok(())
}

/// Walk `root` and collect every directory that directly contains a file
pub fn scan_tree(root: &Path) -> Result<TreeScan> {
    let start_time = Instant::now();
    require_directory(root)?;

    let mut directories = Vec::new();
    let mut file_count = 0;

    let walker = WalkDir::new(root).follow_links(false).sort_by_file_name();

    for entry in walker {
        let entry = entry?;
        if !entry.file_type().is_dir() {
            continue;
        }

        let listing = list_immediate_entries(entry.path())?;
        if !listing.files.is_empty() {
            file_count += listing.files.len();
            directories.push(entry.into_path());
        }
    }

    tracing::debug!(
        "Scanned {}: {} directories with {} files",
        root.display(),
        directories.len(),
        file_count
    );

    Ok(TreeScan {
        root: root.to_path_buf(),
        directories,
        file_count,
        scan_duration: start_time.elapsed(),
    })
}

fn is_directory(path: &Path, file_type: FileType) -> bool {
    file_type.is_dir() || (file_type.is_symlink() && path.is_dir())
}
