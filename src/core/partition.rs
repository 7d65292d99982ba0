//! Work partitioning
//!
//! Splits the directories of a source tree into chunks, one chunk per
//! worker. A directory is the smallest unit of work: all files directly
//! inside it are handled by the same worker.

use crate::error::Result;
use crate::fs::scan_tree;
use std::path::{Path, PathBuf};

/// Ordered directories assigned to one worker
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Chunk {
    directories: Vec<PathBuf>,
}

impl Chunk {
    /// Create a chunk from a list of directories
    pub fn new(directories: Vec<PathBuf>) -> Self {
        Self { directories }
    }

    /// Directories in processing order
    pub fn directories(&self) -> &[PathBuf] {
        &self.directories
    }

    /// Number of directories
    pub fn len(&self) -> usize {
        self.directories.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.directories.is_empty()
    }
}

/// Walk `source` and split its file-bearing directories into chunks
pub fn split_chunks(source: &Path, max_workers: usize) -> Result<Vec<Chunk>> {
    let scan = scan_tree(source)?;
    Ok(group_into_chunks(scan.directories, max_workers))
}

/// Group directories into at most `max_workers` consecutive chunks
///
/// With no more directories than workers every directory becomes its own
/// chunk. Otherwise the list is cut into runs of `ceil(n / max_workers)`
/// directories, the last run possibly shorter.
pub fn group_into_chunks(directories: Vec<PathBuf>, max_workers: usize) -> Vec<Chunk> {
    let max_workers = max_workers.max(1);

    if directories.len() <= max_workers {
        return directories
            .into_iter()
            .map(|dir| Chunk::new(vec![dir]))
            .collect();
    }

    let chunk_size = directories.len().div_ceil(max_workers);

    directories
        .chunks(chunk_size)
        .map(|dirs| Chunk::new(dirs.to_vec()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::HashSet;
    use tempfile::TempDir;

    fn dirs(count: usize) -> Vec<PathBuf> {
        (0..count).map(|i| PathBuf::from(format!("/src/d{}", i))).collect()
    }

    #[test]
    fn test_one_chunk_per_directory_when_workers_suffice() {
        let chunks = group_into_chunks(dirs(3), 8);

        assert_eq!(chunks.len(), 3);
        assert!(chunks.iter().all(|c| c.len() == 1));
    }

    #[test]
    fn test_single_worker_takes_everything() {
        let chunks = group_into_chunks(dirs(3), 1);

        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].directories(), dirs(3).as_slice());
    }

    #[test]
    fn test_consecutive_groups() {
        let chunks = group_into_chunks(dirs(5), 2);

        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].directories(), &dirs(5)[..3]);
        assert_eq!(chunks[1].directories(), &dirs(5)[3..]);
    }

    #[test]
    fn test_zero_workers_treated_as_one() {
        let chunks = group_into_chunks(dirs(4), 0);
        assert_eq!(chunks.len(), 1);
    }

    #[test]
    fn test_no_directories() {
        assert!(group_into_chunks(Vec::new(), 4).is_empty());
    }

    #[test]
    fn test_split_chunks_on_disk() {
        let src = TempDir::new().unwrap();
        for dir in ["a", "b", "b/c", "empty"] {
            std::fs::create_dir_all(src.path().join(dir)).unwrap();
        }
        std::fs::write(src.path().join("a/x.txt"), b"1").unwrap();
        std::fs::write(src.path().join("b/y.txt"), b"2").unwrap();
        std::fs::write(src.path().join("b/c/x.txt"), b"3").unwrap();

        let chunks = split_chunks(src.path(), 2).unwrap();
        let all: Vec<PathBuf> = chunks.iter().flat_map(|c| c.directories().to_vec()).collect();

        assert_eq!(chunks.len(), 2);
        assert_eq!(
            all,
            vec![src.path().join("a"), src.path().join("b"), src.path().join("b/c")]
        );
    }

    proptest! {
        #[test]
        fn prop_partition_is_complete(count in 0usize..200, workers in 0usize..32) {
            let input = dirs(count);
            let chunks = group_into_chunks(input.clone(), workers);

            prop_assert!(chunks.len() <= workers.max(1));
            prop_assert!(chunks.iter().all(|c| !c.is_empty()));

            let flattened: Vec<PathBuf> = chunks.iter().flat_map(|c| c.directories().to_vec()).collect();
            let unique: HashSet<&PathBuf> = flattened.iter().collect();
            prop_assert_eq!(unique.len(), flattened.len());
            prop_assert_eq!(flattened, input);
        }
    }
}
