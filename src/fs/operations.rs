//! File copy primitives
//!
//! The destination is opened with `create_new`, so the existence check and
//! the creation are a single atomic step. When two workers race for the same
//! flattened name exactly one of them gets the file handle; the other sees
//! `AlreadyExists` and reports a skip.

use crate::error::{FlattenError, IoResultExt, Result};
use std::fs::{File, OpenOptions};
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

/// Buffer size used for copies
pub const COPY_BUFFER_SIZE: usize = 1024 * 1024;

/// What happened to a single file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CopyOutcome {
    /// Destination did not exist and was written
    Copied {
        /// Bytes written
        bytes: u64,
    },
    /// Destination name was already taken
    Skipped,
}

impl CopyOutcome {
    /// Whether the file was written
    pub fn is_copied(&self) -> bool {
        matches!(self, Self::Copied { .. })
    }

    /// Bytes written (0 when skipped)
    pub fn bytes(&self) -> u64 {
        match self {
            Self::Copied { bytes } => *bytes,
            Self::Skipped => 0,
        }
    }
}

/// Create the target directory if it is missing
pub fn ensure_target_dir(target: &Path) -> Result<()> {
    std::fs::create_dir_all(target).with_path(target)?;

    if !target.is_dir() {
        return Err(FlattenError::NotADirectory(target.to_path_buf()));
    }

    Ok(())
}

/// Copy `source` to `dest` unless something named `dest` already exists
///
/// Only regular files (or symlinks to them) are copied; opening a FIFO would
/// block until a writer shows up. A destination left half-written by a
/// failed copy is removed before the error is returned.
pub fn copy_if_absent(source: &Path, dest: &Path) -> Result<CopyOutcome> {
    let metadata = std::fs::metadata(source).with_path(source)?;
    if !metadata.is_file() {
        return Err(FlattenError::UnsupportedFileType {
            path: source.to_path_buf(),
            file_type: describe_file_type(metadata.file_type()),
        });
    }

    let dst_file = match OpenOptions::new().write(true).create_new(true).open(dest) {
        Ok(file) => file,
        Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
            return Ok(CopyOutcome::Skipped);
        }
        Err(e) => return Err(FlattenError::io(dest, e)),
    };

    match copy_file_bytes(source, dst_file, dest) {
        Ok(bytes) => Ok(CopyOutcome::Copied { bytes }),
        Err(e) => {
            if let Err(cleanup) = std::fs::remove_file(dest) {
                tracing::warn!("Could not remove partial copy {}: {}", dest.display(), cleanup);
            }
            Err(e)
        }
    }
}

fn describe_file_type(file_type: std::fs::FileType) -> String {
    #[cfg(unix)]
    {
        use std::os::unix::fs::FileTypeExt;
        if file_type.is_fifo() {
            return "named pipe".to_string();
        }
        if file_type.is_socket() {
            return "socket".to_string();
        }
        if file_type.is_block_device() || file_type.is_char_device() {
            return "device".to_string();
        }
    }

    if file_type.is_dir() {
        "directory".to_string()
    } else {
        "special file".to_string()
    }
}

/// Stream the contents of `source` into an already opened destination
fn copy_file_bytes(source: &Path, dst_file: File, dest: &Path) -> Result<u64> {
    let src_file = File::open(source).with_path(source)?;

    let mut reader = BufReader::with_capacity(COPY_BUFFER_SIZE, src_file);
    let mut writer = BufWriter::with_capacity(COPY_BUFFER_SIZE, dst_file);

    let bytes_copied = std::io::copy(&mut reader, &mut writer)
        .map_err(|e| FlattenError::io(source, e))?;

    writer.flush().with_path(dest)?;

    Ok(bytes_copied)
}
