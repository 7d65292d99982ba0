//! Error types for FlatCopy
//!
//! Enumeration and copy failures carry the offending path so the CLI can
//! report something actionable. Worker-level failures wrap the underlying
//! error together with the worker that hit it.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for flatten operations
#[derive(Error, Debug)]
pub enum FlattenError {
    /// I/O error while listing a directory or copying a file
    #[error("I/O error at '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Source path does not exist
    #[error("Path not found: {0}")]
    NotFound(PathBuf),

    /// Source path exists but is not a directory
    #[error("Not a directory: {0}")]
    NotADirectory(PathBuf),

    /// Directory walk failed
    #[error("Walk error at '{path}': {message}")]
    Walk { path: PathBuf, message: String },

    /// Source entry is not a regular file (FIFO, socket, device)
    #[error("Unsupported file type at '{path}': {file_type}")]
    UnsupportedFileType { path: PathBuf, file_type: String },

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Worker thread could not be spawned
    #[error("Thread pool error: {0}")]
    ThreadPoolError(String),

    /// An asynchronous flatten is still in progress
    #[error("A flatten operation is already running")]
    AlreadyRunning,

    /// A worker stopped because of an error
    #[error("Worker {worker} failed: {source}")]
    WorkerFailed {
        worker: usize,
        #[source]
        source: Box<FlattenError>,
    },

    /// A worker panicked
    #[error("Worker {worker} panicked: {message}")]
    WorkerPanicked { worker: usize, message: String },

    /// Multiple errors occurred
    #[error("Multiple errors occurred ({count} errors)")]
    MultipleErrors {
        count: usize,
        errors: Vec<FlattenError>,
    },
}

impl FlattenError {
    /// Create an I/O error with path context
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::ConfigError(message.into())
    }

    /// Wrap an error raised inside a worker
    pub fn worker(worker: usize, source: FlattenError) -> Self {
        Self::WorkerFailed {
            worker,
            source: Box::new(source),
        }
    }

    /// Check if this error is a permission issue
    pub fn is_permission_error(&self) -> bool {
        match self {
            Self::Io { source, .. } => source.kind() == std::io::ErrorKind::PermissionDenied,
            Self::WorkerFailed { source, .. } => source.is_permission_error(),
            _ => false,
        }
    }

    /// Get the path associated with this error, if any
    pub fn path(&self) -> Option<&PathBuf> {
        match self {
            Self::Io { path, .. }
            | Self::NotFound(path)
            | Self::NotADirectory(path)
            | Self::Walk { path, .. }
            | Self::UnsupportedFileType { path, .. } => Some(path),
            Self::WorkerFailed { source, .. } => source.path(),
            _ => None,
        }
    }
}

/// Result type alias for flatten operations
pub type Result<T> = std::result::Result<T, FlattenError>;

impl From<walkdir::Error> for FlattenError {
    fn from(err: walkdir::Error) -> Self {
        let path = err.path().map(|p| p.to_path_buf()).unwrap_or_default();
        match err.into_io_error() {
            Some(source) => FlattenError::Io { path, source },
            None => FlattenError::Walk {
                path,
                message: "filesystem loop detected".to_string(),
            },
        }
    }
}

/// Extension trait for adding path context to std::io::Result
pub trait IoResultExt<T> {
    /// Add path context to an I/O error
    fn with_path(self, path: impl Into<PathBuf>) -> Result<T>;
}

impl<T> IoResultExt<T> for std::io::Result<T> {
    fn with_path(self, path: impl Into<PathBuf>) -> Result<T> {
        self.map_err(|e| FlattenError::io(path, e))
    }
}

/// Fold a list of errors into one: `Ok` when empty, the error itself when
/// there is exactly one, `MultipleErrors` otherwise
pub fn collect_errors(mut errors: Vec<FlattenError>) -> Result<()> {
    match errors.len() {
        0 => Ok(()),
        1 => Err(errors.remove(0)),
        count => Err(FlattenError::MultipleErrors { count, errors }),
    }
}
