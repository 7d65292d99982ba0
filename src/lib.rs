//! # FlatCopy - Flatten Directory Trees
//!
//! FlatCopy copies every file found anywhere under a source directory into a
//! single flat target directory. Files whose name is already taken in the
//! target are skipped, never overwritten.
//!
//! The tree is split into chunks of directories and each chunk is copied by
//! its own OS thread. Results are pushed onto a lock-free queue the caller
//! drains once the workers are joined.
//!
//! ## Quick Start
//!
//! ```no_run
//! use flatcopy::core::flatten_parallel;
//! use std::path::Path;
//!
//! let results = flatten_parallel(Path::new("/source"), Path::new("/flat"), 4).unwrap();
//! for result in &results {
//!     println!("{}", result);
//! }
//! ```
//!
//! ## Polling
//!
//! ```no_run
//! use flatcopy::core::Flattener;
//!
//! let mut flattener = Flattener::from_paths("/source", "/flat");
//! flattener.start_async().unwrap();
//!
//! while flattener.is_running() {
//!     for result in flattener.drain_results() {
//!         println!("{}", result);
//!     }
//! }
//!
//! flattener.join().unwrap();
//! ```
//!
//! Two source files sharing a name race for the same destination. Exactly
//! one of them is copied; which one depends on worker scheduling.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod core;
pub mod error;
pub mod fs;
pub mod progress;

// Re-export commonly used types
pub use config::{FlattenConfig, FlattenMode};
pub use core::{CopyResult, Flattener};
pub use error::{FlattenError, Result};
pub use progress::ProgressReporter;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude module for convenient imports
pub mod prelude {
    //! Convenient re-exports for common usage
    //!
    //! ```no_run
    //! use flatcopy::prelude::*;
    //! ```

    pub use crate::config::{FlattenConfig, FlattenMode};
    pub use crate::core::{
        flatten_parallel, flatten_sync, split_chunks, Chunk, CopyResult, CopyTask, FlattenSummary,
        Flattener,
    };
    pub use crate::error::{FlattenError, Result};
    pub use crate::fs::{list_immediate_entries, scan_tree, DirListing, TreeScan};
    pub use crate::progress::ProgressReporter;
}
