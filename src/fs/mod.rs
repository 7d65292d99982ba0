//! File system primitives
//!
//! The orchestrator only needs three things from the file system: walking
//! the source tree, listing the immediate entries of one directory, and
//! copying one file into the flat target without clobbering anything.

mod operations;
mod scanner;

pub use operations::*;
pub use scanner::*;
