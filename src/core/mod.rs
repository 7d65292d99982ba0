//! Core flatten engine
//!
//! Partitions the source tree into chunks, runs one worker per chunk and
//! collects the per-file results.

mod orchestrator;
mod partition;
mod result;

pub use orchestrator::*;
pub use partition::*;
pub use result::*;
