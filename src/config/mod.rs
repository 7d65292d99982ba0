//! Configuration module for FlatCopy
//!
//! Provides CLI arguments and the runtime settings of a flatten operation.

mod settings;

pub use settings::*;
