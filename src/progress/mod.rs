//! Progress reporting module
//!
//! Shows a file-count progress bar on stderr while workers copy.

mod reporter;

pub use reporter::*;
