//! Path utilities.
//!
//! - [`fs`]: Filesystem path normalization and display helpers

pub mod fs;

pub use fs::{display_relative, normalize_path};
