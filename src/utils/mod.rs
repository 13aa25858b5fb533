//! Utility modules shared across the pipeline and the dev server.

pub mod mime;
pub mod path;
