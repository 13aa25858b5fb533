//! Core types - pure abstractions shared across the codebase.

mod kind;
mod state;

pub use kind::{AssetKind, PerKind};
pub use state::{is_shutdown, register_server, setup_shutdown_handler, wait_for_shutdown};
