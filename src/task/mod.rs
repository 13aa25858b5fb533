//! Task graph and runner.
//!
//! `kiln [TASK]` resolves the task name in [`TaskGraph::standard`], plans
//! its dependency levels and runs them in order, tasks within a level
//! concurrently.

mod graph;
mod runner;

pub use graph::{Action, TASK_NAMES, TaskGraph, TaskId};
pub use runner::run;
