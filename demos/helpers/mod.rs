//! Shared helpers for the demos.

mod run_panel;
mod runner_model;

pub use run_panel::*;
pub use runner_model::*;
