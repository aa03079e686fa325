//! Run summary types and helpers.

mod render;
mod run_summary;
mod status;

pub use render::{render_json, render_table};
pub use run_summary::{NotLoaded, RunSummary};
pub use status::RunStatus;
