//! Multi-stage aggregation over document snapshots.
mod exec;
mod stage;

pub use exec::run_pipeline;
pub use stage::{Accumulator, Pipeline, ProjectExpr, Stage};
