// Submodules for separation of concerns
mod eval;
mod types;
mod update;

pub use eval::{as_f64, compare_bson, compare_docs, eval_filter, get_path, project_fields};
pub(crate) use types::MAX_PROJECTION_FIELDS;
pub use types::{CmpOp, Filter, FindOptions, Order, SortSpec, UpdateDoc};
pub use update::apply_update;
