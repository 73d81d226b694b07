//! Student records: model, document mapping, queries, pipelines and the service.
pub mod aggregation;
pub mod codec;
pub mod model;
pub mod repo;
pub mod service;

pub use aggregation::{MarksAggregator, SCORE_BEST_STUDENT};
pub use model::{IdName, IdNamePhone, Mark, MarksOnly, NameAvgScore, Student, StudentId, StudentRecord};
pub use repo::StudentRepo;
pub use service::StudentsService;
