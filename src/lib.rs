pub mod aggregate;
pub mod cli;
pub mod collection;
pub mod config;
pub mod errors;
pub mod logger;
pub mod query;
pub mod snapshot;
pub mod store;
pub mod students;

pub use crate::collection::Collection;
pub use crate::errors::DbError;
pub use crate::store::RecordStore;
pub use crate::students::{Mark, NameAvgScore, Student, StudentId, StudentRecord, StudentsService};

use crate::config::Settings;
use std::sync::Arc;

/// An opened student store: the in-memory collection and the service over it.
pub struct Database {
    collection: Arc<Collection>,
    service: StudentsService,
}

impl Database {
    /// Creates an empty in-memory database.
    #[must_use]
    pub fn new(collection: &str, best_student_score: i32) -> Self {
        let collection = Arc::new(Collection::new(collection));
        let store: Arc<dyn RecordStore> = collection.clone();
        let service = StudentsService::with_parts(
            students::StudentRepo::new(store.clone()),
            students::MarksAggregator::new(store).with_best_score(best_student_score),
        );
        Self { collection, service }
    }

    /// Opens the snapshot named in `settings`; a missing file starts empty.
    ///
    /// # Errors
    /// Returns an error if the snapshot exists but cannot be read or decoded.
    pub fn open(settings: &Settings) -> Result<Self, DbError> {
        let db = Self::new(&settings.collection, settings.best_student_score);
        snapshot::load(&db.collection, &settings.data_file)?;
        Ok(db)
    }

    /// Writes the collection back to `settings.data_file`.
    ///
    /// # Errors
    /// Returns an error if the snapshot cannot be written.
    pub fn save(&self, settings: &Settings) -> Result<usize, DbError> {
        snapshot::save(&self.collection, &settings.data_file)
    }

    #[must_use]
    pub fn service(&self) -> &StudentsService {
        &self.service
    }

    #[must_use]
    pub fn collection(&self) -> &Arc<Collection> {
        &self.collection
    }
}

/// Initializes logging from resolved settings.
///
/// A `log_config` YAML file wins over the programmatic rolling-file setup.
///
/// # Errors
/// Returns an error if the logger cannot be configured.
pub fn init(settings: &Settings) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(path) = &settings.log_config {
        return logger::init_path(path);
    }
    logger::configure_logging(settings.log_dir.as_deref(), Some(&settings.log_level), Some(settings.log_retention))
}
