use crate::students::model::StudentId;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DbError {
    #[error("Student {0} not found")]
    NotFound(StudentId),

    #[error("Student {0} already exists")]
    AlreadyExists(StudentId),

    #[error("Malformed record: {0}")]
    Malformed(String),

    #[error("Query error: {0}")]
    QueryError(String),

    #[error("I/O error: {0}")]
    Io(String),

    #[error("Serde JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("BSON: {0}")]
    Bson(#[from] bson::error::Error),

    #[error("Config error: {0}")]
    Config(String),
}

impl From<std::io::Error> for DbError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e.to_string())
    }
}

impl DbError {
    /// True for the two domain failures raised by the student service.
    #[must_use]
    pub const fn is_domain(&self) -> bool {
        matches!(self, Self::NotFound(_) | Self::AlreadyExists(_))
    }
}
