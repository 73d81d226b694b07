//! The record store contract the query and aggregation layers are written against.

use bson::Document as BsonDocument;

use crate::aggregate::Pipeline;
use crate::errors::DbError;
use crate::query::{Filter, FindOptions, UpdateDoc};
use crate::students::model::StudentId;

/// Document store holding one document per student, keyed by `_id`.
///
/// Every single-record write is atomic: `update_by_id` and `delete_by_id` never expose a
/// window between reading and writing the record. Backend failures come back unchanged
/// as `Err`.
pub trait RecordStore: Send + Sync {
    fn exists(&self, id: StudentId) -> Result<bool, DbError>;

    fn find_by_id(&self, id: StudentId) -> Result<Option<BsonDocument>, DbError>;

    /// Fails with `AlreadyExists` when a document with the same `_id` is present.
    fn insert(&self, doc: BsonDocument) -> Result<(), DbError>;

    /// Applies `update` to one record and returns the updated document.
    fn update_by_id(&self, id: StudentId, update: &UpdateDoc) -> Result<Option<BsonDocument>, DbError>;

    /// Removes one record and returns it as it was before deletion.
    fn delete_by_id(&self, id: StudentId) -> Result<Option<BsonDocument>, DbError>;

    fn find(&self, filter: &Filter, opts: &FindOptions) -> Result<Vec<BsonDocument>, DbError>;

    /// Removes every match and returns the removed documents, shaped by `opts`.
    fn find_and_delete(&self, filter: &Filter, opts: &FindOptions) -> Result<Vec<BsonDocument>, DbError>;

    fn aggregate(&self, pipeline: &Pipeline) -> Result<Vec<BsonDocument>, DbError>;
}
