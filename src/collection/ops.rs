use bson::Document as BsonDocument;

use super::core::Collection;
use crate::aggregate::{Pipeline, run_pipeline};
use crate::errors::DbError;
use crate::logger::AUDIT_TARGET;
use crate::query::{
    FindOptions, Filter, MAX_PROJECTION_FIELDS, UpdateDoc, apply_update, compare_docs, eval_filter, project_fields,
};
use crate::store::RecordStore;
use crate::students::codec;
use crate::students::model::StudentId;

fn log_audit(op: &str, collection: &str, id: StudentId) {
    let line = serde_json::json!({"op": op, "collection": collection, "id": id}).to_string();
    log::info!(target: AUDIT_TARGET, "{line}");
}

/// Sort, then project, then skip/limit.
fn shape(mut docs: Vec<BsonDocument>, opts: &FindOptions) -> Vec<BsonDocument> {
    if let Some(sort) = &opts.sort {
        docs.sort_by(|a, b| compare_docs(a, b, sort));
    }
    if let Some(fields) = &opts.projection {
        let fields: Vec<String> = fields.iter().take(MAX_PROJECTION_FIELDS).cloned().collect();
        for d in &mut docs {
            *d = project_fields(d, &fields);
        }
    }
    let skip = opts.skip.unwrap_or(0);
    let limit = opts.limit.unwrap_or(usize::MAX);
    docs.into_iter().skip(skip).take(limit).collect()
}

impl Collection {
    /// Inserts a document keyed by its integer `_id`.
    ///
    /// # Errors
    /// `Malformed` without a usable `_id`, `AlreadyExists` on a duplicate key.
    pub fn insert_document(&self, doc: BsonDocument) -> Result<StudentId, DbError> {
        let id = codec::id_of(&doc)?;
        {
            let mut docs = self.docs.write();
            if docs.contains_key(&id) {
                return Err(DbError::AlreadyExists(id));
            }
            docs.insert(id, doc);
        }
        log_audit("insert", &self.name_str(), id);
        Ok(id)
    }

    pub fn find_document(&self, id: StudentId) -> Option<BsonDocument> {
        self.docs.read().get(&id).cloned()
    }

    pub fn contains(&self, id: StudentId) -> bool {
        self.docs.read().contains_key(&id)
    }

    /// Applies `update` under the write lock. The stored document is replaced only when the
    /// whole update succeeds.
    pub fn update_document(&self, id: StudentId, update: &UpdateDoc) -> Result<Option<BsonDocument>, DbError> {
        let updated = {
            let mut docs = self.docs.write();
            let Some(current) = docs.get_mut(&id) else {
                return Ok(None);
            };
            let mut scratch = current.clone();
            if !apply_update(&mut scratch, update)? {
                return Ok(Some(scratch));
            }
            *current = scratch.clone();
            scratch
        };
        log_audit("update", &self.name_str(), id);
        Ok(Some(updated))
    }

    pub fn delete_document(&self, id: StudentId) -> Option<BsonDocument> {
        let removed = self.docs.write().remove(&id);
        if removed.is_some() {
            log_audit("delete", &self.name_str(), id);
        }
        removed
    }

    /// Clones every document in natural order.
    pub fn get_all_documents(&self) -> Vec<BsonDocument> {
        self.docs.read().values().cloned().collect()
    }

    pub fn list_ids(&self) -> Vec<StudentId> {
        self.docs.read().keys().copied().collect()
    }

    pub fn find_docs(&self, filter: &Filter, opts: &FindOptions) -> Vec<BsonDocument> {
        let matched: Vec<BsonDocument> =
            self.docs.read().values().filter(|d| eval_filter(d, filter)).cloned().collect();
        log::trace!("find on {}: {} matches", self.name_str(), matched.len());
        shape(matched, opts)
    }

    pub fn delete_many(&self, filter: &Filter, opts: &FindOptions) -> Vec<BsonDocument> {
        let removed: Vec<(StudentId, BsonDocument)> = {
            let mut docs = self.docs.write();
            let ids: Vec<StudentId> =
                docs.iter().filter(|(_, d)| eval_filter(d, filter)).map(|(id, _)| *id).collect();
            ids.into_iter().filter_map(|id| docs.remove(&id).map(|d| (id, d))).collect()
        };
        let name = self.name_str();
        for (id, _) in &removed {
            log_audit("delete", &name, *id);
        }
        shape(removed.into_iter().map(|(_, d)| d).collect(), opts)
    }

    pub fn aggregate_docs(&self, pipeline: &Pipeline) -> Vec<BsonDocument> {
        run_pipeline(self.get_all_documents(), pipeline)
    }
}

impl RecordStore for Collection {
    fn exists(&self, id: StudentId) -> Result<bool, DbError> {
        Ok(self.contains(id))
    }

    fn find_by_id(&self, id: StudentId) -> Result<Option<BsonDocument>, DbError> {
        Ok(self.find_document(id))
    }

    fn insert(&self, doc: BsonDocument) -> Result<(), DbError> {
        self.insert_document(doc).map(|_| ())
    }

    fn update_by_id(&self, id: StudentId, update: &UpdateDoc) -> Result<Option<BsonDocument>, DbError> {
        self.update_document(id, update)
    }

    fn delete_by_id(&self, id: StudentId) -> Result<Option<BsonDocument>, DbError> {
        Ok(self.delete_document(id))
    }

    fn find(&self, filter: &Filter, opts: &FindOptions) -> Result<Vec<BsonDocument>, DbError> {
        Ok(self.find_docs(filter, opts))
    }

    fn find_and_delete(&self, filter: &Filter, opts: &FindOptions) -> Result<Vec<BsonDocument>, DbError> {
        Ok(self.delete_many(filter, opts))
    }

    fn aggregate(&self, pipeline: &Pipeline) -> Result<Vec<BsonDocument>, DbError> {
        Ok(self.aggregate_docs(pipeline))
    }
}
