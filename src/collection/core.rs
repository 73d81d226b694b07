use bson::Document as BsonDocument;
use parking_lot::RwLock;
use std::collections::BTreeMap;

use crate::students::model::StudentId;

/// In-memory document collection. Natural order is ascending `_id`.
pub struct Collection {
    pub name: RwLock<String>,
    pub(crate) docs: RwLock<BTreeMap<StudentId, BsonDocument>>,
}

impl Collection {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: RwLock::new(name.into()), docs: RwLock::new(BTreeMap::new()) }
    }

    pub fn set_name(&self, new_name: String) {
        *self.name.write() = new_name;
    }

    /// Returns the collection's name as a String (cloned), hiding the `RwLock`.
    pub fn name_str(&self) -> String {
        self.name.read().clone()
    }

    pub fn len(&self) -> usize {
        self.docs.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.docs.read().is_empty()
    }
}

impl std::fmt::Debug for Collection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Collection").field("name", &self.name_str()).field("len", &self.len()).finish()
    }
}
