//! Named filter and lookup queries over the student collection.

use bson::Document as BsonDocument;
use std::sync::Arc;

use super::codec::{self, ID, MARKS, NAME, PHONE, SCORE, SUBJECT};
use super::model::{IdName, IdNamePhone, Mark, MarksOnly, Student, StudentId, StudentRecord};
use crate::errors::DbError;
use crate::query::{CmpOp, Filter, FindOptions, UpdateDoc};
use crate::store::RecordStore;

fn by_id(id: StudentId) -> Filter {
    Filter::equals(ID, id)
}

fn id_name_phone_opts() -> FindOptions {
    FindOptions::project([ID, NAME, PHONE])
}

fn decode_all<T>(
    docs: &[BsonDocument],
    decode: impl Fn(&BsonDocument) -> Result<T, DbError>,
) -> Result<Vec<T>, DbError> {
    docs.iter().map(decode).collect()
}

#[derive(Clone)]
pub struct StudentRepo {
    store: Arc<dyn RecordStore>,
}

impl StudentRepo {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    pub fn exists_by_id(&self, id: StudentId) -> Result<bool, DbError> {
        self.store.exists(id)
    }

    pub fn find_by_id(&self, id: StudentId) -> Result<Option<StudentRecord>, DbError> {
        self.store.find_by_id(id)?.as_ref().map(codec::record_from_doc).transpose()
    }

    pub fn insert(&self, record: &StudentRecord) -> Result<(), DbError> {
        self.store.insert(codec::record_to_doc(record))
    }

    /// Replaces the phone in one atomic store update.
    pub fn set_phone(&self, id: StudentId, phone: &str) -> Result<Option<Student>, DbError> {
        self.store.update_by_id(id, &UpdateDoc::set(PHONE, phone))?.as_ref().map(codec::student_from_doc).transpose()
    }

    /// Appends a mark in one atomic store update and returns the whole updated history.
    pub fn push_mark(&self, id: StudentId, mark: &Mark) -> Result<Option<Vec<Mark>>, DbError> {
        self.store
            .update_by_id(id, &UpdateDoc::push(MARKS, codec::mark_to_doc(mark)))?
            .as_ref()
            .map(codec::marks_from_doc)
            .transpose()
    }

    pub fn delete_by_id(&self, id: StudentId) -> Result<Option<StudentRecord>, DbError> {
        self.store.delete_by_id(id)?.as_ref().map(codec::record_from_doc).transpose()
    }

    /// Marks-only projection of one record; `None` when the id is unknown.
    pub fn find_student_marks(&self, id: StudentId) -> Result<Option<MarksOnly>, DbError> {
        let docs = self.store.find(&by_id(id), &FindOptions::project([MARKS]).with_limit(1))?;
        docs.first().map(|d| codec::marks_from_doc(d).map(|marks| MarksOnly { marks })).transpose()
    }

    /// Identity projection of one record; `None` when the id is unknown.
    pub fn find_student_no_marks(&self, id: StudentId) -> Result<Option<IdNamePhone>, DbError> {
        let docs = self.store.find(&by_id(id), &id_name_phone_opts().with_limit(1))?;
        docs.first().map(codec::id_name_phone_from_doc).transpose()
    }

    /// Phones are not unique; the first match in natural order wins.
    pub fn find_by_phone(&self, phone: &str) -> Result<Option<IdName>, DbError> {
        let opts = FindOptions::project([ID, NAME]).with_limit(1);
        let docs = self.store.find(&Filter::equals(PHONE, phone), &opts)?;
        docs.first().map(codec::id_name_from_doc).transpose()
    }

    pub fn find_by_phone_prefix(&self, prefix: &str) -> Result<Vec<IdNamePhone>, DbError> {
        let docs = self.store.find(&Filter::literal_prefix(PHONE, prefix), &id_name_phone_opts())?;
        decode_all(&docs, codec::id_name_phone_from_doc)
    }

    /// Records with at least one mark and every mark strictly above `threshold`.
    pub fn find_by_good_marks(&self, threshold: i32) -> Result<Vec<IdNamePhone>, DbError> {
        let filter = Filter::And(vec![
            Filter::elem_match(MARKS, Filter::cmp(SCORE, CmpOp::Gt, threshold)),
            Filter::elem_match(MARKS, Filter::cmp(SCORE, CmpOp::Lte, threshold)).negate(),
        ]);
        let docs = self.store.find(&filter, &id_name_phone_opts())?;
        decode_all(&docs, codec::id_name_phone_from_doc)
    }

    fn few_marks(threshold: i32) -> Filter {
        Filter::size(MARKS, CmpOp::Lt, i64::from(threshold))
    }

    /// Records holding fewer than `threshold` marks. Read-only.
    pub fn find_by_few_marks(&self, threshold: i32) -> Result<Vec<IdNamePhone>, DbError> {
        let docs = self.store.find(&Self::few_marks(threshold), &id_name_phone_opts())?;
        decode_all(&docs, codec::id_name_phone_from_doc)
    }

    /// Removes every record holding fewer than `threshold` marks and returns them.
    pub fn delete_by_few_marks(&self, threshold: i32) -> Result<Vec<IdNamePhone>, DbError> {
        let docs = self.store.find_and_delete(&Self::few_marks(threshold), &id_name_phone_opts())?;
        decode_all(&docs, codec::id_name_phone_from_doc)
    }

    /// Records with at least one mark in `subject` scoring `threshold` or more.
    pub fn find_good_marks_subject(&self, subject: &str, threshold: i32) -> Result<Vec<IdNamePhone>, DbError> {
        let filter = Filter::elem_match(
            MARKS,
            Filter::And(vec![Filter::equals(SUBJECT, subject), Filter::cmp(SCORE, CmpOp::Gte, threshold)]),
        );
        let docs = self.store.find(&filter, &id_name_phone_opts())?;
        decode_all(&docs, codec::id_name_phone_from_doc)
    }

    /// Records whose mark count lies in `[min, max]`.
    pub fn find_marks_amount_between(&self, min: i32, max: i32) -> Result<Vec<IdNamePhone>, DbError> {
        let filter = Filter::And(vec![
            Filter::size(MARKS, CmpOp::Gte, i64::from(min)),
            Filter::size(MARKS, CmpOp::Lte, i64::from(max)),
        ]);
        let docs = self.store.find(&filter, &id_name_phone_opts())?;
        decode_all(&docs, codec::id_name_phone_from_doc)
    }

    /// The marks of one student restricted to `subject`, in insertion order.
    pub fn find_marks_by_id_and_subject(&self, id: StudentId, subject: &str) -> Result<Vec<Mark>, DbError> {
        let filter = Filter::And(vec![by_id(id), Filter::elem_match(MARKS, Filter::equals(SUBJECT, subject))]);
        let docs = self.store.find(&filter, &FindOptions::project([MARKS]).with_limit(1))?;
        let Some(doc) = docs.first() else {
            return Ok(Vec::new());
        };
        let mut marks = codec::marks_from_doc(doc)?;
        marks.retain(|m| m.subject == subject);
        Ok(marks)
    }
}
