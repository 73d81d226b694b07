//! Mapping between typed student records and the BSON documents kept by the store.
//!
//! Calendar dates are stored as BSON datetimes at UTC midnight, so a date always
//! reads back as the same date regardless of the host timezone.

use bson::{Bson, Document as BsonDocument, doc};
use chrono::{NaiveDate, NaiveTime};

use super::model::{IdName, IdNamePhone, Mark, Student, StudentId, StudentRecord};
use crate::errors::DbError;

pub const ID: &str = "_id";
pub const NAME: &str = "name";
pub const PHONE: &str = "phone";
pub const MARKS: &str = "marks";
pub const SUBJECT: &str = "subject";
pub const DATE: &str = "date";
pub const SCORE: &str = "score";

/// Dotted path to a field of a mark, for use after unwinding `marks`.
#[must_use]
pub fn mark_path(field: &str) -> String {
    format!("{MARKS}.{field}")
}

#[must_use]
pub fn date_to_bson(date: NaiveDate) -> Bson {
    let millis = date.and_time(NaiveTime::MIN).and_utc().timestamp_millis();
    Bson::DateTime(bson::DateTime::from_millis(millis))
}

pub fn date_from_bson(v: &Bson) -> Result<NaiveDate, DbError> {
    match v {
        Bson::DateTime(dt) => chrono::DateTime::from_timestamp_millis(dt.timestamp_millis())
            .map(|d| d.date_naive())
            .ok_or_else(|| DbError::Malformed(format!("date out of range: {dt}"))),
        Bson::String(s) => NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .map_err(|e| DbError::Malformed(format!("bad date {s:?}: {e}"))),
        other => Err(DbError::Malformed(format!("expected date, got {other}"))),
    }
}

fn int_field(doc: &BsonDocument, key: &str) -> Result<i64, DbError> {
    match doc.get(key) {
        Some(Bson::Int32(i)) => Ok(i64::from(*i)),
        Some(Bson::Int64(i)) => Ok(*i),
        Some(other) => Err(DbError::Malformed(format!("{key}: expected integer, got {other}"))),
        None => Err(DbError::Malformed(format!("missing field {key}"))),
    }
}

pub fn id_of(doc: &BsonDocument) -> Result<StudentId, DbError> {
    int_field(doc, ID)
}

#[must_use]
pub fn mark_to_doc(mark: &Mark) -> BsonDocument {
    doc! {
        SUBJECT: mark.subject.clone(),
        DATE: date_to_bson(mark.date),
        SCORE: mark.score,
    }
}

pub fn mark_from_doc(doc: &BsonDocument) -> Result<Mark, DbError> {
    let score = int_field(doc, SCORE)?;
    let score = i32::try_from(score).map_err(|_| DbError::Malformed(format!("score out of range: {score}")))?;
    let date = doc.get(DATE).ok_or_else(|| DbError::Malformed(format!("missing field {DATE}")))?;
    Ok(Mark { subject: doc.get_str(SUBJECT)?.to_string(), date: date_from_bson(date)?, score })
}

/// Decodes the `marks` array; a missing array decodes as no marks.
pub fn marks_from_doc(doc: &BsonDocument) -> Result<Vec<Mark>, DbError> {
    let Some(marks) = doc.get(MARKS) else {
        return Ok(Vec::new());
    };
    let Bson::Array(items) = marks else {
        return Err(DbError::Malformed(format!("{MARKS}: expected array, got {marks}")));
    };
    items
        .iter()
        .map(|m| match m {
            Bson::Document(d) => mark_from_doc(d),
            other => Err(DbError::Malformed(format!("mark: expected document, got {other}"))),
        })
        .collect()
}

#[must_use]
pub fn record_to_doc(record: &StudentRecord) -> BsonDocument {
    let marks: Vec<Bson> = record.marks.iter().map(|m| Bson::Document(mark_to_doc(m))).collect();
    doc! {
        ID: record.id,
        NAME: record.name.clone(),
        PHONE: record.phone.clone(),
        MARKS: marks,
    }
}

pub fn record_from_doc(doc: &BsonDocument) -> Result<StudentRecord, DbError> {
    Ok(StudentRecord {
        id: id_of(doc)?,
        name: doc.get_str(NAME)?.to_string(),
        phone: doc.get_str(PHONE)?.to_string(),
        marks: marks_from_doc(doc)?,
    })
}

pub fn student_from_doc(doc: &BsonDocument) -> Result<Student, DbError> {
    Ok(Student { id: id_of(doc)?, name: doc.get_str(NAME)?.to_string(), phone: doc.get_str(PHONE)?.to_string() })
}

pub fn id_name_from_doc(doc: &BsonDocument) -> Result<IdName, DbError> {
    Ok(IdName { id: id_of(doc)?, name: doc.get_str(NAME)?.to_string() })
}

pub fn id_name_phone_from_doc(doc: &BsonDocument) -> Result<IdNamePhone, DbError> {
    let s = student_from_doc(doc)?;
    Ok(IdNamePhone { id: s.id, name: s.name, phone: s.phone })
}
