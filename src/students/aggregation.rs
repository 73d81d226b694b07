//! Named aggregation pipelines over the student collection.
//!
//! Stage order is part of each query's meaning: filters run before grouping where they
//! select rows, after grouping where they select groups, and ranking always sorts before
//! it limits.

use bson::Document as BsonDocument;
use chrono::NaiveDate;
use std::sync::Arc;

use super::codec::{self, DATE, ID, MARKS, NAME, SCORE, SUBJECT, mark_path};
use super::model::{Mark, NameAvgScore, StudentId};
use crate::aggregate::{Accumulator, Pipeline, ProjectExpr};
use crate::errors::DbError;
use crate::query::{CmpOp, Filter, Order, as_f64};
use crate::store::RecordStore;

/// Minimum mean score for `best_students`.
pub const SCORE_BEST_STUDENT: i32 = 80;

const AVG_SCORE: &str = "avgScore";
const SCORES: &str = "scores";

fn avg_by_name() -> Pipeline {
    Pipeline::new().unwind(MARKS).group(NAME, vec![(AVG_SCORE, Accumulator::Avg(mark_path(SCORE)))])
}

fn group_name(doc: &BsonDocument) -> Result<String, DbError> {
    Ok(doc.get_str(ID)?.to_string())
}

#[allow(clippy::cast_possible_truncation)]
fn truncated_avg(doc: &BsonDocument) -> Result<i32, DbError> {
    doc.get(AVG_SCORE)
        .and_then(as_f64)
        .map(|f| f.trunc() as i32)
        .ok_or_else(|| DbError::Malformed(format!("missing {AVG_SCORE}")))
}

#[derive(Clone)]
pub struct MarksAggregator {
    store: Arc<dyn RecordStore>,
    best_score: i32,
}

impl MarksAggregator {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store, best_score: SCORE_BEST_STUDENT }
    }

    #[must_use]
    pub const fn with_best_score(mut self, best_score: i32) -> Self {
        self.best_score = best_score;
        self
    }

    pub const fn best_score(&self) -> i32 {
        self.best_score
    }

    /// Marks of one student in one subject, as (score, date) rows.
    ///
    /// # Errors
    /// `NotFound` when the student does not exist.
    pub fn subject_marks_for_student(&self, id: StudentId, subject: &str) -> Result<Vec<Mark>, DbError> {
        if !self.store.exists(id)? {
            return Err(DbError::NotFound(id));
        }
        let pipeline = Pipeline::new()
            .matching(Filter::equals(ID, id))
            .unwind(MARKS)
            .matching(Filter::equals(mark_path(SUBJECT), subject))
            .project_paths(&[mark_path(SCORE).as_str(), mark_path(DATE).as_str()]);
        let rows = self.store.aggregate(&pipeline)?;
        log::debug!("subject marks rows: {rows:?}");
        rows.iter()
            .map(|d| -> Result<Mark, DbError> {
                let date = d.get(DATE).ok_or_else(|| DbError::Malformed(format!("missing {DATE}")))?;
                let score = d.get_i32(SCORE)?;
                Ok(Mark::new(subject, codec::date_from_bson(date)?, score))
            })
            .collect()
    }

    /// Marks of one student dated within `[from, to]`. The range is not validated.
    pub fn marks_in_date_range(&self, id: StudentId, from: NaiveDate, to: NaiveDate) -> Result<Vec<Mark>, DbError> {
        let date = mark_path(DATE);
        let pipeline = Pipeline::new()
            .matching(Filter::equals(ID, id))
            .unwind(MARKS)
            .matching(Filter::And(vec![
                Filter::cmp(date.as_str(), CmpOp::Gte, codec::date_to_bson(from)),
                Filter::cmp(date.as_str(), CmpOp::Lte, codec::date_to_bson(to)),
            ]))
            .project_paths(&[mark_path(SUBJECT).as_str(), mark_path(SCORE).as_str(), date.as_str()]);
        let rows = self.store.aggregate(&pipeline)?;
        log::debug!("date range rows: {rows:?}");
        rows.iter().map(codec::mark_from_doc).collect()
    }

    /// Per-name mean score strictly above `threshold`, highest first.
    pub fn average_score_above(&self, threshold: i32) -> Result<Vec<NameAvgScore>, DbError> {
        let pipeline = avg_by_name()
            .matching(Filter::cmp(AVG_SCORE, CmpOp::Gt, threshold))
            .sort(AVG_SCORE, Order::Desc);
        self.store
            .aggregate(&pipeline)?
            .iter()
            .map(|d| -> Result<NameAvgScore, DbError> { Ok(NameAvgScore { name: group_name(d)?, avg_score: truncated_avg(d)? }) })
            .collect()
    }

    /// Up to `n` names with mean score at least the best-student threshold, highest first.
    pub fn best_students(&self, n: usize) -> Result<Vec<String>, DbError> {
        let pipeline = avg_by_name()
            .matching(Filter::cmp(AVG_SCORE, CmpOp::Gte, self.best_score))
            .sort(AVG_SCORE, Order::Desc)
            .limit(n);
        self.store.aggregate(&pipeline)?.iter().map(group_name).collect()
    }

    /// The `n` records with the lowest score sum; a record without marks sums to 0.
    pub fn worst_students(&self, n: usize) -> Result<Vec<String>, DbError> {
        let pipeline = Pipeline::new()
            .project(vec![
                (NAME.to_string(), ProjectExpr::Field(NAME.to_string())),
                (SCORES.to_string(), ProjectExpr::ArraySum { array: MARKS.to_string(), field: SCORE.to_string() }),
            ])
            .sort(SCORES, Order::Asc)
            .limit(n);
        self.store
            .aggregate(&pipeline)?
            .iter()
            .map(|d| -> Result<String, DbError> { Ok(d.get_str(NAME)?.to_string()) })
            .collect()
    }
}
