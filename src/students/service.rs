use chrono::NaiveDate;
use std::sync::Arc;

use super::aggregation::MarksAggregator;
use super::model::{Mark, NameAvgScore, Student, StudentId, StudentRecord};
use super::repo::StudentRepo;
use crate::errors::DbError;
use crate::store::RecordStore;

fn into_students<T: Into<Student>>(rows: Vec<T>) -> Vec<Student> {
    rows.into_iter().map(Into::into).collect()
}

/// Student operations: mutations with existence checks, and every named read query.
#[derive(Clone)]
pub struct StudentsService {
    repo: StudentRepo,
    aggregator: MarksAggregator,
}

impl StudentsService {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { repo: StudentRepo::new(store.clone()), aggregator: MarksAggregator::new(store) }
    }

    pub fn with_parts(repo: StudentRepo, aggregator: MarksAggregator) -> Self {
        Self { repo, aggregator }
    }

    /// Creates a record with an empty mark history.
    ///
    /// # Errors
    /// `AlreadyExists` when the id is taken.
    pub fn add_student(&self, student: &Student) -> Result<Student, DbError> {
        let id = student.id;
        if self.repo.exists_by_id(id)? {
            return Err(DbError::AlreadyExists(id));
        }
        // the store rejects a duplicate that slipped in after the check
        self.repo.insert(&StudentRecord::from_student(student))?;
        log::debug!("saved {student:?}");
        Ok(student.clone())
    }

    pub fn update_phone(&self, id: StudentId, phone: &str) -> Result<Student, DbError> {
        let updated = self.repo.set_phone(id, phone)?.ok_or(DbError::NotFound(id))?;
        log::debug!("student {id}, new phone number {phone}");
        Ok(updated)
    }

    /// Appends one mark and returns the full updated history.
    pub fn add_mark(&self, id: StudentId, mark: Mark) -> Result<Vec<Mark>, DbError> {
        let marks = self.repo.push_mark(id, &mark)?.ok_or(DbError::NotFound(id))?;
        log::debug!("student {id}, added mark {mark:?}");
        Ok(marks)
    }

    /// Deletes a record and returns its identity and marks as they were.
    pub fn remove_student(&self, id: StudentId) -> Result<StudentRecord, DbError> {
        let removed = self.repo.delete_by_id(id)?.ok_or(DbError::NotFound(id))?;
        log::debug!("removed student {id}, marks {:?}", removed.marks);
        Ok(removed)
    }

    pub fn get_marks(&self, id: StudentId) -> Result<Vec<Mark>, DbError> {
        let marks = self.repo.find_student_marks(id)?.ok_or(DbError::NotFound(id))?.marks;
        log::debug!("id {id}, marks {marks:?}");
        Ok(marks)
    }

    pub fn get_student(&self, id: StudentId) -> Result<Student, DbError> {
        self.repo.find_student_no_marks(id)?.map(Student::from).ok_or(DbError::NotFound(id))
    }

    pub fn get_student_by_phone(&self, phone: &str) -> Result<Option<Student>, DbError> {
        Ok(self.repo.find_by_phone(phone)?.map(|s| Student::new(s.id, s.name, phone)))
    }

    pub fn get_student_by_phone_prefix(&self, prefix: &str) -> Result<Vec<Student>, DbError> {
        let students = self.repo.find_by_phone_prefix(prefix)?;
        log::debug!("number of students having phone prefix {prefix} is {}", students.len());
        Ok(into_students(students))
    }

    pub fn get_students_all_good_marks(&self, threshold: i32) -> Result<Vec<Student>, DbError> {
        Ok(into_students(self.repo.find_by_good_marks(threshold)?))
    }

    /// Students with fewer than `threshold` marks. Does not modify anything.
    pub fn get_students_few_marks(&self, threshold: i32) -> Result<Vec<Student>, DbError> {
        Ok(into_students(self.repo.find_by_few_marks(threshold)?))
    }

    /// Deletes the students with fewer than `threshold` marks and returns them.
    pub fn purge_students_few_marks(&self, threshold: i32) -> Result<Vec<Student>, DbError> {
        let removed = into_students(self.repo.delete_by_few_marks(threshold)?);
        log::debug!("purged {} students having fewer than {threshold} marks", removed.len());
        Ok(removed)
    }

    /// Students with at least one mark in `subject` scoring `threshold` or more.
    pub fn get_students_all_good_marks_subject(&self, subject: &str, threshold: i32) -> Result<Vec<Student>, DbError> {
        let res = into_students(self.repo.find_good_marks_subject(subject, threshold)?);
        log::trace!("students with good marks in {subject}: {res:?}");
        Ok(res)
    }

    pub fn get_students_marks_amount_between(&self, min: i32, max: i32) -> Result<Vec<Student>, DbError> {
        log::debug!("received min {min} and max {max} values");
        let res = into_students(self.repo.find_marks_amount_between(min, max)?);
        log::trace!("students with marks amount in range: {res:?}");
        Ok(res)
    }

    pub fn get_student_subject_marks(&self, id: StudentId, subject: &str) -> Result<Vec<Mark>, DbError> {
        if !self.repo.exists_by_id(id)? {
            return Err(DbError::NotFound(id));
        }
        let res = self.aggregator.subject_marks_for_student(id, subject)?;
        log::debug!("result: {res:?}");
        Ok(res)
    }

    pub fn get_student_avg_score(&self, threshold: i32) -> Result<Vec<NameAvgScore>, DbError> {
        let res = self.aggregator.average_score_above(threshold)?;
        log::debug!("result: {res:?}");
        Ok(res)
    }

    /// Marks of one student dated within `[from, to]`; the caller keeps `from <= to`.
    pub fn get_student_marks_at_dates(&self, id: StudentId, from: NaiveDate, to: NaiveDate) -> Result<Vec<Mark>, DbError> {
        if !self.repo.exists_by_id(id)? {
            return Err(DbError::NotFound(id));
        }
        let res = self.aggregator.marks_in_date_range(id, from, to)?;
        log::debug!("marks: {res:?}");
        Ok(res)
    }

    pub fn get_best_students(&self, n: usize) -> Result<Vec<String>, DbError> {
        let res = self.aggregator.best_students(n)?;
        log::debug!("students: {res:?}");
        Ok(res)
    }

    pub fn get_worst_students(&self, n: usize) -> Result<Vec<String>, DbError> {
        let res = self.aggregator.worst_students(n)?;
        log::debug!("students: {res:?}");
        Ok(res)
    }
}
