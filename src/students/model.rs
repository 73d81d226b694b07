use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Caller-assigned student identifier.
pub type StudentId = i64;

/// Identity view of a student record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Student {
    pub id: StudentId,
    pub name: String,
    pub phone: String,
}

impl Student {
    pub fn new(id: StudentId, name: impl Into<String>, phone: impl Into<String>) -> Self {
        Self { id, name: name.into(), phone: phone.into() }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mark {
    pub subject: String,
    pub date: NaiveDate,
    pub score: i32,
}

impl Mark {
    pub fn new(subject: impl Into<String>, date: NaiveDate, score: i32) -> Self {
        Self { subject: subject.into(), date, score }
    }
}

/// A full record: identity plus the insertion-ordered mark history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentRecord {
    pub id: StudentId,
    pub name: String,
    pub phone: String,
    #[serde(default)]
    pub marks: Vec<Mark>,
}

impl StudentRecord {
    #[must_use]
    pub fn from_student(student: &Student) -> Self {
        Self {
            id: student.id,
            name: student.name.clone(),
            phone: student.phone.clone(),
            marks: Vec::new(),
        }
    }

    #[must_use]
    pub fn student(&self) -> Student {
        Student::new(self.id, self.name.clone(), self.phone.clone())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NameAvgScore {
    pub name: String,
    /// Mean score truncated toward zero.
    pub avg_score: i32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdName {
    pub id: StudentId,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdNamePhone {
    pub id: StudentId,
    pub name: String,
    pub phone: String,
}

impl From<IdNamePhone> for Student {
    fn from(p: IdNamePhone) -> Self {
        Self { id: p.id, name: p.name, phone: p.phone }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MarksOnly {
    pub marks: Vec<Mark>,
}
