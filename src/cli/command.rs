use chrono::NaiveDate;

use crate::students::StudentId;

/// One service operation as issued from the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    AddStudent { id: StudentId, name: String, phone: String },
    UpdatePhone { id: StudentId, phone: String },
    AddMark { id: StudentId, subject: String, date: NaiveDate, score: i32 },
    RemoveStudent { id: StudentId },
    Marks { id: StudentId },
    ByPhone { phone: String },
    ByPhonePrefix { prefix: String },
    GoodMarks { threshold: i32 },
    FewMarks { threshold: i32 },
    PurgeFewMarks { threshold: i32 },
    GoodMarksSubject { subject: String, threshold: i32 },
    MarksBetween { min: i32, max: i32 },
    SubjectMarks { id: StudentId, subject: String },
    AvgScore { threshold: i32 },
    MarksAtDates { id: StudentId, from: NaiveDate, to: NaiveDate },
    Best { n: usize },
    Worst { n: usize },
}

impl Command {
    /// True when the command changes stored data, so the snapshot must be saved afterwards.
    #[must_use]
    pub const fn is_mutation(&self) -> bool {
        matches!(
            self,
            Self::AddStudent { .. }
                | Self::UpdatePhone { .. }
                | Self::AddMark { .. }
                | Self::RemoveStudent { .. }
                | Self::PurgeFewMarks { .. }
        )
    }
}
