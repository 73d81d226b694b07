use chrono::NaiveDate;
use marklite::{Collection, Mark, RecordStore, Student, StudentsService};
use std::sync::Arc;

pub fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

pub fn mark(subject: &str, d: &str, score: i32) -> Mark {
    Mark::new(subject, date(d), score)
}

/// Seven students; mark sums 265, 40, 210, 280, 110, 300 and 0 (student 7 has no marks).
pub fn students() -> Vec<(Student, Vec<Mark>)> {
    vec![
        (
            Student::new(1, "name1", "050-1234567"),
            vec![mark("S1", "2024-01-10", 100), mark("S3", "2024-01-15", 100), mark("S2", "2024-02-01", 65)],
        ),
        (Student::new(2, "name2", "055-2345678"), vec![mark("S1", "2024-01-20", 40)]),
        (
            Student::new(3, "name3", "050-3456789"),
            vec![mark("S1", "2024-01-10", 80), mark("S2", "2024-01-25", 60), mark("S3", "2024-02-05", 70)],
        ),
        (
            Student::new(4, "name4", "052-4567890"),
            vec![mark("S1", "2024-01-12", 90), mark("S2", "2024-01-22", 95), mark("S3", "2024-02-02", 95)],
        ),
        (Student::new(5, "name5", "053-5678901"), vec![mark("S1", "2024-01-18", 50), mark("S3", "2024-02-10", 60)]),
        (
            Student::new(6, "name6", "050-6789012"),
            vec![mark("S1", "2024-01-11", 100), mark("S2", "2024-01-21", 100), mark("S3", "2024-02-01", 100)],
        ),
        (Student::new(7, "name7", "054-7890123"), vec![]),
    ]
}

pub fn empty() -> (Arc<Collection>, StudentsService) {
    let col = Arc::new(Collection::new("students"));
    let store: Arc<dyn RecordStore> = col.clone();
    (col, StudentsService::new(store))
}

/// A service over a collection seeded through the service's own mutations.
pub fn seeded() -> (Arc<Collection>, StudentsService) {
    let (col, svc) = empty();
    for (s, marks) in students() {
        svc.add_student(&s).unwrap();
        for m in marks {
            svc.add_mark(s.id, m).unwrap();
        }
    }
    (col, svc)
}

pub fn ids(students: &[Student]) -> Vec<i64> {
    students.iter().map(|s| s.id).collect()
}
