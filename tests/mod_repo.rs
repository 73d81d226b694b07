#[allow(dead_code)]
#[path = "_support/fixture.rs"]
mod fixture;

use fixture::{mark, seeded};
use marklite::students::{IdName, IdNamePhone, StudentRepo};
use marklite::{RecordStore, Student, StudentRecord};
use std::sync::Arc;

fn repo() -> StudentRepo {
    let (col, _svc) = seeded();
    let store: Arc<dyn RecordStore> = col;
    StudentRepo::new(store)
}

#[test]
fn projections_distinguish_absent_from_empty() {
    let r = repo();
    assert_eq!(r.find_student_marks(7).unwrap().map(|m| m.marks.len()), Some(0));
    assert_eq!(r.find_student_marks(70).unwrap(), None);
    assert_eq!(
        r.find_student_no_marks(5).unwrap(),
        Some(IdNamePhone { id: 5, name: "name5".into(), phone: "053-5678901".into() })
    );
    assert_eq!(r.find_student_no_marks(70).unwrap(), None);
}

#[test]
fn find_by_phone_takes_first_in_id_order() {
    let r = repo();
    r.insert(&StudentRecord::from_student(&Student::new(0, "dup", "052-4567890"))).unwrap();
    assert_eq!(r.find_by_phone("052-4567890").unwrap(), Some(IdName { id: 0, name: "dup".into() }));
}

#[test]
fn marks_by_id_and_subject_keeps_only_that_subject() {
    let r = repo();
    assert_eq!(r.find_marks_by_id_and_subject(3, "S3").unwrap(), vec![mark("S3", "2024-02-05", 70)]);
    assert!(r.find_marks_by_id_and_subject(2, "S3").unwrap().is_empty());
    assert!(r.find_marks_by_id_and_subject(42, "S1").unwrap().is_empty());
}

#[test]
fn count_range_is_closed() {
    let r = repo();
    let between = |min, max| -> Vec<i64> { r.find_marks_amount_between(min, max).unwrap().into_iter().map(|s| s.id).collect() };
    assert_eq!(between(2, 2), vec![5]);
    assert_eq!(between(3, 3), vec![1, 3, 4, 6]);
    assert_eq!(between(0, 0), vec![7]);
    assert!(between(3, 2).is_empty());
}

#[test]
fn delete_by_few_marks_removes_exactly_the_matches() {
    let r = repo();
    let removed: Vec<i64> = r.delete_by_few_marks(3).unwrap().into_iter().map(|s| s.id).collect();
    assert_eq!(removed, vec![2, 5, 7]);
    for id in [2, 5, 7] {
        assert!(!r.exists_by_id(id).unwrap());
    }
    assert!(r.exists_by_id(1).unwrap());
}

#[test]
fn record_round_trips_through_store() {
    let r = repo();
    let rec = r.find_by_id(1).unwrap().unwrap();
    assert_eq!(rec.student(), Student::new(1, "name1", "050-1234567"));
    assert_eq!(rec.marks[2], mark("S2", "2024-02-01", 65));
    assert_eq!(r.set_phone(1, "000").unwrap().map(|s| s.phone), Some("000".to_string()));
    assert_eq!(r.push_mark(99, &mark("S1", "2024-01-01", 1)).unwrap(), None);
}
