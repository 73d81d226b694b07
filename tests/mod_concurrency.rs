#[allow(dead_code)]
#[path = "_support/fixture.rs"]
mod fixture;

use fixture::{date, empty};
use marklite::{Mark, Student};
use std::sync::Arc;
use std::thread;

#[test]
fn parallel_add_mark_loses_nothing() {
    let (_, svc) = empty();
    svc.add_student(&Student::new(1, "a", "050")).unwrap();
    let svc = Arc::new(svc);
    let threads = 8;
    let per_thread = 50;
    let handles: Vec<_> = (0..threads)
        .map(|t| {
            let svc = Arc::clone(&svc);
            thread::spawn(move || {
                for i in 0..per_thread {
                    svc.add_mark(1, Mark::new(format!("T{t}"), date("2024-01-01"), i)).unwrap();
                }
            })
        })
        .collect();
    for h in handles {
        h.join().unwrap();
    }
    let marks = svc.get_marks(1).unwrap();
    assert_eq!(marks.len(), (threads * per_thread) as usize);
    for t in 0..threads {
        let scores: Vec<i32> = marks.iter().filter(|m| m.subject == format!("T{t}")).map(|m| m.score).collect();
        assert_eq!(scores, (0..per_thread).collect::<Vec<_>>(), "per-thread order kept for T{t}");
    }
}

#[test]
fn concurrent_add_student_admits_one() {
    let (col, svc) = empty();
    let svc = Arc::new(svc);
    let handles: Vec<_> = (0..8)
        .map(|i| {
            let svc = Arc::clone(&svc);
            thread::spawn(move || svc.add_student(&Student::new(5, format!("n{i}"), "1")).is_ok())
        })
        .collect();
    let ok = handles.into_iter().map(|h| h.join().unwrap()).filter(|ok| *ok).count();
    assert_eq!(ok, 1);
    assert_eq!(col.len(), 1);
}
