#[allow(dead_code)]
#[path = "_support/fixture.rs"]
mod fixture;

use fixture::seeded;
use marklite::{Collection, DbError, RecordStore, StudentsService, snapshot};
use std::sync::Arc;

#[test]
fn save_then_load_preserves_records_and_order() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("data").join("students.ndjson");
    let (col, svc) = seeded();
    assert_eq!(snapshot::save(&col, &path).unwrap(), 7);

    let text = std::fs::read_to_string(&path).unwrap();
    assert_eq!(text.lines().count(), 7);
    assert!(text.lines().next().unwrap().contains("\"2024-01-10\""));

    let restored = Arc::new(Collection::new("students"));
    assert_eq!(snapshot::load(&restored, &path).unwrap(), 7);
    let store: Arc<dyn RecordStore> = restored;
    let svc2 = StudentsService::new(store);
    for id in 1..=7 {
        assert_eq!(svc2.get_marks(id).unwrap(), svc.get_marks(id).unwrap());
    }
    assert_eq!(svc2.get_worst_students(7).unwrap(), svc.get_worst_students(7).unwrap());
}

#[test]
fn missing_file_loads_empty() {
    let tmp = tempfile::tempdir().unwrap();
    let col = Collection::new("students");
    assert_eq!(snapshot::load(&col, &tmp.path().join("absent.ndjson")).unwrap(), 0);
    assert!(col.is_empty());
}

#[test]
fn blank_lines_skip_and_bad_lines_name_their_number() {
    let input = "{\"id\":1,\"name\":\"a\",\"phone\":\"1\"}\n\n{\"id\":2,\"name\":\"b\"}\n";
    let col = Collection::new("students");
    let e = snapshot::load_from_reader(&col, input.as_bytes()).unwrap_err();
    match e {
        DbError::Malformed(msg) => assert!(msg.starts_with("line 3"), "{msg}"),
        other => panic!("unexpected {other:?}"),
    }
    assert_eq!(col.len(), 1);
}

#[test]
fn duplicate_ids_in_snapshot_fail() {
    let input = "{\"id\":1,\"name\":\"a\",\"phone\":\"1\"}\n{\"id\":1,\"name\":\"b\",\"phone\":\"2\"}\n";
    let col = Collection::new("students");
    assert!(matches!(snapshot::load_from_reader(&col, input.as_bytes()), Err(DbError::Malformed(_))));
}
