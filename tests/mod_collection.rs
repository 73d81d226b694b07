use bson::{Bson, doc};
use marklite::query::{CmpOp, Filter, FindOptions, Order, SortSpec, UpdateDoc};
use marklite::{Collection, DbError, RecordStore};

fn col() -> Collection {
    let c = Collection::new("people");
    for (id, name, age) in [(3_i64, "c", 30), (1, "a", 20), (2, "b", 30), (4, "d", 10)] {
        c.insert_document(doc! {"_id": id, "name": name, "age": age, "tags": []}).unwrap();
    }
    c
}

#[test]
fn insert_rejects_duplicates_and_missing_ids() {
    let c = col();
    assert!(matches!(c.insert_document(doc! {"_id": 1_i64}), Err(DbError::AlreadyExists(1))));
    assert!(matches!(c.insert_document(doc! {"name": "x"}), Err(DbError::Malformed(_))));
    assert_eq!(c.len(), 4);
    assert_eq!(c.list_ids(), vec![1, 2, 3, 4]);
}

#[test]
fn find_sorts_then_skips_and_limits() {
    let c = col();
    let opts = FindOptions {
        projection: Some(vec!["name".into()]),
        sort: Some(vec![SortSpec::desc("age"), SortSpec::asc("name")]),
        limit: Some(2),
        skip: Some(1),
    };
    let docs = c.find(&Filter::True, &opts).unwrap();
    let names: Vec<&str> = docs.iter().map(|d| d.get_str("name").unwrap()).collect();
    assert_eq!(names, vec!["c", "a"]);
    assert!(docs[0].get("age").is_none());
}

#[test]
fn natural_order_is_ascending_id() {
    let c = col();
    let docs = c.find(&Filter::cmp("age", CmpOp::Eq, 30), &FindOptions::default()).unwrap();
    let ids: Vec<i64> = docs.iter().map(|d| d.get_i64("_id").unwrap()).collect();
    assert_eq!(ids, vec![2, 3]);
}

#[test]
fn update_push_and_set_are_applied_atomically() {
    let c = col();
    let after = c.update_by_id(1, &UpdateDoc::push("tags", "x")).unwrap().unwrap();
    assert_eq!(after.get_array("tags").unwrap(), &vec![Bson::String("x".into())]);
    let after = c.update_by_id(1, &UpdateDoc::set("name", "z")).unwrap().unwrap();
    assert_eq!(after.get_str("name").unwrap(), "z");
    assert_eq!(c.update_by_id(9, &UpdateDoc::set("name", "z")).unwrap(), None);
}

#[test]
fn failed_update_leaves_document_untouched() {
    let c = col();
    let mut upd = UpdateDoc::set("name", "changed");
    upd.push.push(("age".into(), Bson::Int32(1)));
    assert!(c.update_by_id(2, &upd).is_err());
    assert_eq!(c.find_by_id(2).unwrap().unwrap().get_str("name").unwrap(), "b");
}

#[test]
fn find_and_delete_removes_every_match() {
    let c = col();
    let removed = c.find_and_delete(&Filter::cmp("age", CmpOp::Gte, 20), &FindOptions::default()).unwrap();
    assert_eq!(removed.len(), 3);
    assert_eq!(c.list_ids(), vec![4]);
    assert!(c.delete_by_id(1).unwrap().is_none());
    assert_eq!(c.delete_by_id(4).unwrap().unwrap().get_str("name").unwrap(), "d");
    assert!(c.is_empty());
}

#[test]
fn rename_is_visible() {
    let c = col();
    c.set_name("renamed".into());
    assert_eq!(c.name_str(), "renamed");
}
