#[allow(dead_code)]
#[path = "_support/fixture.rs"]
mod fixture;

use bson::doc;
use fixture::seeded;
use marklite::aggregate::{Accumulator, Pipeline};
use marklite::query::{CmpOp, Filter, Order};
use marklite::students::MarksAggregator;
use marklite::{Collection, RecordStore};
use std::sync::Arc;

fn names(rows: &[bson::Document]) -> Vec<String> {
    rows.iter().map(|d| d.get_str("_id").unwrap().to_string()).collect()
}

#[test]
fn limit_before_sort_is_not_a_top_n() {
    let (col, _) = seeded();
    let avg = || Pipeline::new().unwind("marks").group("name", vec![("avg", Accumulator::Avg("marks.score".into()))]);
    let sorted_first = col.aggregate(&avg().sort("avg", Order::Desc).limit(2)).unwrap();
    assert_eq!(names(&sorted_first), vec!["name6", "name4"]);
    // groups come out in first-appearance order, so limiting first keeps name1 and name2
    let limited_first = col.aggregate(&avg().limit(2).sort("avg", Order::Desc)).unwrap();
    assert_eq!(names(&limited_first), vec!["name1", "name2"]);
}

#[test]
fn group_counts_and_sums_per_subject() {
    let (col, _) = seeded();
    let p = Pipeline::new()
        .unwind("marks")
        .group(
            "marks.subject",
            vec![("n", Accumulator::Count), ("total", Accumulator::Sum("marks.score".into()))],
        )
        .sort("_id", Order::Asc);
    let rows = col.aggregate(&p).unwrap();
    let got: Vec<(String, i64, i64)> = rows
        .iter()
        .map(|d| (d.get_str("_id").unwrap().to_string(), marklite::query::as_f64(d.get("n").unwrap()).unwrap() as i64, marklite::query::as_f64(d.get("total").unwrap()).unwrap() as i64))
        .collect();
    assert_eq!(
        got,
        vec![("S1".to_string(), 6, 460), ("S2".to_string(), 4, 320), ("S3".to_string(), 5, 425)]
    );
}

#[test]
fn unwind_drops_students_without_marks() {
    let (col, _) = seeded();
    let rows = col.aggregate(&Pipeline::new().matching(Filter::cmp("_id", CmpOp::Gte, 5_i64)).unwind("marks")).unwrap();
    let ids: Vec<i64> = rows.iter().map(|d| d.get_i64("_id").unwrap()).collect();
    assert_eq!(ids, vec![5, 5, 6, 6, 6]);
}

#[test]
fn worst_treats_missing_marks_field_as_zero() {
    let col = Arc::new(Collection::new("raw"));
    col.insert_document(doc! {"_id": 1_i64, "name": "a", "phone": "1", "marks": [{"subject": "S", "date": "2024-01-01", "score": 5}]}).unwrap();
    col.insert_document(doc! {"_id": 2_i64, "name": "b", "phone": "2"}).unwrap();
    col.insert_document(doc! {"_id": 3_i64, "name": "c", "phone": "3", "marks": []}).unwrap();
    let store: Arc<dyn RecordStore> = col;
    let agg = MarksAggregator::new(store);
    assert_eq!(agg.worst_students(3).unwrap(), vec!["b", "c", "a"]);
}

#[test]
fn best_threshold_is_configurable() {
    let (col, _) = seeded();
    let store: Arc<dyn RecordStore> = col;
    let default = MarksAggregator::new(store.clone());
    assert_eq!(default.best_score(), 80);
    let strict = MarksAggregator::new(store).with_best_score(95);
    assert_eq!(strict.best_students(10).unwrap(), vec!["name6"]);
    assert_eq!(default.best_students(10).unwrap(), vec!["name6", "name4", "name1"]);
}

#[test]
fn best_of_zero_is_empty() {
    let (_, svc) = seeded();
    assert!(svc.get_best_students(0).unwrap().is_empty());
    assert!(svc.get_worst_students(0).unwrap().is_empty());
}
