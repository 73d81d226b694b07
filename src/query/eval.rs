use bson::{Bson, Document as BsonDocument};
use std::cmp::Ordering;

use super::types::{CmpOp, Filter, MAX_PATH_DEPTH, MAX_SORT_FIELDS, Order, SortSpec};

pub fn eval_filter(doc: &BsonDocument, filter: &Filter) -> bool {
    match filter {
        Filter::True => true,
        Filter::And(fs) => fs.iter().all(|f| eval_filter(doc, f)),
        Filter::Or(fs) => fs.iter().any(|f| eval_filter(doc, f)),
        Filter::Not(f) => !eval_filter(doc, f),
        Filter::Exists { path, exists } => get_path(doc, path).is_some() == *exists,
        Filter::Cmp { path, op, value } => match get_path(doc, path) {
            Some(v) if *op == CmpOp::Eq => values_equal(v, value),
            Some(v) => cmp_matches(compare_bson(v, value), *op),
            None => false,
        },
        Filter::ElemMatch { path, filter } => match get_path(doc, path) {
            Some(Bson::Array(items)) => items.iter().any(|item| match item {
                Bson::Document(d) => eval_filter(d, filter),
                _ => false,
            }),
            _ => false,
        },
        Filter::Size { path, op, value } => {
            let len = match get_path(doc, path) {
                Some(Bson::Array(items)) => items.len(),
                Some(_) => return false,
                None => 0,
            };
            let len = i64::try_from(len).unwrap_or(i64::MAX);
            cmp_matches(len.cmp(value), *op)
        }
        Filter::Regex { path, pattern, case_insensitive } => {
            if let Some(Bson::String(s)) = get_path(doc, path) {
                let mut re = regex::RegexBuilder::new(pattern);
                re.case_insensitive(*case_insensitive);
                if let Ok(r) = re.build() { r.is_match(s) } else { false }
            } else {
                false
            }
        }
    }
}

/// Numbers compare by value across Int32/Int64/Double; everything else structurally.
fn values_equal(a: &Bson, b: &Bson) -> bool {
    match (as_f64(a), as_f64(b)) {
        (Some(x), Some(y)) => x.total_cmp(&y) == Ordering::Equal,
        _ => a == b,
    }
}

fn cmp_matches(ord: Ordering, op: CmpOp) -> bool {
    match op {
        CmpOp::Eq => ord == Ordering::Equal,
        CmpOp::Gt => ord == Ordering::Greater,
        CmpOp::Gte => ord != Ordering::Less,
        CmpOp::Lt => ord == Ordering::Less,
        CmpOp::Lte => ord != Ordering::Greater,
    }
}

pub fn compare_docs(a: &BsonDocument, b: &BsonDocument, sort: &[SortSpec]) -> Ordering {
    for s in sort.iter().take(MAX_SORT_FIELDS) {
        let va = get_path(a, &s.field);
        let vb = get_path(b, &s.field);
        let ord = match (va, vb) {
            (Some(x), Some(y)) => compare_bson(x, y),
            (Some(_), None) => Ordering::Greater,
            (None, Some(_)) => Ordering::Less,
            (None, None) => Ordering::Equal,
        };
        if ord != Ordering::Equal {
            return if s.order == Order::Asc { ord } else { ord.reverse() };
        }
    }
    Ordering::Equal
}

/// Resolves a dotted path through embedded documents.
pub fn get_path<'a>(doc: &'a BsonDocument, path: &str) -> Option<&'a Bson> {
    if path.is_empty() || path.len() > 1024 {
        return None;
    }
    let mut cur = doc;
    let mut parts = path.split('.').enumerate().peekable();
    while let Some((depth, part)) = parts.next() {
        if depth >= MAX_PATH_DEPTH {
            return None;
        }
        let v = cur.get(part)?;
        if parts.peek().is_none() {
            return Some(v);
        }
        match v {
            Bson::Document(d) => cur = d,
            _ => return None,
        }
    }
    None
}

pub fn as_f64(v: &Bson) -> Option<f64> {
    #[allow(clippy::cast_precision_loss)]
    match v {
        Bson::Int32(i) => Some(f64::from(*i)),
        Bson::Int64(i) => Some(*i as f64),
        Bson::Double(f) => Some(*f),
        _ => None,
    }
}

pub fn compare_bson(a: &Bson, b: &Bson) -> Ordering {
    use bson::Bson as T;
    if let (Some(x), Some(y)) = (as_f64(a), as_f64(b)) {
        return x.total_cmp(&y);
    }
    match (a, b) {
        (T::String(x), T::String(y)) => x.cmp(y),
        (T::Boolean(x), T::Boolean(y)) => x.cmp(y),
        (T::DateTime(x), T::DateTime(y)) => x.cmp(y),
        _ => type_rank(a).cmp(&type_rank(b)),
    }
}

fn type_rank(v: &Bson) -> u8 {
    use bson::Bson as T;
    match v {
        T::MinKey => 0,
        T::Null | T::Undefined => 1,
        T::Int32(_) | T::Int64(_) | T::Double(_) | T::Decimal128(_) => 2,
        T::String(_) | T::Symbol(_) => 3,
        T::Document(_) => 4,
        T::Array(_) => 5,
        T::Binary(_) => 6,
        T::ObjectId(_) => 7,
        T::Boolean(_) => 8,
        T::DateTime(_) => 9,
        T::Timestamp(_) => 10,
        T::RegularExpression(_) => 11,
        T::DbPointer(_) => 12,
        T::JavaScriptCode(_) | T::JavaScriptCodeWithScope(_) => 13,
        T::MaxKey => 255,
    }
}

/// Keeps only the listed top-level fields. `_id` is kept only when listed.
pub fn project_fields(doc: &BsonDocument, fields: &[String]) -> BsonDocument {
    let mut out = BsonDocument::new();
    for f in fields {
        if let Some(v) = doc.get(f) {
            out.insert(f.clone(), v.clone());
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::doc;

    fn student() -> BsonDocument {
        doc! {
            "_id": 1_i64,
            "name": "alice",
            "phone": "050-1234567",
            "marks": [
                {"subject": "math", "score": 90},
                {"subject": "art", "score": 60},
            ],
        }
    }

    #[test]
    fn elem_match_is_existential() {
        let d = student();
        let low = Filter::elem_match("marks", Filter::cmp("score", CmpOp::Lte, 60));
        let high = Filter::elem_match("marks", Filter::cmp("score", CmpOp::Gt, 95));
        assert!(eval_filter(&d, &low));
        assert!(!eval_filter(&d, &high));
    }

    #[test]
    fn elem_match_combines_conditions_on_one_element() {
        let d = student();
        let f = Filter::elem_match(
            "marks",
            Filter::And(vec![Filter::equals("subject", "art"), Filter::cmp("score", CmpOp::Gte, 70)]),
        );
        // art=60 and math=90 must not be mixed across elements
        assert!(!eval_filter(&d, &f));
    }

    #[test]
    fn size_counts_missing_array_as_empty() {
        let d = doc! {"_id": 2_i64};
        assert!(eval_filter(&d, &Filter::size("marks", CmpOp::Lt, 1)));
        assert!(eval_filter(&student(), &Filter::size("marks", CmpOp::Eq, 2)));
        assert!(!eval_filter(&student(), &Filter::size("marks", CmpOp::Gt, 2)));
    }

    #[test]
    fn literal_prefix_escapes_pattern_characters() {
        let d = doc! {"phone": "+1.555"};
        assert!(eval_filter(&d, &Filter::literal_prefix("phone", "+1.")));
        assert!(!eval_filter(&doc! {"phone": "11x555"}, &Filter::literal_prefix("phone", "+1.")));
        // the prefix alone is not a match
        assert!(!eval_filter(&d, &Filter::literal_prefix("phone", "+1.555")));
    }

    #[test]
    fn dotted_paths_and_mixed_numeric_compare() {
        let d = doc! {"marks": {"score": bson::Bson::Int64(70)}};
        assert!(eval_filter(&d, &Filter::cmp("marks.score", CmpOp::Gt, 69.5)));
        assert!(eval_filter(&d, &Filter::cmp("marks.score", CmpOp::Lte, 70)));
        assert!(eval_filter(&d, &Filter::equals("marks.score", 70)));
        assert!(get_path(&d, "marks.score.x").is_none());
    }

    #[test]
    fn datetimes_compare_chronologically() {
        let a = Bson::DateTime(bson::DateTime::from_millis(1_000));
        let b = Bson::DateTime(bson::DateTime::from_millis(2_000));
        assert_eq!(compare_bson(&a, &b), Ordering::Less);
    }
}
