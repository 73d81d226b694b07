use bson::{Bson, Document as BsonDocument};

use super::stage::{Accumulator, Pipeline, ProjectExpr, Stage};
use crate::query::{as_f64, compare_docs, eval_filter, get_path};

/// Runs `pipeline` over `docs`, one stage at a time, in declaration order.
pub fn run_pipeline(docs: Vec<BsonDocument>, pipeline: &Pipeline) -> Vec<BsonDocument> {
    let mut rows = docs;
    for (i, stage) in pipeline.stages().iter().enumerate() {
        rows = run_stage(rows, stage);
        log::trace!("pipeline stage {i} ({}) -> {} rows", stage_name(stage), rows.len());
    }
    rows
}

const fn stage_name(stage: &Stage) -> &'static str {
    match stage {
        Stage::Match(_) => "match",
        Stage::Unwind(_) => "unwind",
        Stage::Group { .. } => "group",
        Stage::Project(_) => "project",
        Stage::Sort(_) => "sort",
        Stage::Limit(_) => "limit",
    }
}

fn run_stage(mut rows: Vec<BsonDocument>, stage: &Stage) -> Vec<BsonDocument> {
    match stage {
        Stage::Match(filter) => {
            rows.retain(|d| eval_filter(d, filter));
            rows
        }
        Stage::Unwind(field) => rows.into_iter().flat_map(|d| unwind(d, field)).collect(),
        Stage::Group { key, accumulators } => group(&rows, key, accumulators),
        Stage::Project(fields) => rows.iter().map(|d| project(d, fields)).collect(),
        Stage::Sort(specs) => {
            // stable: equal keys keep their incoming order
            rows.sort_by(|a, b| compare_docs(a, b, specs));
            rows
        }
        Stage::Limit(n) => {
            rows.truncate(*n);
            rows
        }
    }
}

fn unwind(doc: BsonDocument, field: &str) -> Vec<BsonDocument> {
    match doc.get(field) {
        None | Some(Bson::Null) => Vec::new(),
        Some(Bson::Array(items)) => items
            .iter()
            .map(|item| {
                let mut row = doc.clone();
                row.insert(field.to_string(), item.clone());
                row
            })
            .collect(),
        Some(_) => vec![doc],
    }
}

#[derive(Debug, Default)]
struct NumSum {
    ints: i64,
    floats: f64,
    saw_float: bool,
}

impl NumSum {
    fn add(&mut self, v: &Bson) {
        match v {
            Bson::Int32(i) => self.add_int(i64::from(*i)),
            Bson::Int64(i) => self.add_int(*i),
            other => {
                if let Some(f) = as_f64(other) {
                    self.floats += f;
                    self.saw_float = true;
                }
            }
        }
    }

    #[allow(clippy::cast_precision_loss)]
    fn add_int(&mut self, i: i64) {
        match self.ints.checked_add(i) {
            Some(s) => self.ints = s,
            None => {
                self.floats += i as f64;
                self.saw_float = true;
            }
        }
    }

    #[allow(clippy::cast_precision_loss)]
    fn finish(&self) -> Bson {
        if self.saw_float { Bson::Double(self.ints as f64 + self.floats) } else { Bson::Int64(self.ints) }
    }
}

enum AccState {
    Avg { total: f64, n: u64 },
    Sum(NumSum),
    Count(i64),
}

impl AccState {
    fn new(acc: &Accumulator) -> Self {
        match acc {
            Accumulator::Avg(_) => Self::Avg { total: 0.0, n: 0 },
            Accumulator::Sum(_) => Self::Sum(NumSum::default()),
            Accumulator::Count => Self::Count(0),
        }
    }

    fn feed(&mut self, acc: &Accumulator, doc: &BsonDocument) {
        match (self, acc) {
            (Self::Avg { total, n }, Accumulator::Avg(path)) => {
                if let Some(f) = get_path(doc, path).and_then(as_f64) {
                    *total += f;
                    *n += 1;
                }
            }
            (Self::Sum(s), Accumulator::Sum(path)) => {
                if let Some(v) = get_path(doc, path) {
                    s.add(v);
                }
            }
            (Self::Count(c), Accumulator::Count) => *c += 1,
            _ => {}
        }
    }

    #[allow(clippy::cast_precision_loss)]
    fn finish(&self) -> Bson {
        match self {
            Self::Avg { n: 0, .. } => Bson::Null,
            Self::Avg { total, n } => Bson::Double(total / *n as f64),
            Self::Sum(s) => s.finish(),
            Self::Count(c) => Bson::Int64(*c),
        }
    }
}

fn group(rows: &[BsonDocument], key: &str, accumulators: &[(String, Accumulator)]) -> Vec<BsonDocument> {
    // first-appearance order; Bson is not hashable
    let mut groups: Vec<(Bson, Vec<AccState>)> = Vec::new();
    for row in rows {
        let k = get_path(row, key).cloned().unwrap_or(Bson::Null);
        let idx = if let Some(i) = groups.iter().position(|(g, _)| *g == k) {
            i
        } else {
            groups.push((k, accumulators.iter().map(|(_, a)| AccState::new(a)).collect()));
            groups.len() - 1
        };
        for (state, (_, acc)) in groups[idx].1.iter_mut().zip(accumulators) {
            state.feed(acc, row);
        }
    }
    groups
        .into_iter()
        .map(|(k, states)| {
            let mut out = BsonDocument::new();
            out.insert("_id", k);
            for (state, (name, _)) in states.iter().zip(accumulators) {
                out.insert(name.clone(), state.finish());
            }
            out
        })
        .collect()
}

fn project(doc: &BsonDocument, fields: &[(String, ProjectExpr)]) -> BsonDocument {
    let mut out = BsonDocument::new();
    if let Some(id) = doc.get("_id") {
        out.insert("_id", id.clone());
    }
    for (name, expr) in fields {
        match expr {
            ProjectExpr::Field(path) => {
                if let Some(v) = get_path(doc, path) {
                    out.insert(name.clone(), v.clone());
                }
            }
            ProjectExpr::ArraySum { array, field } => {
                let mut sum = NumSum::default();
                if let Some(Bson::Array(items)) = get_path(doc, array) {
                    for item in items {
                        if let Some(v) = item.as_document().and_then(|d| d.get(field)) {
                            sum.add(v);
                        }
                    }
                }
                out.insert(name.clone(), sum.finish());
            }
        }
    }
    out
}
