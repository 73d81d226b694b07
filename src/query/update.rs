use bson::{Bson, Document as BsonDocument};

use super::types::UpdateDoc;
use crate::errors::DbError;

fn ensure_subdoc<'a>(root: &'a mut BsonDocument, key: &str) -> Result<&'a mut BsonDocument, DbError> {
    if !matches!(root.get(key), Some(Bson::Document(_))) {
        root.insert(key.to_string(), Bson::Document(BsonDocument::new()));
    }
    match root.get_mut(key) {
        Some(Bson::Document(d)) => Ok(d),
        _ => Err(DbError::QueryError(format!("cannot traverse into {key}"))),
    }
}

fn traverse_to_parent<'a>(
    root: &'a mut BsonDocument,
    path: &str,
) -> Result<(&'a mut BsonDocument, String), DbError> {
    let mut cur = root;
    let mut iter = path.split('.').peekable();
    while let Some(seg) = iter.next() {
        if iter.peek().is_none() {
            return Ok((cur, seg.to_string()));
        }
        cur = ensure_subdoc(cur, seg)?;
    }
    Err(DbError::QueryError("empty update path".into()))
}

fn set_path(root: &mut BsonDocument, path: &str, value: Bson) -> Result<bool, DbError> {
    let (parent, last) = traverse_to_parent(root, path)?;
    let old = parent.insert(last, value.clone());
    Ok(old.as_ref() != Some(&value))
}

fn push_path(root: &mut BsonDocument, path: &str, value: Bson) -> Result<bool, DbError> {
    let (parent, last) = traverse_to_parent(root, path)?;
    match parent.get_mut(&last) {
        Some(Bson::Array(items)) => items.push(value),
        None | Some(Bson::Null) => {
            parent.insert(last, Bson::Array(vec![value]));
        }
        Some(_) => {
            return Err(DbError::QueryError(format!("$push target {path} is not an array")));
        }
    }
    Ok(true)
}

/// Applies `$set` then `$push` operators in order. Returns whether the document changed.
///
/// # Errors
/// Fails when a `$push` targets a non-array field; the document may then be partially updated,
/// so callers apply updates to a scratch copy.
pub fn apply_update(doc: &mut BsonDocument, upd: &UpdateDoc) -> Result<bool, DbError> {
    let mut changed = false;
    for (k, v) in &upd.set {
        changed |= set_path(doc, k, v.clone())?;
    }
    for (k, v) in &upd.push {
        changed |= push_path(doc, k, v.clone())?;
    }
    Ok(changed)
}
