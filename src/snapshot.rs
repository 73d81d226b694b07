//! NDJSON snapshots of a student collection: one `StudentRecord` per line.

use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Read, Write};
use std::path::Path;
use tempfile::NamedTempFile;

use crate::collection::Collection;
use crate::errors::DbError;
use crate::students::StudentRecord;
use crate::students::codec;

/// Inserts every record read from `reader`; blank lines are skipped.
///
/// # Errors
/// `Malformed` naming the line number of the first bad line, or a duplicate id.
pub fn load_from_reader<R: Read>(collection: &Collection, reader: R) -> Result<usize, DbError> {
    let mut reader = BufReader::new(reader);
    let mut buf = String::with_capacity(1024);
    let mut line_no: usize = 0;
    let mut loaded = 0;
    loop {
        buf.clear();
        if reader.read_line(&mut buf)? == 0 {
            break;
        }
        line_no += 1;
        let line = buf.trim();
        if line.is_empty() {
            continue;
        }
        let record: StudentRecord =
            serde_json::from_str(line).map_err(|e| DbError::Malformed(format!("line {line_no}: {e}")))?;
        collection
            .insert_document(codec::record_to_doc(&record))
            .map_err(|e| DbError::Malformed(format!("line {line_no}: {e}")))?;
        loaded += 1;
    }
    Ok(loaded)
}

/// Loads `path` into `collection`. A missing file is an empty snapshot.
///
/// # Errors
/// See [`load_from_reader`]; I/O failures other than not-found are passed through.
pub fn load(collection: &Collection, path: &Path) -> Result<usize, DbError> {
    let file = match File::open(path) {
        Ok(f) => f,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            log::info!("snapshot {} not found, starting empty", path.display());
            return Ok(0);
        }
        Err(e) => return Err(e.into()),
    };
    let n = load_from_reader(collection, file)?;
    log::info!("snapshot: loaded {n} records from {}", path.display());
    Ok(n)
}

/// Writes every record in natural order.
///
/// # Errors
/// `Malformed` when a stored document no longer decodes; I/O and JSON failures.
pub fn save_to_writer<W: Write>(collection: &Collection, writer: W) -> Result<usize, DbError> {
    let mut w = BufWriter::new(writer);
    let docs = collection.get_all_documents();
    for doc in &docs {
        let record = codec::record_from_doc(doc)?;
        serde_json::to_writer(&mut w, &record)?;
        w.write_all(b"\n")?;
    }
    w.flush()?;
    Ok(docs.len())
}

/// Saves atomically: writes a temp file beside `path`, then renames it over `path`.
///
/// # Errors
/// See [`save_to_writer`]; also fails when the temp file cannot be created or persisted.
pub fn save(collection: &Collection, path: &Path) -> Result<usize, DbError> {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    if !parent.exists() {
        std::fs::create_dir_all(parent)?;
    }
    let mut tmp = NamedTempFile::new_in(parent)?;
    let n = save_to_writer(collection, &mut tmp)?;
    tmp.persist(path).map_err(|e| DbError::Io(e.error.to_string()))?;
    log::info!("snapshot: saved {n} records to {}", path.display());
    Ok(n)
}
