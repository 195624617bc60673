use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use crate::model::task::{OrderChange, Task};
use crate::ops::reorder_ops::apply_order_changes;
use crate::parse::{self, ParseError};

/// Error type for task file I/O
#[derive(Debug, thiserror::Error)]
pub enum TaskFileError {
    #[error("could not read {path}: {source}")]
    ReadError { path: PathBuf, source: io::Error },
    #[error("could not write {path}: {source}")]
    WriteError { path: PathBuf, source: io::Error },
    #[error("{path} is not a valid task list: {source}")]
    ParseError { path: PathBuf, source: ParseError },
    #[error("could not serialize tasks: {0}")]
    SerializeError(#[from] serde_json::Error),
}

/// Read the raw payload of a task file. A missing file is an absent payload,
/// which loads as an empty task list.
pub fn read_payload(path: &Path) -> Result<Option<String>, TaskFileError> {
    match fs::read_to_string(path) {
        Ok(text) => Ok(Some(text)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(TaskFileError::ReadError {
            path: path.to_path_buf(),
            source: e,
        }),
    }
}

/// Write a task list atomically: temp file in the same directory, then rename.
pub fn write_tasks(path: &Path, tasks: &[Task]) -> Result<(), TaskFileError> {
    let json = parse::serialize_tasks(tasks)?;
    atomic_write(path, json.as_bytes()).map_err(|e| TaskFileError::WriteError {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Apply an order-change payload to the file on disk, the way a host does
/// after a reorder. Returns how many tasks changed.
pub fn apply_changes_to_file(path: &Path, changes: &[OrderChange]) -> Result<usize, TaskFileError> {
    let raw = read_payload(path)?;
    let mut tasks = parse::load(raw.as_deref())
        .map_err(|e| TaskFileError::ParseError {
            path: path.to_path_buf(),
            source: e,
        })?
        .tasks;
    let applied = apply_order_changes(&mut tasks, changes);
    if applied > 0 {
        write_tasks(path, &tasks)?;
    }
    Ok(applied)
}

fn atomic_write(path: &Path, content: &[u8]) -> io::Result<()> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(content)?;
    tmp.flush()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}
