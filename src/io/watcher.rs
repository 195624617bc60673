use std::path::{Path, PathBuf};
use std::sync::mpsc;

use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};

/// Watches a single task file for changes made by another process.
///
/// The parent directory is watched rather than the file itself: editors and
/// atomic writers replace the file by rename, which would drop a file watch.
pub struct TaskFileWatcher {
    _watcher: RecommendedWatcher,
    rx: mpsc::Receiver<PathBuf>,
}

impl TaskFileWatcher {
    /// Start watching `task_file`. Call `poll()` each tick.
    pub fn start(task_file: &Path) -> Result<Self, notify::Error> {
        let (tx, rx) = mpsc::channel();
        let dir = match task_file.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };
        let file_name = task_file.file_name().map(|n| n.to_os_string());

        let mut watcher = RecommendedWatcher::new(
            move |result: Result<Event, notify::Error>| {
                let event = match result {
                    Ok(e) => e,
                    Err(e) => {
                        tracing::warn!(error = %e, "file watcher error");
                        return;
                    }
                };
                match event.kind {
                    EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_) => {}
                    _ => return,
                }
                for path in event.paths {
                    if path.file_name().map(|n| n.to_os_string()) == file_name {
                        let _ = tx.send(path);
                    }
                }
            },
            Config::default(),
        )?;

        watcher.watch(&dir, RecursiveMode::NonRecursive)?;
        Ok(TaskFileWatcher {
            _watcher: watcher,
            rx,
        })
    }

    /// Non-blocking drain of pending change notifications. Returns true if the
    /// task file changed at least once since the last poll.
    pub fn poll(&self) -> bool {
        let mut changed = false;
        while self.rx.try_recv().is_ok() {
            changed = true;
        }
        changed
    }
}
