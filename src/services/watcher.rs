use anyhow::Result;
use notify::{recommended_watcher, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::time::Duration;

use crate::services::spreadsheet::is_supported;

pub const DEBOUNCE_MS: u64 = 700;

#[derive(Debug, Clone)]
pub enum FileEventKind {
    Created,
    Modified,
}

#[derive(Debug, Clone)]
pub struct FileEvent {
    pub path: PathBuf,
    pub kind: FileEventKind,
}

/// Watches the inbox folder for import files; dropping it stops the watch.
pub struct WatcherService {
    _watcher: RecommendedWatcher,
}

impl WatcherService {
    pub fn start(inbox: &Path, tx: mpsc::Sender<FileEvent>) -> Result<Self> {
        let mut watcher = recommended_watcher(move |res: notify::Result<Event>| {
            if let Ok(event) = res {
                let kind = match event.kind {
                    EventKind::Create(_) => FileEventKind::Created,
                    EventKind::Modify(_) => FileEventKind::Modified,
                    _ => return,
                };
                for path in event.paths {
                    if is_supported(&path) {
                        let _ = tx.send(FileEvent {
                            path,
                            kind: kind.clone(),
                        });
                    }
                }
            }
        })?;

        watcher.watch(inbox, RecursiveMode::NonRecursive)?;
        Ok(WatcherService { _watcher: watcher })
    }
}

/// Waits until the file size stops changing; false if it vanished or stayed empty.
pub fn debounce_file_event(path: &Path, debounce_ms: u64) -> bool {
    let mut last_size = None;
    for _ in 0..3 {
        std::thread::sleep(Duration::from_millis(debounce_ms));
        if let Ok(metadata) = std::fs::metadata(path) {
            let size = metadata.len();
            if Some(size) == last_size {
                return size > 0;
            }
            last_size = Some(size);
        } else {
            return false;
        }
    }
    last_size.unwrap_or(0) > 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debounce_rejects_missing_file() {
        let path = std::env::temp_dir().join(format!("item-import-missing-{}.csv", uuid::Uuid::new_v4()));
        assert!(!debounce_file_event(&path, 1));
    }

    #[test]
    fn debounce_accepts_stable_file() {
        let path = std::env::temp_dir().join(format!("item-import-stable-{}.csv", uuid::Uuid::new_v4()));
        std::fs::write(&path, "Item name\nWidget").unwrap();
        assert!(debounce_file_event(&path, 1));
        let _ = std::fs::remove_file(path);
    }
}
