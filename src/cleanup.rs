//! Removal of directories left empty by a recursive run.

use crate::events::{EventSink, SortEvent};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Finds the directories under `root` that contain neither files nor
/// subdirectories, deepest first. The root itself is never a candidate.
///
/// Entries that cannot be read are reported through `events` and skipped.
pub fn find_empty_dirs(root: &Path, events: &mut dyn EventSink) -> Vec<PathBuf> {
    let mut empty = Vec::new();

    for result in WalkDir::new(root).min_depth(1).contents_first(true) {
        let entry = match result {
            Ok(entry) => entry,
            Err(e) => {
                events.emit(SortEvent::ScanFailed {
                    path: e.path().map(Path::to_path_buf),
                    reason: e.to_string(),
                });
                continue;
            }
        };

        if !entry.file_type().is_dir() {
            continue;
        }

        match fs::read_dir(entry.path()) {
            Ok(mut children) => {
                if children.next().is_none() {
                    empty.push(entry.into_path());
                }
            }
            Err(e) => events.emit(SortEvent::ScanFailed {
                path: Some(entry.into_path()),
                reason: e.to_string(),
            }),
        }
    }

    empty
}

/// Removes each directory in `dirs`, returning the ones actually removed.
///
/// A failed removal is reported as a warning and does not stop the pass.
pub fn remove_dirs(dirs: &[PathBuf], events: &mut dyn EventSink) -> Vec<PathBuf> {
    let mut removed = Vec::with_capacity(dirs.len());
    for dir in dirs {
        match fs::remove_dir(dir) {
            Ok(()) => {
                events.emit(SortEvent::EmptyDirRemoved { path: dir.clone() });
                removed.push(dir.clone());
            }
            Err(e) => events.emit(SortEvent::EmptyDirRemoveFailed {
                path: dir.clone(),
                reason: e.to_string(),
            }),
        }
    }
    removed
}
