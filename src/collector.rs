//! Enumeration of the files a run will sort.
//!
//! The collector scans the root directory (or its whole subtree), applies the
//! configured filters, classifies every candidate exactly once, and leaves out
//! files that already sit where the strategy would put them. The result is
//! ordered by the strategy's sort key, ties broken by path.

use crate::config::CompiledFilters;
use crate::events::{EventSink, SortEvent};
use crate::sorter::{SortError, SortResult};
use crate::strategy::{Classification, SortKey, SortStrategy, extension_category};
use std::cell::OnceCell;
use std::collections::{BTreeSet, HashSet};
use std::fs::{self, Metadata};
use std::io;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// A file path plus its metadata, read on first use and then cached.
///
/// Caching means every decision made about one entry during a run sees the
/// same size and timestamps, even if the file changes on disk meanwhile.
#[derive(Debug, Clone)]
pub struct FileEntry {
    path: PathBuf,
    metadata: OnceCell<Result<Metadata, (io::ErrorKind, String)>>,
}

impl FileEntry {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            metadata: OnceCell::new(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The final path component, lossily converted.
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// Reads the metadata on the first call and returns the cached value
    /// afterwards. Symlinks are followed.
    pub fn metadata(&self) -> io::Result<&Metadata> {
        self.metadata
            .get_or_init(|| fs::metadata(&self.path).map_err(|e| (e.kind(), e.to_string())))
            .as_ref()
            .map_err(|(kind, message)| io::Error::new(*kind, message.clone()))
    }
}

/// A collected file together with its classification.
#[derive(Debug, Clone)]
pub struct CollectedFile {
    pub entry: FileEntry,
    pub key: SortKey,
    pub category: String,
}

impl CollectedFile {
    /// True when the file already lives directly inside its own category
    /// directory under `root`.
    fn is_already_filed(&self, root: &Path) -> bool {
        self.entry.path().parent() == Some(root.join(&self.category).as_path())
    }
}

/// Collects the eligible files under `root`, sorted by the strategy's key.
///
/// Only regular files are considered. In recursive mode the subtrees of the
/// category directories that the top-level files map to are skipped, as are
/// files already sitting directly in their own category directory; this keeps
/// repeated runs from re-sorting files that are already filed.
///
/// Unreadable entries and metadata are reported as warnings through `events`
/// and never abort the scan.
///
/// # Errors
///
/// Returns [`SortError::ReadDirectory`] if the root itself cannot be listed.
pub fn collect_files(
    root: &Path,
    strategy: SortStrategy,
    recursive: bool,
    filters: &CompiledFilters,
    events: &mut dyn EventSink,
) -> SortResult<Vec<CollectedFile>> {
    let mut collected: Vec<CollectedFile> = top_level_files(root, filters, events)?
        .into_iter()
        .map(|entry| classify(strategy, entry, events))
        .collect();

    if recursive {
        let excluded: HashSet<PathBuf> = collected
            .iter()
            .map(|file| root.join(&file.category))
            .collect();

        let walker = WalkDir::new(root)
            .min_depth(1)
            .into_iter()
            .filter_entry(|e| !(e.file_type().is_dir() && excluded.contains(e.path())));

        for result in walker {
            let dir_entry = match result {
                Ok(dir_entry) => dir_entry,
                Err(e) => {
                    events.emit(SortEvent::ScanFailed {
                        path: e.path().map(Path::to_path_buf),
                        reason: e.to_string(),
                    });
                    continue;
                }
            };

            // Top-level files were classified above.
            if dir_entry.depth() < 2 || !dir_entry.file_type().is_file() {
                continue;
            }

            let relative = dir_entry
                .path()
                .strip_prefix(root)
                .unwrap_or(dir_entry.path());
            if !filters.should_include(relative) {
                continue;
            }

            let file = classify(strategy, FileEntry::new(dir_entry.into_path()), events);
            if !file.is_already_filed(root) {
                collected.push(file);
            }
        }
    }

    collected.sort_by(|a, b| {
        a.key
            .cmp(&b.key)
            .then_with(|| a.entry.path().cmp(b.entry.path()))
    });
    Ok(collected)
}

/// Lists the distinct extension categories of the regular files under
/// `root`, sorted.
///
/// # Errors
///
/// Returns [`SortError::ReadDirectory`] if the root cannot be listed.
pub fn unique_extensions(root: &Path, recursive: bool) -> SortResult<Vec<String>> {
    let extensions: BTreeSet<String> = if recursive {
        WalkDir::new(root)
            .min_depth(1)
            .into_iter()
            .filter_map(Result::ok)
            .filter(|e| e.file_type().is_file())
            .map(|e| extension_category(e.path()))
            .collect()
    } else {
        top_level_files(root, &CompiledFilters::default(), &mut crate::events::NullSink)?
            .iter()
            .map(|entry| extension_category(entry.path()))
            .collect()
    };
    Ok(extensions.into_iter().collect())
}

fn top_level_files(
    root: &Path,
    filters: &CompiledFilters,
    events: &mut dyn EventSink,
) -> SortResult<Vec<FileEntry>> {
    let entries = fs::read_dir(root).map_err(|source| SortError::ReadDirectory {
        path: root.to_path_buf(),
        source,
    })?;

    let mut files = Vec::new();
    for entry in entries {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                events.emit(SortEvent::ScanFailed {
                    path: Some(root.to_path_buf()),
                    reason: e.to_string(),
                });
                continue;
            }
        };

        if let Ok(file_type) = entry.file_type()
            && file_type.is_file()
            && filters.should_include(Path::new(&entry.file_name()))
        {
            files.push(FileEntry::new(entry.path()));
        }
    }
    Ok(files)
}

fn classify(strategy: SortStrategy, entry: FileEntry, events: &mut dyn EventSink) -> CollectedFile {
    let Classification { key, category } = match strategy.classify(&entry) {
        Ok(classification) => classification,
        Err(e) => {
            events.emit(SortEvent::MetadataUnavailable {
                path: e.path.clone(),
                reason: e.source.to_string(),
            });
            e.fallback
        }
    };
    CollectedFile {
        entry,
        key,
        category,
    }
}
