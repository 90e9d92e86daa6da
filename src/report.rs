//! Final summary of a sorting run.

use crate::events::{EventSink, Section, SortEvent};
use crate::strategy::SortStrategy;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Counters and per-category listing of one finished run.
///
/// Serializes to the JSON printed by `fsort --json`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SortReport {
    pub directory: PathBuf,
    pub strategy: SortStrategy,
    pub dry_run: bool,
    /// Files considered.
    pub total: usize,
    /// Files transferred (or that would be, in a dry run).
    pub processed: usize,
    pub skipped: usize,
    /// Category name to transferred file names, names sorted
    /// case-insensitively. Empty in dry runs.
    pub categories: BTreeMap<String, Vec<String>>,
    pub removed_dirs: Vec<PathBuf>,
    /// The run was stopped before every file was considered.
    pub cancelled: bool,
}

impl SortReport {
    /// A report for a run that found nothing to sort.
    pub fn empty(directory: PathBuf, strategy: SortStrategy, dry_run: bool) -> Self {
        Self {
            directory,
            strategy,
            dry_run,
            total: 0,
            processed: 0,
            skipped: 0,
            categories: BTreeMap::new(),
            removed_dirs: Vec::new(),
            cancelled: false,
        }
    }

    /// Sorts every category's file names case-insensitively.
    pub(crate) fn normalize(&mut self) {
        for files in self.categories.values_mut() {
            files.sort_by(|a, b| a.to_lowercase().cmp(&b.to_lowercase()).then_with(|| a.cmp(b)));
        }
    }

    /// Whether the per-category listing is part of the summary.
    pub fn shows_listing(&self) -> bool {
        self.processed > 0 && !self.dry_run
    }

    /// Emits the listing (when shown) and the closing summary.
    pub fn emit(&self, events: &mut dyn EventSink) {
        if self.shows_listing() {
            events.emit(SortEvent::Section(Section::SortedFiles(
                self.strategy.summary_title(),
            )));
            for (category, files) in &self.categories {
                events.emit(SortEvent::CategoryListing {
                    category: category.clone(),
                    files: files.clone(),
                });
            }
        }

        events.emit(SortEvent::Section(Section::FinalSummary));
        events.emit(SortEvent::Summary {
            directory: self.directory.clone(),
            total: self.total,
            processed: self.processed,
            skipped: self.skipped,
        });
        events.emit(SortEvent::Section(Section::End));
    }
}

/// Formats a byte count with a binary unit and one decimal, e.g. `1.5 KB`.
pub fn human_readable_size(bytes: u64) -> String {
    const UNITS: [&str; 6] = ["B", "KB", "MB", "GB", "TB", "PB"];

    let mut size = bytes as f64;
    for unit in &UNITS[..UNITS.len() - 1] {
        if size < 1024.0 {
            return format!("{size:.1} {unit}");
        }
        size /= 1024.0;
    }
    format!("{size:.1} PB")
}
