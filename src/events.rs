//! Structured notifications emitted by the sorting engine.
//!
//! The engine never prints. Everything it has to say goes through an
//! [`EventSink`] as a [`SortEvent`]; how (or whether) an event is rendered is
//! up to the front end. Progress is reported separately through a
//! [`ProgressSink`].

use std::fmt;
use std::path::PathBuf;

/// Phase markers delimiting the sections of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Details,
    Actions,
    Confirmation,
    Working,
    Cleanup,
    /// The per-category listing, titled by the strategy.
    SortedFiles(&'static str),
    FinalSummary,
    End,
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Section::Details => f.write_str("DETAILS"),
            Section::Actions => f.write_str("ACTIONS"),
            Section::Confirmation => f.write_str("CONFIRMATION"),
            Section::Working => f.write_str("WORKING"),
            Section::Cleanup => f.write_str("CLEANUP"),
            Section::SortedFiles(title) => f.write_str(title),
            Section::FinalSummary => f.write_str("FINAL SUMMARY"),
            Section::End => f.write_str("END"),
        }
    }
}

/// The kind of transfer a run performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferMode {
    Move,
    Copy,
}

impl TransferMode {
    /// Imperative verb, as used in prompts.
    pub fn verb(&self) -> &'static str {
        match self {
            TransferMode::Move => "Move",
            TransferMode::Copy => "Copy",
        }
    }

    /// Past participle, as used in per-file reports.
    pub fn past(&self) -> &'static str {
        match self {
            TransferMode::Move => "Moved",
            TransferMode::Copy => "Copied",
        }
    }
}

/// Why a file was not transferred.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// The target exists and the overwrite was declined.
    Conflict,
    /// The target exists and a previous "skip all" answer applies.
    SkipAll,
    /// The per-file confirmation was declined.
    Declined,
    /// The category directory could not be created.
    DirectoryUnavailable,
}

/// Rendering priority of an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum EventLevel {
    /// Only emitted in verbose runs.
    Detail,
    Info,
    Section,
    Warning,
    Error,
}

/// A single notification from the engine.
#[derive(Debug, Clone, PartialEq)]
pub enum SortEvent {
    Section(Section),
    NoFiles,
    /// Preview header: what is about to happen where.
    Plan {
        directory: PathBuf,
        mode: TransferMode,
        dimension: &'static str,
    },
    /// First file of a category in the preview.
    PlannedCategory { directory: PathBuf, exists: bool },
    /// A file in the preview; `size` is set when sorting by size.
    PlannedFile { name: String, size: Option<u64> },
    Proceeding,
    Stopped,
    DirectoryCreated { path: PathBuf, dry_run: bool },
    DirectoryExists { path: PathBuf },
    DirectoryCreateFailed { path: PathBuf, reason: String },
    Transferred {
        name: String,
        category: String,
        mode: TransferMode,
        dry_run: bool,
    },
    Skipped { name: String, reason: SkipReason },
    /// A "skip all" answer was just given.
    SkippingAllConflicts,
    TransferFailed { path: PathBuf, reason: String },
    MetadataUnavailable { path: PathBuf, reason: String },
    /// A directory entry could not be read while collecting.
    ScanFailed { path: Option<PathBuf>, reason: String },
    Cancelled,
    EmptyDirFound { path: PathBuf },
    EmptyDirRemoved { path: PathBuf },
    EmptyDirRemoveFailed { path: PathBuf, reason: String },
    EmptyDirsKept,
    NoEmptyDirs,
    /// One category of the final listing, names already sorted.
    CategoryListing { category: String, files: Vec<String> },
    Summary {
        directory: PathBuf,
        total: usize,
        processed: usize,
        skipped: usize,
    },
}

impl SortEvent {
    pub fn level(&self) -> EventLevel {
        match self {
            SortEvent::Section(_) => EventLevel::Section,
            SortEvent::DirectoryCreated { dry_run: false, .. }
            | SortEvent::DirectoryExists { .. }
            | SortEvent::Transferred { dry_run: false, .. } => EventLevel::Detail,
            SortEvent::MetadataUnavailable { .. }
            | SortEvent::ScanFailed { .. }
            | SortEvent::EmptyDirRemoveFailed { .. }
            | SortEvent::Cancelled => EventLevel::Warning,
            SortEvent::DirectoryCreateFailed { .. } | SortEvent::TransferFailed { .. } => {
                EventLevel::Error
            }
            _ => EventLevel::Info,
        }
    }
}

/// Receives the engine's events.
pub trait EventSink {
    fn emit(&mut self, event: SortEvent);
}

impl<F> EventSink for F
where
    F: FnMut(SortEvent),
{
    fn emit(&mut self, event: SortEvent) {
        self(event)
    }
}

/// Discards every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl EventSink for NullSink {
    fn emit(&mut self, _event: SortEvent) {}
}

/// Keeps every event in memory, in emission order.
#[derive(Debug, Default, Clone)]
pub struct RecordingSink {
    pub events: Vec<SortEvent>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of recorded events matching `predicate`.
    pub fn count(&self, predicate: impl Fn(&SortEvent) -> bool) -> usize {
        self.events.iter().filter(|event| predicate(event)).count()
    }

    /// Returns true if a recorded event matches `predicate`.
    pub fn contains(&self, predicate: impl Fn(&SortEvent) -> bool) -> bool {
        self.events.iter().any(predicate)
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: SortEvent) {
        self.events.push(event);
    }
}

/// Receives the completion percentage (`0.0..=100.0`) after each file.
pub trait ProgressSink {
    fn progress(&mut self, percent: f64);
}

impl<F> ProgressSink for F
where
    F: FnMut(f64),
{
    fn progress(&mut self, percent: f64) {
        self(percent)
    }
}
