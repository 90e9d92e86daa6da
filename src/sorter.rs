//! The sorting engine: moves or copies files into category directories.
//!
//! A run goes through a fixed sequence of phases:
//!
//! 1. collect the eligible files ([`crate::collector`])
//! 2. preview what will happen
//! 3. ask for confirmation (unless forced)
//! 4. create the category directories
//! 5. transfer every file, resolving collisions as they come
//! 6. remove directories left empty (recursive runs only)
//! 7. report
//!
//! Per-file and per-directory failures are reported through the event sink
//! and counted as skipped; only setup problems end a run with an error.

use crate::cleanup::{find_empty_dirs, remove_dirs};
use crate::collector::{CollectedFile, collect_files};
use crate::config::{CompiledFilters, ConfigError, RunConfig};
use crate::conflict::{ConflictResolver, Resolution};
use crate::events::{EventLevel, EventSink, ProgressSink, Section, SkipReason, SortEvent, TransferMode};
use crate::prompt::Prompter;
use crate::report::SortReport;
use crate::strategy::SortStrategy;
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::fs::{self, FileTimes};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Errors that end a run before any file is touched.
#[derive(Debug, thiserror::Error)]
pub enum SortError {
    /// The root path does not exist or is not a directory.
    #[error("{} is not a valid directory", path.display())]
    InvalidDirectory {
        path: PathBuf,
        #[source]
        source: Option<io::Error>,
    },
    /// Force and interactive modes were both requested.
    #[error("Force and interactive are not compatible with each other")]
    ConflictingModes,
    /// The root directory could not be listed.
    #[error("Failed to read directory {}: {source}", path.display())]
    ReadDirectory {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    /// The filter configuration is invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Result type for sorting operations.
pub type SortResult<T> = Result<T, SortError>;

/// How a run ended.
#[derive(Debug, Clone, PartialEq)]
pub enum SortOutcome {
    /// Every phase ran; the report holds the counters.
    Completed(SortReport),
    /// Nothing was eligible, so nothing was asked or created.
    NoFiles(SortReport),
    /// The user declined the confirmation; the filesystem is untouched.
    Declined,
}

impl SortOutcome {
    pub fn report(&self) -> Option<&SortReport> {
        match self {
            SortOutcome::Completed(report) | SortOutcome::NoFiles(report) => Some(report),
            SortOutcome::Declined => None,
        }
    }
}

/// Mutable state of one run, owned by the engine and dropped with it.
#[derive(Debug, Default)]
pub struct RunState {
    pub total: usize,
    pub processed: usize,
    pub skipped: usize,
    /// Category to names of the files actually transferred.
    pub categories: BTreeMap<String, Vec<String>>,
    /// Holds the sticky overwrite-all / skip-all decisions.
    pub resolver: ConflictResolver,
}

impl RunState {
    fn record(&mut self, category: &str, name: String) {
        self.processed += 1;
        self.categories
            .entry(category.to_string())
            .or_default()
            .push(name);
    }
}

/// Sorts one directory according to a [`RunConfig`].
///
/// # Examples
///
/// ```no_run
/// use fsort::config::RunConfig;
/// use fsort::events::NullSink;
/// use fsort::prompt::ScriptedPrompter;
/// use fsort::sorter::Sorter;
///
/// let config = RunConfig { force: true, ..RunConfig::default() };
/// let mut prompter = ScriptedPrompter::default();
/// let mut events = NullSink;
/// let outcome = Sorter::new("/path/to/downloads", config, &mut prompter, &mut events)
///     .and_then(|sorter| sorter.run());
/// match outcome {
///     Ok(outcome) => println!("{:?}", outcome.report().map(|r| r.processed)),
///     Err(e) => eprintln!("Sorting failed: {}", e),
/// }
/// ```
pub struct Sorter<'a> {
    root: PathBuf,
    config: RunConfig,
    filters: CompiledFilters,
    prompter: &'a mut dyn Prompter,
    events: &'a mut dyn EventSink,
    progress: Option<&'a mut dyn ProgressSink>,
    cancel: Option<Arc<AtomicBool>>,
}

impl<'a> Sorter<'a> {
    /// Validates the configuration and the root directory.
    ///
    /// # Errors
    ///
    /// * [`SortError::ConflictingModes`] if `force` and `interactive` are both set
    /// * [`SortError::InvalidDirectory`] if `root` is missing or not a directory
    /// * [`SortError::Config`] if a filter pattern does not compile
    pub fn new(
        root: impl AsRef<Path>,
        config: RunConfig,
        prompter: &'a mut dyn Prompter,
        events: &'a mut dyn EventSink,
    ) -> SortResult<Self> {
        if config.has_conflicting_modes() {
            return Err(SortError::ConflictingModes);
        }
        let root = validate_directory(root.as_ref())?;
        let filters = config.filters.compile()?;

        Ok(Self {
            root,
            config,
            filters,
            prompter,
            events,
            progress: None,
            cancel: None,
        })
    }

    /// Reports the completion percentage after every file.
    pub fn with_progress(mut self, progress: &'a mut dyn ProgressSink) -> Self {
        self.progress = Some(progress);
        self
    }

    /// Stops the run between two files once `flag` is set. Files already
    /// transferred stay where they are.
    pub fn with_cancel_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = Some(flag);
        self
    }

    /// The canonical root directory being sorted.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Runs every phase and consumes the sorter.
    ///
    /// # Errors
    ///
    /// Returns [`SortError::ReadDirectory`] if the root cannot be listed.
    /// Nothing after collection fails the run.
    pub fn run(mut self) -> SortResult<SortOutcome> {
        let strategy = self.config.strategy;
        let files = collect_files(
            &self.root,
            strategy,
            self.config.recursive,
            &self.filters,
            &mut *self.events,
        )?;

        if files.is_empty() {
            self.emit(SortEvent::NoFiles);
            return Ok(SortOutcome::NoFiles(SortReport::empty(
                self.root.clone(),
                strategy,
                self.config.dry,
            )));
        }

        self.preview(&files);

        if !self.config.force {
            self.emit(SortEvent::Section(Section::Confirmation));
            if !self.prompter.confirm("Proceed with sorting?") {
                self.emit(SortEvent::Stopped);
                self.emit(SortEvent::Section(Section::End));
                return Ok(SortOutcome::Declined);
            }
            self.emit(SortEvent::Proceeding);
        }
        self.emit(SortEvent::Section(Section::Working));

        let unavailable = self.create_category_dirs(&files);

        let mut state = RunState::default();
        let mut cancelled = false;
        for (index, file) in files.iter().enumerate() {
            if self.is_cancelled() {
                self.emit(SortEvent::Cancelled);
                cancelled = true;
                break;
            }
            state.total += 1;
            self.process_file(file, &unavailable, &mut state);

            if let Some(progress) = self.progress.as_mut() {
                progress.progress((index + 1) as f64 / files.len() as f64 * 100.0);
            }
        }

        let removed_dirs = if self.config.recursive && !cancelled {
            self.cleanup_empty_dirs()
        } else {
            Vec::new()
        };

        let mut report = SortReport {
            directory: self.root.clone(),
            strategy,
            dry_run: self.config.dry,
            total: state.total,
            processed: state.processed,
            skipped: state.skipped,
            categories: state.categories,
            removed_dirs,
            cancelled,
        };
        report.normalize();
        report.emit(&mut *self.events);

        Ok(SortOutcome::Completed(report))
    }

    fn emit(&mut self, event: SortEvent) {
        if event.level() == EventLevel::Detail && !self.config.verbose {
            return;
        }
        self.events.emit(event);
    }

    fn mode(&self) -> TransferMode {
        if self.config.copy {
            TransferMode::Copy
        } else {
            TransferMode::Move
        }
    }

    fn is_cancelled(&self) -> bool {
        self.cancel
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::Relaxed))
    }

    fn preview(&mut self, files: &[CollectedFile]) {
        self.emit(SortEvent::Section(Section::Details));
        self.emit(SortEvent::Plan {
            directory: self.root.clone(),
            mode: self.mode(),
            dimension: self.config.strategy.category_name(),
        });
        self.emit(SortEvent::Section(Section::Actions));

        let mut seen = HashSet::new();
        for file in files {
            if seen.insert(file.category.as_str()) {
                let directory = self.root.join(&file.category);
                let exists = directory.is_dir();
                self.emit(SortEvent::PlannedCategory { directory, exists });
            }
            let size = match self.config.strategy {
                SortStrategy::Size => file.entry.metadata().ok().map(|m| m.len()),
                _ => None,
            };
            self.emit(SortEvent::PlannedFile {
                name: file.entry.file_name(),
                size,
            });
        }
    }

    /// Creates the directory of every category present in `files`. Returns
    /// the categories whose directory could not be created.
    fn create_category_dirs(&mut self, files: &[CollectedFile]) -> HashSet<String> {
        let categories: BTreeSet<&str> = files.iter().map(|f| f.category.as_str()).collect();
        let mut unavailable = HashSet::new();

        for category in categories {
            let path = self.root.join(category);
            if path.is_dir() {
                self.emit(SortEvent::DirectoryExists { path });
            } else if self.config.dry {
                self.emit(SortEvent::DirectoryCreated {
                    path,
                    dry_run: true,
                });
            } else {
                match fs::create_dir_all(&path) {
                    Ok(()) => self.emit(SortEvent::DirectoryCreated {
                        path,
                        dry_run: false,
                    }),
                    Err(e) => {
                        self.emit(SortEvent::DirectoryCreateFailed {
                            path,
                            reason: e.to_string(),
                        });
                        unavailable.insert(category.to_string());
                    }
                }
            }
        }
        unavailable
    }

    fn process_file(
        &mut self,
        file: &CollectedFile,
        unavailable: &HashSet<String>,
        state: &mut RunState,
    ) {
        let name = file.entry.file_name();
        if unavailable.contains(&file.category) {
            self.skip(state, name, SkipReason::DirectoryUnavailable);
            return;
        }

        let target_dir = self.root.join(&file.category);
        let target = target_dir.join(file.entry.path().file_name().unwrap_or_default());

        if target.symlink_metadata().is_ok() {
            match state
                .resolver
                .resolve(&target, self.config.force, &mut *self.prompter)
            {
                Resolution::Overwrite => {}
                Resolution::Skip => {
                    let reason = if state.resolver.skip_all() {
                        SkipReason::SkipAll
                    } else {
                        SkipReason::Conflict
                    };
                    self.skip(state, name, reason);
                    return;
                }
                Resolution::SkipAll => {
                    self.emit(SortEvent::SkippingAllConflicts);
                    self.skip(state, name, SkipReason::SkipAll);
                    return;
                }
            }
        }

        let mode = self.mode();
        if self.config.interactive {
            let question = format!("{} {} to {}?", mode.verb(), name, target_dir.display());
            if !self.prompter.confirm(&question) {
                self.skip(state, name, SkipReason::Declined);
                return;
            }
        }

        if self.config.dry {
            state.processed += 1;
            self.emit(SortEvent::Transferred {
                name,
                category: file.category.clone(),
                mode,
                dry_run: true,
            });
            return;
        }

        match transfer_file(file.entry.path(), &target, mode) {
            Ok(()) => {
                state.record(&file.category, name.clone());
                self.emit(SortEvent::Transferred {
                    name,
                    category: file.category.clone(),
                    mode,
                    dry_run: false,
                });
            }
            Err(e) => {
                state.skipped += 1;
                self.emit(SortEvent::TransferFailed {
                    path: file.entry.path().to_path_buf(),
                    reason: e.to_string(),
                });
            }
        }
    }

    fn skip(&mut self, state: &mut RunState, name: String, reason: SkipReason) {
        state.skipped += 1;
        self.emit(SortEvent::Skipped { name, reason });
    }

    /// Lists the empty directories and, once confirmed (or forced), removes
    /// them all together. Dry runs never remove anything.
    fn cleanup_empty_dirs(&mut self) -> Vec<PathBuf> {
        self.emit(SortEvent::Section(Section::Cleanup));

        let candidates = find_empty_dirs(&self.root, &mut *self.events);
        if candidates.is_empty() {
            self.emit(SortEvent::NoEmptyDirs);
            return Vec::new();
        }
        for path in &candidates {
            self.emit(SortEvent::EmptyDirFound { path: path.clone() });
        }

        if !self.config.force && !self.prompter.confirm("Remove empty directories?") {
            self.emit(SortEvent::EmptyDirsKept);
            return Vec::new();
        }
        if self.config.dry {
            return Vec::new();
        }
        remove_dirs(&candidates, &mut *self.events)
    }
}

/// Resolves `path` to a canonical directory path.
///
/// # Errors
///
/// Returns [`SortError::InvalidDirectory`] if it is missing or not a directory.
pub fn validate_directory(path: &Path) -> SortResult<PathBuf> {
    let canonical = fs::canonicalize(path).map_err(|e| SortError::InvalidDirectory {
        path: path.to_path_buf(),
        source: Some(e),
    })?;
    if !canonical.is_dir() {
        return Err(SortError::InvalidDirectory {
            path: canonical,
            source: None,
        });
    }
    Ok(canonical)
}

/// Moves or copies `source` to `target`, replacing an existing target.
///
/// Copies keep the source's modification and access times. A move across
/// filesystems falls back to copy-then-delete.
pub fn transfer_file(source: &Path, target: &Path, mode: TransferMode) -> io::Result<()> {
    match mode {
        TransferMode::Copy => copy_preserving_times(source, target),
        TransferMode::Move => match fs::rename(source, target) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::CrossesDevices => {
                copy_preserving_times(source, target)?;
                fs::remove_file(source)
            }
            Err(e) => Err(e),
        },
    }
}

fn copy_preserving_times(source: &Path, target: &Path) -> io::Result<()> {
    let metadata = fs::metadata(source)?;
    fs::copy(source, target)?;

    let mut times = FileTimes::new().set_modified(metadata.modified()?);
    if let Ok(accessed) = metadata.accessed() {
        times = times.set_accessed(accessed);
    }
    // The copy inherits the source's permissions, so the target may be
    // read-only; setting times only needs ownership.
    fs::File::open(target)?.set_times(times)
}
