//! Output formatting and styling module.
//!
//! Provides a centralized interface for all CLI output, including colored output,
//! progress tracking, and the rendering of engine events. This module abstracts
//! away output details, making it easy to change formatting globally.

use crate::events::{EventLevel, EventSink, Section, SkipReason, SortEvent, TransferMode};
use crate::report::human_readable_size;
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};

/// Manages all CLI output with consistent styling and formatting.
///
/// This struct provides methods for:
/// - Success messages (green with ✓)
/// - Error messages (red with ✗)
/// - Warning messages (yellow with ⚠)
/// - Info messages (cyan)
/// - Plain, unstyled messages
/// - Section headers and progress bars
pub struct OutputFormatter;

impl OutputFormatter {
    /// Formats a success message in green with a checkmark.
    pub fn success(message: &str) -> String {
        format!("{} {}", "✓".green(), message)
    }

    /// Formats an error message in red with an X mark.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use fsort::output::OutputFormatter;
    /// eprintln!("{}", OutputFormatter::error("Failed to sort directory"));
    /// ```
    pub fn error(message: &str) -> String {
        format!("{} {}", "✗".red(), message.red())
    }

    /// Formats a warning message in yellow with a warning symbol.
    pub fn warning(message: &str) -> String {
        format!("{} {}", "⚠".yellow(), message.yellow())
    }

    /// Formats an info message in cyan.
    pub fn info(message: &str) -> String {
        message.cyan().to_string()
    }

    /// Formats a regular message without styling.
    pub fn plain(message: &str) -> String {
        message.to_string()
    }

    /// Formats a section header, e.g. `=== WORKING ===`.
    pub fn header(header: &str) -> String {
        format!("=== {} ===", header).cyan().bold().to_string()
    }

    /// Formats a dry-run notice message.
    pub fn dry_run_notice(message: &str) -> String {
        format!("[DRY RUN] {}", message).yellow().to_string()
    }

    /// Creates a progress bar counting up to 100 percent.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use fsort::output::OutputFormatter;
    /// let pb = OutputFormatter::create_progress_bar();
    /// pb.set_position(50);
    /// pb.finish_and_clear();
    /// ```
    pub fn create_progress_bar() -> ProgressBar {
        let pb = ProgressBar::new(100);
        let style = ProgressStyle::default_bar()
            .template("{spinner:.cyan} [{bar:40.cyan/blue}] {pos:>3}% {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▓░");
        pb.set_style(style);
        pb
    }

    /// Renders an engine event as one or more display lines.
    pub fn render(event: &SortEvent) -> String {
        match event {
            SortEvent::Section(section) => Self::header(&section.to_string()),
            SortEvent::NoFiles => Self::info("No files to sort."),
            SortEvent::Plan {
                directory,
                mode,
                dimension,
            } => {
                let action = match mode {
                    TransferMode::Move => "Moving",
                    TransferMode::Copy => "Copying",
                };
                format!(
                    "➡ Directory: [{}]\n➡ Action: {}\n➡ Sorted by: {}",
                    directory.display(),
                    action,
                    dimension
                )
            }
            SortEvent::PlannedCategory { directory, exists } => {
                let marker = if *exists { " (exists)" } else { "" };
                Self::info(&format!("[{}]{}", directory.display(), marker))
            }
            SortEvent::PlannedFile { name, size } => match size {
                Some(bytes) => format!("   ➡ {} ({})", name, human_readable_size(*bytes)),
                None => format!("   ➡ {}", name),
            },
            SortEvent::Proceeding => format!("Status: {}", "Proceed".green()),
            SortEvent::Stopped => format!("Status: {}", "Stopped".red()),
            SortEvent::DirectoryCreated { path, dry_run } => {
                let message = format!("Created: {}", path.display());
                if *dry_run {
                    Self::dry_run_notice(&message)
                } else {
                    Self::success(&message)
                }
            }
            SortEvent::DirectoryExists { path } => {
                format!("Skipping [{}], folder already exists", path.display())
            }
            SortEvent::DirectoryCreateFailed { path, reason } => {
                Self::error(&format!("Failed to create {}: {}", path.display(), reason))
            }
            SortEvent::Transferred {
                name,
                category,
                mode,
                dry_run,
            } => {
                let message = format!("{} [{}] → [{}/]", mode.past(), name, category);
                if *dry_run {
                    Self::dry_run_notice(&message)
                } else {
                    Self::success(&message)
                }
            }
            SortEvent::Skipped { name, reason } => {
                let why = match reason {
                    SkipReason::Conflict | SkipReason::SkipAll => "target exists",
                    SkipReason::Declined => "declined",
                    SkipReason::DirectoryUnavailable => "category directory unavailable",
                };
                format!("Skipped: {} ({})", name, why)
            }
            SortEvent::SkippingAllConflicts => Self::plain("Skipping all files with conflicts"),
            SortEvent::TransferFailed { path, reason } => {
                Self::error(&format!("Failed to process {}: {}", path.display(), reason))
            }
            SortEvent::MetadataUnavailable { path, reason } => {
                Self::warning(&format!("Cannot read metadata of {}: {}", path.display(), reason))
            }
            SortEvent::ScanFailed { path, reason } => match path {
                Some(path) => Self::warning(&format!("Skipping {}: {}", path.display(), reason)),
                None => Self::warning(&format!("Skipping unreadable entry: {}", reason)),
            },
            SortEvent::Cancelled => Self::warning("Cancelled, remaining files left in place"),
            SortEvent::EmptyDirFound { path } => {
                format!("Found empty dir: [{}]", path.display())
            }
            SortEvent::EmptyDirRemoved { path } => {
                Self::success(&format!("Removed: [{}]", path.display()))
            }
            SortEvent::EmptyDirRemoveFailed { path, reason } => {
                Self::warning(&format!("Could not remove {}: {}", path.display(), reason))
            }
            SortEvent::EmptyDirsKept => Self::plain("Did not remove empty directories"),
            SortEvent::NoEmptyDirs => Self::plain("No empty dirs found"),
            SortEvent::CategoryListing { category, files } => {
                let mut lines = vec![format!("{}/", category).bold().to_string()];
                lines.extend(files.iter().map(|name| format!("  {}", name)));
                lines.join("\n")
            }
            SortEvent::Summary {
                directory,
                total,
                processed,
                skipped,
            } => format!(
                "Sorted: {}\nTotal files found:     {}\nFiles moved/copied:    {}\nFiles skipped:         {}",
                directory.display(),
                total,
                processed.to_string().green(),
                skipped
            ),
        }
    }
}

/// Renders engine events on the terminal.
///
/// Errors go to stderr. Everything else goes to stdout, or to stderr when
/// stdout is reserved for machine-readable output. Lines are printed
/// above the progress bar when one is attached.
#[derive(Default)]
pub struct ConsoleSink {
    progress: Option<ProgressBar>,
    stderr_only: bool,
}

impl ConsoleSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// A sink that leaves stdout untouched.
    pub fn stderr_only() -> Self {
        Self {
            progress: None,
            stderr_only: true,
        }
    }

    pub fn with_progress_bar(mut self, bar: ProgressBar) -> Self {
        self.progress = Some(bar);
        self
    }

    fn print(&self, line: &str, is_error: bool) {
        let write = || {
            if is_error || self.stderr_only {
                eprintln!("{}", line);
            } else {
                println!("{}", line);
            }
        };
        match &self.progress {
            Some(bar) => bar.suspend(write),
            None => write(),
        }
    }
}

impl EventSink for ConsoleSink {
    fn emit(&mut self, event: SortEvent) {
        if matches!(event, SortEvent::Section(Section::FinalSummary))
            && let Some(bar) = self.progress.take()
        {
            bar.finish_and_clear();
        }
        let line = OutputFormatter::render(&event);
        self.print(&line, event.level() == EventLevel::Error);
    }
}
