//! fsort - sort the files of a directory into category subdirectories
//!
//! This library classifies files by extension, size bucket, or modification
//! or creation date, then moves or copies them into one subdirectory per
//! category. It supports dry runs, interactive and forced modes, recursive
//! sorting with a cleanup pass for directories left empty, and file
//! filtering rules loaded from TOML configuration files.
//!
//! The engine ([`Sorter`]) never prints or reads the terminal itself: it
//! asks questions through a [`Prompter`] and reports through an
//! [`EventSink`], so the same run can be driven by the CLI, a test, or a
//! graphical shell.

pub mod cleanup;
pub mod cli;
pub mod collector;
pub mod config;
pub mod conflict;
pub mod events;
pub mod output;
pub mod prompt;
pub mod report;
pub mod sorter;
pub mod strategy;

pub use config::{CompiledFilters, ConfigError, FilterRules, RunConfig, SortConfig};
pub use events::{EventSink, NullSink, ProgressSink, RecordingSink, SortEvent};
pub use prompt::{DialoguerPrompter, OverwriteAnswer, Prompter, ScriptedPrompter};
pub use report::SortReport;
pub use sorter::{SortError, SortOutcome, SortResult, Sorter};
pub use strategy::SortStrategy;

pub use cli::{CliArgs, run_cli};
