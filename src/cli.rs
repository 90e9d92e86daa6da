//! Command-line interface for fsort.
//!
//! This module handles:
//! - Argument parsing (`clap` derive)
//! - Merging command-line flags with the configuration file
//! - Wiring the terminal prompter, console output and progress bar into
//!   a [`Sorter`] run

use crate::collector::unique_extensions;
use crate::config::{RunConfig, SortConfig};
use crate::output::{ConsoleSink, OutputFormatter};
use crate::prompt::DialoguerPrompter;
use crate::sorter::{SortOutcome, SortResult, Sorter, validate_directory};
use crate::strategy::SortStrategy;
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;

/// Exit status of a run stopped at the confirmation prompt.
pub const EXIT_DECLINED: u8 = 2;

/// Sort the files of a directory into subdirectories by extension, size or date.
#[derive(Parser, Debug, Clone, Default)]
#[command(name = "fsort", version, about, long_about = None)]
pub struct CliArgs {
    /// Directory to sort
    pub directory: PathBuf,

    /// Classification strategy
    #[arg(short, long, value_enum)]
    pub strategy: Option<SortStrategy>,

    /// Copy files instead of moving them
    #[arg(short, long)]
    pub copy: bool,

    /// Show every file operation
    #[arg(short, long)]
    pub verbose: bool,

    /// Simulate only, change nothing on disk
    #[arg(short, long)]
    pub dry: bool,

    /// Never prompt: overwrite existing files and remove empty directories
    #[arg(short, long)]
    pub force: bool,

    /// Confirm every single transfer
    #[arg(short, long)]
    pub interactive: bool,

    /// Sort the whole subtree and remove directories left empty
    #[arg(short, long)]
    pub recursive: bool,

    /// List the unique extensions and exit
    #[arg(short, long)]
    pub unique: bool,

    /// Print the final report as JSON on stdout
    #[arg(long)]
    pub json: bool,

    /// Show a progress bar while transferring
    #[arg(long)]
    pub progress: bool,

    /// Configuration file (defaults to ./.fsortrc.toml, then ~/.config/fsort/config.toml)
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

impl CliArgs {
    /// Builds the run configuration. A flag that is set wins over the
    /// configuration file's defaults.
    pub fn run_config(&self, file: SortConfig) -> RunConfig {
        let defaults = file.defaults;
        RunConfig {
            copy: self.copy || defaults.copy,
            verbose: self.verbose || defaults.verbose,
            dry: self.dry,
            force: self.force,
            interactive: self.interactive,
            recursive: self.recursive || defaults.recursive,
            strategy: self.strategy.or(defaults.strategy).unwrap_or_default(),
            filters: file.filters,
        }
    }

    fn shows_progress(&self, config: &RunConfig) -> bool {
        (config.force || self.progress) && !config.verbose && !config.interactive
    }
}

/// Runs the CLI application with already parsed arguments.
///
/// # Errors
///
/// Returns any fatal [`crate::sorter::SortError`]: invalid directory,
/// conflicting modes, or a broken configuration file.
///
/// # Examples
///
/// ```no_run
/// use fsort::cli::{CliArgs, run_cli};
/// use std::path::PathBuf;
///
/// let args = CliArgs {
///     directory: PathBuf::from("/path/to/downloads"),
///     dry: true,
///     ..CliArgs::default()
/// };
/// match run_cli(&args) {
///     Ok(code) => println!("Finished: {:?}", code),
///     Err(e) => eprintln!("Error: {}", e),
/// }
/// ```
pub fn run_cli(args: &CliArgs) -> SortResult<ExitCode> {
    let file_config = SortConfig::load(args.config.as_deref())?;
    let config = args.run_config(file_config);

    if args.unique {
        return list_unique_extensions(args, config.recursive);
    }

    let mut prompter = DialoguerPrompter::new();
    let mut console = if args.json {
        ConsoleSink::stderr_only()
    } else {
        ConsoleSink::new()
    };

    let bar = args
        .shows_progress(&config)
        .then(OutputFormatter::create_progress_bar);
    if let Some(bar) = &bar {
        console = console.with_progress_bar(bar.clone());
    }
    let mut progress = |percent: f64| {
        if let Some(bar) = &bar {
            bar.set_position(percent.round() as u64);
        }
    };

    let sorter = Sorter::new(&args.directory, config, &mut prompter, &mut console)?;
    let outcome = sorter.with_progress(&mut progress).run()?;

    match outcome {
        SortOutcome::Declined => Ok(ExitCode::from(EXIT_DECLINED)),
        SortOutcome::Completed(report) | SortOutcome::NoFiles(report) => {
            if args.json {
                match serde_json::to_string_pretty(&report) {
                    Ok(json) => println!("{}", json),
                    Err(e) => {
                        let message = format!("Failed to serialize report: {}", e);
                        eprintln!("{}", OutputFormatter::error(&message));
                        return Ok(ExitCode::FAILURE);
                    }
                }
            }
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn list_unique_extensions(args: &CliArgs, recursive: bool) -> SortResult<ExitCode> {
    let root = validate_directory(&args.directory)?;
    let extensions = unique_extensions(&root, recursive)?;

    if args.json {
        let json = serde_json::to_string_pretty(&extensions).unwrap_or_else(|_| "[]".to_string());
        println!("{}", json);
        return Ok(ExitCode::SUCCESS);
    }

    let header = format!("Unique extensions: {}", extensions.len());
    println!("{}", OutputFormatter::header(&header));
    for (i, extension) in extensions.iter().enumerate() {
        println!("{}) {}", i + 1, extension);
    }
    println!("{}", OutputFormatter::header("END"));
    Ok(ExitCode::SUCCESS)
}
