/// Integration tests for fsort
///
/// These tests simulate real-world usage scenarios, testing the complete
/// end-to-end behavior of a sorting run through the library API.
///
/// Test categories:
/// 1. Basic sorting workflows
/// 2. Size and date strategies
/// 3. Dry-run mode verification
/// 4. Conflicts and confirmations
/// 5. Recursive sorting and cleanup
/// 6. Configuration and filtering
/// 7. Edge cases and error scenarios
use fsort::config::{RunConfig, SortConfig};
use fsort::events::{RecordingSink, SkipReason, SortEvent};
use fsort::prompt::{OverwriteAnswer, ScriptedPrompter};
use fsort::report::SortReport;
use fsort::sorter::{SortError, SortOutcome, Sorter};
use fsort::strategy::SortStrategy;
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;
use tempfile::TempDir;

// ============================================================================
// Test Utilities
// ============================================================================

/// A test fixture that sets up a temporary directory with configurable
/// file structure for testing.
struct TestFixture {
    temp_dir: TempDir,
}

impl TestFixture {
    /// Create a new test fixture with a temporary directory.
    fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        TestFixture { temp_dir }
    }

    /// Get the path to the test directory.
    fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Create a file with content, creating parent directories as needed.
    fn create_file(&self, rel_path: &str, content: &[u8]) {
        let file_path = self.path().join(rel_path);
        if let Some(parent) = file_path.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent directory");
        }
        let mut file = File::create(&file_path).expect("Failed to create file");
        file.write_all(content)
            .expect("Failed to write file content");
    }

    /// Create a file with specific content (string version).
    fn create_text_file(&self, rel_path: &str, content: &str) {
        self.create_file(rel_path, content.as_bytes());
    }

    /// Create a subdirectory (and its parents) in the test directory.
    fn create_subdir(&self, rel_path: &str) {
        fs::create_dir_all(self.path().join(rel_path)).expect("Failed to create subdirectory");
    }

    /// Assert that a directory exists.
    fn assert_dir_exists(&self, rel_path: &str) {
        let path = self.path().join(rel_path);
        assert!(
            path.exists() && path.is_dir(),
            "Directory should exist: {}",
            path.display()
        );
    }

    /// Assert that a file exists at the given relative path.
    fn assert_file_exists(&self, rel_path: &str) {
        let path = self.path().join(rel_path);
        assert!(
            path.exists() && path.is_file(),
            "File should exist: {}",
            path.display()
        );
    }

    /// Assert that nothing exists at the given relative path.
    fn assert_not_exists(&self, rel_path: &str) {
        let path = self.path().join(rel_path);
        assert!(!path.exists(), "Path should not exist: {}", path.display());
    }

    /// Read a file's content as a string.
    fn read(&self, rel_path: &str) -> String {
        fs::read_to_string(self.path().join(rel_path)).expect("Failed to read file")
    }

    /// Count regular files in the test directory (non-recursive).
    fn count_files(&self) -> usize {
        self.count_entries(|metadata| metadata.is_file())
    }

    /// Count directories in the test directory (non-recursive).
    fn count_dirs(&self) -> usize {
        self.count_entries(|metadata| metadata.is_dir())
    }

    fn count_entries(&self, predicate: impl Fn(&fs::Metadata) -> bool) -> usize {
        fs::read_dir(self.path())
            .expect("Failed to read directory")
            .filter_map(|entry| entry.ok()?.metadata().ok())
            .filter(|metadata| predicate(metadata))
            .count()
    }

    /// Run a sort over the fixture and return the outcome with every event.
    fn run(&self, config: RunConfig, prompter: &mut ScriptedPrompter) -> (SortOutcome, RecordingSink) {
        let mut events = RecordingSink::new();
        let outcome = Sorter::new(self.path(), config, prompter, &mut events)
            .and_then(|sorter| sorter.run())
            .expect("Sorting should succeed");
        (outcome, events)
    }

    /// Run a forced sort (no prompts) and return its report.
    fn run_forced(&self, config: RunConfig) -> SortReport {
        let mut prompter = ScriptedPrompter::default();
        let (outcome, _) = self.run(RunConfig { force: true, ..config }, &mut prompter);
        assert_eq!(prompter.prompts_asked(), 0, "Forced runs never prompt");
        completed(outcome)
    }
}

fn completed(outcome: SortOutcome) -> SortReport {
    match outcome {
        SortOutcome::Completed(report) => report,
        other => panic!("Expected a completed run, got {:?}", other),
    }
}

fn strategy(strategy: SortStrategy) -> RunConfig {
    RunConfig {
        strategy,
        ..RunConfig::default()
    }
}

// ============================================================================
// 1. Basic Sorting Workflows
// ============================================================================

#[test]
fn test_sort_empty_directory() {
    let fixture = TestFixture::new();
    let mut prompter = ScriptedPrompter::default();

    let (outcome, events) = fixture.run(RunConfig::default(), &mut prompter);

    match outcome {
        SortOutcome::NoFiles(report) => {
            assert_eq!(report.total, 0);
            assert_eq!(report.processed, 0);
        }
        other => panic!("Expected NoFiles, got {:?}", other),
    }
    assert_eq!(prompter.prompts_asked(), 0, "Nothing to sort means nothing to ask");
    assert!(events.contains(|e| *e == SortEvent::NoFiles));
    assert_eq!(fixture.count_dirs(), 0);
}

#[test]
fn test_sort_by_extension_case_insensitive() {
    let fixture = TestFixture::new();
    fixture.create_text_file("a.txt", "a");
    fixture.create_text_file("b.TXT", "b");
    fixture.create_text_file("c", "c");

    let report = fixture.run_forced(RunConfig::default());

    assert_eq!((report.total, report.processed, report.skipped), (3, 3, 0));
    fixture.assert_file_exists("txt/a.txt");
    fixture.assert_file_exists("txt/b.TXT");
    fixture.assert_file_exists("no_ext/c");
    assert_eq!(fixture.count_files(), 0);
    assert_eq!(report.categories["txt"], vec!["a.txt", "b.TXT"]);
    assert_eq!(report.categories["no_ext"], vec!["c"]);
}

#[test]
fn test_uppercase_extension_goes_to_lowercase_directory() {
    let fixture = TestFixture::new();
    fixture.create_text_file("REPORT.PDF", "%PDF");

    fixture.run_forced(RunConfig::default());

    fixture.assert_file_exists("pdf/REPORT.PDF");
    fixture.assert_not_exists("PDF");
}

#[test]
fn test_sort_many_files() {
    let fixture = TestFixture::new();
    for i in 0..25 {
        fixture.create_text_file(&format!("note_{:02}.md", i), "# note");
        fixture.create_text_file(&format!("data_{:02}.csv", i), "a,b");
    }

    let report = fixture.run_forced(RunConfig::default());

    assert_eq!(report.total, 50);
    assert_eq!(report.processed, 50);
    assert_eq!(report.categories["md"].len(), 25);
    assert_eq!(report.categories["csv"].len(), 25);
    assert_eq!(fixture.count_files(), 0);
    assert_eq!(fixture.count_dirs(), 2);
}

#[test]
fn test_copy_mode_keeps_sources() {
    let fixture = TestFixture::new();
    fixture.create_text_file("a.txt", "hello");

    let report = fixture.run_forced(RunConfig {
        copy: true,
        ..RunConfig::default()
    });

    assert_eq!(report.processed, 1);
    fixture.assert_file_exists("a.txt");
    assert_eq!(fixture.read("txt/a.txt"), "hello");
}

#[test]
fn test_second_run_finds_nothing() {
    let fixture = TestFixture::new();
    fixture.create_text_file("a.txt", "a");
    fixture.create_text_file("b.pdf", "b");
    fixture.run_forced(RunConfig::default());

    let mut prompter = ScriptedPrompter::default();
    let (outcome, _) = fixture.run(RunConfig { force: true, ..RunConfig::default() }, &mut prompter);

    assert!(matches!(outcome, SortOutcome::NoFiles(_)));
    fixture.assert_file_exists("txt/a.txt");
    fixture.assert_file_exists("pdf/b.pdf");
}

// ============================================================================
// 2. Size and Date Strategies
// ============================================================================

#[test]
fn test_size_bucket_boundaries() {
    let fixture = TestFixture::new();
    fixture.create_file("empty.bin", b"");
    fixture.create_file("small.bin", &[0u8; 1023]);
    fixture.create_file("kilo.bin", &[0u8; 1024]);

    let report = fixture.run_forced(strategy(SortStrategy::Size));

    assert_eq!(report.processed, 3);
    fixture.assert_file_exists("11_empty/empty.bin");
    fixture.assert_file_exists("11_empty/small.bin");
    fixture.assert_file_exists("09_1KB-500KB/kilo.bin");
    fixture.assert_not_exists("10_0-1KB");
}

#[test]
fn test_size_preview_shows_sizes() {
    let fixture = TestFixture::new();
    fixture.create_file("kilo.bin", &[0u8; 1536]);
    let mut prompter = ScriptedPrompter::new([false], []);

    let (_, events) = fixture.run(strategy(SortStrategy::Size), &mut prompter);

    assert!(events.contains(|e| matches!(
        e,
        SortEvent::PlannedFile { name, size: Some(1536) } if name == "kilo.bin"
    )));
}

#[test]
fn test_sort_by_modification_date() {
    let fixture = TestFixture::new();
    fixture.create_text_file("photo.jpg", "pixels");
    let modified = fs::metadata(fixture.path().join("photo.jpg"))
        .and_then(|m| m.modified())
        .expect("Modification time available");
    let expected = chrono::DateTime::<chrono::Local>::from(modified)
        .format("%Y-%m-%d")
        .to_string();

    let report = fixture.run_forced(strategy(SortStrategy::Mtime));

    assert_eq!(report.processed, 1);
    fixture.assert_file_exists(&format!("{}/photo.jpg", expected));
}

// ============================================================================
// 3. Dry-Run Mode Verification
// ============================================================================

#[test]
fn test_dry_run_changes_nothing() {
    let fixture = TestFixture::new();
    fixture.create_text_file("a.txt", "a");
    fixture.create_text_file("b.pdf", "b");
    fixture.create_text_file("c", "c");

    let report = fixture.run_forced(RunConfig {
        dry: true,
        ..RunConfig::default()
    });

    assert!(report.dry_run);
    assert_eq!(report.processed, 3);
    assert!(report.categories.is_empty(), "Dry runs record no transfers");
    assert_eq!(fixture.count_files(), 3);
    assert_eq!(fixture.count_dirs(), 0);
}

#[test]
fn test_dry_run_counts_match_real_run() {
    let fixture = TestFixture::new();
    fixture.create_text_file("a.txt", "a");
    fixture.create_text_file("b.md", "b");
    fixture.create_text_file("c.md", "c");

    let dry = fixture.run_forced(RunConfig {
        dry: true,
        ..RunConfig::default()
    });
    let real = fixture.run_forced(RunConfig::default());

    assert_eq!(dry.total, real.total);
    assert_eq!(dry.processed, real.processed);
    assert_eq!(dry.skipped, real.skipped);
}

#[test]
fn test_dry_run_reports_planned_directories() {
    let fixture = TestFixture::new();
    fixture.create_text_file("a.txt", "a");

    let mut prompter = ScriptedPrompter::new([true], []);
    let (_, events) = fixture.run(
        RunConfig {
            dry: true,
            ..RunConfig::default()
        },
        &mut prompter,
    );

    assert!(events.contains(|e| matches!(e, SortEvent::DirectoryCreated { dry_run: true, .. })));
    assert!(events.contains(|e| matches!(e, SortEvent::Transferred { dry_run: true, .. })));
    assert!(!events.contains(|e| matches!(e, SortEvent::CategoryListing { .. })));
    fixture.assert_not_exists("txt");
}

// ============================================================================
// 4. Conflicts and Confirmations
// ============================================================================

#[test]
fn test_declined_confirmation_touches_nothing() {
    let fixture = TestFixture::new();
    fixture.create_text_file("a.txt", "a");
    let mut prompter = ScriptedPrompter::new([false], []);

    let (outcome, events) = fixture.run(RunConfig::default(), &mut prompter);

    assert_eq!(outcome, SortOutcome::Declined);
    assert_eq!(prompter.confirm_questions, vec!["Proceed with sorting?"]);
    assert!(events.contains(|e| *e == SortEvent::Stopped));
    fixture.assert_file_exists("a.txt");
    assert_eq!(fixture.count_dirs(), 0);
}

#[test]
fn test_conflict_answered_no_keeps_both_files() {
    let fixture = TestFixture::new();
    fixture.create_text_file("a.txt", "new");
    fixture.create_text_file("txt/a.txt", "old");
    let mut prompter = ScriptedPrompter::new([true], [OverwriteAnswer::No]);

    let (outcome, events) = fixture.run(RunConfig::default(), &mut prompter);
    let report = completed(outcome);

    assert_eq!((report.total, report.processed, report.skipped), (1, 0, 1));
    assert_eq!(fixture.read("a.txt"), "new");
    assert_eq!(fixture.read("txt/a.txt"), "old");
    assert!(events.contains(|e| matches!(
        e,
        SortEvent::Skipped { reason: SkipReason::Conflict, .. }
    )));
}

#[test]
fn test_conflict_answered_yes_overwrites() {
    let fixture = TestFixture::new();
    fixture.create_text_file("a.txt", "new");
    fixture.create_text_file("txt/a.txt", "old");
    let mut prompter = ScriptedPrompter::new([true], [OverwriteAnswer::Yes]);

    let report = completed(fixture.run(RunConfig::default(), &mut prompter).0);

    assert_eq!(report.processed, 1);
    fixture.assert_not_exists("a.txt");
    assert_eq!(fixture.read("txt/a.txt"), "new");
}

#[test]
fn test_overwrite_all_is_sticky() {
    let fixture = TestFixture::new();
    for name in ["a.txt", "b.txt", "c.txt"] {
        fixture.create_text_file(name, "new");
        fixture.create_text_file(&format!("txt/{}", name), "old");
    }
    let mut prompter = ScriptedPrompter::new([true], [OverwriteAnswer::All]);

    let report = completed(fixture.run(RunConfig::default(), &mut prompter).0);

    assert_eq!(prompter.overwrite_questions.len(), 1);
    assert_eq!(report.processed, 3);
    for name in ["a.txt", "b.txt", "c.txt"] {
        assert_eq!(fixture.read(&format!("txt/{}", name)), "new");
    }
}

#[test]
fn test_skip_all_is_sticky() {
    let fixture = TestFixture::new();
    for name in ["a.txt", "b.txt", "c.txt"] {
        fixture.create_text_file(name, "new");
        fixture.create_text_file(&format!("txt/{}", name), "old");
    }
    let mut prompter = ScriptedPrompter::new([true], [OverwriteAnswer::SkipAll]);

    let (outcome, events) = fixture.run(RunConfig::default(), &mut prompter);
    let report = completed(outcome);

    assert_eq!(prompter.overwrite_questions.len(), 1);
    assert_eq!((report.processed, report.skipped), (0, 3));
    assert_eq!(events.count(|e| *e == SortEvent::SkippingAllConflicts), 1);
    assert_eq!(fixture.count_files(), 3);
}

#[test]
fn test_force_overwrites_without_prompting() {
    let fixture = TestFixture::new();
    fixture.create_text_file("a.txt", "new");
    fixture.create_text_file("txt/a.txt", "old");

    let report = fixture.run_forced(RunConfig::default());

    assert_eq!(report.processed, 1);
    assert_eq!(fixture.read("txt/a.txt"), "new");
}

#[test]
fn test_interactive_confirms_each_file() {
    let fixture = TestFixture::new();
    fixture.create_text_file("a.txt", "a");
    fixture.create_text_file("b.txt", "b");
    let mut prompter = ScriptedPrompter::new([true, true, false], []);

    let (outcome, events) = fixture.run(
        RunConfig {
            interactive: true,
            ..RunConfig::default()
        },
        &mut prompter,
    );
    let report = completed(outcome);

    assert_eq!((report.processed, report.skipped), (1, 1));
    assert_eq!(prompter.confirm_questions.len(), 3);
    assert!(prompter.confirm_questions[1].starts_with("Move a.txt to "));
    assert!(prompter.confirm_questions[2].starts_with("Move b.txt to "));
    fixture.assert_file_exists("txt/a.txt");
    fixture.assert_file_exists("b.txt");
    assert!(events.contains(|e| matches!(
        e,
        SortEvent::Skipped { name, reason: SkipReason::Declined } if name == "b.txt"
    )));
}

// ============================================================================
// 5. Recursive Sorting and Cleanup
// ============================================================================

#[test]
fn test_recursive_sort_and_forced_cleanup() {
    let fixture = TestFixture::new();
    fixture.create_text_file("top.txt", "t");
    fixture.create_text_file("nested/inner.txt", "i");
    fixture.create_text_file("nested/deeper/doc.pdf", "d");

    let report = fixture.run_forced(RunConfig {
        recursive: true,
        ..RunConfig::default()
    });

    assert_eq!(report.processed, 3);
    fixture.assert_file_exists("txt/top.txt");
    fixture.assert_file_exists("txt/inner.txt");
    fixture.assert_file_exists("pdf/doc.pdf");
    fixture.assert_not_exists("nested/deeper");
    assert_eq!(report.removed_dirs.len(), 1);
    assert!(report.removed_dirs[0].ends_with("nested/deeper"));
}

#[test]
fn test_recursive_sort_is_idempotent() {
    let fixture = TestFixture::new();
    fixture.create_text_file("top.txt", "t");
    fixture.create_text_file("nested/inner.md", "i");
    let config = RunConfig {
        recursive: true,
        ..RunConfig::default()
    };
    fixture.run_forced(config.clone());

    let mut prompter = ScriptedPrompter::default();
    let (outcome, _) = fixture.run(RunConfig { force: true, ..config }, &mut prompter);

    assert!(matches!(outcome, SortOutcome::NoFiles(_)));
    fixture.assert_file_exists("txt/top.txt");
    fixture.assert_file_exists("md/inner.md");
}

#[test]
fn test_recursive_skips_existing_category_directory() {
    let fixture = TestFixture::new();
    fixture.create_text_file("a.txt", "new");
    fixture.create_text_file("txt/old.txt", "old");

    let report = fixture.run_forced(RunConfig {
        recursive: true,
        ..RunConfig::default()
    });

    assert_eq!(report.total, 1);
    fixture.assert_file_exists("txt/old.txt");
    fixture.assert_file_exists("txt/a.txt");
}

#[test]
fn test_cleanup_declined_keeps_directories() {
    let fixture = TestFixture::new();
    fixture.create_text_file("nested/inner.txt", "i");
    let mut prompter = ScriptedPrompter::new([true, false], []);

    let (outcome, events) = fixture.run(
        RunConfig {
            recursive: true,
            ..RunConfig::default()
        },
        &mut prompter,
    );
    let report = completed(outcome);

    assert_eq!(
        prompter.confirm_questions,
        vec!["Proceed with sorting?", "Remove empty directories?"]
    );
    assert!(report.removed_dirs.is_empty());
    assert!(events.contains(|e| *e == SortEvent::EmptyDirsKept));
    fixture.assert_file_exists("txt/inner.txt");
    fixture.assert_dir_exists("nested");
}

#[test]
fn test_cleanup_in_dry_run_never_removes() {
    let fixture = TestFixture::new();
    fixture.create_subdir("hollow");
    fixture.create_text_file("nested/inner.txt", "i");
    let mut prompter = ScriptedPrompter::approving([]);

    let (outcome, events) = fixture.run(
        RunConfig {
            recursive: true,
            dry: true,
            ..RunConfig::default()
        },
        &mut prompter,
    );
    let report = completed(outcome);

    assert!(events.contains(|e| matches!(e, SortEvent::EmptyDirFound { .. })));
    assert!(report.removed_dirs.is_empty());
    fixture.assert_dir_exists("hollow");
    fixture.assert_file_exists("nested/inner.txt");
}

#[test]
fn test_non_recursive_run_has_no_cleanup() {
    let fixture = TestFixture::new();
    fixture.create_subdir("hollow");
    fixture.create_text_file("a.txt", "a");

    let report = fixture.run_forced(RunConfig::default());

    assert!(report.removed_dirs.is_empty());
    fixture.assert_dir_exists("hollow");
}

// ============================================================================
// 6. Configuration and Filtering
// ============================================================================

#[test]
fn test_config_file_filters_apply_to_run() {
    let fixture = TestFixture::new();
    fixture.create_text_file("keep.txt", "k");
    fixture.create_text_file("skip.log", "s");
    fixture.create_text_file(".hidden", "h");
    let config_path = fixture.path().join("fsort.toml");
    fs::write(
        &config_path,
        r#"
[defaults]
strategy = "extension"

[filters]
enable_hidden_files = false

[filters.exclude]
extensions = ["log", "toml"]
"#,
    )
    .expect("Failed to write config");

    let file_config = SortConfig::load(Some(&config_path)).expect("Config should load");
    let report = fixture.run_forced(RunConfig {
        strategy: file_config.defaults.strategy.unwrap_or_default(),
        filters: file_config.filters,
        ..RunConfig::default()
    });

    assert_eq!(report.total, 1);
    fixture.assert_file_exists("txt/keep.txt");
    fixture.assert_file_exists("skip.log");
    fixture.assert_file_exists(".hidden");
}

#[test]
fn test_hidden_files_sorted_by_default() {
    let fixture = TestFixture::new();
    fixture.create_text_file(".bashrc", "alias");

    fixture.run_forced(RunConfig::default());

    fixture.assert_file_exists("no_ext/.bashrc");
}

// ============================================================================
// 7. Edge Cases and Error Scenarios
// ============================================================================

#[test]
fn test_invalid_directory_is_fatal() {
    let fixture = TestFixture::new();
    let mut prompter = ScriptedPrompter::default();
    let mut events = RecordingSink::new();

    let result = Sorter::new(
        fixture.path().join("missing"),
        RunConfig::default(),
        &mut prompter,
        &mut events,
    );

    assert!(matches!(result, Err(SortError::InvalidDirectory { .. })));
    assert!(events.events.is_empty());
}

#[test]
fn test_force_with_interactive_is_fatal() {
    let fixture = TestFixture::new();
    fixture.create_text_file("a.txt", "a");
    let mut prompter = ScriptedPrompter::default();
    let mut events = RecordingSink::new();

    let result = Sorter::new(
        fixture.path(),
        RunConfig {
            force: true,
            interactive: true,
            ..RunConfig::default()
        },
        &mut prompter,
        &mut events,
    );

    assert!(matches!(result, Err(SortError::ConflictingModes)));
    fixture.assert_file_exists("a.txt");
}

#[test]
fn test_directories_are_never_sorted() {
    let fixture = TestFixture::new();
    fixture.create_subdir("photos.jpg");
    fixture.create_text_file("a.jpg", "a");

    let report = fixture.run_forced(RunConfig::default());

    assert_eq!(report.total, 1);
    fixture.assert_dir_exists("photos.jpg");
    fixture.assert_file_exists("jpg/a.jpg");
}

#[test]
fn test_summary_is_last_before_end_marker() {
    let fixture = TestFixture::new();
    fixture.create_text_file("a.txt", "a");
    let mut prompter = ScriptedPrompter::default();

    let (_, events) = fixture.run(
        RunConfig {
            force: true,
            ..RunConfig::default()
        },
        &mut prompter,
    );

    let n = events.events.len();
    assert!(n >= 2);
    assert!(matches!(
        events.events[n - 2],
        SortEvent::Summary { total: 1, processed: 1, skipped: 0, .. }
    ));
    assert_eq!(
        events.events[n - 1],
        SortEvent::Section(fsort::events::Section::End)
    );
}

#[test]
fn test_report_serializes_to_json() {
    let fixture = TestFixture::new();
    fixture.create_text_file("a.txt", "a");

    let report = fixture.run_forced(RunConfig::default());
    let json = serde_json::to_value(&report).expect("Report serializes");

    assert_eq!(json["total"], 1);
    assert_eq!(json["strategy"], "extension");
    assert_eq!(json["categories"]["txt"][0], "a.txt");
    assert_eq!(json["cancelled"], false);
}

#[test]
fn test_vanished_source_is_skipped_and_run_continues() {
    let fixture = TestFixture::new();
    fixture.create_text_file("a.txt", "a");
    fixture.create_text_file("b.txt", "b");
    fixture.create_text_file("c.txt", "c");
    let doomed = fixture.path().join("b.txt");
    let mut removed = false;
    let mut progress = |_percent: f64| {
        if !removed {
            fs::remove_file(&doomed).expect("Failed to remove file");
            removed = true;
        }
    };
    let mut prompter = ScriptedPrompter::default();
    let mut events = RecordingSink::new();

    let outcome = Sorter::new(
        fixture.path(),
        RunConfig {
            force: true,
            ..RunConfig::default()
        },
        &mut prompter,
        &mut events,
    )
    .map(|sorter| sorter.with_progress(&mut progress))
    .and_then(|sorter| sorter.run())
    .expect("Sorting should succeed");
    let report = completed(outcome);

    assert_eq!((report.total, report.processed, report.skipped), (3, 2, 1));
    assert_eq!(
        events.count(|e| matches!(
            e,
            SortEvent::TransferFailed { path, .. } if path.ends_with("b.txt")
        )),
        1
    );
    fixture.assert_file_exists("txt/a.txt");
    fixture.assert_file_exists("txt/c.txt");
    fixture.assert_not_exists("txt/b.txt");
    assert_eq!(report.categories["txt"], vec!["a.txt", "c.txt"]);
}

#[test]
fn test_unavailable_category_directory_skips_its_files() {
    let fixture = TestFixture::new();
    // A file named `txt` blocks the creation of the `txt` category directory.
    fixture.create_text_file("txt", "plain");
    fixture.create_text_file("a.txt", "a");
    let mut prompter = ScriptedPrompter::default();

    let (outcome, events) = fixture.run(
        RunConfig {
            force: true,
            ..RunConfig::default()
        },
        &mut prompter,
    );
    let report = completed(outcome);

    assert_eq!((report.total, report.processed, report.skipped), (2, 1, 1));
    assert!(events.contains(|e| matches!(
        e,
        SortEvent::DirectoryCreateFailed { path, .. } if path.ends_with("txt")
    )));
    assert!(events.contains(|e| matches!(
        e,
        SortEvent::Skipped { name, reason: SkipReason::DirectoryUnavailable } if name == "a.txt"
    )));
    fixture.assert_file_exists("no_ext/txt");
    fixture.assert_file_exists("a.txt");
}

#[cfg(target_os = "linux")]
#[test]
fn test_non_utf8_names_keep_their_exact_bytes() {
    use std::ffi::OsStr;
    use std::os::unix::ffi::OsStrExt;

    let fixture = TestFixture::new();
    let first = OsStr::from_bytes(b"a\xe9.txt");
    let second = OsStr::from_bytes(b"a\xe8.txt");
    fs::write(fixture.path().join(first), "one").expect("Failed to write");
    fs::write(fixture.path().join(second), "two").expect("Failed to write");

    let report = fixture.run_forced(RunConfig::default());

    assert_eq!((report.processed, report.skipped), (2, 0));
    let sorted = fixture.path().join("txt");
    assert_eq!(fs::read_to_string(sorted.join(first)).expect("readable"), "one");
    assert_eq!(fs::read_to_string(sorted.join(second)).expect("readable"), "two");
    assert_eq!(fs::read_dir(&sorted).expect("readable").count(), 2);
}
