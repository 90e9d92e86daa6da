//! Classification strategies for sorting files into category directories.
//!
//! A strategy maps a file to a sort key (used to order the collected files
//! before processing) and a category (the name of the target subdirectory).
//! Three dimensions are supported: file extension, size bucket, and the
//! calendar date of the modification or creation timestamp.
//!
//! # Examples
//!
//! ```
//! use fsort::strategy::{SortStrategy, extension_category};
//! use std::path::Path;
//!
//! assert_eq!(extension_category(Path::new("REPORT.PDF")), "pdf");
//! assert_eq!(extension_category(Path::new("Makefile")), "no_ext");
//! assert_eq!(SortStrategy::Size.size_bucket(0), "11_empty");
//! ```

use crate::collector::FileEntry;
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// Category for files without an extension.
pub const NO_EXTENSION: &str = "no_ext";
/// Category for files under 1 KiB and files whose size could not be read.
pub const EMPTY_BUCKET: &str = "11_empty";
/// Category for files whose timestamp could not be read.
pub const UNKNOWN_DATE: &str = "unknown_date";

const KIB: u64 = 1024;
const MIB: u64 = 1024 * KIB;
const GIB: u64 = 1024 * MIB;

/// Size buckets, scanned from the largest threshold down. A file lands in
/// the first bucket whose threshold it meets or exceeds; anything under
/// 1 KiB falls through to [`EMPTY_BUCKET`].
pub const SIZE_BUCKETS: &[(u64, &str)] = &[
    (20 * GIB, "01_20GB+"),
    (10 * GIB, "02_10GB-20GB"),
    (5 * GIB, "03_5GB-10GB"),
    (GIB, "04_1GB-5GB"),
    (500 * MIB, "05_500MB-1GB"),
    (100 * MIB, "06_100MB-500MB"),
    (MIB, "07_1MB-100MB"),
    (500 * KIB, "08_500KB-1MB"),
    (KIB, "09_1KB-500KB"),
];

/// The dimension files are classified along.
///
/// This is a closed set: each variant knows how to compute its own sort key
/// and category, and how to describe itself in the report.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum SortStrategy {
    /// Lowercase file extension, `no_ext` when there is none.
    #[default]
    Extension,
    /// Fixed byte-size buckets.
    Size,
    /// Local calendar date of the last modification.
    Mtime,
    /// Local calendar date of the creation.
    Ctime,
}

/// Key used to order files before they are processed.
///
/// Keys produced by one strategy are always of the same variant, so the
/// derived ordering only ever compares like with like.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum SortKey {
    /// The extension category itself.
    Text(String),
    /// Raw byte size, `-1` when the size could not be read.
    Size(i64),
    /// Raw timestamp, `None` when it could not be read.
    Time(Option<SystemTime>),
}

/// The result of classifying a single file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub key: SortKey,
    pub category: String,
}

/// Metadata needed for a classification could not be read.
///
/// Carries the sentinel classification the file degrades to, so callers can
/// log the failure and carry on.
#[derive(Debug, thiserror::Error)]
#[error("could not read metadata of {}: {source}", path.display())]
pub struct MetadataUnavailable {
    pub path: PathBuf,
    pub fallback: Classification,
    #[source]
    pub source: io::Error,
}

impl SortStrategy {
    /// Classifies a file, reading its metadata at most once.
    ///
    /// # Errors
    ///
    /// Returns [`MetadataUnavailable`] when the size or timestamp cannot be
    /// read. The error carries the sentinel classification (`11_empty` with
    /// key `-1`, or `unknown_date` with no timestamp) that should be used
    /// instead; the failure is never fatal.
    pub fn classify(&self, entry: &FileEntry) -> Result<Classification, MetadataUnavailable> {
        match self {
            SortStrategy::Extension => {
                let category = extension_category(entry.path());
                Ok(Classification {
                    key: SortKey::Text(category.clone()),
                    category,
                })
            }
            SortStrategy::Size => match entry.metadata() {
                Ok(metadata) => {
                    let size = metadata.len();
                    Ok(Classification {
                        key: SortKey::Size(i64::try_from(size).unwrap_or(i64::MAX)),
                        category: self.size_bucket(size).to_string(),
                    })
                }
                Err(source) => Err(MetadataUnavailable {
                    path: entry.path().to_path_buf(),
                    fallback: Classification {
                        key: SortKey::Size(-1),
                        category: EMPTY_BUCKET.to_string(),
                    },
                    source,
                }),
            },
            SortStrategy::Mtime | SortStrategy::Ctime => {
                let timestamp = entry.metadata().and_then(|metadata| {
                    if *self == SortStrategy::Ctime {
                        metadata.created()
                    } else {
                        metadata.modified()
                    }
                });
                match timestamp {
                    Ok(time) => Ok(Classification {
                        key: SortKey::Time(Some(time)),
                        category: date_bucket(time),
                    }),
                    Err(source) => Err(MetadataUnavailable {
                        path: entry.path().to_path_buf(),
                        fallback: Classification {
                            key: SortKey::Time(None),
                            category: UNKNOWN_DATE.to_string(),
                        },
                        source,
                    }),
                }
            }
        }
    }

    /// Returns the size bucket a file of `size` bytes belongs to.
    pub fn size_bucket(&self, size: u64) -> &'static str {
        SIZE_BUCKETS
            .iter()
            .find(|(threshold, _)| size >= *threshold)
            .map(|(_, bucket)| *bucket)
            .unwrap_or(EMPTY_BUCKET)
    }

    /// Human-readable name of the classification dimension.
    pub fn category_name(&self) -> &'static str {
        match self {
            SortStrategy::Extension => "File Extension",
            SortStrategy::Size => "File Size",
            SortStrategy::Mtime => "Modified Time",
            SortStrategy::Ctime => "Created Time",
        }
    }

    /// Title of the per-category section of the final report.
    pub fn summary_title(&self) -> &'static str {
        match self {
            SortStrategy::Extension => "SORTED FILES BY EXTENSION",
            SortStrategy::Size => "SORTED FILES BY SIZE",
            SortStrategy::Mtime | SortStrategy::Ctime => "SORTED FILES BY DATE",
        }
    }
}

impl fmt::Display for SortStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SortStrategy::Extension => "extension",
            SortStrategy::Size => "size",
            SortStrategy::Mtime => "mtime",
            SortStrategy::Ctime => "ctime",
        };
        f.write_str(name)
    }
}

/// Returns the extension category of a path: the lowercase suffix without
/// its leading dot, or `no_ext`.
pub fn extension_category(path: &Path) -> String {
    path.extension()
        .map(|ext| ext.to_string_lossy().to_lowercase())
        .filter(|ext| !ext.is_empty())
        .unwrap_or_else(|| NO_EXTENSION.to_string())
}

/// Formats a timestamp as a `YYYY-MM-DD` date in local time.
pub fn date_bucket(time: SystemTime) -> String {
    DateTime::<Local>::from(time).format("%Y-%m-%d").to_string()
}
