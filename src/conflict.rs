//! Resolution of collisions with files already present at the target.

use crate::prompt::{OverwriteAnswer, Prompter};
use std::path::Path;

/// What to do with a colliding file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    Overwrite,
    Skip,
    /// Skip, and the user just asked to skip every later collision too.
    SkipAll,
}

/// Decides, per collision, whether to overwrite or skip.
///
/// Holds the sticky "overwrite all" / "skip all" decisions of one run.
/// Once either is set the prompter is never consulted again.
#[derive(Debug, Default, Clone)]
pub struct ConflictResolver {
    overwrite_all: bool,
    skip_all: bool,
}

impl ConflictResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn overwrite_all(&self) -> bool {
        self.overwrite_all
    }

    pub fn skip_all(&self) -> bool {
        self.skip_all
    }

    /// Resolves a collision at `target`.
    ///
    /// `force` always overwrites without asking. Otherwise a sticky decision
    /// applies if one was made, and only then is the user asked.
    pub fn resolve(
        &mut self,
        target: &Path,
        force: bool,
        prompter: &mut dyn Prompter,
    ) -> Resolution {
        if force || self.overwrite_all {
            return Resolution::Overwrite;
        }
        if self.skip_all {
            return Resolution::Skip;
        }

        let message = format!("{} exists. Overwrite?", target.display());
        match prompter.confirm_overwrite(&message) {
            OverwriteAnswer::Yes => Resolution::Overwrite,
            OverwriteAnswer::No => Resolution::Skip,
            OverwriteAnswer::All => {
                self.overwrite_all = true;
                Resolution::Overwrite
            }
            OverwriteAnswer::SkipAll => {
                self.skip_all = true;
                Resolution::SkipAll
            }
        }
    }
}
