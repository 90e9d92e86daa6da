//! User confirmation abstraction.
//!
//! The engine asks its questions through the [`Prompter`] trait so the same
//! run can be driven by a terminal, a graphical shell, or a script.
//! [`DialoguerPrompter`] is the terminal implementation;
//! [`ScriptedPrompter`] replays canned answers.

use std::collections::VecDeque;

/// Answer to an overwrite question.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverwriteAnswer {
    /// Overwrite this file.
    Yes,
    /// Skip this file.
    No,
    /// Overwrite this and every later colliding file.
    All,
    /// Skip this and every later colliding file.
    SkipAll,
}

impl OverwriteAnswer {
    /// Parses a typed answer. Anything unrecognised, including an empty
    /// line, is [`OverwriteAnswer::No`].
    ///
    /// ```
    /// use fsort::prompt::OverwriteAnswer;
    ///
    /// assert_eq!(OverwriteAnswer::parse(" A "), OverwriteAnswer::All);
    /// assert_eq!(OverwriteAnswer::parse("skip-all"), OverwriteAnswer::SkipAll);
    /// assert_eq!(OverwriteAnswer::parse("maybe"), OverwriteAnswer::No);
    /// ```
    pub fn parse(input: &str) -> Self {
        match input.trim().to_lowercase().as_str() {
            "y" | "yes" => OverwriteAnswer::Yes,
            "a" | "all" => OverwriteAnswer::All,
            "s" | "skip-all" | "skip all" | "skipall" => OverwriteAnswer::SkipAll,
            _ => OverwriteAnswer::No,
        }
    }
}

/// Source of answers to the engine's questions.
///
/// Implementations must never fail: an aborted or unreadable input is a
/// negative answer.
pub trait Prompter {
    /// Asks a yes/no question.
    fn confirm(&mut self, message: &str) -> bool;

    /// Asks whether an existing target should be overwritten.
    fn confirm_overwrite(&mut self, message: &str) -> OverwriteAnswer;
}

/// Terminal prompts built on `dialoguer`.
pub struct DialoguerPrompter {
    theme: dialoguer::theme::ColorfulTheme,
}

impl DialoguerPrompter {
    #[must_use]
    pub fn new() -> Self {
        Self {
            theme: dialoguer::theme::ColorfulTheme::default(),
        }
    }
}

impl Default for DialoguerPrompter {
    fn default() -> Self {
        Self::new()
    }
}

impl Prompter for DialoguerPrompter {
    fn confirm(&mut self, message: &str) -> bool {
        use dialoguer::Confirm;

        Confirm::with_theme(&self.theme)
            .with_prompt(message)
            .default(false)
            .interact()
            .unwrap_or(false)
    }

    fn confirm_overwrite(&mut self, message: &str) -> OverwriteAnswer {
        use dialoguer::Input;

        Input::<String>::with_theme(&self.theme)
            .with_prompt(format!("{message} [y]es/[N]o/[a]ll/[s]kip all"))
            .allow_empty(true)
            .interact_text()
            .map(|answer| OverwriteAnswer::parse(&answer))
            .unwrap_or(OverwriteAnswer::No)
    }
}

/// Replays queued answers and records every question asked.
///
/// When a queue runs dry the answer is negative, the same as a closed
/// input stream.
#[derive(Debug, Default, Clone)]
pub struct ScriptedPrompter {
    confirms: VecDeque<bool>,
    overwrites: VecDeque<OverwriteAnswer>,
    /// Every yes/no question, in order.
    pub confirm_questions: Vec<String>,
    /// Every overwrite question, in order.
    pub overwrite_questions: Vec<String>,
}

impl ScriptedPrompter {
    pub fn new(
        confirms: impl IntoIterator<Item = bool>,
        overwrites: impl IntoIterator<Item = OverwriteAnswer>,
    ) -> Self {
        Self {
            confirms: confirms.into_iter().collect(),
            overwrites: overwrites.into_iter().collect(),
            ..Self::default()
        }
    }

    /// A prompter with no yes/no answers queued.
    pub fn overwrites(overwrites: impl IntoIterator<Item = OverwriteAnswer>) -> Self {
        Self {
            overwrites: overwrites.into_iter().collect(),
            ..Self::default()
        }
    }

    /// A prompter that says yes to every yes/no question and answers
    /// overwrite questions from `overwrites`.
    pub fn approving(overwrites: impl IntoIterator<Item = OverwriteAnswer>) -> Self {
        Self::new(std::iter::repeat_n(true, 64), overwrites)
    }

    pub fn prompts_asked(&self) -> usize {
        self.confirm_questions.len() + self.overwrite_questions.len()
    }
}

impl Prompter for ScriptedPrompter {
    fn confirm(&mut self, message: &str) -> bool {
        self.confirm_questions.push(message.to_string());
        self.confirms.pop_front().unwrap_or(false)
    }

    fn confirm_overwrite(&mut self, message: &str) -> OverwriteAnswer {
        self.overwrite_questions.push(message.to_string());
        self.overwrites.pop_front().unwrap_or(OverwriteAnswer::No)
    }
}
