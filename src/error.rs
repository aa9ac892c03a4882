//! Build errors and recoverable warnings
//!
//! Two channels:
//!
//! - [`BuildError`] aborts the build. Returned through `Result` and propagated
//!   with `?` (unwritable output directory, empty dataset, bad axis column...).
//! - [`Warning`] is recoverable. Each one is logged with `tracing::warn!` where
//!   it happens and collected into the build's warning list, so the caller gets
//!   a usable (if imperfect) bundle plus a structured account of what went wrong.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Fatal conditions that stop bundle generation
#[derive(Error, Debug)]
pub enum BuildError {
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("layout file error: {0}")]
    Layout(#[from] serde_json::Error),

    #[error("dataset has no rows")]
    EmptyDataset,

    #[error("column '{0}' not found in dataset")]
    UnknownColumn(String),

    #[error("column '{0}' is not numeric and cannot be used as an axis")]
    NotNumeric(String),

    #[error("need at least {needed} numeric column(s) to pick default axes, found {found}")]
    NotEnoughNumericColumns { needed: usize, found: usize },

    #[error("row index {index} out of range (row count: {row_count})")]
    IndexOutOfRange { index: usize, row_count: usize },

    #[error("layout references unknown widget '{0}'")]
    UnknownWidget(String),

    #[error("layout leaves out registered widget '{0}'")]
    MissingWidget(String),

    #[error("layout places widget '{0}' more than once")]
    DuplicateWidget(String),

    #[error("column '{column}' has {actual} values, expected {expected}")]
    LengthMismatch {
        column: String,
        expected: usize,
        actual: usize,
    },
}

impl BuildError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        BuildError::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, BuildError>;

/// Recoverable conditions, reported alongside a successful build
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Warning {
    /// Dropdown option that is not a column of the dataset
    UnknownDropdownOption(String),
    /// Dropdown option that exists but holds non-numeric data
    NonNumericDropdownOption(String),
    /// Old option name; value was applied to its replacement
    DeprecatedOption { old: String, replacement: String },
    /// Two distinct sources mapped to the same bundle target
    DuplicateTarget { filename: String, renamed_to: String },
    /// Dataset already has an `id` column, identity column not inserted
    IdColumnExists,
    /// Media file referenced by the dataset does not exist
    MissingMedia(PathBuf),
    /// Media file exists but could not be read
    UnreadableMedia { path: PathBuf, reason: String },
    /// Text panel include/ignore entry that is not a column
    UnknownTextColumn(String),
    /// Output directory contains the working directory, left as is
    RefusedToClear(PathBuf),
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Warning::UnknownDropdownOption(name) => {
                write!(f, "couldn't find dropdown option '{}' in dataset, skipping option", name)
            }
            Warning::NonNumericDropdownOption(name) => {
                write!(f, "dropdown option '{}' is not numeric, skipping option", name)
            }
            Warning::DeprecatedOption { old, replacement } => {
                write!(f, "'{}' is deprecated, use '{}' instead", old, replacement)
            }
            Warning::DuplicateTarget { filename, renamed_to } => {
                write!(f, "filename {} already used, copied as {}", filename, renamed_to)
            }
            Warning::IdColumnExists => {
                write!(f, "dataset already has an 'id' column, not inserting identity column")
            }
            Warning::MissingMedia(path) => {
                write!(f, "{} does not exist, skipping copy", path.display())
            }
            Warning::UnreadableMedia { path, reason } => {
                write!(f, "{} could not be read ({}), skipping copy", path.display(), reason)
            }
            Warning::UnknownTextColumn(name) => {
                write!(f, "text panel column '{}' not found in dataset, ignoring", name)
            }
            Warning::RefusedToClear(path) => {
                write!(f, "refusing to clear {} because it contains the working directory", path.display())
            }
        }
    }
}

/// Ordered warning sink that logs every entry as it arrives
#[derive(Debug, Default, Clone)]
pub struct Warnings {
    entries: Vec<Warning>,
}

impl Warnings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, warning: Warning) {
        tracing::warn!(warning = %warning, "build warning");
        self.entries.push(warning);
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Warning> {
        self.entries.iter()
    }

    pub fn into_vec(self) -> Vec<Warning> {
        self.entries
    }
}
