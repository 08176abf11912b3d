//! Typed failures raised by the merge and normalize pipelines.
//!
//! Pure pipeline stages return [`IngestError`] directly; the command layer wraps
//! them in `anyhow` context so the operator sees the full chain, while callers
//! can still downcast to the variant that caused the abort.

use std::{io, path::PathBuf};

use thiserror::Error;

pub type Result<T> = std::result::Result<T, IngestError>;

#[derive(Debug, Error)]
pub enum IngestError {
    /// Input file is missing or unreadable.
    #[error("cannot read input {path:?}: {source}")]
    InputAccess {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Input does not contain a header row followed by at least one data row.
    #[error("input {path:?} needs a header row and at least one data row (found {found} row(s))")]
    TooFewRows { path: PathBuf, found: usize },

    #[error("{0:?} is not a directory")]
    NotADirectory(PathBuf),

    #[error("no '.{extension}' files found in {folder:?}")]
    NoInputFiles { folder: PathBuf, extension: String },

    /// A `--map` entry that is not of the form `input=output`.
    #[error("invalid rename entry '{entry}': {reason}")]
    MalformedRename { entry: String, reason: String },

    #[error("malformed delimited text in {path:?}: {source}")]
    MalformedInput {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// Unbalanced or stray quotes; `row` counts records from 1.
    #[error("malformed quoting in {path:?} at row {row}: {reason}")]
    MalformedQuoting {
        path: PathBuf,
        row: usize,
        reason: &'static str,
    },

    #[error("row {row} of {path:?} is not valid {encoding}")]
    Decode {
        path: PathBuf,
        row: usize,
        encoding: &'static str,
    },

    #[error("cannot read workbook {path:?}: {source}")]
    Workbook {
        path: PathBuf,
        #[source]
        source: calamine::XlsxError,
    },

    #[error("workbook {path:?} contains no worksheets")]
    MissingSheet { path: PathBuf },

    #[error("invalid normalization profile {path:?}: {source}")]
    Config {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// Schema string canonicalized to zero usable headers.
    #[error("schema '{raw}' does not name any usable column")]
    EmptySchema { raw: String },

    /// Strict mode found schema columns with no input source.
    #[error("strict mode: no input column supplies schema column(s): {}", .missing.join(", "))]
    StrictSource { missing: Vec<String> },

    #[error("cannot write output {path:?}: {source}")]
    OutputWrite {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("cannot write workbook {path:?}: {source}")]
    WorkbookWrite {
        path: PathBuf,
        #[source]
        source: rust_xlsxwriter::XlsxError,
    },

    #[error("row {row}, column {column} exceeds worksheet limits in {path:?}")]
    SheetBounds {
        path: PathBuf,
        row: usize,
        column: usize,
    },

    #[error("{0}")]
    InvalidOption(String),
}
