//! The `merge` command: concatenates every same-shaped file in a folder.
//!
//! The first non-empty file contributes its header row; later files have their
//! first row skipped. Files are visited in sorted path order so repeated runs produce the
//! same master file.

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use log::{debug, info};

use crate::{
    cli::{FileType, MergeArgs},
    error::IngestError,
    io_utils::{self, Table},
    spreadsheet,
};

const DEFAULT_SHEET: &str = "Sheet1";
const LOCK_FILE_PREFIX: &str = "~$";

/// Where and how the merged table is written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MergeOutput {
    Csv(PathBuf),
    Workbook { path: PathBuf, sheet: String },
}

impl MergeOutput {
    /// `.csv` destinations stay CSV; anything else becomes an `.xlsx` workbook.
    pub fn resolve(out: &str, sheet: &str) -> crate::error::Result<Self> {
        let out = out.trim();
        if out.is_empty() {
            return Err(IngestError::InvalidOption("--out cannot be empty".to_string()));
        }
        if out.to_ascii_lowercase().ends_with(".csv") {
            return Ok(MergeOutput::Csv(PathBuf::from(out)));
        }
        let path = if out.to_ascii_lowercase().ends_with(".xlsx") {
            PathBuf::from(out)
        } else {
            PathBuf::from(format!("{out}.xlsx"))
        };
        let sheet = match sheet.trim() {
            "" => DEFAULT_SHEET.to_string(),
            name => name.to_string(),
        };
        Ok(MergeOutput::Workbook { path, sheet })
    }

    pub fn path(&self) -> &Path {
        match self {
            MergeOutput::Csv(path) => path.as_path(),
            MergeOutput::Workbook { path, .. } => path.as_path(),
        }
    }
}

/// Regular files in `folder` whose extension matches, minus Office lock files,
/// sorted by path.
pub fn list_files_by_extension(
    folder: &Path,
    extension: &str,
) -> crate::error::Result<Vec<PathBuf>> {
    let access_error = |source: std::io::Error| IngestError::InputAccess {
        path: folder.to_path_buf(),
        source,
    };
    let mut paths = Vec::new();
    for entry in fs::read_dir(folder).map_err(access_error)? {
        let entry = entry.map_err(access_error)?;
        if entry.file_type().map_err(access_error)?.is_dir() {
            continue;
        }
        let name = entry.file_name();
        if name.to_string_lossy().starts_with(LOCK_FILE_PREFIX) {
            continue;
        }
        let path = entry.path();
        if io_utils::has_extension(&path, extension) {
            paths.push(path);
        }
    }
    paths.sort();
    Ok(paths)
}

/// Appends `rows` to `merged`, dropping the first row unless `keep_header`.
/// Rows with no cells or only empty cells are skipped.
pub fn append_rows(merged: &mut Table, rows: Table, keep_header: bool) -> usize {
    let before = merged.len();
    merged.extend(
        rows.into_iter()
            .skip(if keep_header { 0 } else { 1 })
            .filter(|row| row.iter().any(|cell| !cell.is_empty())),
    );
    merged.len() - before
}

pub fn execute(args: &MergeArgs) -> Result<()> {
    let metadata = fs::metadata(&args.folder).map_err(|source| IngestError::InputAccess {
        path: args.folder.clone(),
        source,
    })?;
    if !metadata.is_dir() {
        return Err(IngestError::NotADirectory(args.folder.clone()).into());
    }

    let extension = args.filetype.extension();
    let files = list_files_by_extension(&args.folder, extension)?;
    if files.is_empty() {
        return Err(IngestError::NoInputFiles {
            folder: args.folder.clone(),
            extension: extension.to_string(),
        }
        .into());
    }
    let output = MergeOutput::resolve(&args.out, &args.sheet)?;
    let encoding = io_utils::resolve_encoding(args.input_encoding.as_deref())?;
    let delimiter = args.delimiter.unwrap_or(io_utils::DEFAULT_CSV_DELIMITER);
    info!(
        "Merging {} '.{}' file(s) from '{}' -> '{}'",
        files.len(),
        extension,
        args.folder.display(),
        output.path().display()
    );

    let mut merged: Table = Vec::new();
    let mut header_pending = true;
    for path in &files {
        let rows = match args.filetype {
            FileType::Xlsx => spreadsheet::read_first_sheet(path),
            FileType::Csv => io_utils::read_all_rows(
                path,
                io_utils::resolve_input_delimiter(path, args.delimiter),
                encoding,
            ),
        }
        .with_context(|| format!("Reading rows from {path:?}"))?;
        if rows.is_empty() {
            debug!("Skipping empty file {path:?}");
            continue;
        }
        let appended = append_rows(&mut merged, rows, header_pending);
        header_pending = false;
        debug!("Appended {appended} row(s) from {path:?}");
    }

    let written = match &output {
        MergeOutput::Csv(path) => io_utils::write_all_rows(path, delimiter, &merged),
        MergeOutput::Workbook { path, sheet } => spreadsheet::write_sheet(path, sheet, &merged),
    };
    written.with_context(|| format!("Writing merged output to {:?}", output.path()))?;

    info!(
        "Merged {} file(s) ({} row(s)) into {:?}",
        files.len(),
        merged.len(),
        output.path()
    );
    Ok(())
}
