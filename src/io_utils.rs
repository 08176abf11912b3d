//! Reading and writing whole tables at the file boundary.
//!
//! The normalize and merge pipelines never touch the filesystem directly; they
//! exchange `Vec<Vec<String>>` tables with this module:
//!
//! - **Delimiter resolution**: `.tsv` inputs default to tab, everything else to
//!   comma, with manual override support.
//! - **Encoding**: input bytes are decoded via `encoding_rs`, defaulting to UTF-8.
//! - **Ragged rows**: readers are flexible, so rows may be shorter or longer
//!   than the header row.
//! - **Spreadsheets**: `.xlsx` paths are routed through [`crate::spreadsheet`].
//! - **Atomic-ish output**: rows are serialized into memory before the
//!   destination file is created, so a failed run leaves no file behind.

use std::{
    fs,
    io::Read,
    path::{Path, PathBuf},
};

use encoding_rs::{Encoding, UTF_8};

use crate::{
    error::{IngestError, Result},
    spreadsheet,
};

pub const DEFAULT_CSV_DELIMITER: u8 = b',';
pub const DEFAULT_TSV_DELIMITER: u8 = b'\t';

pub type Table = Vec<Vec<String>>;

pub fn resolve_encoding(label: Option<&str>) -> Result<&'static Encoding> {
    if let Some(value) = label {
        Encoding::for_label(value.trim().as_bytes())
            .ok_or_else(|| IngestError::InvalidOption(format!("Unknown encoding '{value}'")))
    } else {
        Ok(UTF_8)
    }
}

pub fn resolve_input_delimiter(path: &Path, provided: Option<u8>) -> u8 {
    provided.unwrap_or_else(|| {
        if has_extension(path, "tsv") {
            DEFAULT_TSV_DELIMITER
        } else {
            DEFAULT_CSV_DELIMITER
        }
    })
}

pub fn has_extension(path: &Path, extension: &str) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case(extension))
}

pub fn open_csv_reader<R>(reader: R, delimiter: u8) -> csv::Reader<R>
where
    R: Read,
{
    let mut builder = csv::ReaderBuilder::new();
    builder
        .has_headers(false)
        .delimiter(delimiter)
        .double_quote(true)
        .flexible(true);
    builder.from_reader(reader)
}

/// Reads every row of `path`, header included as row 0.
///
/// Quoting is checked before parsing, because the csv reader would otherwise
/// fold an unterminated quote into one giant cell.
pub fn read_all_rows(path: &Path, delimiter: u8, encoding: &'static Encoding) -> Result<Table> {
    if has_extension(path, "xlsx") {
        return spreadsheet::read_first_sheet(path);
    }
    let bytes = fs::read(path).map_err(|source| IngestError::InputAccess {
        path: path.to_path_buf(),
        source,
    })?;
    check_quoting(&bytes, delimiter).map_err(|fault| IngestError::MalformedQuoting {
        path: path.to_path_buf(),
        row: fault.row,
        reason: fault.reason,
    })?;

    let mut reader = open_csv_reader(bytes.as_slice(), delimiter);
    let mut rows = Vec::new();
    for (idx, record) in reader.byte_records().enumerate() {
        let record = record.map_err(|source| IngestError::MalformedInput {
            path: path.to_path_buf(),
            source,
        })?;
        let decoded = decode_record(&record, encoding).ok_or_else(|| IngestError::Decode {
            path: path.to_path_buf(),
            row: idx + 1,
            encoding: encoding.name(),
        })?;
        rows.push(decoded);
    }
    Ok(rows)
}

/// Where and why [`check_quoting`] rejected its input. `row` is 1-based and
/// counts records, not physical lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuoteFault {
    pub row: usize,
    pub reason: &'static str,
}

#[derive(Clone, Copy)]
enum QuoteState {
    FieldStart,
    Unquoted,
    Quoted,
    QuoteInQuoted,
}

/// Rejects an open quoted field at end of input, a `"` inside an unquoted
/// field, and anything other than a delimiter or line end after a closing quote.
pub fn check_quoting(bytes: &[u8], delimiter: u8) -> std::result::Result<(), QuoteFault> {
    let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
    let mut state = QuoteState::FieldStart;
    let mut row = 1usize;

    for &byte in bytes {
        state = match (state, byte) {
            (QuoteState::Quoted, b'"') => QuoteState::QuoteInQuoted,
            (QuoteState::Quoted, _) => QuoteState::Quoted,
            (QuoteState::QuoteInQuoted, b'"') => QuoteState::Quoted,
            (_, b'\n') => {
                row += 1;
                QuoteState::FieldStart
            }
            (_, b'\r') => QuoteState::FieldStart,
            (_, byte) if byte == delimiter => QuoteState::FieldStart,
            (QuoteState::FieldStart, b'"') => QuoteState::Quoted,
            (QuoteState::Unquoted, b'"') => {
                return Err(QuoteFault {
                    row,
                    reason: "quote inside an unquoted field",
                });
            }
            (QuoteState::QuoteInQuoted, _) => {
                return Err(QuoteFault {
                    row,
                    reason: "unexpected character after a closing quote",
                });
            }
            (QuoteState::FieldStart | QuoteState::Unquoted, _) => QuoteState::Unquoted,
        };
    }

    match state {
        QuoteState::Quoted => Err(QuoteFault {
            row,
            reason: "quoted field is never closed",
        }),
        _ => Ok(()),
    }
}

pub fn decode_bytes(bytes: &[u8], encoding: &'static Encoding) -> Option<String> {
    let (text, _, had_errors) = encoding.decode(bytes);
    if had_errors {
        None
    } else {
        Some(text.into_owned())
    }
}

pub fn decode_record(record: &csv::ByteRecord, encoding: &'static Encoding) -> Option<Vec<String>> {
    record
        .iter()
        .map(|field| decode_bytes(field, encoding))
        .collect()
}

/// Serializes `rows` with `delimiter` and writes them to `path` in one step.
pub fn write_all_rows(path: &Path, delimiter: u8, rows: &[Vec<String>]) -> Result<()> {
    let write_error = |source: std::io::Error| IngestError::OutputWrite {
        path: path.to_path_buf(),
        source,
    };
    let mut builder = csv::WriterBuilder::new();
    builder
        .delimiter(delimiter)
        .double_quote(true)
        .flexible(true);
    let mut writer = builder.from_writer(Vec::new());
    for row in rows {
        writer
            .write_record(row)
            .map_err(|err| write_error(err.into()))?;
    }
    let buffer = writer
        .into_inner()
        .map_err(|err| write_error(err.into_error()))?;
    fs::write(path, buffer).map_err(write_error)
}

/// `<stem>_normalized.csv` next to the input file.
pub fn default_output_path(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output".to_string());
    input.with_file_name(format!("{stem}_normalized.csv"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tsv_extension_selects_tab() {
        assert_eq!(resolve_input_delimiter(Path::new("a.TSV"), None), b'\t');
        assert_eq!(resolve_input_delimiter(Path::new("a.csv"), None), b',');
        assert_eq!(resolve_input_delimiter(Path::new("a.tsv"), Some(b';')), b';');
    }

    #[test]
    fn output_path_stays_beside_input() {
        assert_eq!(
            default_output_path(Path::new("exports/june.csv")),
            PathBuf::from("exports/june_normalized.csv")
        );
        assert_eq!(
            default_output_path(Path::new("ledger")),
            PathBuf::from("ledger_normalized.csv")
        );
    }

    #[test]
    fn quoting_accepts_escapes_and_embedded_newlines() {
        assert_eq!(check_quoting(b"a,b\r\n\"x \"\"y\"\"\",\"1\n2\"\r\n", b','), Ok(()));
        assert_eq!(check_quoting(b"\xEF\xBB\xBF\"id\"\n1\n", b','), Ok(()));
        assert_eq!(check_quoting(b"a\t\"b\tc\"\n", b'\t'), Ok(()));
        assert_eq!(check_quoting(b"", b','), Ok(()));
    }

    #[test]
    fn quote_faults_report_the_record_row() {
        let fault = check_quoting(b"id,name\n1,\"Ann\n2,Bob\n", b',').unwrap_err();
        assert_eq!(fault.row, 2);
        assert_eq!(fault.reason, "quoted field is never closed");

        let fault = check_quoting(b"a,\"multi\nline\"\n1,An\"n\n", b',').unwrap_err();
        assert_eq!(fault.row, 2);
        assert_eq!(fault.reason, "quote inside an unquoted field");
    }

    #[test]
    fn unknown_encoding_is_rejected() {
        assert!(resolve_encoding(Some("not-a-charset")).is_err());
        assert_eq!(resolve_encoding(Some("latin1")).unwrap().name(), "windows-1252");
    }
}
