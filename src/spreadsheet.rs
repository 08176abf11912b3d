use std::path::Path;

use calamine::{DataType, Reader, Xlsx, open_workbook};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime, TimeDelta};
use rust_xlsxwriter::Workbook;

use crate::{
    error::{IngestError, Result},
    io_utils::Table,
};

/// Excel's per-sheet limits.
const MAX_SHEET_ROWS: usize = 1_048_576;
const MAX_SHEET_COLUMNS: usize = 16_384;

/// Reads the first worksheet of an `.xlsx` workbook as text rows.
///
/// Trailing empty cells are dropped from each row, matching how spreadsheet
/// applications report row extents.
pub fn read_first_sheet(path: &Path) -> Result<Table> {
    let workbook_error = |source: calamine::XlsxError| IngestError::Workbook {
        path: path.to_path_buf(),
        source,
    };
    let mut workbook: Xlsx<_> = open_workbook(path).map_err(workbook_error)?;
    let first = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| IngestError::MissingSheet {
            path: path.to_path_buf(),
        })?;
    let range = workbook
        .worksheet_range(&first)
        .ok_or_else(|| IngestError::MissingSheet {
            path: path.to_path_buf(),
        })?
        .map_err(workbook_error)?;

    let rows = range
        .rows()
        .map(|row| {
            let mut cells = row.iter().map(cell_to_string).collect::<Vec<_>>();
            while cells.last().is_some_and(String::is_empty) {
                cells.pop();
            }
            cells
        })
        .collect();
    Ok(rows)
}

fn cell_to_string(cell: &DataType) -> String {
    match cell {
        DataType::String(value) => value.clone(),
        DataType::Float(value) => value.to_string(),
        DataType::Int(value) => value.to_string(),
        DataType::Bool(value) => value.to_string(),
        DataType::DateTime(serial) => excel_serial_to_datetime(*serial)
            .map(render_datetime)
            .unwrap_or_else(|| serial.to_string()),
        DataType::DateTimeIso(value) | DataType::DurationIso(value) => value.clone(),
        DataType::Empty => String::new(),
        other => other.to_string(),
    }
}

/// Dates render as `YYYY-MM-DD`; the time is appended only when it is not midnight.
fn render_datetime(value: NaiveDateTime) -> String {
    if value.time() == NaiveTime::MIN {
        value.format("%Y-%m-%d").to_string()
    } else {
        value.format("%Y-%m-%d %H:%M:%S").to_string()
    }
}

/// Converts a 1900-system serial date. Serials below 60 predate Excel's
/// phantom 1900-02-29 and use a base one day later.
fn excel_serial_to_datetime(serial: f64) -> Option<NaiveDateTime> {
    if !serial.is_finite() || serial < 0.0 {
        return None;
    }
    let base = if serial < 60.0 {
        NaiveDate::from_ymd_opt(1899, 12, 31)?
    } else {
        NaiveDate::from_ymd_opt(1899, 12, 30)?
    };
    let seconds = (serial * 86_400.0).round();
    if seconds > i64::MAX as f64 {
        return None;
    }
    base.and_time(NaiveTime::MIN)
        .checked_add_signed(TimeDelta::try_seconds(seconds as i64)?)
}

/// Writes `rows` into a single worksheet named `sheet` at `path`.
pub fn write_sheet(path: &Path, sheet: &str, rows: &[Vec<String>]) -> Result<()> {
    let write_error = |source: rust_xlsxwriter::XlsxError| IngestError::WorkbookWrite {
        path: path.to_path_buf(),
        source,
    };
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(sheet).map_err(write_error)?;

    for (row_idx, row) in rows.iter().enumerate() {
        for (col_idx, cell) in row.iter().enumerate() {
            if row_idx >= MAX_SHEET_ROWS || col_idx >= MAX_SHEET_COLUMNS {
                return Err(IngestError::SheetBounds {
                    path: path.to_path_buf(),
                    row: row_idx + 1,
                    column: col_idx + 1,
                });
            }
            worksheet
                .write_string(row_idx as u32, col_idx as u16, cell)
                .map_err(write_error)?;
        }
    }

    workbook.save(path).map_err(write_error)?;
    Ok(())
}
