//! Participant table loading
//!
//! Spreadsheets (`.xlsx`, `.xlsm`, `.xls`, `.ods`) are read through calamine,
//! `.csv` through the csv crate. Both end up as a [`Table`]: one header row and
//! untyped cells addressed by header name.

use crate::config::{ColumnNames, PipelineVariant};
use crate::error::{Error, Result};
use calamine::{open_workbook_auto, Data, Reader};
use chrono::NaiveDateTime;
use std::path::Path;

/// A single cell, with just enough typing to format dates and identifiers
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Empty,
    Text(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    DateTime(NaiveDateTime),
}

impl CellValue {
    /// Text content, `None` for non-text or blank cells
    pub fn as_text(&self) -> Option<&str> {
        match self {
            CellValue::Text(s) if !s.trim().is_empty() => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    /// String rendering used for identifiers and names.
    ///
    /// Integral floats drop their fractional part, since spreadsheets store
    /// every number as a float.
    pub fn display(&self) -> Option<String> {
        match self {
            CellValue::Empty => None,
            CellValue::Text(s) => {
                let trimmed = s.trim();
                (!trimmed.is_empty()).then(|| trimmed.to_string())
            }
            CellValue::Int(i) => Some(i.to_string()),
            CellValue::Float(f) if f.fract() == 0.0 && f.abs() < 1e15 => {
                Some(format!("{}", *f as i64))
            }
            CellValue::Float(f) => Some(f.to_string()),
            CellValue::Bool(b) => Some(b.to_string()),
            CellValue::DateTime(dt) => Some(dt.to_string()),
        }
    }

    fn from_calamine(data: &Data) -> Self {
        match data {
            Data::Empty | Data::Error(_) => CellValue::Empty,
            Data::String(s) => CellValue::Text(s.clone()),
            Data::Int(i) => CellValue::Int(*i),
            Data::Float(f) => CellValue::Float(*f),
            Data::Bool(b) => CellValue::Bool(*b),
            Data::DateTime(dt) => match dt.as_datetime() {
                Some(parsed) => CellValue::DateTime(parsed),
                None => CellValue::Float(dt.as_f64()),
            },
            Data::DateTimeIso(s) | Data::DurationIso(s) => CellValue::Text(s.clone()),
        }
    }

    fn from_csv(field: &str) -> Self {
        if field.trim().is_empty() {
            CellValue::Empty
        } else {
            CellValue::Text(field.to_string())
        }
    }
}

/// Header row plus data rows, in file order
#[derive(Debug, Clone, Default)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<CellValue>>,
}

impl Table {
    /// Position of the column named `name`
    pub fn column(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// Fail unless every header in `required` is present
    pub fn require_columns(&self, required: &[&str]) -> Result<()> {
        let missing: Vec<String> = required
            .iter()
            .filter(|name| self.column(name).is_none())
            .map(|name| name.to_string())
            .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(Error::MissingColumns {
                missing,
                found: self.headers.clone(),
            })
        }
    }

    /// Project rows onto participant records.
    ///
    /// Required columns are checked first; optional columns that are absent
    /// from the header simply yield empty values.
    pub fn participants(
        &self,
        columns: &ColumnNames,
        variant: PipelineVariant,
    ) -> Result<Vec<ParticipantRecord>> {
        self.require_columns(&columns.required(variant))?;

        let identifier = self.column(&columns.identifier);
        let last_name = self.column(&columns.last_name);
        let first_name = self.column(&columns.first_name);
        let registration_date = self.column(&columns.registration_date);
        let mission_type = self.column(&columns.mission_type);
        let mission = self.column(&columns.mission);

        let cell = |row: &[CellValue], idx: Option<usize>| -> CellValue {
            idx.and_then(|i| row.get(i).cloned())
                .unwrap_or(CellValue::Empty)
        };

        Ok(self
            .rows
            .iter()
            .enumerate()
            // Header is row 1, data starts at row 2
            .map(|(i, row)| ParticipantRecord {
                row: i + 2,
                identifier: cell(row, identifier).display(),
                last_name: cell(row, last_name).display().unwrap_or_default(),
                first_name: cell(row, first_name).display().unwrap_or_default(),
                registration_date: cell(row, registration_date),
                mission_type: cell(row, mission_type),
                mission: cell(row, mission).display(),
            })
            .collect())
    }
}

/// One participant, as read from the table
#[derive(Debug, Clone, PartialEq)]
pub struct ParticipantRecord {
    /// 1-indexed spreadsheet row, for diagnostics
    pub row: usize,
    pub identifier: Option<String>,
    pub last_name: String,
    pub first_name: String,
    pub registration_date: CellValue,
    /// Kept untyped: a non-text mission type falls back like a missing one
    pub mission_type: CellValue,
    pub mission: Option<String>,
}

/// Load a table, dispatching on the file extension
pub fn read_table<P: AsRef<Path>>(path: P) -> Result<Table> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(Error::TableNotFound {
            path: path.display().to_string(),
        });
    }

    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());

    match extension.as_deref() {
        Some("csv") => read_csv(path),
        Some("xlsx" | "xlsm" | "xlsb" | "xls" | "ods") => read_spreadsheet(path),
        _ => Err(Error::UnsupportedTable {
            path: path.display().to_string(),
        }),
    }
}

/// Read the first worksheet of a spreadsheet
fn read_spreadsheet(path: &Path) -> Result<Table> {
    let mut workbook = open_workbook_auto(path)?;
    let range = match workbook.worksheet_range_at(0) {
        Some(range) => range?,
        None => {
            return Err(Error::EmptyTable {
                path: path.display().to_string(),
            })
        }
    };

    let mut rows = range.rows();
    let headers = rows
        .next()
        .ok_or_else(|| Error::EmptyTable {
            path: path.display().to_string(),
        })?
        .iter()
        .map(|cell| match cell {
            Data::String(s) => s.trim().to_string(),
            other => other.to_string().trim().to_string(),
        })
        .collect();

    let rows = rows
        .map(|row| row.iter().map(CellValue::from_calamine).collect::<Vec<_>>())
        .filter(|row| row.iter().any(|cell| !cell.is_empty()))
        .collect();

    Ok(Table { headers, rows })
}

fn read_csv(path: &Path) -> Result<Table> {
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_path(path)?;

    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.trim_start_matches('\u{feff}').trim().to_string())
        .collect();

    if headers.iter().all(|h| h.is_empty()) {
        return Err(Error::EmptyTable {
            path: path.display().to_string(),
        });
    }

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        let row: Vec<CellValue> = record.iter().map(CellValue::from_csv).collect();
        if row.iter().any(|cell| !cell.is_empty()) {
            rows.push(row);
        }
    }

    Ok(Table { headers, rows })
}
