//! Row source: turns raw file bytes into a sequence of header-keyed row
//! maps.
//!
//! Dispatch is by file extension: `csv` goes through the csv crate with
//! the first record as header; `xlsx`/`xls` read sheet zero via calamine,
//! again header-driven. The sequence is finite, single-pass, and not
//! restartable -- the underlying bytes are consumed once.

use std::io::Cursor;

use calamine::{open_workbook_auto_from_rs, Data, Reader};

use rollcall_core::bulk_import::{CSV_EXTENSIONS, SHEET_EXTENSIONS};
use rollcall_core::row_fields::RowMap;

use crate::error::PipelineError;

/// Lowercased extension of a file name, empty when there is none.
pub fn extension_of(file_name: &str) -> String {
    match file_name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => ext.to_lowercase(),
        _ => String::new(),
    }
}

enum SourceKind {
    Csv {
        headers: Vec<String>,
        records: csv::StringRecordsIntoIter<Cursor<Vec<u8>>>,
    },
    Sheet {
        headers: Vec<String>,
        rows: std::vec::IntoIter<Vec<Data>>,
    },
}

/// A lazy, finite, single-pass sequence of row maps.
pub struct RowSource {
    file_name: String,
    kind: SourceKind,
}

impl std::fmt::Debug for RowSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let kind = match &self.kind {
            SourceKind::Csv { .. } => "Csv",
            SourceKind::Sheet { .. } => "Sheet",
        };
        f.debug_struct("RowSource")
            .field("file_name", &self.file_name)
            .field("kind", &kind)
            .finish()
    }
}

impl RowSource {
    /// Open a source for `bytes`, dispatching on the extension of
    /// `file_name`. Fails fast with [`PipelineError::UnsupportedFileType`]
    /// for anything that is not csv/xlsx/xls.
    pub fn open(file_name: &str, bytes: Vec<u8>) -> Result<Self, PipelineError> {
        let extension = extension_of(file_name);
        let kind = if CSV_EXTENSIONS.contains(&extension.as_str()) {
            open_csv(file_name, bytes)?
        } else if SHEET_EXTENSIONS.contains(&extension.as_str()) {
            open_sheet(file_name, bytes)?
        } else {
            return Err(PipelineError::UnsupportedFileType(extension));
        };
        Ok(Self {
            file_name: file_name.to_string(),
            kind,
        })
    }

    /// The headers found in the first row. Blank headers keep their
    /// position but never key a row cell.
    pub fn headers(&self) -> &[String] {
        match &self.kind {
            SourceKind::Csv { headers, .. } => headers,
            SourceKind::Sheet { headers, .. } => headers,
        }
    }
}

impl Iterator for RowSource {
    type Item = Result<RowMap, PipelineError>;

    fn next(&mut self) -> Option<Self::Item> {
        match &mut self.kind {
            SourceKind::Csv { headers, records } => match records.next()? {
                Ok(record) => {
                    let mut row = RowMap::new();
                    for (i, header) in headers.iter().enumerate() {
                        if header.is_empty() {
                            continue;
                        }
                        let value = record.get(i).unwrap_or("");
                        row.insert(header.clone(), value.to_string());
                    }
                    Some(Ok(row))
                }
                Err(e) => {
                    let file = self.file_name.clone();
                    Some(Err(PipelineError::Parse {
                        file,
                        message: e.to_string(),
                    }))
                }
            },
            SourceKind::Sheet { headers, rows } => {
                let cells = rows.next()?;
                let mut row = RowMap::new();
                for (i, header) in headers.iter().enumerate() {
                    if header.is_empty() {
                        continue;
                    }
                    let value = cells.get(i).map(cell_to_string).unwrap_or_default();
                    row.insert(header.clone(), value);
                }
                Some(Ok(row))
            }
        }
    }
}

fn open_csv(file_name: &str, bytes: Vec<u8>) -> Result<SourceKind, PipelineError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(Cursor::new(bytes));

    let headers = reader
        .headers()
        .map_err(|e| PipelineError::Parse {
            file: file_name.to_string(),
            message: e.to_string(),
        })?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    Ok(SourceKind::Csv {
        headers,
        records: reader.into_records(),
    })
}

fn open_sheet(file_name: &str, bytes: Vec<u8>) -> Result<SourceKind, PipelineError> {
    let parse_error = |message: String| PipelineError::Parse {
        file: file_name.to_string(),
        message,
    };

    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes))
        .map_err(|e| parse_error(e.to_string()))?;

    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| parse_error("workbook has no sheets".to_string()))?
        .map_err(|e| parse_error(e.to_string()))?;

    let mut rows = range.rows();
    let headers: Vec<String> = rows
        .next()
        .map(|cells| cells.iter().map(|c| cell_to_string(c).trim().to_string()).collect())
        .unwrap_or_default();
    let data_rows: Vec<Vec<Data>> = rows.map(<[Data]>::to_vec).collect();

    Ok(SourceKind::Sheet {
        headers,
        rows: data_rows.into_iter(),
    })
}

/// Render a sheet cell the way it reads in the file. Whole floats lose the
/// trailing `.0` spreadsheet tools add to numeric-looking text columns.
fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        Data::Float(f) if f.fract() == 0.0 => format!("{}", *f as i64),
        other => other.to_string(),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
