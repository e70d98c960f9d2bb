use std::collections::HashSet;
use std::io::Cursor;
use std::path::Path;

use anyhow::Context;
use calamine::{open_workbook_from_rs, Data, Reader, Xlsx};

use super::model::{is_missing_token, Column, Dataset};
use crate::error::{InsightError, Result};

// ---------------------------------------------------------------------------
// Declared upload format
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    Csv,
    Xlsx,
}

impl SourceFormat {
    /// Dispatch by extension, case-insensitively.
    pub fn from_file_name(name: &str) -> Result<Self> {
        let ext = Path::new(name)
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_ascii_lowercase();

        match ext.as_str() {
            "csv" => Ok(SourceFormat::Csv),
            "xlsx" => Ok(SourceFormat::Xlsx),
            other => Err(InsightError::format(format!(
                "unsupported file extension: .{other}"
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Load a dataset from a file on disk.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`  – header row followed by equally sized records
/// * `.xlsx` – first worksheet, first row is the header
pub fn load_file(path: &Path) -> anyhow::Result<Dataset> {
    let name = path.to_string_lossy();
    let format = SourceFormat::from_file_name(&name)?;
    let bytes = std::fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    let dataset = load_bytes(&bytes, format)
        .with_context(|| format!("parsing {}", path.display()))?;
    Ok(dataset)
}

/// Parse an uploaded byte stream into a [`Dataset`].
pub fn load_bytes(bytes: &[u8], format: SourceFormat) -> Result<Dataset> {
    let (headers, rows) = match format {
        SourceFormat::Csv => read_csv(bytes)?,
        SourceFormat::Xlsx => read_xlsx(bytes)?,
    };
    let dataset = build_dataset(headers, rows)?;
    log::debug!(
        "parsed {:?} upload: {} rows x {} columns",
        format,
        dataset.n_rows(),
        dataset.n_cols()
    );
    Ok(dataset)
}

type RawRows = Vec<Vec<Option<String>>>;

// ---------------------------------------------------------------------------
// CSV reader
// ---------------------------------------------------------------------------

fn read_csv(bytes: &[u8]) -> Result<(Vec<String>, RawRows)> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(bytes);

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| InsightError::format(format!("reading CSV header: {e}")))?
        .iter()
        .map(|h| h.to_string())
        .collect();
    if headers.is_empty() {
        return Err(InsightError::format("no header row"));
    }

    let mut rows = Vec::new();
    for (row_no, result) in reader.records().enumerate() {
        let record =
            result.map_err(|e| InsightError::format(format!("CSV row {row_no}: {e}")))?;
        rows.push(record.iter().map(raw_cell).collect());
    }
    Ok((headers, rows))
}

fn raw_cell(s: &str) -> Option<String> {
    (!is_missing_token(s)).then(|| s.to_string())
}

// ---------------------------------------------------------------------------
// XLSX reader
// ---------------------------------------------------------------------------

fn read_xlsx(bytes: &[u8]) -> Result<(Vec<String>, RawRows)> {
    let mut workbook: Xlsx<_> = open_workbook_from_rs(Cursor::new(bytes))
        .map_err(|e| InsightError::format(format!("reading workbook: {e}")))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| InsightError::format("workbook has no worksheets"))?
        .map_err(|e| InsightError::format(format!("reading first worksheet: {e}")))?;

    let mut sheet_rows = range.rows();
    let headers: Vec<String> = sheet_rows
        .next()
        .ok_or_else(|| InsightError::format("worksheet is empty"))?
        .iter()
        .map(|cell| xlsx_cell(cell).unwrap_or_default())
        .collect();

    let rows = sheet_rows
        .map(|row| row.iter().map(xlsx_cell).collect())
        .collect();
    Ok((headers, rows))
}

fn xlsx_cell(cell: &Data) -> Option<String> {
    match cell {
        Data::Empty | Data::Error(_) => None,
        Data::String(s) => raw_cell(s),
        Data::Float(f) => Some(f.to_string()),
        Data::Int(i) => Some(i.to_string()),
        Data::Bool(b) => Some(b.to_string()),
        other => Some(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Shared: header clean-up and per-column type inference
// ---------------------------------------------------------------------------

fn build_dataset(headers: Vec<String>, rows: RawRows) -> Result<Dataset> {
    let width = headers.len();
    let mut raw_columns: Vec<Vec<Option<String>>> = vec![Vec::with_capacity(rows.len()); width];
    for (row_no, row) in rows.into_iter().enumerate() {
        if row.len() != width {
            return Err(InsightError::format(format!(
                "row {row_no} has {} fields, header has {width}",
                row.len()
            )));
        }
        for (col, cell) in raw_columns.iter_mut().zip(row) {
            col.push(cell);
        }
    }

    let columns = unique_names(headers)
        .into_iter()
        .zip(raw_columns)
        .map(|(name, raw)| Column::infer(name, raw))
        .collect();
    Dataset::new(columns)
}

/// Blank names become `Unnamed: <i>`; repeats get `.1`, `.2`, … suffixes.
fn unique_names(headers: Vec<String>) -> Vec<String> {
    let mut seen: HashSet<String> = HashSet::new();
    headers
        .into_iter()
        .enumerate()
        .map(|(i, h)| {
            let base = if h.trim().is_empty() {
                format!("Unnamed: {i}")
            } else {
                h
            };
            let mut name = base.clone();
            let mut suffix = 1;
            while seen.contains(&name) {
                name = format!("{base}.{suffix}");
                suffix += 1;
            }
            seen.insert(name.clone());
            name
        })
        .collect()
}
