//! Tabular loading for uploaded assay exports.
//!
//! Reads comma-delimited text (through Polars) or the first worksheet of a
//! spreadsheet workbook (through calamine) into a [`TabularDataset`]. The
//! first row is always the header. Unsupported extensions are rejected here,
//! before anything looks at the content.

use crate::constants::{CSV_EXTENSIONS, SPREADSHEET_EXTENSIONS};
use crate::error::{AssayError, Result};
use crate::models::{Cell, TabularDataset};
use calamine::{Data, Reader, open_workbook_auto};
use polars::prelude::*;
use std::path::Path;
use tracing::debug;

/// Input encodings the loader understands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    Csv,
    Spreadsheet,
}

impl SourceFormat {
    /// Detect the format from the file extension (case-insensitive)
    pub fn from_path(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_ascii_lowercase();

        if CSV_EXTENSIONS.contains(&extension.as_str()) {
            Ok(SourceFormat::Csv)
        } else if SPREADSHEET_EXTENSIONS.contains(&extension.as_str()) {
            Ok(SourceFormat::Spreadsheet)
        } else {
            Err(AssayError::UnsupportedFormat {
                path: path.to_path_buf(),
                extension,
            })
        }
    }
}

/// Load an assay export. Dispatch by extension.
pub fn load_dataset(path: &Path) -> Result<TabularDataset> {
    let format = SourceFormat::from_path(path)?;

    let dataset = match format {
        SourceFormat::Csv => load_csv(path)?,
        SourceFormat::Spreadsheet => load_spreadsheet(path)?,
    };

    debug!(
        "Loaded {} ({:?}): {} columns, {} rows",
        path.display(),
        format,
        dataset.column_count(),
        dataset.row_count()
    );
    Ok(dataset)
}

// ---------------------------------------------------------------------------
// CSV
// ---------------------------------------------------------------------------

fn load_csv(path: &Path) -> Result<TabularDataset> {
    if std::fs::metadata(path)?.len() == 0 {
        return Err(AssayError::EmptyDataset {
            path: path.to_path_buf(),
        });
    }

    // Scan every row for type inference so a garbled reading late in a
    // column turns the column into text instead of failing the read.
    let df = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(None)
        .map_parse_options(|opts| opts.with_truncate_ragged_lines(true))
        .try_into_reader_with_file_path(Some(path.to_path_buf()))?
        .finish()?;

    dataset_from_frame(&df)
}

/// Convert a Polars frame into rows of cells
pub fn dataset_from_frame(df: &DataFrame) -> Result<TabularDataset> {
    let columns: Vec<String> = df
        .get_column_names()
        .into_iter()
        .map(|name| name.to_string())
        .collect();

    let mut rows: Vec<Vec<Cell>> = (0..df.height())
        .map(|_| Vec::with_capacity(columns.len()))
        .collect();

    for column in df.get_columns() {
        let cells = column_cells(column.as_materialized_series())?;
        for (row, cell) in rows.iter_mut().zip(cells) {
            row.push(cell);
        }
    }

    rows.retain(|row| !row.iter().all(Cell::is_missing));
    Ok(TabularDataset::new(columns, rows))
}

fn column_cells(series: &Series) -> Result<Vec<Cell>> {
    let cells = match series.dtype() {
        DataType::String => series.str()?.into_iter().map(text_cell).collect(),
        DataType::Null => vec![Cell::Missing; series.len()],
        DataType::Boolean => series
            .bool()?
            .into_iter()
            .map(|v| v.map_or(Cell::Missing, |b| Cell::Text(b.to_string())))
            .collect(),
        _ => {
            let floats = series.cast(&DataType::Float64)?;
            floats
                .f64()?
                .into_iter()
                .map(|v| v.map_or(Cell::Missing, Cell::Number))
                .collect()
        }
    };
    Ok(cells)
}

fn text_cell(value: Option<&str>) -> Cell {
    match value {
        Some(s) if !s.trim().is_empty() => Cell::Text(s.to_string()),
        _ => Cell::Missing,
    }
}

// ---------------------------------------------------------------------------
// Spreadsheet
// ---------------------------------------------------------------------------

fn load_spreadsheet(path: &Path) -> Result<TabularDataset> {
    let mut workbook = open_workbook_auto(path)?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| AssayError::EmptyDataset {
            path: path.to_path_buf(),
        })??;

    dataset_from_grid(path, range.rows())
}

/// Convert a worksheet grid (header row first) into a dataset
pub fn dataset_from_grid<'a>(
    path: &Path,
    mut rows: impl Iterator<Item = &'a [Data]>,
) -> Result<TabularDataset> {
    let header = rows.next().ok_or_else(|| AssayError::EmptyDataset {
        path: path.to_path_buf(),
    })?;

    let columns: Vec<String> = header
        .iter()
        .enumerate()
        .map(|(i, cell)| match spreadsheet_cell(cell).as_label() {
            Some(name) => name,
            None => format!("Unnamed: {i}"),
        })
        .collect();

    let rows: Vec<Vec<Cell>> = rows
        .map(|row| row.iter().map(spreadsheet_cell).collect::<Vec<_>>())
        .filter(|row| !row.iter().all(Cell::is_missing))
        .collect();

    Ok(TabularDataset::new(columns, rows))
}

fn spreadsheet_cell(value: &Data) -> Cell {
    match value {
        Data::Int(i) => Cell::Number(*i as f64),
        Data::Float(f) => Cell::Number(*f),
        Data::String(s) => text_cell(Some(s.as_str())),
        Data::Bool(b) => Cell::Text(b.to_string()),
        Data::Empty | Data::Error(_) => Cell::Missing,
        other => Cell::Text(other.to_string()),
    }
}
