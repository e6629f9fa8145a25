//! Tests for the assay calculators
//!
//! Shared dataset builders for the TNS and Zeta Potential layouts.

pub mod tns_tests;

use crate::models::{Cell, TabularDataset};

/// Twelve-column TNS header: id, 3 treatment, 4 unused, 4 control
pub fn tns_columns() -> Vec<String> {
    let mut columns = vec!["Formulation".to_string()];
    columns.extend((1..=3).map(|i| format!("Rep {i}")));
    columns.extend((4..=7).map(|i| format!("Blank {i}")));
    columns.extend((1..=4).map(|i| format!("Control {i}")));
    columns
}

/// One TNS row from an id, three treatment and four control readings
pub fn tns_row(id: &str, treatment: [f64; 3], control: [f64; 4]) -> Vec<Cell> {
    let mut row = vec![Cell::Text(id.to_string())];
    row.extend(treatment.iter().map(|v| Cell::Number(*v)));
    row.extend(std::iter::repeat_n(Cell::Missing, 4));
    row.extend(control.iter().map(|v| Cell::Number(*v)));
    row
}

pub fn tns_dataset(rows: Vec<Vec<Cell>>) -> TabularDataset {
    TabularDataset::new(tns_columns(), rows)
}

/// Zeta Potential dataset from (sample name, reading) pairs
pub fn zeta_dataset(rows: Vec<(Cell, Cell)>) -> TabularDataset {
    TabularDataset::new(
        vec![
            "Sample Name".to_string(),
            "Measurement Type".to_string(),
            "Zeta Potential (mV)".to_string(),
        ],
        rows.into_iter()
            .map(|(sample, zeta)| vec![sample, Cell::Text("Zeta".to_string()), zeta])
            .collect(),
    )
}

pub fn text(s: &str) -> Cell {
    Cell::Text(s.to_string())
}

pub fn num(v: f64) -> Cell {
    Cell::Number(v)
}

/// The three standards used throughout: mean -12
pub fn standard_rows() -> Vec<(Cell, Cell)> {
    vec![
        (text("STD1"), num(-10.0)),
        (text("STD2"), num(-12.0)),
        (text("STD3"), num(-14.0)),
    ]
}

pub fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-12,
        "expected {expected}, got {actual}"
    );
}
