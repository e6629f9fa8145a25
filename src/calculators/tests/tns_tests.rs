//! Tests for the TNS calculator

use super::*;
use crate::calculators::{AssayCalculator, RowFaultPolicy, TnsCalculator, engine};
use crate::config::TnsConfig;
use crate::error::AssayError;
use crate::models::AssayType;

#[test]
fn test_reference_formulation_row() {
    let dataset = tns_dataset(vec![tns_row(
        "F1",
        [10.0, 12.0, 14.0],
        [100.0, 100.0, 100.0, 100.0],
    )]);

    let calculation = engine::run(&TnsCalculator::default(), &dataset).unwrap();

    assert_eq!(calculation.assay, AssayType::Tns);
    assert_eq!(calculation.records.len(), 1);
    let record = &calculation.records[0];
    assert_eq!(record.formulation_id, "F1");
    assert_close(record.calculated_value, 0.12);
    assert!(!record.valid);
    assert!(calculation.skipped.is_empty());
    assert_eq!(calculation.control_mean, None);
}

#[test]
fn test_ratio_and_threshold_per_row() {
    let dataset = tns_dataset(vec![
        tns_row("F1", [300.0, 330.0, 360.0], [20.0, 30.0, 30.0, 20.0]),
        tns_row("F2", [250.0, 250.0, 250.0], [25.0, 25.0, 25.0, 25.0]),
        tns_row("F3", [50.0, 60.0, 70.0], [10.0, 10.0, 10.0, 10.0]),
    ]);

    let calculation = engine::run(&TnsCalculator::default(), &dataset).unwrap();
    let records = &calculation.records;

    assert_eq!(records.len(), 3);
    // 330 / 25
    assert_close(records[0].calculated_value, 13.2);
    assert!(records[0].valid);
    // Exactly 10 is not above the threshold
    assert_close(records[1].calculated_value, 10.0);
    assert!(!records[1].valid);
    assert_close(records[2].calculated_value, 6.0);
    assert!(!records[2].valid);
    assert_eq!(calculation.valid_count(), 1);
}

#[test]
fn test_every_row_yields_a_record_in_order() {
    let rows: Vec<_> = (0..5)
        .map(|i| tns_row(&format!("F{i}"), [1.0, 2.0, 3.0], [1.0, 1.0, 1.0, 1.0]))
        .collect();

    let calculation = engine::run(&TnsCalculator::default(), &tns_dataset(rows)).unwrap();

    let ids: Vec<&str> = calculation
        .records
        .iter()
        .map(|r| r.formulation_id.as_str())
        .collect();
    assert_eq!(ids, vec!["F0", "F1", "F2", "F3", "F4"]);
}

#[test]
fn test_numeric_formulation_id_is_rendered_as_label() {
    let mut row = tns_row("x", [1.0, 1.0, 1.0], [1.0, 1.0, 1.0, 1.0]);
    row[0] = num(1042.0);

    let calculation = engine::run(&TnsCalculator::default(), &tns_dataset(vec![row])).unwrap();
    assert_eq!(calculation.records[0].formulation_id, "1042");
}

#[test]
fn test_non_numeric_treatment_aborts_batch() {
    let mut bad = tns_row("F2", [1.0, 1.0, 1.0], [1.0, 1.0, 1.0, 1.0]);
    bad[2] = text("n/a");
    let dataset = tns_dataset(vec![
        tns_row("F1", [1.0, 1.0, 1.0], [1.0, 1.0, 1.0, 1.0]),
        bad,
    ]);

    match engine::run(&TnsCalculator::default(), &dataset) {
        Err(AssayError::RowFault {
            assay,
            line,
            column,
            reason,
        }) => {
            assert_eq!(assay, AssayType::Tns);
            assert_eq!(line, 3);
            assert_eq!(column, "Rep 2");
            assert!(reason.contains("n/a"));
        }
        other => panic!("Expected RowFault, got {:?}", other),
    }
}

#[test]
fn test_missing_control_cell_aborts_batch() {
    let mut bad = tns_row("F1", [1.0, 1.0, 1.0], [1.0, 1.0, 1.0, 1.0]);
    bad[11] = Cell::Missing;

    match engine::run(&TnsCalculator::default(), &tns_dataset(vec![bad])) {
        Err(AssayError::RowFault { column, reason, .. }) => {
            assert_eq!(column, "Control 4");
            assert_eq!(reason, "value is missing");
        }
        other => panic!("Expected RowFault, got {:?}", other),
    }
}

#[test]
fn test_zero_control_mean_aborts_batch() {
    let dataset = tns_dataset(vec![tns_row("F1", [1.0, 2.0, 3.0], [0.0, 0.0, 0.0, 0.0])]);

    match engine::run(&TnsCalculator::default(), &dataset) {
        Err(AssayError::RowFault { column, reason, .. }) => {
            assert_eq!(column, "Control 1..Control 4");
            assert!(reason.contains("zero"));
        }
        other => panic!("Expected RowFault, got {:?}", other),
    }
}

#[test]
fn test_missing_formulation_id_aborts_batch() {
    let mut bad = tns_row("F1", [1.0, 1.0, 1.0], [1.0, 1.0, 1.0, 1.0]);
    bad[0] = Cell::Missing;

    let result = engine::run(&TnsCalculator::default(), &tns_dataset(vec![bad]));
    assert!(matches!(
        result,
        Err(AssayError::RowFault { ref column, .. }) if column == "Formulation"
    ));
}

#[test]
fn test_narrow_dataset_is_schema_error() {
    let dataset = TabularDataset::new(
        vec!["Formulation".to_string(), "Rep 1".to_string()],
        vec![vec![text("F1"), num(1.0)]],
    );

    let result = engine::run(&TnsCalculator::default(), &dataset);
    assert!(matches!(
        result,
        Err(AssayError::Schema {
            assay: Some(AssayType::Tns),
            ..
        })
    ));
}

#[test]
fn test_skip_leading_rows() {
    let mut units = vec![text("units")];
    units.extend(std::iter::repeat_n(text("RFU"), 11));
    let dataset = tns_dataset(vec![
        units,
        tns_row("F1", [10.0, 12.0, 14.0], [100.0, 100.0, 100.0, 100.0]),
    ]);

    // Without skipping, the units row is a numeric fault
    assert!(engine::run(&TnsCalculator::default(), &dataset).is_err());

    let config = TnsConfig {
        skip_leading_rows: 1,
        ..Default::default()
    };
    let calculation = engine::run(&TnsCalculator::new(config), &dataset).unwrap();
    assert_eq!(calculation.records.len(), 1);
    assert_eq!(calculation.records[0].formulation_id, "F1");
}

#[test]
fn test_declared_policy() {
    assert_eq!(
        TnsCalculator::default().row_fault_policy(),
        RowFaultPolicy::AbortOnRowFault
    );
}

#[test]
fn test_overflowing_ratio_aborts_batch() {
    let dataset = tns_dataset(vec![
        tns_row("F1", [10.0, 12.0, 14.0], [100.0, 100.0, 100.0, 100.0]),
        tns_row("F2", [1e308, 1e308, 1e308], [1e-10, 1e-10, 1e-10, 1e-10]),
        tns_row("F3", [20.0, 20.0, 20.0], [1.0, 1.0, 1.0, 1.0]),
    ]);

    match engine::run(&TnsCalculator::default(), &dataset) {
        Err(AssayError::RowFault {
            line,
            column,
            reason,
            ..
        }) => {
            assert_eq!(line, 3);
            assert_eq!(column, "calculated value");
            assert!(reason.contains("not finite"));
        }
        other => panic!("Expected RowFault, got {:?}", other),
    }
}
