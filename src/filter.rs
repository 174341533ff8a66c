//! Post-build validity filtering.
//!
//! The windowed table still carries identifier and label columns, lag
//! copies of those identifiers, and rows whose deepest lags reach past
//! the start of the data. This module reduces it to the purely numeric
//! table the reshaper consumes, in four ordered steps:
//!
//! 1. Drop synthetic identifier duplicates: suffixed copies of
//!    `serial_number`, `date`, `capacity_bytes` and `model` produced by
//!    shifting (`serial_number_2`, `date_3`, ...). The unsuffixed
//!    originals, which after reconciliation belong to the deepest lag,
//!    are kept for the next step.
//! 2. If `date`, `serial_number` and `capacity_bytes` are all present,
//!    drop rows with a missing value in any of them. A missing
//!    deepest-lag identifier marks an incomplete window. If any of the
//!    three columns is absent entirely, report which and skip the row
//!    drop; see [`FilterReport::missing_essential`]. Rows with partial
//!    identifiers survive on that path.
//! 3. Drop every column that still contains a missing value. A single
//!    hole in a feature column removes the whole column for all
//!    samples.
//! 4. Drop the identifier columns themselves (`serial_number`, `date`,
//!    `model`, `capacity_bytes`). Labels (`failure`, `predict_val`,
//!    `validate_val`) and their lag copies stay in the numeric output.
//!
//! When windowing is disabled only step 4 applies; use
//! [`drop_identifier_columns`] directly.

use regex::Regex;

use crate::error::Result;
use crate::frame::{Column, Frame};

/// Base names whose suffixed duplicates are synthetic and dropped in
/// step 1.
pub const SYNTHETIC_ID_BASES: [&str; 4] = ["serial_number", "date", "capacity_bytes", "model"];

/// Columns a valid windowed row must identify itself by.
pub const ESSENTIAL_COLUMNS: [&str; 3] = ["date", "serial_number", "capacity_bytes"];

/// Identifier columns removed from the numeric output in step 4.
pub const IDENTIFIER_COLUMNS: [&str; 4] = ["serial_number", "date", "model", "capacity_bytes"];

/// What the filter did to the table.
#[derive(Debug, Clone, Default)]
pub struct FilterReport {
    /// Synthetic identifier columns removed in step 1.
    pub synthetic_columns_dropped: Vec<String>,

    /// Essential columns that were absent, causing the row-drop step to
    /// be skipped. Non-empty means the output may retain rows with
    /// partial identifiers.
    pub missing_essential: Vec<String>,

    /// Rows removed for missing essential identifiers.
    pub rows_dropped: usize,

    /// Columns removed in step 3 for residual missing values.
    pub incomplete_columns_dropped: Vec<String>,
}

/// Drops invalid windows and non-numeric columns from a built table.
#[derive(Debug, Clone, Default)]
pub struct ValidityFilter;

impl ValidityFilter {
    /// Filter with the standard column sets.
    pub fn new() -> Self {
        Self
    }

    /// Apply all four steps to a windowed table.
    ///
    /// `anchors` must be aligned with the table's rows; it is filtered
    /// in lockstep so the caller can keep slicing label arrays by the
    /// same positions.
    pub fn apply(&self, frame: Frame, anchors: Vec<usize>) -> Result<(Frame, Vec<usize>, FilterReport)> {
        let mut frame = frame;
        let mut anchors = anchors;
        let mut report = FilterReport::default();

        // Step 1: synthetic identifier duplicates.
        let pattern = format!("^(?:{})_\\d+$", SYNTHETIC_ID_BASES.join("|"));
        let synthetic = Regex::new(&pattern).expect("synthetic-identifier pattern is valid");
        let keep: Vec<bool> = frame.names().map(|n| !synthetic.is_match(n)).collect();
        report.synthetic_columns_dropped = frame
            .names()
            .zip(keep.iter())
            .filter(|(_, &k)| !k)
            .map(|(n, _)| n.to_string())
            .collect();
        frame.retain_columns(&keep);

        // Step 2: rows with missing essential identifiers.
        let missing: Vec<String> = ESSENTIAL_COLUMNS
            .iter()
            .filter(|&&c| !frame.has_column(c))
            .map(|&c| c.to_string())
            .collect();
        if missing.is_empty() {
            let keep_rows = complete_row_mask(&frame)?;
            let kept: Vec<usize> = keep_rows
                .iter()
                .enumerate()
                .filter(|(_, &k)| k)
                .map(|(i, _)| i)
                .collect();
            report.rows_dropped = frame.nrows() - kept.len();
            log::info!("dropped {} incomplete windows", report.rows_dropped);
            if report.rows_dropped > 0 {
                frame = frame.select_rows(&kept);
                anchors = kept.iter().map(|&i| anchors[i]).collect();
            }
        } else {
            log::warn!(
                "columns {missing:?} do not exist in the table; skipping invalid-window drop"
            );
            report.missing_essential = missing;
        }

        // Step 3: columns with residual missing values.
        let keep: Vec<bool> = frame
            .columns()
            .map(|(_, c)| !c.has_missing())
            .collect();
        report.incomplete_columns_dropped = frame
            .names()
            .zip(keep.iter())
            .filter(|(_, &k)| !k)
            .map(|(n, _)| n.to_string())
            .collect();
        if !report.incomplete_columns_dropped.is_empty() {
            log::info!(
                "dropped {} columns with residual missing values",
                report.incomplete_columns_dropped.len()
            );
            frame.retain_columns(&keep);
        }

        // Step 4: identifier columns are not features.
        drop_identifier_columns(&mut frame);

        Ok((frame, anchors, report))
    }
}

/// Remove the unsuffixed identifier columns from a table.
pub fn drop_identifier_columns(frame: &mut Frame) {
    for name in IDENTIFIER_COLUMNS {
        frame.drop_column(name);
    }
}

/// Row mask that is true where every essential column has a value.
fn complete_row_mask(frame: &Frame) -> Result<Vec<bool>> {
    let mut keep = vec![true; frame.nrows()];
    for name in ESSENTIAL_COLUMNS {
        match frame.column(name) {
            Some(Column::Float(v)) => {
                for (k, value) in keep.iter_mut().zip(v.iter()) {
                    if value.is_nan() {
                        *k = false;
                    }
                }
            }
            Some(Column::Text(v)) => {
                for (k, value) in keep.iter_mut().zip(v.iter()) {
                    if value.is_none() {
                        *k = false;
                    }
                }
            }
            None => unreachable!("presence checked before building the mask"),
        }
    }
    Ok(keep)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text_col(values: &[Option<&str>]) -> Column {
        Column::Text(values.iter().map(|v| v.map(String::from)).collect())
    }

    /// Minimal windowed-looking table: identifiers, one suffixed
    /// duplicate of each, a label and a feature.
    fn windowed_fixture() -> Frame {
        let mut frame = Frame::new();
        frame
            .push_column(
                "serial_number",
                text_col(&[None, Some("a"), Some("b")]),
            )
            .unwrap();
        frame
            .push_column("serial_number_2", text_col(&[Some("x"), Some("a"), Some("b")]))
            .unwrap();
        frame
            .push_column("date", text_col(&[None, Some("2024-01-02"), Some("2024-01-03")]))
            .unwrap();
        frame
            .push_column("date_2", text_col(&[Some("2024-01-01"), Some("2024-01-02"), None]))
            .unwrap();
        frame
            .push_column(
                "capacity_bytes",
                Column::Float(vec![f64::NAN, 4.0e12, 4.0e12]),
            )
            .unwrap();
        frame
            .push_column("capacity_bytes_2", Column::Float(vec![4.0e12; 3]))
            .unwrap();
        frame
            .push_column("model", text_col(&[Some("m"), Some("m"), Some("m")]))
            .unwrap();
        frame
            .push_column("model_2", text_col(&[Some("m"), Some("m"), Some("m")]))
            .unwrap();
        frame
            .push_column("failure", Column::Float(vec![0.0, 0.0, 1.0]))
            .unwrap();
        frame
            .push_column("smart_5", Column::Float(vec![f64::NAN, 0.5, 1.0]))
            .unwrap();
        frame
            .push_column("smart_5_2", Column::Float(vec![0.1, 0.2, 0.3]))
            .unwrap();
        frame
    }

    #[test]
    fn test_synthetic_duplicates_dropped() {
        let (frame, _, report) = ValidityFilter::new()
            .apply(windowed_fixture(), vec![0, 1, 2])
            .unwrap();
        assert_eq!(
            report.synthetic_columns_dropped,
            vec!["serial_number_2", "date_2", "capacity_bytes_2", "model_2"]
        );
        // Suffixed feature copies are not synthetic identifiers.
        assert!(frame.has_column("smart_5_2"));
    }

    #[test]
    fn test_incomplete_windows_dropped_with_anchors() {
        let (frame, anchors, report) = ValidityFilter::new()
            .apply(windowed_fixture(), vec![10, 11, 12])
            .unwrap();
        // Row 0 has missing serial, date and capacity.
        assert_eq!(report.rows_dropped, 1);
        assert_eq!(anchors, vec![11, 12]);
        assert_eq!(frame.nrows(), 2);
    }

    #[test]
    fn test_feature_column_with_hole_dropped_entirely() {
        let (frame, _, _) = ValidityFilter::new()
            .apply(windowed_fixture(), vec![0, 1, 2])
            .unwrap();
        // smart_5 had a NaN only in the dropped row, so it survives;
        // give it a hole in a surviving row instead.
        assert!(frame.has_column("smart_5"));

        let mut with_hole = windowed_fixture();
        with_hole.drop_column("smart_5");
        with_hole
            .push_column("smart_5", Column::Float(vec![0.0, f64::NAN, 1.0]))
            .unwrap();
        let (frame, _, report) = ValidityFilter::new()
            .apply(with_hole, vec![0, 1, 2])
            .unwrap();
        assert!(!frame.has_column("smart_5"));
        assert_eq!(report.incomplete_columns_dropped, vec!["smart_5"]);
    }

    #[test]
    fn test_identifier_columns_removed_from_output() {
        let (frame, _, _) = ValidityFilter::new()
            .apply(windowed_fixture(), vec![0, 1, 2])
            .unwrap();
        for name in IDENTIFIER_COLUMNS {
            assert!(!frame.has_column(name), "{name} should be gone");
        }
        // Labels stay.
        assert!(frame.has_column("failure"));
    }

    #[test]
    fn test_missing_essential_column_skips_row_drop() {
        let mut frame = windowed_fixture();
        frame.drop_column("capacity_bytes");
        let (filtered, anchors, report) =
            ValidityFilter::new().apply(frame, vec![0, 1, 2]).unwrap();

        assert_eq!(report.missing_essential, vec!["capacity_bytes"]);
        assert_eq!(report.rows_dropped, 0);
        assert_eq!(anchors, vec![0, 1, 2]);
        // With no row drop, the holes stay and take their columns with
        // them in step 3.
        assert!(!filtered.has_column("smart_5"));
        assert!(filtered.has_column("smart_5_2"));
    }

    #[test]
    fn test_bare_identifier_names_not_treated_as_synthetic() {
        let mut frame = Frame::new();
        frame
            .push_column("serial_number", text_col(&[Some("a")]))
            .unwrap();
        frame
            .push_column("date", text_col(&[Some("2024-01-01")]))
            .unwrap();
        frame
            .push_column("capacity_bytes", Column::Float(vec![1.0]))
            .unwrap();
        frame
            .push_column("smart_10", Column::Float(vec![1.0]))
            .unwrap();

        let (filtered, _, report) = ValidityFilter::new().apply(frame, vec![0]).unwrap();
        assert!(report.synthetic_columns_dropped.is_empty());
        // smart_10 matches no synthetic base name.
        assert!(filtered.has_column("smart_10"));
    }
}
