//! Feature normalization for the windowing pipeline.
//!
//! Disk-health counters arrive on wildly different scales (raw sector
//! counts, temperatures, power-on hours). The pipeline scales every
//! feature column to `[0, 1]` with per-column min-max before windowing,
//! so stacked lag copies of a feature share one scale.
//!
//! Identifier and label columns ([`RESERVED_COLUMNS`]) pass through
//! untouched: serials and dates are not features, and the label columns
//! must keep their original values for retention decisions downstream.
//!
//! # Missing and degenerate data
//!
//! - NaN entries are ignored when fitting and preserved in the output.
//! - A constant column maps to all zeros.
//! - A text-typed column outside the reserved set is a fatal error;
//!   the upstream table must be fixed and the build re-run.

use crate::error::{Result, WindowingError};
use crate::frame::{Column, Frame};

/// Identifier and label columns that are never scaled.
pub const RESERVED_COLUMNS: [&str; 7] = [
    "serial_number",
    "date",
    "failure",
    "predict_val",
    "validate_val",
    "model",
    "capacity_bytes",
];

/// Per-column min-max scaler over a telemetry frame.
///
/// # Example
///
/// ```
/// use smart_windows::frame::{Column, Frame};
/// use smart_windows::preprocessing::MinMaxScaler;
///
/// let mut frame = Frame::new();
/// frame.push_column("smart_9", Column::Float(vec![0.0, 50.0, 100.0])).unwrap();
/// frame.push_column("failure", Column::Float(vec![0.0, 0.0, 1.0])).unwrap();
///
/// let scaled = MinMaxScaler::new().transform(frame).unwrap();
/// assert_eq!(scaled.float_column("smart_9").unwrap(), &[0.0, 0.5, 1.0]);
/// // Label columns keep their raw values.
/// assert_eq!(scaled.float_column("failure").unwrap(), &[0.0, 0.0, 1.0]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct MinMaxScaler;

impl MinMaxScaler {
    /// Scaler with the standard reserved-column set.
    pub fn new() -> Self {
        Self
    }

    /// True when `name` is an identifier or label column.
    pub fn is_reserved(name: &str) -> bool {
        RESERVED_COLUMNS.contains(&name)
    }

    /// Scale every non-reserved column to `[0, 1]`, preserving row
    /// order, column order and the reserved columns verbatim.
    pub fn transform(&self, frame: Frame) -> Result<Frame> {
        let nrows = frame.nrows();
        let mut scaled = Frame::new();
        for (name, column) in frame.columns() {
            if Self::is_reserved(name) {
                scaled.push_column(name, column.clone())?;
                continue;
            }
            let values = match column {
                Column::Float(v) => v,
                Column::Text(_) => {
                    return Err(WindowingError::NonNumericColumn(name.to_string()))
                }
            };
            scaled.push_column(name, Column::Float(scale_column(values)))?;
        }
        debug_assert_eq!(scaled.nrows(), nrows);
        Ok(scaled)
    }
}

/// Min-max scale one column, ignoring NaN when fitting.
fn scale_column(values: &[f64]) -> Vec<f64> {
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for &v in values {
        if v.is_nan() {
            continue;
        }
        min = min.min(v);
        max = max.max(v);
    }
    if !min.is_finite() {
        // All-missing column: nothing to fit.
        return values.to_vec();
    }
    let range = max - min;
    values
        .iter()
        .map(|&v| {
            if v.is_nan() {
                v
            } else if range == 0.0 {
                0.0
            } else {
                (v - min) / range
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame_with(name: &str, values: Vec<f64>) -> Frame {
        let mut frame = Frame::new();
        frame.push_column(name, Column::Float(values)).unwrap();
        frame
    }

    #[test]
    fn test_scales_to_unit_interval() {
        let frame = frame_with("smart_5", vec![10.0, 20.0, 30.0]);
        let scaled = MinMaxScaler::new().transform(frame).unwrap();
        assert_eq!(scaled.float_column("smart_5").unwrap(), &[0.0, 0.5, 1.0]);
    }

    #[test]
    fn test_reserved_columns_untouched() {
        let mut frame = Frame::new();
        frame
            .push_column(
                "serial_number",
                Column::Text(vec![Some("a".into()), Some("b".into())]),
            )
            .unwrap();
        frame
            .push_column("predict_val", Column::Float(vec![3.0, 7.0]))
            .unwrap();
        frame
            .push_column("smart_1", Column::Float(vec![0.0, 4.0]))
            .unwrap();

        let scaled = MinMaxScaler::new().transform(frame).unwrap();
        assert_eq!(scaled.float_column("predict_val").unwrap(), &[3.0, 7.0]);
        assert_eq!(scaled.float_column("smart_1").unwrap(), &[0.0, 1.0]);
        assert_eq!(
            scaled.text_column("serial_number").unwrap()[1].as_deref(),
            Some("b")
        );
    }

    #[test]
    fn test_constant_column_maps_to_zero() {
        let frame = frame_with("smart_3", vec![42.0, 42.0, 42.0]);
        let scaled = MinMaxScaler::new().transform(frame).unwrap();
        assert_eq!(scaled.float_column("smart_3").unwrap(), &[0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_nan_ignored_when_fitting_and_preserved() {
        let frame = frame_with("smart_7", vec![0.0, f64::NAN, 10.0]);
        let scaled = MinMaxScaler::new().transform(frame).unwrap();
        let out = scaled.float_column("smart_7").unwrap();
        assert_eq!(out[0], 0.0);
        assert!(out[1].is_nan());
        assert_eq!(out[2], 1.0);
    }

    #[test]
    fn test_text_feature_column_is_fatal() {
        let mut frame = Frame::new();
        frame
            .push_column("firmware", Column::Text(vec![Some("v1".into())]))
            .unwrap();
        let err = MinMaxScaler::new().transform(frame).unwrap_err();
        assert!(matches!(err, WindowingError::NonNumericColumn(name) if name == "firmware"));
    }

    #[test]
    fn test_row_and_column_order_preserved() {
        let mut frame = Frame::new();
        frame
            .push_column("smart_b", Column::Float(vec![1.0, 0.0]))
            .unwrap();
        frame
            .push_column("smart_a", Column::Float(vec![0.0, 2.0]))
            .unwrap();
        let scaled = MinMaxScaler::new().transform(frame).unwrap();
        let names: Vec<&str> = scaled.names().collect();
        assert_eq!(names, vec!["smart_b", "smart_a"]);
        assert_eq!(scaled.float_column("smart_b").unwrap(), &[1.0, 0.0]);
    }
}
