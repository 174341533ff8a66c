//! Tensor materialization for classifier input.
//!
//! The filtered table is purely numeric, with `depth` lag copies of
//! every base column sitting side by side in the sorted schema. This
//! module flattens it row-major and reshapes each row of length
//! `base_features × depth` into `(base_features, depth)`, yielding the
//! final `(samples, base_features, depth)` tensor. A disabled-windowing
//! build uses `depth = 1`, which degenerates to appending a singleton
//! axis.
//!
//! The reshape is a bijection: flattening the tensor along its last two
//! axes and reshaping with the same depth reproduces it exactly. A row
//! length not divisible by `depth` means the builder and the caller
//! disagree about the window depth and is a fatal error.

use ndarray::Array3;

use crate::error::{Result, WindowingError};
use crate::frame::{Column, Frame};

/// Materialize the table into a `(samples, base_features, depth)`
/// tensor.
///
/// Fails if any column is non-numeric or if the column count is not a
/// multiple of `depth`.
pub fn to_tensor(frame: &Frame, depth: usize) -> Result<Array3<f64>> {
    if depth == 0 {
        return Err(WindowingError::InvalidConfig(
            "window depth must be > 0".to_string(),
        ));
    }
    let nrows = frame.nrows();
    let ncols = frame.ncols();
    if ncols % depth != 0 {
        return Err(WindowingError::DepthMismatch {
            row_len: ncols,
            depth,
        });
    }

    let mut columns: Vec<&[f64]> = Vec::with_capacity(ncols);
    for (name, column) in frame.columns() {
        match column {
            Column::Float(v) => columns.push(v),
            Column::Text(_) => {
                return Err(WindowingError::NonNumericColumn(name.to_string()))
            }
        }
    }

    let mut flat = Vec::with_capacity(nrows * ncols);
    for row in 0..nrows {
        for col in &columns {
            flat.push(col[row]);
        }
    }

    Ok(Array3::from_shape_vec((nrows, ncols / depth, depth), flat)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array;

    fn numeric_frame(ncols: usize, nrows: usize) -> Frame {
        let mut frame = Frame::new();
        for c in 0..ncols {
            frame
                .push_column(
                    format!("c{c}"),
                    Column::Float((0..nrows).map(|r| (r * ncols + c) as f64).collect()),
                )
                .unwrap();
        }
        frame
    }

    #[test]
    fn test_shape_and_layout() {
        // 2 rows x 6 columns, depth 3 -> (2, 2, 3).
        let tensor = to_tensor(&numeric_frame(6, 2), 3).unwrap();
        assert_eq!(tensor.shape(), &[2, 2, 3]);
        // Row-major: sample 0, feature 0 holds columns 0..3 of row 0.
        assert_eq!(tensor[[0, 0, 0]], 0.0);
        assert_eq!(tensor[[0, 0, 2]], 2.0);
        assert_eq!(tensor[[0, 1, 0]], 3.0);
        assert_eq!(tensor[[1, 0, 0]], 6.0);
    }

    #[test]
    fn test_singleton_depth() {
        let tensor = to_tensor(&numeric_frame(4, 3), 1).unwrap();
        assert_eq!(tensor.shape(), &[3, 4, 1]);
    }

    #[test]
    fn test_reshape_is_bijection() {
        let tensor = to_tensor(&numeric_frame(6, 4), 3).unwrap();
        let flat: Vec<f64> = tensor.iter().copied().collect();
        let rebuilt = Array::from_shape_vec((4, 2, 3), flat).unwrap();
        assert_eq!(tensor, rebuilt);
    }

    #[test]
    fn test_indivisible_row_length_fails() {
        let err = to_tensor(&numeric_frame(5, 2), 3).unwrap_err();
        assert!(matches!(
            err,
            WindowingError::DepthMismatch {
                row_len: 5,
                depth: 3
            }
        ));
    }

    #[test]
    fn test_text_column_fails() {
        let mut frame = Frame::new();
        frame
            .push_column("serial_number", Column::Text(vec![Some("a".into())]))
            .unwrap();
        let err = to_tensor(&frame, 1).unwrap_err();
        assert!(matches!(err, WindowingError::NonNumericColumn(_)));
    }

    #[test]
    fn test_empty_table() {
        let tensor = to_tensor(&numeric_frame(6, 0), 3).unwrap();
        assert_eq!(tensor.shape(), &[0, 2, 3]);
    }
}
