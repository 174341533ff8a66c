//! Columnar table values for the windowing engine.
//!
//! A [`Frame`] is an ordered list of named columns over a fixed row
//! count. Unlike a map-backed table, column names are allowed to repeat:
//! the shift-and-concatenate phase deliberately produces many copies of
//! every base column, and duplicates stay in place until the
//! [`crate::window_builder::reconcile_columns`] pass renames them.
//!
//! # Missing values
//!
//! - [`Column::Float`] uses `f64::NAN` for missing entries.
//! - [`Column::Text`] uses `None`.
//!
//! Shifting a table down by `n` rows introduces `n` missing entries at
//! the top of every column; the validity filter removes the affected
//! rows (or columns) later in the pipeline.

pub mod engine;

pub use engine::{ChunkedWindowFrame, DeviceGroup, InMemoryWindowFrame, WindowTable};

use crate::error::{Result, WindowingError};

/// A single column of telemetry data.
#[derive(Debug, Clone)]
pub enum Column {
    /// Numeric data; missing entries are NaN.
    Float(Vec<f64>),
    /// Identifier-style text data; missing entries are `None`.
    Text(Vec<Option<String>>),
}

/// Equality treats two NaN entries as equal, so tables remain
/// comparable after shifting has introduced missing values.
impl PartialEq for Column {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Column::Float(a), Column::Float(b)) => {
                a.len() == b.len()
                    && a.iter()
                        .zip(b.iter())
                        .all(|(x, y)| x == y || (x.is_nan() && y.is_nan()))
            }
            (Column::Text(a), Column::Text(b)) => a == b,
            _ => false,
        }
    }
}

impl Column {
    /// Number of rows in the column.
    pub fn len(&self) -> usize {
        match self {
            Column::Float(v) => v.len(),
            Column::Text(v) => v.len(),
        }
    }

    /// True when the column holds no rows.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// True for numeric columns.
    pub fn is_float(&self) -> bool {
        matches!(self, Column::Float(_))
    }

    /// True when any entry is missing (NaN or `None`).
    pub fn has_missing(&self) -> bool {
        match self {
            Column::Float(v) => v.iter().any(|x| x.is_nan()),
            Column::Text(v) => v.iter().any(|x| x.is_none()),
        }
    }

    /// Entry `row - shift` of this column for each requested row, with
    /// rows that would fall before the start of the table filled as
    /// missing.
    pub fn gather(&self, rows: &[usize], shift: usize) -> Column {
        match self {
            Column::Float(v) => Column::Float(
                rows.iter()
                    .map(|&r| if r >= shift { v[r - shift] } else { f64::NAN })
                    .collect(),
            ),
            Column::Text(v) => Column::Text(
                rows.iter()
                    .map(|&r| if r >= shift { v[r - shift].clone() } else { None })
                    .collect(),
            ),
        }
    }

    /// Subset of the column at the given row positions.
    pub fn select(&self, positions: &[usize]) -> Column {
        self.gather(positions, 0)
    }

    fn append(&mut self, other: Column) -> Result<()> {
        match (self, other) {
            (Column::Float(a), Column::Float(b)) => a.extend(b),
            (Column::Text(a), Column::Text(b)) => a.extend(b),
            _ => return Err(WindowingError::ColumnTypeMismatch),
        }
        Ok(())
    }

    /// A fully-missing column of the same type with `len` rows.
    fn missing_like(&self, len: usize) -> Column {
        match self {
            Column::Float(_) => Column::Float(vec![f64::NAN; len]),
            Column::Text(_) => Column::Text(vec![None; len]),
        }
    }
}

/// An ordered, possibly duplicate-named collection of columns.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Frame {
    cols: Vec<(String, Column)>,
    nrows: usize,
}

impl Frame {
    /// Create an empty frame with zero rows and zero columns.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of rows.
    pub fn nrows(&self) -> usize {
        self.nrows
    }

    /// Number of columns.
    pub fn ncols(&self) -> usize {
        self.cols.len()
    }

    /// Column names in layout order (duplicates included).
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.cols.iter().map(|(n, _)| n.as_str())
    }

    /// Columns with their names, in layout order.
    pub fn columns(&self) -> impl Iterator<Item = (&str, &Column)> {
        self.cols.iter().map(|(n, c)| (n.as_str(), c))
    }

    /// Append a column on the right. The first column fixes the frame's
    /// row count; every later column must match it.
    pub fn push_column(&mut self, name: impl Into<String>, column: Column) -> Result<()> {
        if self.cols.is_empty() {
            self.nrows = column.len();
        } else if column.len() != self.nrows {
            return Err(WindowingError::RowCountMismatch {
                expected: self.nrows,
                actual: column.len(),
            });
        }
        self.cols.push((name.into(), column));
        Ok(())
    }

    /// Position of the first column with this name.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.cols.iter().position(|(n, _)| n == name)
    }

    /// First column with this name.
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.cols
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, c)| c)
    }

    /// True when a column with this name exists.
    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    /// Numeric view of the first column with this name.
    pub fn float_column(&self, name: &str) -> Result<&[f64]> {
        match self.column(name) {
            Some(Column::Float(v)) => Ok(v),
            Some(Column::Text(_)) => Err(WindowingError::NonNumericColumn(name.to_string())),
            None => Err(WindowingError::MissingColumn(name.to_string())),
        }
    }

    /// Text view of the first column with this name.
    pub fn text_column(&self, name: &str) -> Result<&[Option<String>]> {
        match self.column(name) {
            Some(Column::Text(v)) => Ok(v),
            Some(Column::Float(_)) => Err(WindowingError::NonNumericColumn(name.to_string())),
            None => Err(WindowingError::MissingColumn(name.to_string())),
        }
    }

    /// Drop every column with the given name (all occurrences).
    pub fn drop_column(&mut self, name: &str) {
        self.cols.retain(|(n, _)| n != name);
    }

    /// Keep only the columns at the given layout positions, in order.
    pub fn retain_columns(&mut self, keep: &[bool]) {
        debug_assert_eq!(keep.len(), self.cols.len());
        let mut idx = 0;
        self.cols.retain(|_| {
            let k = keep[idx];
            idx += 1;
            k
        });
    }

    /// New frame with entry `row - shift` of every column for each
    /// requested row; out-of-range rows become missing.
    pub fn gather_rows(&self, rows: &[usize], shift: usize) -> Frame {
        Frame {
            cols: self
                .cols
                .iter()
                .map(|(n, c)| (n.clone(), c.gather(rows, shift)))
                .collect(),
            nrows: rows.len(),
        }
    }

    /// New frame restricted to the given row positions.
    pub fn select_rows(&self, positions: &[usize]) -> Frame {
        self.gather_rows(positions, 0)
    }

    /// Splice another frame's columns in front of this frame's columns.
    /// Both frames must have the same row count.
    pub fn prepend_columns(&mut self, other: Frame) -> Result<()> {
        if !self.cols.is_empty() && !other.cols.is_empty() && other.nrows != self.nrows {
            return Err(WindowingError::RowCountMismatch {
                expected: self.nrows,
                actual: other.nrows,
            });
        }
        if self.cols.is_empty() {
            self.nrows = other.nrows;
        }
        self.cols.splice(0..0, other.cols);
        Ok(())
    }

    /// Append another frame's rows. Schemas must match positionally
    /// (same column count, names and types).
    pub fn append_rows(&mut self, other: Frame) -> Result<()> {
        if other.ncols() != self.ncols() {
            return Err(WindowingError::ColumnCountMismatch {
                expected: self.ncols(),
                actual: other.ncols(),
            });
        }
        for ((name, col), (other_name, other_col)) in
            self.cols.iter_mut().zip(other.cols.into_iter())
        {
            if *name != other_name {
                return Err(WindowingError::MissingColumn(other_name));
            }
            col.append(other_col)?;
        }
        self.nrows += other.nrows;
        Ok(())
    }

    /// Append another frame's rows, aligning duplicate column
    /// occurrences from the right within each name group.
    ///
    /// The k-th-from-last `name` column on the left receives the
    /// k-th-from-last `name` column on the right. Occurrences present on
    /// only one side are filled with missing values on the other; extra
    /// right-hand columns are appended after the left layout. This is
    /// how windowed sub-tables of different lag depth are merged: anchor
    /// aligns with anchor, lag-1 with lag-1, and the surplus deepest
    /// lags become missing-bearing columns for the shallower rows.
    pub fn append_rows_aligned(&mut self, other: Frame) -> Result<()> {
        use ahash::AHashMap;

        let left_rows = self.nrows;
        let right_rows = other.nrows;

        // Occurrence counts per name on each side.
        let mut left_count: AHashMap<String, usize> = AHashMap::new();
        for (n, _) in &self.cols {
            *left_count.entry(n.clone()).or_insert(0) += 1;
        }
        let mut right_count: AHashMap<String, usize> = AHashMap::new();
        for (n, _) in &other.cols {
            *right_count.entry(n.clone()).or_insert(0) += 1;
        }

        // Key right-hand columns by (name, occurrence-from-right).
        let mut right_cols: AHashMap<(String, usize), Column> = AHashMap::new();
        let mut right_extra: Vec<(String, usize, Column)> = Vec::new();
        let mut seen_right: AHashMap<String, usize> = AHashMap::new();
        for (name, col) in other.cols {
            let seen = seen_right.entry(name.clone()).or_insert(0);
            let from_right = right_count[&name] - 1 - *seen;
            *seen += 1;
            let left_n = left_count.get(&name).copied().unwrap_or(0);
            if from_right < left_n {
                right_cols.insert((name, from_right), col);
            } else {
                right_extra.push((name, from_right, col));
            }
        }

        // Extend matched left columns; pad unmatched ones with missing.
        let mut seen_left: AHashMap<String, usize> = AHashMap::new();
        for (name, col) in self.cols.iter_mut() {
            let seen = seen_left.entry(name.clone()).or_insert(0);
            let from_right = left_count[name] - 1 - *seen;
            *seen += 1;
            match right_cols.remove(&(name.clone(), from_right)) {
                Some(rc) => col.append(rc)?,
                None => {
                    let pad = col.missing_like(right_rows);
                    col.append(pad)?;
                }
            }
        }

        // Right-only occurrences join on the far right, deepest lag
        // first, missing for every pre-existing row.
        right_extra.sort_by(|a, b| a.0.cmp(&b.0).then(b.1.cmp(&a.1)));
        for (name, _, col) in right_extra {
            let mut padded = col.missing_like(left_rows);
            padded.append(col)?;
            self.cols.push((name, padded));
        }

        self.nrows = left_rows + right_rows;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn float(values: &[f64]) -> Column {
        Column::Float(values.to_vec())
    }

    fn text(values: &[&str]) -> Column {
        Column::Text(values.iter().map(|s| Some(s.to_string())).collect())
    }

    #[test]
    fn test_push_column_row_count_mismatch() {
        let mut frame = Frame::new();
        frame.push_column("a", float(&[1.0, 2.0])).unwrap();
        let err = frame.push_column("b", float(&[1.0])).unwrap_err();
        assert!(matches!(
            err,
            WindowingError::RowCountMismatch {
                expected: 2,
                actual: 1
            }
        ));
    }

    #[test]
    fn test_gather_rows_shift_fills_missing() {
        let mut frame = Frame::new();
        frame
            .push_column("a", float(&[10.0, 11.0, 12.0, 13.0]))
            .unwrap();
        frame.push_column("s", text(&["x", "y", "z", "w"])).unwrap();

        let shifted = frame.gather_rows(&[0, 1, 2, 3], 2);
        let a = shifted.float_column("a").unwrap();
        assert!(a[0].is_nan());
        assert!(a[1].is_nan());
        assert_eq!(&a[2..], &[10.0, 11.0]);

        let s = shifted.text_column("s").unwrap();
        assert_eq!(s[0], None);
        assert_eq!(s[2].as_deref(), Some("x"));
    }

    #[test]
    fn test_select_rows_keeps_order() {
        let mut frame = Frame::new();
        frame.push_column("a", float(&[0.0, 1.0, 2.0, 3.0])).unwrap();
        let picked = frame.select_rows(&[3, 1]);
        assert_eq!(picked.float_column("a").unwrap(), &[3.0, 1.0]);
    }

    #[test]
    fn test_prepend_columns_order() {
        let mut base = Frame::new();
        base.push_column("a", float(&[1.0, 2.0])).unwrap();
        let mut block = Frame::new();
        block.push_column("a", float(&[3.0, 4.0])).unwrap();

        base.prepend_columns(block).unwrap();
        let names: Vec<&str> = base.names().collect();
        assert_eq!(names, vec!["a", "a"]);
        // Prepended copy sits leftmost.
        assert_eq!(base.columns().next().unwrap().1, &float(&[3.0, 4.0]));
    }

    #[test]
    fn test_append_rows_same_schema() {
        let mut top = Frame::new();
        top.push_column("a", float(&[1.0])).unwrap();
        let mut bottom = Frame::new();
        bottom.push_column("a", float(&[2.0, 3.0])).unwrap();

        top.append_rows(bottom).unwrap();
        assert_eq!(top.nrows(), 3);
        assert_eq!(top.float_column("a").unwrap(), &[1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_append_rows_aligned_right_alignment() {
        // Left: two occurrences of "x" (lag-1, anchor). Right: three
        // (lag-2, lag-1, anchor). Anchor must meet anchor.
        let mut left = Frame::new();
        left.push_column("x", float(&[10.0])).unwrap(); // lag-1
        left.push_column("x", float(&[11.0])).unwrap(); // anchor

        let mut right = Frame::new();
        right.push_column("x", float(&[20.0])).unwrap(); // lag-2
        right.push_column("x", float(&[21.0])).unwrap(); // lag-1
        right.push_column("x", float(&[22.0])).unwrap(); // anchor

        left.append_rows_aligned(right).unwrap();
        assert_eq!(left.nrows(), 2);
        assert_eq!(left.ncols(), 3);

        let cols: Vec<&Column> = left.columns().map(|(_, c)| c).collect();
        // Left layout first: lag-1 then anchor.
        assert_eq!(cols[0], &float(&[10.0, 21.0]));
        assert_eq!(cols[1], &float(&[11.0, 22.0]));
        // Right-only lag-2 appended at the end, missing for left rows.
        match cols[2] {
            Column::Float(v) => {
                assert!(v[0].is_nan());
                assert_eq!(v[1], 20.0);
            }
            _ => panic!("expected float column"),
        }
    }

    #[test]
    fn test_append_rows_aligned_pads_missing_side() {
        // Left has a column the right lacks entirely.
        let mut left = Frame::new();
        left.push_column("only_left", float(&[1.0])).unwrap();
        left.push_column("shared", float(&[2.0])).unwrap();

        let mut right = Frame::new();
        right.push_column("shared", float(&[3.0])).unwrap();

        left.append_rows_aligned(right).unwrap();
        let only_left = left.float_column("only_left").unwrap();
        assert_eq!(only_left[0], 1.0);
        assert!(only_left[1].is_nan());
        assert_eq!(left.float_column("shared").unwrap(), &[2.0, 3.0]);
    }

    #[test]
    fn test_has_missing() {
        assert!(Column::Float(vec![1.0, f64::NAN]).has_missing());
        assert!(!Column::Float(vec![1.0, 2.0]).has_missing());
        assert!(Column::Text(vec![Some("a".into()), None]).has_missing());
    }
}
