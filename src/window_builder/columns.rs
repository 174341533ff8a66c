//! Canonical column schema for windowed tables.
//!
//! Repeated shift-and-concatenate leaves many columns sharing one name.
//! Downstream stages match columns by name pattern, so duplicates are
//! disambiguated with an incrementing integer suffix in layout order
//! (`col`, `col_2`, `col_3`, ...) and the full schema is then sorted
//! lexicographically. The sorted schema is independent of the order in
//! which shifts were applied, which is what makes cached builds with
//! the same configuration byte-comparable.
//!
//! Because blocks are stacked newest-lag-leftmost, the unsuffixed
//! survivor of every name group belongs to the deepest lag. The
//! validity filter relies on this: a row whose deepest-lag identifiers
//! are missing is an incomplete window.

use ahash::AHashMap;

use crate::frame::Frame;

/// Rename duplicate columns with positional suffixes and sort the
/// schema lexicographically.
///
/// The first occurrence of a name keeps the bare name; later
/// occurrences get `_2`, `_3`, ... in layout order. Sorting uses plain
/// byte-wise string order, so with ten or more duplicates the suffixed
/// names interleave (`col`, `col_10`, `col_2`, ...); the ordering is
/// canonical, not numeric.
pub fn reconcile_columns(frame: Frame) -> Frame {
    let mut counts: AHashMap<String, usize> = AHashMap::new();
    let nrows = frame.nrows();

    let mut renamed: Vec<(String, crate::frame::Column)> = frame
        .columns()
        .map(|(name, column)| {
            let count = counts.entry(name.to_string()).or_insert(0);
            *count += 1;
            let new_name = if *count > 1 {
                format!("{name}_{count}")
            } else {
                name.to_string()
            };
            (new_name, column.clone())
        })
        .collect();

    renamed.sort_by(|a, b| a.0.cmp(&b.0));

    let mut out = Frame::new();
    for (name, column) in renamed {
        // Row counts are unchanged by renaming.
        out.push_column(name, column)
            .expect("reconciled columns share the source row count");
    }
    debug_assert_eq!(out.nrows(), nrows);
    out
}
