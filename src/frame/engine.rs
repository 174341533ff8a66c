//! Out-of-core table engine for the window builder.
//!
//! The builder never mutates the input table. It works against the
//! [`WindowTable`] capability interface, which models a growing stack of
//! lag blocks over a shared, immutable base table:
//!
//! ```text
//! ┌ shift(s_n) block ┐ ... ┌ shift(s_1) block ┐ ┌ anchor block ┐
//! └──────────────────┘     └──────────────────┘ └──────────────┘
//!   newest lag (leftmost)                          base columns
//! ```
//!
//! Every block is fully determined by the base table, the current set of
//! retained anchor rows and a shift distance, so the whole stack can be
//! recomputed from `(base, row_ids, shifts)` at any time. That is what
//! makes the operations referentially transparent and safe to evaluate
//! chunk-parallel without locking.
//!
//! Two implementations satisfy the contract:
//!
//! - [`InMemoryWindowFrame`] applies every operation eagerly. Simple,
//!   serial, useful for tests and small tables.
//! - [`ChunkedWindowFrame`] queues shift operations and realizes them
//!   only at materialization points, evaluating row chunks (default
//!   100 000 rows) in parallel with rayon.
//!
//! Synchronization points are (a) before any group-wise retention pass,
//! which needs globally ordered rows per device, and (b) the end of the
//! build. Between those points no realized table exists for the chunked
//! engine.

use std::sync::Arc;

use ahash::AHashMap;
use rayon::prelude::*;

use crate::error::Result;
use crate::frame::Frame;

/// One device's retained rows, as seen by a retention selector.
///
/// `predict_val` holds the anchor-row failure-proximity labels for the
/// group, in row order.
#[derive(Debug)]
pub struct DeviceGroup<'a> {
    /// Device serial number (the group key).
    pub serial: &'a str,
    /// Anchor `predict_val` values for the group's retained rows.
    pub predict_val: &'a [f64],
}

/// Retention selector: maps a device group to the local row indices to
/// keep, in ascending order.
pub type RetentionFn<'a> = dyn Fn(&DeviceGroup<'_>) -> Vec<usize> + 'a;

/// Capability interface over the windowing engine's table operations.
///
/// The contract deliberately mirrors what an out-of-core dataframe
/// library would offer: `shift_concat` and `group_apply` are cheap
/// logical operations, `materialize` is the expensive synchronization
/// point that realizes the pending computation graph.
pub trait WindowTable: Sized {
    /// Engine over the whole base table, anchors `0..base.nrows()`.
    fn from_base(base: Arc<Frame>, chunk_rows: usize) -> Self {
        let n = base.nrows();
        Self::with_rows(base, chunk_rows, (0..n).collect())
    }

    /// Engine restricted to the given anchor rows of the base table.
    fn with_rows(base: Arc<Frame>, chunk_rows: usize, row_ids: Vec<usize>) -> Self;

    /// Logically concatenate a copy of the base table shifted down by
    /// `periods` rows onto the left of the block stack.
    fn shift_concat(&mut self, periods: usize);

    /// Realize all pending operations into a concrete frame.
    fn materialize(&mut self) -> Result<&Frame>;

    /// Anchor row positions (into the base table) currently retained,
    /// in table order.
    fn row_ids(&self) -> &[usize];

    /// Group retained rows by `serial_number`, apply the selector to
    /// each group, and keep only the selected rows.
    ///
    /// Groups are visited in ascending serial order and each group keeps
    /// its row order, so the surviving table is ordered by
    /// (serial, original position). Rows with a missing serial are
    /// dropped. Implies a materialization point.
    fn group_apply(&mut self, select: &RetentionFn<'_>) -> Result<()>;

    /// Finish the build: realize pending work and hand back the frame
    /// together with the anchor row ids aligned to its rows.
    fn into_frame(self) -> Result<(Frame, Vec<usize>)>;
}

/// Group retained rows by device serial.
///
/// Returns `(serial, positions)` pairs where positions index into
/// `row_ids`, sorted by serial, each group in row order.
fn grouped_positions(base: &Frame, row_ids: &[usize]) -> Result<Vec<(String, Vec<usize>)>> {
    let serials = base.text_column("serial_number")?;
    let mut groups: AHashMap<&str, Vec<usize>> = AHashMap::new();
    for (pos, &id) in row_ids.iter().enumerate() {
        if let Some(serial) = &serials[id] {
            groups.entry(serial.as_str()).or_default().push(pos);
        }
    }
    let mut grouped: Vec<(String, Vec<usize>)> = groups
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect();
    grouped.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(grouped)
}

/// Apply a retention selector over grouped rows, returning the kept
/// positions into `row_ids` (group-key order, row order within groups).
fn apply_selector(
    base: &Frame,
    row_ids: &[usize],
    select: &RetentionFn<'_>,
) -> Result<Vec<usize>> {
    let grouped = grouped_positions(base, row_ids)?;
    let predict = base.float_column("predict_val")?;

    let mut keep = Vec::new();
    for (serial, positions) in &grouped {
        let values: Vec<f64> = positions.iter().map(|&p| predict[row_ids[p]]).collect();
        let group = DeviceGroup {
            serial,
            predict_val: &values,
        };
        for local in select(&group) {
            keep.push(positions[local]);
        }
    }
    Ok(keep)
}

// ============================================================================
// Eager engine
// ============================================================================

/// Array-backed engine that applies every operation immediately.
pub struct InMemoryWindowFrame {
    base: Arc<Frame>,
    row_ids: Vec<usize>,
    realized: Frame,
}

impl WindowTable for InMemoryWindowFrame {
    fn with_rows(base: Arc<Frame>, _chunk_rows: usize, row_ids: Vec<usize>) -> Self {
        let realized = base.gather_rows(&row_ids, 0);
        Self {
            base,
            row_ids,
            realized,
        }
    }

    fn shift_concat(&mut self, periods: usize) {
        let block = self.base.gather_rows(&self.row_ids, periods);
        // Row counts always agree: both sides are gathered at row_ids.
        self.realized
            .prepend_columns(block)
            .expect("lag block row count matches accumulator");
    }

    fn materialize(&mut self) -> Result<&Frame> {
        Ok(&self.realized)
    }

    fn row_ids(&self) -> &[usize] {
        &self.row_ids
    }

    fn group_apply(&mut self, select: &RetentionFn<'_>) -> Result<()> {
        let keep = apply_selector(&self.base, &self.row_ids, select)?;
        self.row_ids = keep.iter().map(|&p| self.row_ids[p]).collect();
        self.realized = self.realized.select_rows(&keep);
        Ok(())
    }

    fn into_frame(self) -> Result<(Frame, Vec<usize>)> {
        Ok((self.realized, self.row_ids))
    }
}

// ============================================================================
// Chunked engine
// ============================================================================

/// Chunked, lazily-evaluated engine.
///
/// Shift operations are queued and realized at materialization points;
/// realization gathers each lag block over row chunks in parallel.
pub struct ChunkedWindowFrame {
    base: Arc<Frame>,
    row_ids: Vec<usize>,
    chunk_rows: usize,
    pending: Vec<usize>,
    realized: Option<Frame>,
}

impl ChunkedWindowFrame {
    /// Gather `base` shifted by `shift` at the given rows, evaluating
    /// row chunks in parallel.
    fn gather_block(&self, shift: usize) -> Frame {
        let chunk = self.chunk_rows.max(1);
        if self.row_ids.len() <= chunk {
            return self.base.gather_rows(&self.row_ids, shift);
        }
        let parts: Vec<Frame> = self
            .row_ids
            .par_chunks(chunk)
            .map(|rows| self.base.gather_rows(rows, shift))
            .collect();
        let mut parts = parts.into_iter();
        let mut block = parts.next().unwrap_or_default();
        for part in parts {
            block
                .append_rows(part)
                .expect("chunked gather yields identical schemas");
        }
        block
    }
}

impl WindowTable for ChunkedWindowFrame {
    fn with_rows(base: Arc<Frame>, chunk_rows: usize, row_ids: Vec<usize>) -> Self {
        Self {
            base,
            row_ids,
            chunk_rows,
            pending: Vec::new(),
            realized: None,
        }
    }

    fn shift_concat(&mut self, periods: usize) {
        self.pending.push(periods);
    }

    fn materialize(&mut self) -> Result<&Frame> {
        if self.realized.is_none() {
            self.realized = Some(self.gather_block(0));
        }
        let pending = std::mem::take(&mut self.pending);
        for shift in pending {
            let block = self.gather_block(shift);
            self.realized
                .as_mut()
                .expect("anchor block realized above")
                .prepend_columns(block)?;
        }
        Ok(self.realized.as_ref().expect("anchor block realized above"))
    }

    fn row_ids(&self) -> &[usize] {
        &self.row_ids
    }

    fn group_apply(&mut self, select: &RetentionFn<'_>) -> Result<()> {
        self.materialize()?;
        let keep = apply_selector(&self.base, &self.row_ids, select)?;
        self.row_ids = keep.iter().map(|&p| self.row_ids[p]).collect();
        let realized = self
            .realized
            .take()
            .expect("materialize leaves a realized frame");
        self.realized = Some(realized.select_rows(&keep));
        Ok(())
    }

    fn into_frame(mut self) -> Result<(Frame, Vec<usize>)> {
        self.materialize()?;
        let frame = self
            .realized
            .take()
            .expect("materialize leaves a realized frame");
        Ok((frame, self.row_ids))
    }
}
