//! Window construction under the three overlap policies.
//!
//! The builder turns a normalized per-timestep table into a wide table
//! where every row carries stacked lag copies of each base column. It
//! drives a [`WindowTable`] engine through one of three procedures:
//!
//! - **Full**: `window_dim - 1` shift-and-concatenate steps. Every row
//!   becomes a dense window over its trailing history.
//! - **Dynamic**: the prime factors of `window_dim` are processed in
//!   order; each factor `p` contributes `p - 1` shift steps at the
//!   current cumulative stride, followed by a per-device down-sampling
//!   pass at factor `p`. Interleaving densify and decimate bounds the
//!   peak row count while still reaching the requested lag span.
//! - **Hybrid**: the dynamic procedure over the whole population, plus
//!   the full procedure restricted to rows of eventually-failing
//!   devices (`validate_val == 1`), row-appended with lag columns
//!   aligned anchor-to-anchor.
//!
//! Shifts are applied globally, not per device: a window at the start
//! of one device's history reaches into the previous device's rows.
//! Callers either partition per device upstream or accept the
//! approximation; the validity filter removes the table-leading rows
//! whose deepest lag has no data at all.
//!
//! # Example
//!
//! ```ignore
//! use smart_windows::config::{OverlapPolicy, WindowConfig};
//! use smart_windows::frame::ChunkedWindowFrame;
//! use smart_windows::window_builder::WindowBuilder;
//!
//! let config = WindowConfig::new(4, OverlapPolicy::Dynamic);
//! let (wide, anchors) = WindowBuilder::new(config).build::<ChunkedWindowFrame>(table)?;
//! ```

use std::sync::Arc;

use crate::config::{OverlapPolicy, WindowConfig};
use crate::error::Result;
use crate::frame::{DeviceGroup, Frame, WindowTable};
use crate::preprocessing::{prime_factors, UnderSampler};

/// Builds the windowed (shift-and-concatenate) table for one
/// configuration.
pub struct WindowBuilder {
    config: WindowConfig,
}

impl WindowBuilder {
    /// Builder for the given configuration.
    pub fn new(config: WindowConfig) -> Self {
        Self { config }
    }

    /// Run the configured overlap policy over `base`.
    ///
    /// Returns the wide table together with the anchor row positions
    /// (into `base`) aligned to its rows. Under the hybrid policy a row
    /// of a failing device can appear twice, once from each
    /// sub-procedure, so anchor positions are not necessarily unique.
    pub fn build<T: WindowTable>(&self, base: Frame) -> Result<(Frame, Vec<usize>)> {
        let base = Arc::new(base);
        match self.config.overlap {
            OverlapPolicy::Full => {
                let n = base.nrows();
                let acc = self.full_pass::<T>(base, (0..n).collect());
                acc.into_frame()
            }
            OverlapPolicy::Dynamic => {
                let acc = self.dynamic_pass::<T>(base)?;
                acc.into_frame()
            }
            OverlapPolicy::Hybrid => {
                let failed_rows = eventually_failing_rows(&base)?;
                log::info!(
                    "hybrid build: {} of {} rows belong to failing devices",
                    failed_rows.len(),
                    base.nrows()
                );

                let dense = self.full_pass::<T>(base.clone(), failed_rows);
                let sparse = self.dynamic_pass::<T>(base)?;

                let (mut frame, mut anchors) = sparse.into_frame()?;
                let (dense_frame, dense_anchors) = dense.into_frame()?;
                frame.append_rows_aligned(dense_frame)?;
                anchors.extend(dense_anchors);
                Ok((frame, anchors))
            }
        }
    }

    /// Dense windowing: one shift per preceding timestep.
    fn full_pass<T: WindowTable>(&self, base: Arc<Frame>, row_ids: Vec<usize>) -> T {
        let mut acc = T::with_rows(base, self.config.chunk_rows, row_ids);
        for lag in 1..self.config.window_dim {
            log::debug!("concatenating lag {lag}");
            acc.shift_concat(lag);
        }
        acc
    }

    /// Factor-driven windowing: densify at the cumulative stride, then
    /// decimate per device, once per prime factor.
    fn dynamic_pass<T: WindowTable>(&self, base: Arc<Frame>) -> Result<T> {
        let mut acc = T::from_base(base, self.config.chunk_rows);
        let mut stride = 1;
        for factor in prime_factors(self.config.window_dim) {
            for step in 1..factor {
                log::debug!("concatenating lag {}", stride * step);
                acc.shift_concat(stride * step);
            }
            acc.materialize()?;

            let rows_before = acc.row_ids().len();
            let sampler = UnderSampler::new(factor).with_tail_guard(self.config.tail_guard);
            acc.group_apply(&|group: &DeviceGroup<'_>| sampler.retain_indices(group.predict_val))?;
            log::info!(
                "down-sampled by {factor}: {} -> {} rows",
                rows_before,
                acc.row_ids().len()
            );

            stride *= factor;
        }
        Ok(acc)
    }
}

/// Row positions whose device eventually fails (`validate_val == 1`).
fn eventually_failing_rows(base: &Frame) -> Result<Vec<usize>> {
    let validate = base.float_column("validate_val")?;
    Ok(validate
        .iter()
        .enumerate()
        .filter(|(_, &v)| v == 1.0)
        .map(|(i, _)| i)
        .collect())
}
