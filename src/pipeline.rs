//! End-to-end windowing pipeline.
//!
//! Connects all stages in order:
//!
//! ```text
//! raw table -> MinMaxScaler -> WindowBuilder -> reconcile_columns
//!                                   |                  |
//!                           (Factorizer,        ValidityFilter
//!                            UnderSampler)            |
//!                                               to_tensor -> X
//! ```
//!
//! Each stage is a pure function over an explicit table value; the
//! pipeline owns no mutable working state beyond the values it threads
//! through. A build is atomic from the caller's perspective: it
//! either returns a complete [`PipelineOutput`] or the first error.
//!
//! The input table must carry the identifier and label columns
//! (`serial_number`, `date`, `failure`, `predict_val`, `validate_val`,
//! `model`, `capacity_bytes`) plus any number of numeric feature
//! columns, with rows sorted by `(serial_number, date)`. Ordering is
//! assumed, not enforced; [`Pipeline::run`] logs a warning when it
//! spots out-of-order dates within a device.
//!
//! # Example
//!
//! ```ignore
//! use smart_windows::config::{OverlapPolicy, WindowConfig};
//! use smart_windows::pipeline::Pipeline;
//!
//! let config = WindowConfig::new(12, OverlapPolicy::Dynamic);
//! let output = Pipeline::new(config).run(table)?;
//! // output.tensor: (samples, base_features, 5)
//! // output.retained_rows: input-row position of each sample's anchor
//! ```

use chrono::NaiveDate;
use ndarray::Array3;

use crate::config::WindowConfig;
use crate::error::{Result, WindowingError};
use crate::filter::{drop_identifier_columns, FilterReport, ValidityFilter};
use crate::frame::{ChunkedWindowFrame, Frame};
use crate::preprocessing::MinMaxScaler;
use crate::tensor::to_tensor;
use crate::window_builder::{reconcile_columns, WindowBuilder};

/// Result of one windowing build.
#[derive(Debug)]
pub struct PipelineOutput {
    /// Feature tensor, shape `(samples, base_features, depth)`; depth
    /// is 1 when windowing is disabled.
    pub tensor: Array3<f64>,

    /// Input-table row position of each sample's anchor timestep,
    /// aligned with the tensor's first axis. Label arrays must be
    /// sliced with these positions to stay aligned; under the hybrid
    /// policy positions of failing devices can repeat.
    pub retained_rows: Vec<usize>,

    /// Final column schema (sorted, suffixed) backing the tensor's
    /// flattened feature axis.
    pub columns: Vec<String>,

    /// What the validity filter removed.
    pub filter: FilterReport,
}

impl PipelineOutput {
    /// Number of samples in the tensor.
    pub fn n_samples(&self) -> usize {
        self.tensor.shape()[0]
    }

    /// Number of base features per sample.
    pub fn n_features(&self) -> usize {
        self.tensor.shape()[1]
    }

    /// Window depth of the tensor.
    pub fn depth(&self) -> usize {
        self.tensor.shape()[2]
    }
}

/// The windowing pipeline for one configuration.
pub struct Pipeline {
    config: WindowConfig,
}

impl Pipeline {
    /// Pipeline over the given configuration.
    pub fn new(config: WindowConfig) -> Self {
        Self { config }
    }

    /// The pipeline's configuration.
    pub fn config(&self) -> &WindowConfig {
        &self.config
    }

    /// Run the full build over a raw telemetry table.
    pub fn run(&self, raw: Frame) -> Result<PipelineOutput> {
        self.config
            .validate()
            .map_err(WindowingError::InvalidConfig)?;

        warn_if_unsorted(&raw);

        log::info!(
            "scaling {} columns over {} rows",
            raw.ncols(),
            raw.nrows()
        );
        let scaled = MinMaxScaler::new().transform(raw)?;

        if !self.config.windowing {
            return self.run_unwindowed(scaled);
        }

        log::info!(
            "windowing table: dim {}, overlap {}",
            self.config.window_dim,
            self.config.overlap.as_str()
        );
        let builder = WindowBuilder::new(self.config.clone());
        let (wide, anchors) = builder.build::<ChunkedWindowFrame>(scaled)?;

        let wide = reconcile_columns(wide);
        let (clean, anchors, report) = ValidityFilter::new().apply(wide, anchors)?;

        let depth = self.config.depth();
        let tensor = to_tensor(&clean, depth)?;
        log::info!(
            "built tensor: {} samples x {} features x depth {}",
            tensor.shape()[0],
            tensor.shape()[1],
            tensor.shape()[2]
        );

        Ok(PipelineOutput {
            tensor,
            retained_rows: anchors,
            columns: clean.names().map(String::from).collect(),
            filter: report,
        })
    }

    /// Windowing disabled: keep every row, drop identifiers, add a
    /// singleton depth axis.
    fn run_unwindowed(&self, scaled: Frame) -> Result<PipelineOutput> {
        let n = scaled.nrows();
        let mut frame = scaled;
        drop_identifier_columns(&mut frame);

        let tensor = to_tensor(&frame, 1)?;
        Ok(PipelineOutput {
            tensor,
            retained_rows: (0..n).collect(),
            columns: frame.names().map(String::from).collect(),
            filter: FilterReport::default(),
        })
    }
}

/// Best-effort chronology check over `(serial_number, date)`.
///
/// Logs one warning when a device's dates go backwards; unparsable
/// dates or absent columns end the check silently. The build itself
/// never reorders rows.
fn warn_if_unsorted(frame: &Frame) {
    let serials = match frame.text_column("serial_number") {
        Ok(s) => s,
        Err(_) => return,
    };
    let dates = match frame.text_column("date") {
        Ok(d) => d,
        Err(_) => return,
    };

    let mut previous: Option<(&str, NaiveDate)> = None;
    for (serial, date) in serials.iter().zip(dates.iter()) {
        let (serial, date) = match (serial, date) {
            (Some(s), Some(d)) => (s.as_str(), d.as_str()),
            _ => continue,
        };
        let parsed = match NaiveDate::parse_from_str(date, "%Y-%m-%d") {
            Ok(p) => p,
            Err(_) => {
                log::debug!("unparsable date '{date}'; skipping chronology check");
                return;
            }
        };
        if let Some((prev_serial, prev_date)) = previous {
            if prev_serial == serial && parsed < prev_date {
                log::warn!(
                    "rows for device {serial} are not in chronological order; \
                     windows will mix timesteps"
                );
                return;
            }
        }
        previous = Some((serial, parsed));
    }
}
