//! Prelude module for convenient imports.
//!
//! ```ignore
//! use smart_windows::prelude::*;
//!
//! let config = WindowConfig::new(12, OverlapPolicy::Dynamic);
//! let output = Pipeline::new(config).run(table)?;
//! ```

pub use crate::config::{OverlapPolicy, WindowConfig};
pub use crate::error::{Result, WindowingError};
pub use crate::export::{export_dataset, ExportMetadata};
pub use crate::filter::{FilterReport, ValidityFilter};
pub use crate::frame::{
    ChunkedWindowFrame, Column, DeviceGroup, Frame, InMemoryWindowFrame, WindowTable,
};
pub use crate::pipeline::{Pipeline, PipelineOutput};
pub use crate::preprocessing::{prime_factors, MinMaxScaler, UnderSampler};
pub use crate::tensor::to_tensor;
pub use crate::window_builder::{reconcile_columns, WindowBuilder};
