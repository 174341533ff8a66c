//! Temporal windowing engine for per-device disk-health telemetry.
//!
//! This library turns a flat per-timestep table of SMART-style health
//! counters (one row per `(serial_number, date)`) into a fixed-shape
//! `(samples, base_features, depth)` tensor suitable as input to a
//! failure-prediction classifier.
//!
//! # Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                        smart-windows                           │
//! ├────────────────────────────────────────────────────────────────┤
//! │  frame/          - columnar table + out-of-core engine         │
//! │  preprocessing/  - min-max scaling, factorization, sampling    │
//! │  window_builder/ - shift-and-concatenate under overlap policy  │
//! │  filter          - invalid-window and identifier removal       │
//! │  tensor          - reshape into the classifier tensor          │
//! │  pipeline        - end-to-end orchestration                    │
//! │  export          - .npy / metadata export                      │
//! └────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Overlap policies
//!
//! The builder supports three trade-offs between historical density and
//! memory:
//!
//! - **Full**: every row carries its complete trailing window
//! - **Dynamic**: densify-then-decimate rounds driven by the prime
//!   factors of the window length, with per-device down-sampling that
//!   never discards the only evidence of a pending failure
//! - **Hybrid**: full windows for eventually-failing devices, dynamic
//!   windows for the rest
//!
//! # Example
//!
//! ```ignore
//! use smart_windows::prelude::*;
//!
//! let config = WindowConfig::new(12, OverlapPolicy::Dynamic);
//! let output = Pipeline::new(config).run(table)?;
//!
//! // Tensor for the classifier; slice labels with retained_rows.
//! assert_eq!(output.tensor.shape()[2], 5); // 12 = 2*2*3 -> depth 5
//! ```

pub mod config;
pub mod error;
pub mod export;
pub mod filter;
pub mod frame;
pub mod pipeline;
pub mod prelude;
pub mod preprocessing;
pub mod tensor;
pub mod window_builder;

// Re-exports - Configuration
pub use config::{OverlapPolicy, WindowConfig};

// Re-exports - Errors
pub use error::{Result, WindowingError};

// Re-exports - Table and engine
pub use frame::{ChunkedWindowFrame, Column, Frame, InMemoryWindowFrame, WindowTable};

// Re-exports - Pipeline
pub use pipeline::{Pipeline, PipelineOutput};

// Re-exports - Components
pub use filter::{FilterReport, ValidityFilter};
pub use preprocessing::{prime_factors, MinMaxScaler, UnderSampler};
pub use tensor::to_tensor;
pub use window_builder::{reconcile_columns, WindowBuilder};
