//! Error types for the windowing engine.
//!
//! One crate-wide error enum; every fallible operation returns
//! [`Result`]. There are no retries anywhere: a build either yields a
//! complete tensor or fails with the first error it hits.

use thiserror::Error;

/// Errors raised while building windowed datasets.
#[derive(Debug, Error)]
pub enum WindowingError {
    /// A column the engine needs is absent from the table.
    #[error("column '{0}' not found in table")]
    MissingColumn(String),

    /// A column that must be numeric holds text data. Scaling and
    /// shifting cannot recover from this; the upstream table has to be
    /// fixed and the build re-run.
    #[error("non-numeric data in column '{0}'")]
    NonNumericColumn(String),

    /// Two tables that must agree on row count don't.
    #[error("row count mismatch: expected {expected}, got {actual}")]
    RowCountMismatch { expected: usize, actual: usize },

    /// Two tables that must agree on schema don't.
    #[error("column layout mismatch: expected {expected} columns, got {actual}")]
    ColumnCountMismatch { expected: usize, actual: usize },

    /// Two columns that must share a storage type don't.
    #[error("column type mismatch while appending rows")]
    ColumnTypeMismatch,

    /// Configuration failed validation.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// The filtered table's row length is not divisible by the window
    /// depth. Indicates a depth mismatch between the builder and the
    /// reshaper.
    #[error("row length {row_len} is not divisible by window depth {depth}")]
    DepthMismatch { row_len: usize, depth: usize },

    /// Tensor reshape failure.
    #[error("tensor shape error: {0}")]
    Shape(#[from] ndarray::ShapeError),

    /// Filesystem failure during config or dataset I/O.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// NumPy array export failure.
    #[error("npy write error: {0}")]
    Npy(#[from] ndarray_npy::WriteNpyError),

    /// JSON (de)serialization failure.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML deserialization failure.
    #[error("TOML parse error: {0}")]
    TomlDe(#[from] toml::de::Error),

    /// TOML serialization failure.
    #[error("TOML write error: {0}")]
    TomlSer(#[from] toml::ser::Error),
}

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, WindowingError>;
