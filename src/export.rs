//! Dataset export for downstream trainers.
//!
//! Writes a finished build to a directory as NumPy arrays plus a JSON
//! metadata sidecar:
//!
//! | file | contents |
//! |------|----------|
//! | `features.npy` | the `(samples, base_features, depth)` tensor |
//! | `retained_rows.npy` | anchor row positions, `u64`, one per sample |
//! | `metadata.json` | shape, configuration and creation timestamp |
//!
//! Label arrays are deliberately not written: labels belong to the
//! caller, which slices them with `retained_rows` against its own copy
//! of the input table.

use std::fs::{self, File};
use std::io::BufWriter;
use std::path::Path;

use ndarray::Array1;
use ndarray_npy::WriteNpyExt;
use serde::{Deserialize, Serialize};

use crate::config::WindowConfig;
use crate::error::Result;
use crate::pipeline::PipelineOutput;

/// Metadata describing an exported dataset.
#[derive(Debug, Serialize, Deserialize)]
pub struct ExportMetadata {
    /// Number of samples (tensor axis 0).
    pub n_samples: usize,

    /// Number of base features (tensor axis 1).
    pub n_features: usize,

    /// Window depth (tensor axis 2).
    pub depth: usize,

    /// Requested history length.
    pub window_dim: usize,

    /// Overlap policy used for the build.
    pub overlap: String,

    /// Whether windowing ran.
    pub windowing: bool,

    /// Final column schema backing the flattened feature axis.
    pub columns: Vec<String>,

    /// RFC 3339 creation timestamp.
    pub created_at: String,
}

/// Write a build's tensor, anchor indices and metadata into `dir`.
///
/// The directory is created if it does not exist; existing files are
/// overwritten.
pub fn export_dataset<P: AsRef<Path>>(
    output: &PipelineOutput,
    config: &WindowConfig,
    dir: P,
) -> Result<()> {
    let dir = dir.as_ref();
    fs::create_dir_all(dir)?;

    let features = BufWriter::new(File::create(dir.join("features.npy"))?);
    output.tensor.write_npy(features)?;

    let anchors: Array1<u64> = output.retained_rows.iter().map(|&i| i as u64).collect();
    let rows = BufWriter::new(File::create(dir.join("retained_rows.npy"))?);
    anchors.write_npy(rows)?;

    let metadata = ExportMetadata {
        n_samples: output.n_samples(),
        n_features: output.n_features(),
        depth: output.depth(),
        window_dim: config.window_dim,
        overlap: config.overlap.as_str().to_string(),
        windowing: config.windowing,
        columns: output.columns.clone(),
        created_at: chrono::Utc::now().to_rfc3339(),
    };
    let json = serde_json::to_string_pretty(&metadata)?;
    fs::write(dir.join("metadata.json"), json)?;

    log::info!(
        "exported {} samples to {}",
        metadata.n_samples,
        dir.display()
    );
    Ok(())
}
