//! Windowing configuration.
//!
//! One [`WindowConfig`] fully determines a build: the requested history
//! length, the overlap policy, whether windowing runs at all, and the
//! engine tunables (chunk size, tail guard). Configurations serialize
//! to TOML or JSON so an experiment can be pinned to a file and
//! reproduced, and the tuple `(window_dim, overlap, windowing)` is the
//! natural cache key for a build's output.
//!
//! # Example
//!
//! ```
//! use smart_windows::config::{OverlapPolicy, WindowConfig};
//!
//! let config = WindowConfig::new(12, OverlapPolicy::Dynamic);
//! assert!(config.validate().is_ok());
//! // 12 = 2 * 2 * 3 -> depth (1 + 1 + 2) + 1
//! assert_eq!(config.depth(), 5);
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::preprocessing::{dynamic_depth, DEFAULT_TAIL_GUARD};

/// How much historical redundancy each windowed sample carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OverlapPolicy {
    /// Every row is enriched with all `window_dim - 1` preceding
    /// timesteps. Maximum information, maximum memory.
    Full,

    /// Densify-then-decimate rounds driven by the prime factors of
    /// `window_dim`. Bounds peak row count at the cost of coarser lag
    /// coverage.
    Dynamic,

    /// Full windows for devices that eventually fail, dynamic windows
    /// over the whole population, concatenated. Accepted in config
    /// files as `hybrid` or the legacy spelling `other`.
    #[serde(alias = "other")]
    Hybrid,
}

impl OverlapPolicy {
    /// Stable lowercase name, as used in config files and cache keys.
    pub fn as_str(&self) -> &'static str {
        match self {
            OverlapPolicy::Full => "full",
            OverlapPolicy::Dynamic => "dynamic",
            OverlapPolicy::Hybrid => "hybrid",
        }
    }
}

fn default_chunk_rows() -> usize {
    100_000
}

fn default_tail_guard() -> usize {
    DEFAULT_TAIL_GUARD
}

/// Configuration for one windowing build.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowConfig {
    /// Target history length (lag depth) per sample, in timesteps.
    pub window_dim: usize,

    /// Overlap policy selecting the build procedure.
    pub overlap: OverlapPolicy,

    /// Whether windowing runs at all. When false the builder and the
    /// windowing-specific filter steps are bypassed and the output
    /// tensor gets a singleton trailing axis.
    pub windowing: bool,

    /// Row-chunk size for the out-of-core engine.
    #[serde(default = "default_chunk_rows")]
    pub chunk_rows: usize,

    /// Rows excluded from retention at the end of each device group
    /// during down-sampling.
    #[serde(default = "default_tail_guard")]
    pub tail_guard: usize,
}

impl WindowConfig {
    /// Configuration with windowing enabled and default engine
    /// tunables.
    pub fn new(window_dim: usize, overlap: OverlapPolicy) -> Self {
        Self {
            window_dim,
            overlap,
            windowing: true,
            chunk_rows: default_chunk_rows(),
            tail_guard: default_tail_guard(),
        }
    }

    /// Enable or disable windowing.
    pub fn with_windowing(mut self, windowing: bool) -> Self {
        self.windowing = windowing;
        self
    }

    /// Set the engine row-chunk size.
    pub fn with_chunk_rows(mut self, chunk_rows: usize) -> Self {
        self.chunk_rows = chunk_rows;
        self
    }

    /// Override the down-sampling tail guard.
    pub fn with_tail_guard(mut self, tail_guard: usize) -> Self {
        self.tail_guard = tail_guard;
        self
    }

    /// Effective window depth: the number of stacked lag copies of every
    /// base column a built sample carries.
    ///
    /// `window_dim` under full overlap; `Σ(factor − 1) + 1` over the
    /// prime factors of `window_dim` otherwise. The same value feeds the
    /// reshaper, so builder and reshaper cannot disagree.
    pub fn depth(&self) -> usize {
        if !self.windowing {
            return 1;
        }
        match self.overlap {
            OverlapPolicy::Full => self.window_dim,
            OverlapPolicy::Dynamic | OverlapPolicy::Hybrid => dynamic_depth(self.window_dim),
        }
    }

    /// Validate the configuration.
    ///
    /// Returns Ok(()) if valid, Err(msg) otherwise.
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.window_dim == 0 {
            return Err("window_dim must be > 0".to_string());
        }
        if self.chunk_rows == 0 {
            return Err("chunk_rows must be > 0".to_string());
        }
        Ok(())
    }

    /// Save configuration to a TOML file.
    pub fn save_toml<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let toml_string = toml::to_string_pretty(self)?;
        fs::write(path, toml_string)?;
        Ok(())
    }

    /// Load configuration from a TOML file.
    pub fn load_toml<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: WindowConfig = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Save configuration to a JSON file.
    pub fn save_json<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let json_string = serde_json::to_string_pretty(self)?;
        fs::write(path, json_string)?;
        Ok(())
    }

    /// Load configuration from a JSON file.
    pub fn load_json<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: WindowConfig = serde_json::from_str(&contents)?;
        Ok(config)
    }
}
