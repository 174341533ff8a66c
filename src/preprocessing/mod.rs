//! Preprocessing stages that run before and inside the window builder.
//!
//! - **Normalization**: min-max scaling of feature columns, with
//!   identifier and label columns passed through untouched
//! - **Factorization**: prime factor decomposition of the window
//!   length, which drives the dynamic down-sampling schedule
//! - **Sampling**: per-device retention-index computation used to thin
//!   out redundant windows without losing failure evidence
//!
//! # Example
//!
//! ```ignore
//! use smart_windows::preprocessing::{prime_factors, MinMaxScaler, UnderSampler};
//!
//! let scaled = MinMaxScaler::new().transform(raw)?;
//! for factor in prime_factors(window_dim) {
//!     let sampler = UnderSampler::new(factor);
//!     // ... densify, then retain sampler.retain_indices(&group) per device
//! }
//! ```

pub mod factorization;
pub mod normalization;
pub mod sampling;

// Re-export commonly used types for convenience
pub use factorization::{dynamic_depth, prime_factors};
pub use normalization::MinMaxScaler;
pub use sampling::{rolling_max, UnderSampler, DEFAULT_TAIL_GUARD};
