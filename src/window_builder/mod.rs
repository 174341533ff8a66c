//! Shift-and-concatenate window construction.
//!
//! - **WindowBuilder**: drives the overlap policy (full, dynamic,
//!   hybrid) over a [`crate::frame::WindowTable`] engine
//! - **Column reconciliation**: renames the duplicate columns produced
//!   by repeated shifting and sorts the schema into canonical order

pub mod builder;
pub mod columns;

pub use builder::WindowBuilder;
pub use columns::reconcile_columns;
