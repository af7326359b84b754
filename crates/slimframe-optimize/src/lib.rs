#![forbid(unsafe_code)]
//! slimframe-optimize: shrink a table's column storage.
//!
//! - Integer columns move to the narrowest of Int8/Int16/Int32/Int64 that
//!   covers their observed min and max.
//! - Float columns move to the narrowest of Float16/Float32/Float64 whose
//!   finite range covers min and max. Range-only by default, which can drop
//!   significand bits; see `FloatDowncast`.
//! - Text columns with few distinct values become categorical.
//!
//! Everything here is pure and synchronous. Inputs are never mutated.

pub mod numeric;
pub mod optimizer;
pub mod options;
pub mod report;
pub mod text;

pub use optimizer::{optimize, optimize_column, optimize_with, optimize_with_report, planned_types};
pub use options::{FloatDowncast, OptimizeOptions, CATEGORICAL_RATIO_THRESHOLD};
pub use report::{ColumnChange, OptimizeReport};
