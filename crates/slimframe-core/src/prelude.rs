//! Convenient re-exports for downstream crates.

pub use crate::config::SlimConfig;
pub use crate::error::{Error, Result};
pub use crate::hash::Hash256;
pub use crate::schema::{DataType, Field, Schema};
pub use crate::types::{CategoricalArray, Column, ColumnData, Scalar, Table};
