#![forbid(unsafe_code)]
//! slimframe-core: the in-memory table model shared by every other crate.
//!
//! A `Table` is an ordered list of named, homogeneously typed columns. Column
//! storage is typed (`ColumnData`) so that narrowing a column actually shrinks
//! its footprint. No I/O lives here.

pub mod config;
pub mod error;
pub mod hash;
pub mod prelude;
pub mod schema;
pub mod types;

pub use error::{Error, Result};
pub use schema::{DataType, Field, Schema};
pub use types::{CategoricalArray, Column, ColumnData, Scalar, Table};
