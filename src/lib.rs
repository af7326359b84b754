#![forbid(unsafe_code)]
//! slimframe: narrow the column types of in-memory tables, and cache
//! optimized tables on disk grouped by category.
//!
//! This crate only re-exports the workspace members:
//! - [`core`]: `Table`, `Column`, `DataType`, config and hashing.
//! - [`optimize`]: integer/float narrowing and categorical encoding.
//! - [`io`]: delimited-text reader, cache blobs, storage and the category registry.

pub use slimframe_core as core;
pub use slimframe_io as io;
pub use slimframe_optimize as optimize;

pub use slimframe_core::{Column, ColumnData, DataType, Table};
pub use slimframe_io::{CategoryRegistry, TableCache};
pub use slimframe_optimize::{optimize, optimize_with, OptimizeOptions};
