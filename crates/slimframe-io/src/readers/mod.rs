//! Readers that produce in-memory `Table`s.

pub mod csv;
