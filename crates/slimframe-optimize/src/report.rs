//! Per-column summary of what the optimizer changed.

use std::fmt;

use serde::{Deserialize, Serialize};

use slimframe_core::schema::DataType;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnChange {
    pub name: String,
    pub before: DataType,
    pub after: DataType,
    pub bytes_before: usize,
    pub bytes_after: usize,
}

impl ColumnChange {
    pub fn changed(&self) -> bool {
        self.before != self.after
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptimizeReport {
    pub rows: usize,
    pub columns: Vec<ColumnChange>,
}

impl OptimizeReport {
    pub fn bytes_before(&self) -> usize {
        self.columns.iter().map(|c| c.bytes_before).sum()
    }

    pub fn bytes_after(&self) -> usize {
        self.columns.iter().map(|c| c.bytes_after).sum()
    }

    /// Fraction of bytes saved, `0.0` for an empty table.
    pub fn reduction(&self) -> f64 {
        let before = self.bytes_before();
        if before == 0 {
            return 0.0;
        }
        1.0 - self.bytes_after() as f64 / before as f64
    }

    pub fn changed_columns(&self) -> impl Iterator<Item = &ColumnChange> {
        self.columns.iter().filter(|c| c.changed())
    }
}

impl fmt::Display for OptimizeReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = self
            .columns
            .iter()
            .map(|c| c.name.len())
            .max()
            .unwrap_or(0)
            .max("column".len());
        writeln!(
            f,
            "{:<width$}  {:<11}  {:<11}  {:>12}  {:>12}",
            "column", "before", "after", "bytes before", "bytes after"
        )?;
        for c in &self.columns {
            writeln!(
                f,
                "{:<width$}  {:<11}  {:<11}  {:>12}  {:>12}",
                c.name,
                c.before.name(),
                c.after.name(),
                c.bytes_before,
                c.bytes_after
            )?;
        }
        write!(
            f,
            "{} rows, {} -> {} bytes ({:.1}% smaller)",
            self.rows,
            self.bytes_before(),
            self.bytes_after(),
            self.reduction() * 100.0
        )
    }
}
