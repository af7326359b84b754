//! Delimited-text reader with per-column type inference.
//!
//! Inference runs over the non-null fields of each column: all `i64` gives
//! Int64, otherwise all `f64` gives Float64, otherwise Utf8. A column with
//! rows but no non-null field is Float64.

use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::io::Read;
use std::path::Path;

use slimframe_core::config::SlimConfig;
use slimframe_core::types::{Column, ColumnData, Table};

use crate::error::{Error, Result};

/// Field spellings read as null.
pub const NULL_TOKENS: &[&str] = &[
    "", "NA", "N/A", "n/a", "NaN", "nan", "-NaN", "-nan", "null", "NULL", "None", "<NA>", "#N/A",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CsvOptions {
    pub delimiter: u8,
    pub has_headers: bool,
}

impl Default for CsvOptions {
    fn default() -> Self {
        Self {
            delimiter: b',',
            has_headers: true,
        }
    }
}

impl CsvOptions {
    pub fn from_config(cfg: &SlimConfig) -> Result<Self> {
        if !cfg.csv_delimiter.is_ascii() {
            return Err(Error::Config(format!(
                "csv delimiter must be ASCII, got {:?}",
                cfg.csv_delimiter
            )));
        }
        Ok(Self {
            delimiter: cfg.csv_delimiter as u8,
            ..Self::default()
        })
    }
}

pub struct CsvReader<R: Read> {
    inner: csv::Reader<R>,
    has_headers: bool,
}

impl CsvReader<File> {
    pub fn from_path<P: AsRef<Path>>(path: P, opts: &CsvOptions) -> Result<Self> {
        let file = File::open(path)?;
        Ok(Self::from_reader(file, opts))
    }
}

impl<R: Read> CsvReader<R> {
    pub fn from_reader(reader: R, opts: &CsvOptions) -> Self {
        let inner = csv::ReaderBuilder::new()
            .delimiter(opts.delimiter)
            .has_headers(opts.has_headers)
            .from_reader(reader);
        Self {
            inner,
            has_headers: opts.has_headers,
        }
    }

    /// Read every remaining record into a table.
    pub fn read_table(mut self) -> Result<Table> {
        let mut names: Vec<String> = if self.has_headers {
            dedupe_names(self.inner.headers()?.iter())
        } else {
            Vec::new()
        };
        let mut fields: Vec<Vec<Option<String>>> = vec![Vec::new(); names.len()];

        for record in self.inner.records() {
            let record = record?;
            if names.is_empty() && fields.is_empty() {
                names = (0..record.len()).map(|i| format!("column_{i}")).collect();
                fields = vec![Vec::new(); record.len()];
            }
            for (col, field) in fields.iter_mut().zip(record.iter()) {
                col.push(parse_field(field));
            }
        }

        let columns = names
            .into_iter()
            .zip(fields)
            .map(|(name, values)| Column::new(name, infer_column(values)))
            .collect();
        Ok(Table::try_new(columns)?)
    }
}

/// Read a delimited-text file into a table.
pub fn read_csv<P: AsRef<Path>>(path: P, opts: &CsvOptions) -> Result<Table> {
    CsvReader::from_path(path, opts)?.read_table()
}

/// Repeated header names get a `.N` suffix (`a`, `a.1`, `a.2`), skipping
/// any suffix already taken by another header.
fn dedupe_names<'a>(headers: impl Iterator<Item = &'a str>) -> Vec<String> {
    let headers: Vec<&str> = headers.collect();
    let mut taken: HashSet<String> = headers.iter().map(|h| h.to_string()).collect();
    let mut seen: HashSet<&str> = HashSet::new();
    let mut counts: HashMap<&str, usize> = HashMap::new();

    headers
        .iter()
        .map(|&h| {
            if seen.insert(h) {
                return h.to_string();
            }
            let n = counts.entry(h).or_insert(0);
            loop {
                *n += 1;
                let candidate = format!("{h}.{n}");
                if taken.insert(candidate.clone()) {
                    return candidate;
                }
            }
        })
        .collect()
}

fn parse_field(field: &str) -> Option<String> {
    if NULL_TOKENS.contains(&field) {
        None
    } else {
        Some(field.to_string())
    }
}

fn infer_column(values: Vec<Option<String>>) -> ColumnData {
    if values.is_empty() {
        return ColumnData::Utf8(values);
    }
    if values.iter().all(Option::is_none) {
        return ColumnData::Float64(vec![None; values.len()]);
    }
    if let Some(ints) = parse_all(&values, |s| s.parse::<i64>().ok()) {
        return ColumnData::Int64(ints);
    }
    if let Some(floats) = parse_all(&values, |s| s.parse::<f64>().ok()) {
        return ColumnData::Float64(floats);
    }
    ColumnData::Utf8(values)
}

fn parse_all<T>(values: &[Option<String>], parse: impl Fn(&str) -> Option<T>) -> Option<Vec<Option<T>>> {
    values
        .iter()
        .map(|v| match v {
            Some(s) => parse(s).map(Some),
            None => Some(None),
        })
        .collect()
}
