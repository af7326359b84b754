//! Typed column storage, scalars, and the `Table` container.
//!
//! Every column variant stores `Option<T>` slots so nulls survive narrowing.
//! Float columns serialize as IEEE bit patterns; JSON has no spelling for
//! NaN or infinity and would otherwise turn them into nulls.

use std::collections::HashSet;
use std::mem::size_of;

use half::f16;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::schema::{DataType, Field, Schema};

#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Null,
    I8(i8),
    I16(i16),
    I32(i32),
    I64(i64),
    F16(f16),
    F32(f32),
    F64(f64),
    Str(String),
}

impl Scalar {
    /// Storage type of the value; `None` for `Null`.
    pub fn data_type(&self) -> Option<DataType> {
        match self {
            Scalar::Null => None,
            Scalar::I8(_) => Some(DataType::Int8),
            Scalar::I16(_) => Some(DataType::Int16),
            Scalar::I32(_) => Some(DataType::Int32),
            Scalar::I64(_) => Some(DataType::Int64),
            Scalar::F16(_) => Some(DataType::Float16),
            Scalar::F32(_) => Some(DataType::Float32),
            Scalar::F64(_) => Some(DataType::Float64),
            Scalar::Str(_) => Some(DataType::Utf8),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Scalar::Null)
    }

    /// Integer value widened to `i64`.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Scalar::I8(v) => Some(i64::from(*v)),
            Scalar::I16(v) => Some(i64::from(*v)),
            Scalar::I32(v) => Some(i64::from(*v)),
            Scalar::I64(v) => Some(*v),
            _ => None,
        }
    }

    /// Float value widened to `f64`.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Scalar::F16(v) => Some(v.to_f64()),
            Scalar::F32(v) => Some(f64::from(*v)),
            Scalar::F64(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Scalar::Str(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Widen to the family's widest representation (`I64`, `F64`, `Str`).
    pub fn widen(&self) -> Scalar {
        if let Some(v) = self.as_i64() {
            return Scalar::I64(v);
        }
        if let Some(v) = self.as_f64() {
            return Scalar::F64(v);
        }
        self.clone()
    }

    /// Equality after widening both sides. NaN equals NaN here.
    pub fn widened_eq(&self, other: &Scalar) -> bool {
        match (self.widen(), other.widen()) {
            (Scalar::F64(a), Scalar::F64(b)) => a == b || (a.is_nan() && b.is_nan()),
            (a, b) => a == b,
        }
    }
}

/// Dictionary-encoded text: distinct values plus a per-row index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoricalArray {
    pub dictionary: Vec<String>,
    pub codes: Vec<Option<u32>>,
}

impl CategoricalArray {
    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    /// Decoded value at `row`; `None` for null rows or out-of-range rows.
    pub fn value(&self, row: usize) -> Option<&str> {
        let code = (*self.codes.get(row)?)?;
        self.dictionary.get(code as usize).map(String::as_str)
    }

    /// Check that every code points into the dictionary.
    pub fn validate(&self) -> Result<()> {
        let n = self.dictionary.len();
        if let Some(bad) = self.codes.iter().flatten().find(|c| **c as usize >= n) {
            return Err(Error::Schema(format!(
                "categorical code {bad} out of range for dictionary of {n} values"
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "values")]
pub enum ColumnData {
    Int8(Vec<Option<i8>>),
    Int16(Vec<Option<i16>>),
    Int32(Vec<Option<i32>>),
    Int64(Vec<Option<i64>>),
    Float16(#[serde(with = "float_bits::f16s")] Vec<Option<f16>>),
    Float32(#[serde(with = "float_bits::f32s")] Vec<Option<f32>>),
    Float64(#[serde(with = "float_bits::f64s")] Vec<Option<f64>>),
    Utf8(Vec<Option<String>>),
    Categorical(CategoricalArray),
}

impl ColumnData {
    pub fn int64(values: impl IntoIterator<Item = i64>) -> Self {
        ColumnData::Int64(values.into_iter().map(Some).collect())
    }

    pub fn float64(values: impl IntoIterator<Item = f64>) -> Self {
        ColumnData::Float64(values.into_iter().map(Some).collect())
    }

    pub fn utf8<S: Into<String>>(values: impl IntoIterator<Item = S>) -> Self {
        ColumnData::Utf8(values.into_iter().map(|s| Some(s.into())).collect())
    }

    pub fn data_type(&self) -> DataType {
        match self {
            ColumnData::Int8(_) => DataType::Int8,
            ColumnData::Int16(_) => DataType::Int16,
            ColumnData::Int32(_) => DataType::Int32,
            ColumnData::Int64(_) => DataType::Int64,
            ColumnData::Float16(_) => DataType::Float16,
            ColumnData::Float32(_) => DataType::Float32,
            ColumnData::Float64(_) => DataType::Float64,
            ColumnData::Utf8(_) => DataType::Utf8,
            ColumnData::Categorical(_) => DataType::Categorical,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            ColumnData::Int8(v) => v.len(),
            ColumnData::Int16(v) => v.len(),
            ColumnData::Int32(v) => v.len(),
            ColumnData::Int64(v) => v.len(),
            ColumnData::Float16(v) => v.len(),
            ColumnData::Float32(v) => v.len(),
            ColumnData::Float64(v) => v.len(),
            ColumnData::Utf8(v) => v.len(),
            ColumnData::Categorical(c) => c.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Value at `row` as a scalar; `None` past the end.
    pub fn get(&self, row: usize) -> Option<Scalar> {
        if row >= self.len() {
            return None;
        }
        let s = match self {
            ColumnData::Int8(v) => v[row].map_or(Scalar::Null, Scalar::I8),
            ColumnData::Int16(v) => v[row].map_or(Scalar::Null, Scalar::I16),
            ColumnData::Int32(v) => v[row].map_or(Scalar::Null, Scalar::I32),
            ColumnData::Int64(v) => v[row].map_or(Scalar::Null, Scalar::I64),
            ColumnData::Float16(v) => v[row].map_or(Scalar::Null, Scalar::F16),
            ColumnData::Float32(v) => v[row].map_or(Scalar::Null, Scalar::F32),
            ColumnData::Float64(v) => v[row].map_or(Scalar::Null, Scalar::F64),
            ColumnData::Utf8(v) => v[row].clone().map_or(Scalar::Null, Scalar::Str),
            ColumnData::Categorical(c) => c
                .value(row)
                .map_or(Scalar::Null, |s| Scalar::Str(s.to_string())),
        };
        Some(s)
    }

    pub fn null_count(&self) -> usize {
        match self {
            ColumnData::Int8(v) => count_nulls(v),
            ColumnData::Int16(v) => count_nulls(v),
            ColumnData::Int32(v) => count_nulls(v),
            ColumnData::Int64(v) => count_nulls(v),
            ColumnData::Float16(v) => count_nulls(v),
            ColumnData::Float32(v) => count_nulls(v),
            ColumnData::Float64(v) => count_nulls(v),
            ColumnData::Utf8(v) => count_nulls(v),
            ColumnData::Categorical(c) => count_nulls(&c.codes),
        }
    }

    /// Estimated bytes held by this column: slot storage plus string heap.
    pub fn memory_usage(&self) -> usize {
        match self {
            ColumnData::Int8(v) => slot_bytes(v),
            ColumnData::Int16(v) => slot_bytes(v),
            ColumnData::Int32(v) => slot_bytes(v),
            ColumnData::Int64(v) => slot_bytes(v),
            ColumnData::Float16(v) => slot_bytes(v),
            ColumnData::Float32(v) => slot_bytes(v),
            ColumnData::Float64(v) => slot_bytes(v),
            ColumnData::Utf8(v) => {
                slot_bytes(v) + v.iter().flatten().map(String::len).sum::<usize>()
            }
            ColumnData::Categorical(c) => {
                slot_bytes(&c.codes)
                    + slot_bytes(&c.dictionary)
                    + c.dictionary.iter().map(String::len).sum::<usize>()
            }
        }
    }

    /// Number of distinct values; a null counts once if present.
    pub fn distinct_count(&self) -> usize {
        let mut seen: HashSet<String> = HashSet::new();
        let mut saw_null = false;
        for row in 0..self.len() {
            match self.get(row) {
                Some(Scalar::Null) | None => saw_null = true,
                Some(s) => {
                    seen.insert(scalar_key(&s));
                }
            }
        }
        seen.len() + usize::from(saw_null)
    }
}

fn count_nulls<T>(values: &[Option<T>]) -> usize {
    values.iter().filter(|v| v.is_none()).count()
}

fn slot_bytes<T>(values: &[T]) -> usize {
    values.len() * size_of::<T>()
}

fn scalar_key(s: &Scalar) -> String {
    match s.widen() {
        Scalar::I64(v) => format!("i:{v}"),
        Scalar::F64(v) => format!("f:{}", v.to_bits()),
        Scalar::Str(v) => format!("s:{v}"),
        other => format!("{other:?}"),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    pub data: ColumnData,
}

impl Column {
    pub fn new(name: impl Into<String>, data: ColumnData) -> Self {
        Self {
            name: name.into(),
            data,
        }
    }

    pub fn data_type(&self) -> DataType {
        self.data.data_type()
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn memory_usage(&self) -> usize {
        self.data.memory_usage()
    }

    pub fn field(&self) -> Field {
        Field::new(
            self.name.clone(),
            self.data_type(),
            self.data.null_count() > 0,
        )
    }
}

/// Ordered, named columns with a uniform row count.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Table {
    columns: Vec<Column>,
}

impl Table {
    /// Build a table, rejecting columns of differing lengths.
    pub fn try_new(columns: Vec<Column>) -> Result<Self> {
        if let Some(first) = columns.first() {
            let rows = first.len();
            if let Some(bad) = columns.iter().find(|c| c.len() != rows) {
                return Err(Error::Schema(format!(
                    "column '{}' has {} rows, expected {} (from column '{}')",
                    bad.name,
                    bad.len(),
                    rows,
                    first.name
                )));
            }
        }
        for col in &columns {
            if let ColumnData::Categorical(c) = &col.data {
                c.validate()?;
            }
        }
        Ok(Self { columns })
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn into_columns(self) -> Vec<Column> {
        self.columns
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn num_rows(&self) -> usize {
        self.columns.first().map(|c| c.len()).unwrap_or(0)
    }

    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    pub fn schema(&self) -> Schema {
        Schema::new(self.columns.iter().map(Column::field).collect())
    }

    pub fn memory_usage(&self) -> usize {
        self.columns.iter().map(Column::memory_usage).sum()
    }

    /// New table with each column replaced by `f(column)`. `f` must keep the
    /// row count; names and order come from whatever `f` returns.
    pub fn map_columns<F>(&self, f: F) -> Table
    where
        F: FnMut(&Column) -> Column,
    {
        let columns: Vec<Column> = self.columns.iter().map(f).collect();
        debug_assert!(columns.iter().all(|c| c.len() == self.num_rows()));
        Table { columns }
    }

    /// Row `idx` as scalars in column order.
    pub fn row(&self, idx: usize) -> Option<Vec<Scalar>> {
        if idx >= self.num_rows() {
            return None;
        }
        self.columns.iter().map(|c| c.data.get(idx)).collect()
    }

    /// True when both tables have the same shape, names, and values once
    /// every value is widened to its family's widest type.
    pub fn equals_widened(&self, other: &Table) -> bool {
        if self.num_columns() != other.num_columns() || self.num_rows() != other.num_rows() {
            return false;
        }
        self.columns.iter().zip(&other.columns).all(|(a, b)| {
            a.name == b.name
                && (0..a.len()).all(|r| match (a.data.get(r), b.data.get(r)) {
                    (Some(x), Some(y)) => x.widened_eq(&y),
                    _ => false,
                })
        })
    }
}

mod float_bits {
    use half::f16;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    fn serialize_bits<S, T, B>(values: &[Option<T>], to_bits: fn(T) -> B, s: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
        T: Copy,
        B: Serialize,
    {
        s.collect_seq(values.iter().map(|v| v.map(to_bits)))
    }

    fn deserialize_bits<'de, D, T, B>(d: D, from_bits: fn(B) -> T) -> Result<Vec<Option<T>>, D::Error>
    where
        D: Deserializer<'de>,
        B: Deserialize<'de>,
    {
        let bits: Vec<Option<B>> = Vec::deserialize(d)?;
        Ok(bits.into_iter().map(|b| b.map(from_bits)).collect())
    }

    pub mod f16s {
        use super::*;

        pub fn serialize<S: Serializer>(v: &[Option<f16>], s: S) -> Result<S::Ok, S::Error> {
            serialize_bits(v, f16::to_bits, s)
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<Option<f16>>, D::Error> {
            deserialize_bits(d, f16::from_bits)
        }
    }

    pub mod f32s {
        use super::*;

        pub fn serialize<S: Serializer>(v: &[Option<f32>], s: S) -> Result<S::Ok, S::Error> {
            serialize_bits(v, f32::to_bits, s)
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<Option<f32>>, D::Error> {
            deserialize_bits(d, f32::from_bits)
        }
    }

    pub mod f64s {
        use super::*;

        pub fn serialize<S: Serializer>(v: &[Option<f64>], s: S) -> Result<S::Ok, S::Error> {
            serialize_bits(v, f64::to_bits, s)
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<Option<f64>>, D::Error> {
            deserialize_bits(d, f64::from_bits)
        }
    }
}
