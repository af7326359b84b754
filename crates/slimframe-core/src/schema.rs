//! Logical schema types. Pure data.
//!
//! `DataType` names the storage representation of a column. The optimizer
//! moves columns between types of the same family (integer, float, text).

use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DataType {
    Int8,
    Int16,
    Int32,
    Int64,
    Float16,
    Float32,
    Float64,
    Utf8,
    Categorical,
}

impl DataType {
    pub fn is_integer(self) -> bool {
        matches!(
            self,
            DataType::Int8 | DataType::Int16 | DataType::Int32 | DataType::Int64
        )
    }

    pub fn is_float(self) -> bool {
        matches!(
            self,
            DataType::Float16 | DataType::Float32 | DataType::Float64
        )
    }

    pub fn is_numeric(self) -> bool {
        self.is_integer() || self.is_float()
    }

    /// Width in bits of one value, for fixed-width types.
    pub fn bit_width(self) -> Option<u32> {
        match self {
            DataType::Int8 => Some(8),
            DataType::Int16 | DataType::Float16 => Some(16),
            DataType::Int32 | DataType::Float32 => Some(32),
            DataType::Int64 | DataType::Float64 => Some(64),
            DataType::Utf8 | DataType::Categorical => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            DataType::Int8 => "Int8",
            DataType::Int16 => "Int16",
            DataType::Int32 => "Int32",
            DataType::Int64 => "Int64",
            DataType::Float16 => "Float16",
            DataType::Float32 => "Float32",
            DataType::Float64 => "Float64",
            DataType::Utf8 => "Utf8",
            DataType::Categorical => "Categorical",
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    pub name: String,
    pub data_type: DataType,
    pub nullable: bool,
}

impl Field {
    pub fn new(name: impl Into<String>, data_type: DataType, nullable: bool) -> Self {
        Self {
            name: name.into(),
            data_type,
            nullable,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schema {
    pub fields: Vec<Field>,
}

impl Schema {
    pub fn new(fields: Vec<Field>) -> Self {
        Self { fields }
    }

    pub fn field(&self, idx: usize) -> Option<&Field> {
        self.fields.get(idx)
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == name)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn families_are_disjoint() {
        for dt in [DataType::Int8, DataType::Int16, DataType::Int32, DataType::Int64] {
            assert!(dt.is_integer() && !dt.is_float());
        }
        for dt in [DataType::Float16, DataType::Float32, DataType::Float64] {
            assert!(dt.is_float() && !dt.is_integer());
        }
        assert!(!DataType::Utf8.is_numeric());
        assert!(!DataType::Categorical.is_numeric());
    }

    #[test]
    fn schema_lookup_by_name() {
        let schema = Schema::new(vec![
            Field::new("id", DataType::Int64, false),
            Field::new("label", DataType::Utf8, true),
        ]);
        assert_eq!(schema.index_of("label"), Some(1));
        assert_eq!(schema.index_of("missing"), None);
        assert_eq!(schema.field(0).map(|f| f.data_type), Some(DataType::Int64));
    }
}
