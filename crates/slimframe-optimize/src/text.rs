//! Dictionary encoding for low-cardinality text columns.

use std::collections::{BTreeSet, HashMap};

use slimframe_core::types::CategoricalArray;

/// `distinct / rows` for a text column; a null counts as one distinct value.
/// `None` for zero rows.
pub fn distinct_ratio(values: &[Option<String>]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut distinct: BTreeSet<&str> = BTreeSet::new();
    let mut saw_null = false;
    for v in values {
        match v {
            Some(s) => {
                distinct.insert(s.as_str());
            }
            None => saw_null = true,
        }
    }
    let count = distinct.len() + usize::from(saw_null);
    Some(count as f64 / values.len() as f64)
}

/// Encode `values` as categorical when the distinct ratio is strictly below
/// `threshold`. The dictionary holds the distinct non-null values in sorted
/// order; null rows get no code.
pub fn encode_categorical(values: &[Option<String>], threshold: f64) -> Option<CategoricalArray> {
    let ratio = distinct_ratio(values)?;
    if ratio >= threshold {
        return None;
    }
    Some(dictionary_encode(values))
}

/// Unconditional dictionary encoding.
pub fn dictionary_encode(values: &[Option<String>]) -> CategoricalArray {
    let dictionary: Vec<String> = values
        .iter()
        .flatten()
        .map(String::as_str)
        .collect::<BTreeSet<&str>>()
        .into_iter()
        .map(str::to_string)
        .collect();

    let index: HashMap<&str, u32> = dictionary
        .iter()
        .enumerate()
        .map(|(i, s)| (s.as_str(), i as u32))
        .collect();

    let codes = values
        .iter()
        .map(|v| v.as_deref().and_then(|s| index.get(s).copied()))
        .collect();

    CategoricalArray { dictionary, codes }
}
