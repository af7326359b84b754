//! Width selection and narrowing for integer and float columns.
//!
//! Each family has an ordered candidate list; the first candidate whose range
//! holds both the column minimum and maximum wins. A column is never moved to
//! a wider type than the one it already has.

use half::f16;

use slimframe_core::schema::DataType;
use slimframe_core::types::ColumnData;

use crate::options::FloatDowncast;

pub const INT_CANDIDATES: [DataType; 4] = [
    DataType::Int8,
    DataType::Int16,
    DataType::Int32,
    DataType::Int64,
];

pub const FLOAT_CANDIDATES: [DataType; 3] =
    [DataType::Float16, DataType::Float32, DataType::Float64];

/// Inclusive value range of a signed integer type.
pub fn int_range(dt: DataType) -> Option<(i64, i64)> {
    match dt {
        DataType::Int8 => Some((i64::from(i8::MIN), i64::from(i8::MAX))),
        DataType::Int16 => Some((i64::from(i16::MIN), i64::from(i16::MAX))),
        DataType::Int32 => Some((i64::from(i32::MIN), i64::from(i32::MAX))),
        DataType::Int64 => Some((i64::MIN, i64::MAX)),
        _ => None,
    }
}

/// Finite value range of a float type.
pub fn float_range(dt: DataType) -> Option<(f64, f64)> {
    match dt {
        DataType::Float16 => Some((f16::MIN.to_f64(), f16::MAX.to_f64())),
        DataType::Float32 => Some((f64::from(f32::MIN), f64::from(f32::MAX))),
        DataType::Float64 => Some((f64::MIN, f64::MAX)),
        _ => None,
    }
}

/// Integer values of `data` widened to `i64`; `None` for other families.
pub fn integer_values(data: &ColumnData) -> Option<Vec<Option<i64>>> {
    let out = match data {
        ColumnData::Int8(v) => v.iter().map(|x| x.map(i64::from)).collect(),
        ColumnData::Int16(v) => v.iter().map(|x| x.map(i64::from)).collect(),
        ColumnData::Int32(v) => v.iter().map(|x| x.map(i64::from)).collect(),
        ColumnData::Int64(v) => v.clone(),
        _ => return None,
    };
    Some(out)
}

/// Float values of `data` widened to `f64`; `None` for other families.
pub fn float_values(data: &ColumnData) -> Option<Vec<Option<f64>>> {
    let out = match data {
        ColumnData::Float16(v) => v.iter().map(|x| x.map(f16::to_f64)).collect(),
        ColumnData::Float32(v) => v.iter().map(|x| x.map(f64::from)).collect(),
        ColumnData::Float64(v) => v.clone(),
        _ => return None,
    };
    Some(out)
}

/// Minimum and maximum of the non-null values, or `None` when there are none.
pub fn int_min_max(values: &[Option<i64>]) -> Option<(i64, i64)> {
    values.iter().flatten().fold(None, |acc, &v| match acc {
        None => Some((v, v)),
        Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
    })
}

/// Minimum and maximum of the non-null, non-NaN values.
pub fn float_min_max(values: &[Option<f64>]) -> Option<(f64, f64)> {
    values
        .iter()
        .flatten()
        .filter(|v| !v.is_nan())
        .fold(None, |acc, &v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
}

/// Narrowest integer type holding `[min, max]`.
pub fn smallest_int_type(min: i64, max: i64) -> DataType {
    INT_CANDIDATES
        .into_iter()
        .find(|dt| matches!(int_range(*dt), Some((lo, hi)) if min >= lo && max <= hi))
        .unwrap_or(DataType::Int64)
}

/// Narrowest float type whose finite range holds `[min, max]`. Infinite
/// extremes fit nothing narrower than Float64.
pub fn smallest_float_type(min: f64, max: f64) -> DataType {
    FLOAT_CANDIDATES
        .into_iter()
        .find(|dt| matches!(float_range(*dt), Some((lo, hi)) if min >= lo && max <= hi))
        .unwrap_or(DataType::Float64)
}

/// True when `v` survives a trip through `dt` unchanged. NaN maps to NaN.
pub fn float_round_trips(v: f64, dt: DataType) -> bool {
    if v.is_nan() {
        return true;
    }
    match dt {
        DataType::Float16 => f16::from_f64(v).to_f64() == v,
        DataType::Float32 => f64::from(v as f32) == v,
        _ => true,
    }
}

fn position(candidates: &[DataType], dt: DataType) -> usize {
    candidates
        .iter()
        .position(|c| *c == dt)
        .unwrap_or(candidates.len())
}

/// Choose the target integer type, or `None` when the column has no values.
pub fn choose_int_type(data: &ColumnData) -> Option<DataType> {
    let values = integer_values(data)?;
    let (min, max) = int_min_max(&values)?;
    let chosen = smallest_int_type(min, max);
    let current = data.data_type();
    if position(&INT_CANDIDATES, chosen) > position(&INT_CANDIDATES, current) {
        return Some(current);
    }
    Some(chosen)
}

/// Choose the target float type, or `None` when the column has no non-NaN values.
pub fn choose_float_type(data: &ColumnData, policy: FloatDowncast) -> Option<DataType> {
    let values = float_values(data)?;
    let (min, max) = float_min_max(&values)?;
    let current = data.data_type();
    let by_range = smallest_float_type(min, max);

    let chosen = match policy {
        FloatDowncast::RangeOnly => by_range,
        FloatDowncast::Lossless => FLOAT_CANDIDATES
            .into_iter()
            .skip(position(&FLOAT_CANDIDATES, by_range))
            .find(|dt| values.iter().flatten().all(|v| float_round_trips(*v, *dt)))
            .unwrap_or(DataType::Float64),
    };

    if position(&FLOAT_CANDIDATES, chosen) > position(&FLOAT_CANDIDATES, current) {
        return Some(current);
    }
    Some(chosen)
}

/// Rebuild an integer column as `target`. Callers must have checked that
/// every value fits; the `as` casts below are exact under that condition.
pub fn cast_integers(values: &[Option<i64>], target: DataType) -> Option<ColumnData> {
    let out = match target {
        DataType::Int8 => ColumnData::Int8(values.iter().map(|v| v.map(|x| x as i8)).collect()),
        DataType::Int16 => ColumnData::Int16(values.iter().map(|v| v.map(|x| x as i16)).collect()),
        DataType::Int32 => ColumnData::Int32(values.iter().map(|v| v.map(|x| x as i32)).collect()),
        DataType::Int64 => ColumnData::Int64(values.to_vec()),
        _ => return None,
    };
    Some(out)
}

/// Rebuild a float column as `target`, rounding to nearest.
pub fn cast_floats(values: &[Option<f64>], target: DataType) -> Option<ColumnData> {
    let out = match target {
        DataType::Float16 => {
            ColumnData::Float16(values.iter().map(|v| v.map(f16::from_f64)).collect())
        }
        DataType::Float32 => {
            ColumnData::Float32(values.iter().map(|v| v.map(|x| x as f32)).collect())
        }
        DataType::Float64 => ColumnData::Float64(values.to_vec()),
        _ => return None,
    };
    Some(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn int_width_boundaries() {
        assert_eq!(smallest_int_type(-128, 127), DataType::Int8);
        assert_eq!(smallest_int_type(-129, 0), DataType::Int16);
        assert_eq!(smallest_int_type(0, 128), DataType::Int16);
        assert_eq!(smallest_int_type(0, 32_768), DataType::Int32);
        assert_eq!(smallest_int_type(i64::from(i32::MIN), 0), DataType::Int32);
        assert_eq!(smallest_int_type(0, i64::from(i32::MAX) + 1), DataType::Int64);
        assert_eq!(smallest_int_type(i64::MIN, i64::MAX), DataType::Int64);
    }

    #[test]
    fn float_width_boundaries() {
        assert_eq!(smallest_float_type(-65504.0, 65504.0), DataType::Float16);
        assert_eq!(smallest_float_type(0.0, 65505.0), DataType::Float32);
        assert_eq!(smallest_float_type(-1e39, 0.0), DataType::Float64);
        assert_eq!(smallest_float_type(0.0, f64::INFINITY), DataType::Float64);
    }

    #[test]
    fn min_max_skips_nulls_and_nan() {
        assert_eq!(int_min_max(&[None, Some(3), Some(-2), None]), Some((-2, 3)));
        assert_eq!(int_min_max(&[None, None]), None);
        assert_eq!(
            float_min_max(&[Some(f64::NAN), Some(1.5), None, Some(-0.5)]),
            Some((-0.5, 1.5))
        );
        assert_eq!(float_min_max(&[Some(f64::NAN), None]), None);
    }

    #[test]
    fn never_widens_existing_narrow_column() {
        let data = ColumnData::Float16(vec![Some(f16::INFINITY), Some(f16::ONE)]);
        assert_eq!(
            choose_float_type(&data, FloatDowncast::RangeOnly),
            Some(DataType::Float16)
        );
        let ints = ColumnData::Int16(vec![Some(5)]);
        assert_eq!(choose_int_type(&ints), Some(DataType::Int8));
    }

    #[test]
    fn lossless_policy_checks_significand() {
        // 0.1 is in f16 range but needs more than 11 significand bits.
        let data = ColumnData::float64([0.1, 2.0]);
        assert_eq!(
            choose_float_type(&data, FloatDowncast::RangeOnly),
            Some(DataType::Float16)
        );
        assert_eq!(
            choose_float_type(&data, FloatDowncast::Lossless),
            Some(DataType::Float64)
        );

        let halves = ColumnData::float64([0.5, 1.25, -3.0]);
        assert_eq!(
            choose_float_type(&halves, FloatDowncast::Lossless),
            Some(DataType::Float16)
        );

        // 2049 needs 12 significand bits: exact in f32, not in f16.
        let wide = ColumnData::float64([2049.0]);
        assert_eq!(
            choose_float_type(&wide, FloatDowncast::Lossless),
            Some(DataType::Float32)
        );
    }

    #[test]
    fn wrong_family_yields_none() {
        let text = ColumnData::utf8(["a"]);
        assert_eq!(choose_int_type(&text), None);
        assert_eq!(choose_float_type(&text, FloatDowncast::RangeOnly), None);
        assert!(cast_integers(&[Some(1)], DataType::Float32).is_none());
    }
}
