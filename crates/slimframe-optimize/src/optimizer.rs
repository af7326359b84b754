//! Table-level entry points.

use slimframe_core::schema::DataType;
use slimframe_core::types::{Column, ColumnData, Table};

use crate::numeric::{
    cast_floats, cast_integers, choose_float_type, choose_int_type, float_values, integer_values,
};
use crate::options::OptimizeOptions;
use crate::report::{ColumnChange, OptimizeReport};
use crate::text::encode_categorical;

/// Optimize with default options.
pub fn optimize(table: &Table) -> Table {
    optimize_with(table, &OptimizeOptions::default())
}

pub fn optimize_with(table: &Table, opts: &OptimizeOptions) -> Table {
    table.map_columns(|c| optimize_column(c, opts))
}

/// Optimize and describe what changed per column.
pub fn optimize_with_report(table: &Table, opts: &OptimizeOptions) -> (Table, OptimizeReport) {
    let optimized = optimize_with(table, opts);
    let columns = table
        .columns()
        .iter()
        .zip(optimized.columns())
        .map(|(before, after)| ColumnChange {
            name: before.name.clone(),
            before: before.data_type(),
            after: after.data_type(),
            bytes_before: before.memory_usage(),
            bytes_after: after.memory_usage(),
        })
        .collect();
    let report = OptimizeReport {
        rows: table.num_rows(),
        columns,
    };
    (optimized, report)
}

/// Optimize a single column. Columns with nothing to measure (no rows, or
/// only nulls/NaN) come back unchanged.
pub fn optimize_column(column: &Column, opts: &OptimizeOptions) -> Column {
    let data = match &column.data {
        d if d.data_type().is_integer() => narrow_integers(d),
        d if d.data_type().is_float() => narrow_floats(d, opts),
        ColumnData::Utf8(values) => encode_categorical(values, opts.categorical_threshold)
            .map(ColumnData::Categorical),
        _ => None,
    };

    match data {
        Some(data) => {
            #[cfg(feature = "tracing")]
            tracing::debug!(
                column = %column.name,
                from = %column.data_type(),
                to = %data.data_type(),
                "narrowed column"
            );
            Column::new(column.name.clone(), data)
        }
        None => column.clone(),
    }
}

fn narrow_integers(data: &ColumnData) -> Option<ColumnData> {
    let target = choose_int_type(data)?;
    if target == data.data_type() {
        return None;
    }
    let values = integer_values(data)?;
    cast_integers(&values, target)
}

fn narrow_floats(data: &ColumnData, opts: &OptimizeOptions) -> Option<ColumnData> {
    let target = choose_float_type(data, opts.float_downcast)?;
    if target == data.data_type() {
        return None;
    }
    let values = float_values(data)?;
    cast_floats(&values, target)
}

/// Data types `optimize` would pick for each column, without building them.
pub fn planned_types(table: &Table, opts: &OptimizeOptions) -> Vec<DataType> {
    table
        .columns()
        .iter()
        .map(|c| match &c.data {
            d if d.data_type().is_integer() => choose_int_type(d).unwrap_or(d.data_type()),
            d if d.data_type().is_float() => {
                choose_float_type(d, opts.float_downcast).unwrap_or(d.data_type())
            }
            ColumnData::Utf8(values) => {
                if encode_categorical(values, opts.categorical_threshold).is_some() {
                    DataType::Categorical
                } else {
                    DataType::Utf8
                }
            }
            d => d.data_type(),
        })
        .collect()
}
