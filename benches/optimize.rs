use criterion::{criterion_group, criterion_main, Criterion};
use slimframe_core::types::{Column, ColumnData, Table};
use slimframe_io::blob::{decode_table, encode_table};
use slimframe_io::Codec;
use slimframe_optimize::{optimize_with, FloatDowncast, OptimizeOptions};

fn make_table(rows: usize) -> Table {
    let mut ids = Vec::with_capacity(rows);
    let mut groups = Vec::with_capacity(rows);
    let mut values = Vec::with_capacity(rows);
    for i in 0..rows {
        ids.push(i as i64);
        groups.push(format!("group-{}", i % 4));
        values.push((i % 10) as f64 * 0.5);
    }
    Table::try_new(vec![
        Column::new("id", ColumnData::int64(ids)),
        Column::new("group", ColumnData::utf8(groups)),
        Column::new("value", ColumnData::float64(values)),
    ])
    .unwrap()
}

fn bench_optimize(c: &mut Criterion) {
    let table = make_table(10_000);
    let range_only = OptimizeOptions::default();
    let lossless = OptimizeOptions::default().with_float_downcast(FloatDowncast::Lossless);

    c.bench_function("optimize_range_only", |b| {
        b.iter(|| optimize_with(&table, &range_only))
    });
    c.bench_function("optimize_lossless", |b| {
        b.iter(|| optimize_with(&table, &lossless))
    });
}

fn bench_blob(c: &mut Criterion) {
    let table = optimize_with(&make_table(10_000), &OptimizeOptions::default());
    let bytes = encode_table(&table, Codec::None).unwrap();

    c.bench_function("blob_encode", |b| {
        b.iter(|| encode_table(&table, Codec::None).unwrap())
    });
    c.bench_function("blob_decode", |b| b.iter(|| decode_table(&bytes).unwrap()));
}

criterion_group!(benches, bench_optimize, bench_blob);
criterion_main!(benches);
