//! Benchmarks for flatstore table operations

use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use flatstore::{Config, FieldDescriptor, FieldType, Table, Value};
use tempfile::TempDir;

const ROWS: usize = 1_000;

fn setup_table(rows: usize) -> (TempDir, Table) {
    let temp_dir = TempDir::new().unwrap();
    let table = Table::new(Config::builder().dir(temp_dir.path()).name("Bench").build());
    table.reset().unwrap();
    table
        .add_field(FieldDescriptor::new("Id", FieldType::Int32))
        .unwrap();
    table
        .add_field(FieldDescriptor::new("Name", FieldType::String))
        .unwrap();
    for n in 0..rows {
        table.create(&row(n as i32)).unwrap();
    }
    (temp_dir, table)
}

fn row(n: i32) -> Vec<Value> {
    vec![Value::Int32(n), Value::Text(format!("name-{:05}", n))]
}

fn storage_benchmarks(c: &mut Criterion) {
    c.bench_function("create", |b| {
        b.iter_batched(
            || setup_table(0),
            |(_temp, table)| {
                for n in 0..100 {
                    table.create(black_box(&row(n))).unwrap();
                }
            },
            BatchSize::PerIteration,
        )
    });

    let (_temp, table) = setup_table(ROWS);
    let mut cursor = 0usize;
    c.bench_function("read", |b| {
        b.iter(|| {
            cursor = (cursor + 7) % ROWS;
            black_box(table.read(cursor).unwrap())
        })
    });

    c.bench_function("update_in_place", |b| {
        b.iter(|| {
            cursor = (cursor + 7) % ROWS;
            table.update(cursor, black_box(&row(cursor as i32))).unwrap()
        })
    });

    c.bench_function("scan", |b| {
        b.iter(|| table.rows().filter_map(|r| r.ok()).count())
    });

    c.bench_function("delete_front", |b| {
        b.iter_batched(
            || setup_table(ROWS),
            |(_temp, table)| {
                for _ in 0..100 {
                    table.delete(0).unwrap();
                }
            },
            BatchSize::PerIteration,
        )
    });
}

criterion_group!(benches, storage_benchmarks);
criterion_main!(benches);
