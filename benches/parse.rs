use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use std::fmt::Write;
use toml_doc::{parse, parse_reader, parse_slice};

const EXAMPLE: &str = r#"
title = "TOML Example"

[owner]
name = "Tom Preston-Werner"
dob = 1979-05-27T07:32:00-08:00

[database]
server = "192.168.1.1"
ports = [ 8001, 8001, 8002 ]
connection_max = 5000
enabled = true

[servers.alpha]
ip = "10.0.0.1"
dc = "eqdc10"

[servers.beta]
ip = "10.0.0.2"
dc = "eqdc10"

[clients]
data = [ ["gamma", "delta"], [1, 2] ]
hosts = [
  "alpha",
  "omega"
]
"#;

fn products_document(size: usize) -> String {
    let mut doc = String::new();
    for i in 0..size {
        let _ = write!(
            doc,
            "[[products]]\nsku = \"SKU{i}\"\nname = \"Product {i}\"\nprice = {price}\nquantity = {i}\nadded = 2023-01-{day:02}T00:00:00Z\n\n",
            i = i,
            price = 9.99 + i as f64,
            day = i % 28 + 1,
        );
    }
    doc
}

fn benchmark_parse_example(c: &mut Criterion) {
    c.bench_function("parse_example_document", |b| {
        b.iter(|| parse(black_box(EXAMPLE)))
    });
}

fn benchmark_parse_table_arrays(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse_table_arrays");

    for size in [10, 50, 100, 500].iter() {
        let doc = products_document(*size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &doc, |b, doc| {
            b.iter(|| parse(black_box(doc)))
        });
    }
    group.finish();
}

fn benchmark_scalars(c: &mut Criterion) {
    let mut group = c.benchmark_group("scalars");

    let integers: String = (0..100).map(|i| format!("i{} = {}\n", i, i * 7919)).collect();
    let floats: String = (0..100).map(|i| format!("f{} = {:?}\n", i, i as f64 * 1.5)).collect();
    let strings: String = (0..100)
        .map(|i| format!("s{} = \"value with \\t escapes \\u00E9 {}\"\n", i, i))
        .collect();
    let datetimes: String = (0..100)
        .map(|i| format!("d{} = 1979-05-27T07:32:{:02}.999999-07:00\n", i, i % 60))
        .collect();

    group.bench_function("integers", |b| b.iter(|| parse(black_box(&integers))));
    group.bench_function("floats", |b| b.iter(|| parse(black_box(&floats))));
    group.bench_function("strings", |b| b.iter(|| parse(black_box(&strings))));
    group.bench_function("datetimes", |b| b.iter(|| parse(black_box(&datetimes))));

    group.finish();
}

fn benchmark_input_kinds(c: &mut Criterion) {
    let doc = products_document(100);
    let mut group = c.benchmark_group("input_kinds");

    group.bench_function("str", |b| b.iter(|| parse(black_box(&doc))));
    group.bench_function("slice", |b| {
        b.iter(|| parse_slice(black_box(doc.as_bytes())))
    });
    group.bench_function("reader", |b| {
        b.iter(|| parse_reader(black_box(doc.as_bytes())))
    });

    group.finish();
}

criterion_group!(
    benches,
    benchmark_parse_example,
    benchmark_parse_table_arrays,
    benchmark_scalars,
    benchmark_input_kinds
);
criterion_main!(benches);
