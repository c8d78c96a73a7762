use std::{hint::black_box, sync::Arc};

use chrono::NaiveDate;
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rust_decimal::Decimal;
use structdoc::{
    CodecContext, Composite, ElementKind, JsonTranscoder, NestedStorage, ScalarMapping,
    SchemaDescriptor, SqlTypeCode, Value, XmlTranscoder,
};

// ============================================================================
// Fixtures
// ============================================================================

fn line_schema() -> Arc<SchemaDescriptor> {
    SchemaDescriptor::builder("Line")
        .scalar("sku", ScalarMapping::of(SqlTypeCode::VarChar))
        .scalar("qty", ScalarMapping::of(SqlTypeCode::Integer))
        .scalar("price", ScalarMapping::of(SqlTypeCode::Decimal))
        .build()
        .expect("line schema")
}

fn order_schema() -> Arc<SchemaDescriptor> {
    let address = SchemaDescriptor::builder("Address")
        .scalar("street", ScalarMapping::of(SqlTypeCode::VarChar))
        .scalar("city", ScalarMapping::of(SqlTypeCode::VarChar))
        .build()
        .expect("address schema");
    SchemaDescriptor::builder("Order")
        .scalar("id", ScalarMapping::of(SqlTypeCode::BigInt))
        .scalar("placed", ScalarMapping::of(SqlTypeCode::Date))
        .scalar("note", ScalarMapping::of(SqlTypeCode::Clob))
        .nested("ship_to", address, NestedStorage::Aggregate)
        .plural("lines", ElementKind::Composite(line_schema()))
        .build()
        .expect("order schema")
}

fn line(i: usize) -> Value {
    Composite::new(
        "Line",
        vec![
            Value::Str(format!("SKU-{i:05}")),
            Value::Int(i as i64 % 7 + 1),
            Value::Decimal(Decimal::new(1999 + i as i64, 2)),
        ],
    )
    .into()
}

fn order(lines: usize) -> Value {
    let address: Value = Composite::new(
        "Address",
        vec!["1 <Main> & Co".into(), "Springfield".into()],
    )
    .into();
    Composite::new(
        "Order",
        vec![
            Value::Int(42),
            Value::Date(NaiveDate::from_ymd_opt(2024, 5, 17).expect("date")),
            Value::Str("deliver \"before\" noon".into()),
            address,
            Value::Array((0..lines).map(line).collect()),
        ],
    )
    .into()
}

// ============================================================================
// Benchmarks
// ============================================================================

fn bench_serialize(c: &mut Criterion) {
    let ctx = CodecContext::default();
    let schema = order_schema();
    let mut group = c.benchmark_group("serialize");

    for lines in [0usize, 10, 100, 1000] {
        let value = order(lines);
        group.throughput(Throughput::Elements(lines as u64 + 1));
        group.bench_with_input(BenchmarkId::new("json", lines), &value, |b, v| {
            let json = JsonTranscoder::new(&ctx);
            b.iter(|| json.serialize(black_box(&schema), black_box(v)).expect("json"))
        });
        group.bench_with_input(BenchmarkId::new("xml", lines), &value, |b, v| {
            let xml = XmlTranscoder::new(&ctx);
            b.iter(|| xml.serialize(black_box(&schema), black_box(v)).expect("xml"))
        });
    }
    group.finish();
}

fn bench_deserialize(c: &mut Criterion) {
    let ctx = CodecContext::default();
    let schema = order_schema();
    let json = JsonTranscoder::new(&ctx);
    let xml = XmlTranscoder::new(&ctx);
    let mut group = c.benchmark_group("deserialize");

    for lines in [0usize, 10, 100, 1000] {
        let value = order(lines);
        let json_doc = json.serialize(&schema, &value).expect("json");
        let xml_doc = xml.serialize(&schema, &value).expect("xml");

        group.throughput(Throughput::Bytes(json_doc.len() as u64));
        group.bench_with_input(BenchmarkId::new("json", lines), &json_doc, |b, doc| {
            b.iter(|| json.deserialize(black_box(&schema), black_box(doc), true).expect("json"))
        });
        group.throughput(Throughput::Bytes(xml_doc.len() as u64));
        group.bench_with_input(BenchmarkId::new("xml", lines), &xml_doc, |b, doc| {
            b.iter(|| xml.deserialize(black_box(&schema), black_box(doc), true).expect("xml"))
        });
    }
    group.finish();
}

/// Raw rows skip composite instantiation of nested values.
fn bench_raw_rows(c: &mut Criterion) {
    let ctx = CodecContext::default();
    let schema = order_schema();
    let json = JsonTranscoder::new(&ctx);
    let doc = json.serialize(&schema, &order(100)).expect("json");

    c.bench_function("deserialize/json_raw_rows_100", |b| {
        b.iter(|| json.deserialize(black_box(&schema), black_box(&doc), false).expect("json"))
    });
}

criterion_group!(benches, bench_serialize, bench_deserialize, bench_raw_rows);
criterion_main!(benches);
