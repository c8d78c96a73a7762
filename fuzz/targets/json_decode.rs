#![no_main]

use std::sync::Arc;

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use structdoc::{
    CodecContext, CodecOptions, ElementKind, JsonTranscoder, NestedStorage, ScalarMapping,
    SchemaDescriptor, SqlTypeCode,
};

#[derive(Debug, Arbitrary)]
struct FuzzInput {
    doc: String,
    embeddable: bool,
    max_depth: u8,
}

fn schema() -> Arc<SchemaDescriptor> {
    let point = SchemaDescriptor::builder("Point")
        .scalar("x", ScalarMapping::of(SqlTypeCode::Integer))
        .scalar("y", ScalarMapping::of(SqlTypeCode::BigInt))
        .build()
        .expect("point schema");
    SchemaDescriptor::builder("Shape")
        .scalar("name", ScalarMapping::of(SqlTypeCode::VarChar))
        .scalar("on", ScalarMapping::of(SqlTypeCode::Boolean))
        .scalar("at", ScalarMapping::of(SqlTypeCode::TimestampWithTimeZone))
        .scalar("blob", ScalarMapping::of(SqlTypeCode::Blob))
        .nested("center", point.clone(), NestedStorage::Aggregate)
        .plural("path", ElementKind::Composite(point))
        .build()
        .expect("shape schema")
}

fuzz_target!(|input: FuzzInput| {
    let ctx = CodecContext::new(CodecOptions {
        max_depth: usize::from(input.max_depth.max(1)),
        ..CodecOptions::default()
    });
    let schema = schema();
    let json = JsonTranscoder::new(&ctx);

    // Whatever decodes must encode again and decode to the same value.
    if let Ok(Some(value)) = json.deserialize(&schema, &input.doc, true) {
        let again = json.serialize(&schema, &value).expect("decoded value must encode");
        let back = json.deserialize(&schema, &again, true).expect("own output must decode");
        assert_eq!(back, Some(value));
    }
});
