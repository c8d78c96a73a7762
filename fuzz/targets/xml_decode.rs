#![no_main]

use std::sync::Arc;

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use structdoc::{
    CodecContext, ElementKind, NestedStorage, ScalarMapping, SchemaDescriptor, SqlTypeCode,
    XmlTranscoder,
};

#[derive(Debug, Arbitrary)]
enum Mode {
    Typed,
    Raw,
    Untyped,
}

#[derive(Debug, Arbitrary)]
struct FuzzInput {
    doc: String,
    mode: Mode,
}

fn schema() -> Arc<SchemaDescriptor> {
    let cell = SchemaDescriptor::builder("Cell")
        .scalar("v", ScalarMapping::of(SqlTypeCode::Decimal))
        .build()
        .expect("cell schema");
    SchemaDescriptor::builder("Sheet")
        .scalar("title", ScalarMapping::of(SqlTypeCode::NVarChar))
        .scalar("day", ScalarMapping::of(SqlTypeCode::Date))
        .scalar("id", ScalarMapping::of(SqlTypeCode::Uuid))
        .nested("first", cell.clone(), NestedStorage::Aggregate)
        .plural("cells", ElementKind::Composite(cell))
        .plural("tags", ElementKind::Scalar(ScalarMapping::of(SqlTypeCode::VarChar)))
        .build()
        .expect("sheet schema")
}

fuzz_target!(|input: FuzzInput| {
    let ctx = CodecContext::default();
    let schema = schema();
    let xml = XmlTranscoder::new(&ctx);

    match input.mode {
        Mode::Typed => {
            if let Ok(Some(value)) = xml.deserialize(&schema, &input.doc, true) {
                let again = xml.serialize(&schema, &value).expect("decoded value must encode");
                let back = xml.deserialize(&schema, &again, true).expect("own output must decode");
                assert_eq!(back, Some(value));
            }
        }
        Mode::Raw => {
            let _ = xml.deserialize(&schema, &input.doc, false);
        }
        Mode::Untyped => {
            let _ = xml.deserialize_untyped(&input.doc);
        }
    }
});
