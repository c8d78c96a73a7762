//! XML microformat.
//!
//! Not general XML: no attributes, declarations, comments or namespaces.
//! A composite is `<e>` holding one tag per selectable; arrays are
//! `<Collection>` holding `<e>` items; any null is a self-closing tag.
//!
//! ```text
//! <e><x>1</x><y>ab</y><tags><Collection><e>a</e><e/></Collection></tags></e>
//! ```

mod decoder;
mod encoder;
pub mod escape;

use structdoc_error::CodecResult;
use tracing::trace;

pub use self::escape::is_valid_xml_name;
use self::{decoder::XmlDecoder, encoder::XmlEncoder};
use crate::{
    codec::CodecContext,
    schema::{ElementKind, SchemaDescriptor},
    value::Value,
};

const ELEMENT_TAG: &str = "e";
const COLLECTION_TAG: &str = "Collection";

pub struct XmlTranscoder<'a> {
    ctx: &'a CodecContext,
}

impl<'a> XmlTranscoder<'a> {
    pub fn new(ctx: &'a CodecContext) -> Self {
        Self { ctx }
    }

    /// Encodes a composite (or a raw `Row`); `Null` becomes `<e/>`.
    pub fn serialize(
        &self,
        schema: &SchemaDescriptor,
        value: &Value,
    ) -> CodecResult<String> {
        let mut encoder = XmlEncoder::new(self.ctx);
        encoder.write_root(schema, value)?;
        let doc = encoder.finish();
        trace!(schema = schema.name(), len = doc.len(), "serialized XML");
        Ok(doc)
    }

    /// Encodes a standalone plural value. `Null` becomes `<e/>`.
    pub fn serialize_array(
        &self,
        element: &ElementKind,
        value: &Value,
    ) -> CodecResult<String> {
        if value.is_null() {
            return Ok(format!("<{ELEMENT_TAG}/>"));
        }
        let relational = self.ctx.composite().array_to_relational(element, value)?;
        let mut encoder = XmlEncoder::new(self.ctx);
        encoder.write_collection(element, &relational, 1)?;
        Ok(encoder.finish())
    }

    /// Decodes `<e>...</e>`; `<e/>` yields `None`.
    ///
    /// With `return_embeddable` every composite is instantiated, otherwise
    /// the result and its nested aggregates are raw `Row`s.
    pub fn deserialize(
        &self,
        schema: &SchemaDescriptor,
        doc: &str,
        return_embeddable: bool,
    ) -> CodecResult<Option<Value>> {
        let mut decoder = XmlDecoder::new(self.ctx, doc, return_embeddable);
        match decoder.read_root(schema)? {
            None => Ok(None),
            Some(row) if return_embeddable => self.ctx.composite().compose(schema, &row).map(Some),
            Some(row) => Ok(Some(Value::Row(row))),
        }
    }

    pub fn deserialize_array(
        &self,
        element: &ElementKind,
        doc: &str,
    ) -> CodecResult<Value> {
        if doc.trim() == format!("<{ELEMENT_TAG}/>") {
            return Ok(Value::Null);
        }
        let mut decoder = XmlDecoder::new(self.ctx, doc, true);
        let items = decoder.read_collection(element, 1)?;
        decoder.expect_end()?;
        self.ctx.composite().array_to_domain(element, &items)
    }

    /// Reads a document without a schema: element text as `Str`, nested
    /// elements as `Row`s in document order, collections as `Array`s.
    pub fn deserialize_untyped(
        &self,
        doc: &str,
    ) -> CodecResult<Option<Value>> {
        let mut decoder = XmlDecoder::new(self.ctx, doc, false);
        decoder.deserialize_untyped_root()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use structdoc_error::CodecError;

    use super::*;
    use crate::{
        codec::CodecOptions,
        schema::{NestedStorage, ScalarMapping, SqlTypeCode, ValueType},
        value::Composite,
    };

    fn point() -> Arc<SchemaDescriptor> {
        SchemaDescriptor::builder("Point")
            .scalar("x", ScalarMapping::of(SqlTypeCode::Integer))
            .scalar("y", ScalarMapping::of(SqlTypeCode::VarChar))
            .build()
            .unwrap()
    }

    fn holder() -> Arc<SchemaDescriptor> {
        SchemaDescriptor::builder("Holder")
            .nested("at", point(), NestedStorage::Aggregate)
            .plural(
                "tags",
                ElementKind::Scalar(ScalarMapping::of(SqlTypeCode::VarChar)),
            )
            .build()
            .unwrap()
    }

    fn pt(
        x: i64,
        y: &str,
    ) -> Value {
        Composite::new("Point", vec![Value::Int(x), y.into()]).into()
    }

    #[test]
    fn test_every_selectable_is_written() {
        let ctx = CodecContext::default();
        let xml = XmlTranscoder::new(&ctx);
        let value: Value = Composite::new(
            "Holder",
            vec![pt(1, "a"), Value::Array(vec!["t".into(), Value::Null])],
        )
        .into();
        let doc = xml.serialize(&holder(), &value).unwrap();
        assert_eq!(
            doc,
            "<e><at><x>1</x><y>a</y></at><tags><Collection><e>t</e><e/></Collection></tags></e>"
        );
        assert_eq!(xml.deserialize(&holder(), &doc, true).unwrap(), Some(value));

        let nulls: Value = Composite::new("Holder", vec![Value::Null, Value::Null]).into();
        let doc = xml.serialize(&holder(), &nulls).unwrap();
        assert_eq!(doc, "<e><at/><tags/></e>");
        assert_eq!(xml.deserialize(&holder(), &doc, true).unwrap(), Some(nulls));
    }

    #[test]
    fn test_raw_rows_when_not_embeddable() {
        let ctx = CodecContext::default();
        let xml = XmlTranscoder::new(&ctx);
        let got = xml
            .deserialize(&holder(), "<e><at><x>2</x><y/></at></e>", false)
            .unwrap();
        assert_eq!(
            got,
            Some(Value::Row(vec![
                Value::Row(vec![Value::Int(2), Value::Null]),
                Value::Null,
            ]))
        );
    }

    #[test]
    fn test_whitespace_between_tags() {
        let ctx = CodecContext::default();
        let xml = XmlTranscoder::new(&ctx);
        let doc = "<e>\n  <y>b</y>\n  <x>4</x>\n</e>\n";
        assert_eq!(xml.deserialize(&point(), doc, true).unwrap(), Some(pt(4, "b")));
    }

    #[test]
    fn test_bool_literals_by_family() {
        let schema = SchemaDescriptor::builder("Flags")
            .scalar("a", ScalarMapping::new(SqlTypeCode::SmallInt, ValueType::Bool))
            .scalar("b", ScalarMapping::new(SqlTypeCode::Char, ValueType::Bool))
            .scalar("c", ScalarMapping::of(SqlTypeCode::Boolean))
            .build()
            .unwrap();
        let ctx = CodecContext::default();
        let xml = XmlTranscoder::new(&ctx);
        let value: Value = Composite::new(
            "Flags",
            vec![Value::Bool(true), Value::Bool(false), Value::Bool(true)],
        )
        .into();
        let doc = xml.serialize(&schema, &value).unwrap();
        assert_eq!(doc, "<e><a>1</a><b>N</b><c>1</c></e>");
        assert_eq!(xml.deserialize(&schema, &doc, true).unwrap(), Some(value));
    }

    #[test]
    fn test_structure_errors() {
        let ctx = CodecContext::default();
        let xml = XmlTranscoder::new(&ctx);

        let err = xml
            .deserialize(&point(), "<e><x><y>1</y></x></e>", true)
            .unwrap_err();
        assert!(matches!(err, CodecError::TypeMismatch(_)));

        let err = xml.deserialize(&point(), "<e><z>1</z></e>", true).unwrap_err();
        assert_eq!(err, CodecError::unknown_attribute("Point", "z"));

        for doc in ["<e><x>1</x>", "<e><x>1</y></e>", "<a></a>", "<e></e><e/>"] {
            let err = xml.deserialize(&point(), doc, true).unwrap_err();
            assert!(matches!(err, CodecError::MalformedDocument(_)), "{doc}");
        }
    }

    #[test]
    fn test_invalid_tag_name() {
        let schema = SchemaDescriptor::builder("Odd")
            .scalar("two words", ScalarMapping::of(SqlTypeCode::Integer))
            .build()
            .unwrap();
        let ctx = CodecContext::default();
        let value: Value = Composite::new("Odd", vec![Value::Int(1)]).into();
        let err = XmlTranscoder::new(&ctx).serialize(&schema, &value).unwrap_err();
        assert_eq!(err, CodecError::InvalidTagName("two words".into()));
    }

    #[test]
    fn test_depth_limit() {
        let ctx = CodecContext::new(CodecOptions {
            max_depth: 1,
            ..Default::default()
        });
        let xml = XmlTranscoder::new(&ctx);
        let err = xml
            .deserialize(&holder(), "<e><at><x>1</x></at></e>", true)
            .unwrap_err();
        assert_eq!(err, CodecError::DepthLimit { current: 2, max: 1 });
    }

    #[test]
    fn test_standalone_array() {
        let ctx = CodecContext::default();
        let xml = XmlTranscoder::new(&ctx);
        let element = ElementKind::Composite(point());
        let value = Value::Array(vec![Value::Null, pt(1, "")]);
        let doc = xml.serialize_array(&element, &value).unwrap();
        assert_eq!(doc, "<Collection><e/><e><x>1</x><y></y></e></Collection>");
        assert_eq!(xml.deserialize_array(&element, &doc).unwrap(), value);
        assert_eq!(xml.serialize_array(&element, &Value::Null).unwrap(), "<e/>");
        assert_eq!(xml.deserialize_array(&element, "<e/>").unwrap(), Value::Null);
    }

    #[test]
    fn test_untyped() {
        let ctx = CodecContext::default();
        let xml = XmlTranscoder::new(&ctx);
        let got = xml
            .deserialize_untyped("<e><a>1</a><b/><c><d>x&amp;y</d></c><l><Collection><e>z</e></Collection></l></e>")
            .unwrap();
        assert_eq!(
            got,
            Some(Value::Row(vec![
                "1".into(),
                Value::Null,
                Value::Row(vec!["x&y".into()]),
                Value::Row(vec![Value::Array(vec!["z".into()])]),
            ]))
        );
        assert_eq!(xml.deserialize_untyped("<e/>").unwrap(), None);
    }
}
