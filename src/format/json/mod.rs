//! JSON dialect.
//!
//! A composite is an object keyed by selectable name, written in
//! selectable order with no whitespace. Plural attributes are arrays and
//! aggregates are nested objects. Decoding is a push-down automaton over
//! [`DocumentReader`] tokens.

mod decoder;
mod encoder;

use structdoc_error::{CodecError, CodecResult};
use tracing::trace;

use self::{
    decoder::{JsonDecoder, ParseFrame},
    encoder::JsonEncoder,
};
use crate::{
    codec::CodecContext,
    document::{DocumentReader, JsonDocumentReader, TokenKind},
    schema::{ElementKind, SchemaDescriptor},
    value::Value,
};

pub struct JsonTranscoder<'a> {
    ctx: &'a CodecContext,
}

impl<'a> JsonTranscoder<'a> {
    pub fn new(ctx: &'a CodecContext) -> Self {
        Self { ctx }
    }

    /// Encodes a composite (or a raw `Row`); `Null` becomes `null`.
    pub fn serialize(
        &self,
        schema: &SchemaDescriptor,
        value: &Value,
    ) -> CodecResult<String> {
        let mut encoder = JsonEncoder::new(self.ctx);
        encoder.write_composite(schema, value, 1)?;
        let doc = encoder.finish();
        trace!(schema = schema.name(), len = doc.len(), "serialized JSON");
        Ok(doc)
    }

    /// Encodes a standalone plural value of domain elements.
    pub fn serialize_array(
        &self,
        element: &ElementKind,
        value: &Value,
    ) -> CodecResult<String> {
        let relational = self.ctx.composite().array_to_relational(element, value)?;
        let mut encoder = JsonEncoder::new(self.ctx);
        encoder.write_array(element, &relational, 1)?;
        Ok(encoder.finish())
    }

    pub fn deserialize(
        &self,
        schema: &SchemaDescriptor,
        doc: &str,
        return_embeddable: bool,
    ) -> CodecResult<Option<Value>> {
        let mut reader = JsonDocumentReader::new(doc);
        self.deserialize_from(schema, &mut reader, return_embeddable)
    }

    /// Decodes one composite from `reader`.
    ///
    /// Returns `None` for a `null` document. With `return_embeddable` the
    /// result is an instantiated composite, otherwise the raw flat `Row`.
    /// Nested composites are always instantiated with their own schema.
    pub fn deserialize_from(
        &self,
        schema: &SchemaDescriptor,
        reader: &mut dyn DocumentReader,
        return_embeddable: bool,
    ) -> CodecResult<Option<Value>> {
        match first_token(reader)? {
            TokenKind::NullValue => {
                expect_end(reader)?;
                Ok(None)
            }
            TokenKind::ObjectStart => {
                let root = ParseFrame::composite(schema);
                let closed = JsonDecoder::new(self.ctx).run(root, reader)?;
                let ParseFrame::Composite { row, .. } = closed else {
                    return Err(CodecError::malformed("document root is not an object"));
                };
                if return_embeddable {
                    self.ctx.composite().compose(schema, &row).map(Some)
                } else {
                    Ok(Some(Value::Row(row)))
                }
            }
            _ => Err(CodecError::malformed(
                "document must start with an object or null",
            )),
        }
    }

    /// Decodes a standalone plural document into domain elements.
    pub fn deserialize_array(
        &self,
        element: &ElementKind,
        doc: &str,
    ) -> CodecResult<Value> {
        let mut reader = JsonDocumentReader::new(doc);
        match first_token(&mut reader)? {
            TokenKind::NullValue => {
                expect_end(&mut reader)?;
                Ok(Value::Null)
            }
            TokenKind::ArrayStart => {
                let root = ParseFrame::array(element);
                let closed = JsonDecoder::new(self.ctx).run(root, &mut reader)?;
                let ParseFrame::Array { buffer, .. } = closed else {
                    return Err(CodecError::malformed("document root is not an array"));
                };
                self.ctx
                    .composite()
                    .array_to_domain(element, &buffer.into_value())
            }
            _ => Err(CodecError::malformed(
                "array document must start with an array or null",
            )),
        }
    }
}

fn first_token(reader: &mut dyn DocumentReader) -> CodecResult<TokenKind> {
    if !reader.has_next() {
        return Err(CodecError::malformed("empty document"));
    }
    reader.next_token()
}

fn expect_end(reader: &mut dyn DocumentReader) -> CodecResult<()> {
    if reader.has_next() {
        return Err(CodecError::malformed("content after the closing token"));
    }
    Ok(())
}
