use structdoc_error::{CodecError, CodecResult};
use tracing::debug;

use super::{escape::is_valid_xml_name, COLLECTION_TAG, ELEMENT_TAG};
use crate::{
    codec::CodecContext,
    document::{Dialect, DocumentAppender, DocumentWriter},
    format::LiteralFamily,
    schema::{ElementKind, ScalarMapping, SchemaDescriptor, StorageKind},
    value::Value,
};

pub(super) struct XmlEncoder<'a> {
    ctx: &'a CodecContext,
    out: DocumentAppender,
}

impl<'a> XmlEncoder<'a> {
    pub(super) fn new(ctx: &'a CodecContext) -> Self {
        Self {
            ctx,
            out: DocumentAppender::with_capacity(Dialect::Xml, 128),
        }
    }

    pub(super) fn finish(self) -> String {
        self.out.into_string()
    }

    fn enter(
        &self,
        depth: usize,
    ) -> CodecResult<()> {
        let max = self.ctx.options().max_depth;
        if depth > max {
            return Err(CodecError::DepthLimit {
                current: depth,
                max,
            });
        }
        Ok(())
    }

    fn open(
        &mut self,
        tag: &str,
    ) {
        self.out.append_char('<');
        self.out.append_str(tag);
        self.out.append_char('>');
    }

    fn close(
        &mut self,
        tag: &str,
    ) {
        self.out.append_str("</");
        self.out.append_str(tag);
        self.out.append_char('>');
    }

    fn empty(
        &mut self,
        tag: &str,
    ) {
        self.out.append_char('<');
        self.out.append_str(tag);
        self.out.append_str("/>");
    }

    /// `<e>fields</e>`, or `<e/>` for null.
    pub(super) fn write_root(
        &mut self,
        schema: &SchemaDescriptor,
        value: &Value,
    ) -> CodecResult<()> {
        if value.is_null() {
            self.empty(ELEMENT_TAG);
            return Ok(());
        }
        self.open(ELEMENT_TAG);
        self.write_fields(schema, value, 1)?;
        self.close(ELEMENT_TAG);
        Ok(())
    }

    /// One tag per selectable, nulls included.
    fn write_fields(
        &mut self,
        schema: &SchemaDescriptor,
        value: &Value,
        depth: usize,
    ) -> CodecResult<()> {
        self.enter(depth)?;
        let row = self.ctx.composite().decompose(schema, value)?;
        for selectable in schema.selectables() {
            let name = selectable.name.as_str();
            if !is_valid_xml_name(name) {
                debug!(schema = schema.name(), name, "selectable is not a valid tag name");
                return Err(CodecError::InvalidTagName(name.to_string()));
            }
            let raw = &row[selectable.index];
            if raw.is_null() {
                self.empty(name);
                continue;
            }
            match &selectable.storage {
                StorageKind::Scalar(mapping) => {
                    let relational = self.ctx.scalars().from_raw(mapping, raw.clone())?;
                    if relational.is_null() {
                        self.empty(name);
                        continue;
                    }
                    self.open(name);
                    self.write_scalar(mapping, &relational)?;
                }
                StorageKind::Aggregate(nested) => {
                    self.open(name);
                    self.write_fields(nested, raw, depth + 1)?;
                }
                StorageKind::Array(element) => {
                    self.open(name);
                    self.write_collection(element, raw, depth + 1)?;
                }
            }
            self.close(name);
        }
        Ok(())
    }

    /// `<Collection>` of `<e>` items; `<Collection/>` when empty.
    pub(super) fn write_collection(
        &mut self,
        element: &ElementKind,
        value: &Value,
        depth: usize,
    ) -> CodecResult<()> {
        let Value::Array(items) = value else {
            return Err(CodecError::mismatch(format!(
                "array slot holds a {} value",
                value.kind_name()
            )));
        };
        self.enter(depth)?;
        if items.is_empty() {
            self.empty(COLLECTION_TAG);
            return Ok(());
        }
        self.open(COLLECTION_TAG);
        for item in items {
            if item.is_null() {
                self.empty(ELEMENT_TAG);
                continue;
            }
            self.open(ELEMENT_TAG);
            match element {
                ElementKind::Scalar(mapping) => self.write_scalar(mapping, item)?,
                ElementKind::Composite(schema) => self.write_fields(schema, item, depth + 1)?,
            }
            self.close(ELEMENT_TAG);
        }
        self.close(COLLECTION_TAG);
        Ok(())
    }

    fn write_scalar(
        &mut self,
        mapping: &ScalarMapping,
        value: &Value,
    ) -> CodecResult<()> {
        let scalars = self.ctx.scalars();
        match (LiteralFamily::of(mapping.code)?, value) {
            (LiteralFamily::Integer | LiteralFamily::Native, Value::Bool(b)) => {
                self.out.append_char(if *b { '1' } else { '0' })
            }
            (LiteralFamily::Character, Value::Bool(b)) => {
                self.out.append_char(if *b { 'Y' } else { 'N' })
            }
            (LiteralFamily::Character | LiteralFamily::Text, _) => {
                self.out.start_escaping();
                let written = scalars.append_encoded(mapping, value, &mut self.out);
                self.out.end_escaping();
                written?;
            }
            _ => scalars.append_encoded(mapping, value, &mut self.out)?,
        }
        Ok(())
    }
}
