use structdoc_error::{CodecError, CodecResult};
use tracing::debug;

use super::{escape::unescape, COLLECTION_TAG, ELEMENT_TAG};
use crate::{
    codec::{CodecContext, GrowableArray},
    format::LiteralFamily,
    schema::{ElementKind, ScalarMapping, SchemaDescriptor, StorageKind},
    value::Value,
};

/// Recursive-descent reader over the byte offsets of an XML document.
pub(super) struct XmlDecoder<'a, 'd> {
    ctx: &'a CodecContext,
    input: &'d str,
    pos: usize,
    return_embeddable: bool,
}

/// Opening tag just read.
enum Open<'d> {
    /// `<name>`
    Start(&'d str),
    /// `<name/>`
    Empty(&'d str),
}

impl<'a, 'd> XmlDecoder<'a, 'd> {
    /// Trailing whitespace of `input` is ignored.
    pub(super) fn new(
        ctx: &'a CodecContext,
        input: &'d str,
        return_embeddable: bool,
    ) -> Self {
        Self {
            ctx,
            input: input.trim_end(),
            pos: 0,
            return_embeddable,
        }
    }

    fn error(
        &self,
        msg: &str,
    ) -> CodecError {
        debug!(position = self.pos, msg, "malformed XML document");
        CodecError::malformed(format!("{msg} at offset {}", self.pos))
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

    fn rest(&self) -> &'d str {
        &self.input[self.pos..]
    }

    fn skip_whitespace(&mut self) {
        let rest = self.rest();
        self.pos += rest.len() - rest.trim_start().len();
    }

    fn eat(
        &mut self,
        literal: &str,
    ) -> bool {
        if self.rest().starts_with(literal) {
            self.pos += literal.len();
            true
        } else {
            false
        }
    }

    fn at_close(&mut self) -> bool {
        self.skip_whitespace();
        self.rest().starts_with("</")
    }

    /// Reads `<name>` or `<name/>`.
    fn read_open(&mut self) -> CodecResult<Open<'d>> {
        self.skip_whitespace();
        if !self.eat("<") {
            return Err(self.error("expected an opening tag"));
        }
        let rest = self.rest();
        let end = rest
            .find('>')
            .ok_or_else(|| self.error("unterminated tag"))?;
        let inner = &rest[..end];
        self.pos += end + 1;
        match inner.strip_suffix('/') {
            Some(name) => Ok(Open::Empty(name)),
            None => Ok(Open::Start(inner)),
        }
    }

    fn expect_close(
        &mut self,
        tag: &str,
    ) -> CodecResult<()> {
        self.skip_whitespace();
        let matched = self.rest().strip_prefix("</").and_then(|r| r.strip_prefix(tag));
        match matched {
            Some(r) if r.starts_with('>') => {
                self.pos += tag.len() + 3;
                Ok(())
            }
            _ => Err(self.error(&format!("expected </{tag}>"))),
        }
    }

    /// Raw text up to the next tag.
    fn read_text(&mut self) -> CodecResult<&'d str> {
        let rest = self.rest();
        let end = rest
            .find('<')
            .ok_or_else(|| self.error("unexpected end of document"))?;
        self.pos += end;
        Ok(&rest[..end])
    }

    pub(super) fn expect_end(&mut self) -> CodecResult<()> {
        self.skip_whitespace();
        if self.pos != self.input.len() {
            return Err(self.error("content after the root element"));
        }
        Ok(())
    }

    /// `<e>...</e>` or `<e/>`. Returns the raw row of the root composite.
    pub(super) fn read_root(
        &mut self,
        schema: &SchemaDescriptor,
    ) -> CodecResult<Option<Vec<Value>>> {
        let row = match self.read_open()? {
            Open::Empty(ELEMENT_TAG) => None,
            Open::Start(ELEMENT_TAG) => Some(self.read_fields(schema, ELEMENT_TAG, 1)?),
            _ => return Err(self.error("document must start with <e>")),
        };
        self.expect_end()?;
        Ok(row)
    }

    /// Child tags of a composite up to `</end_tag>`. Unlisted selectables
    /// stay null.
    fn read_fields(
        &mut self,
        schema: &SchemaDescriptor,
        end_tag: &str,
        depth: usize,
    ) -> CodecResult<Vec<Value>> {
        self.enter(depth)?;
        let mut row = vec![Value::Null; schema.flat_count()];
        while !self.at_close() {
            let (name, empty) = match self.read_open()? {
                Open::Start(name) => (name, false),
                Open::Empty(name) => (name, true),
            };
            let selectable = schema.resolve(name)?;
            if empty {
                row[selectable.index] = Value::Null;
                continue;
            }
            row[selectable.index] = match &selectable.storage {
                StorageKind::Scalar(mapping) => {
                    let relational = self.read_scalar(mapping)?;
                    self.expect_close(name)?;
                    self.ctx.composite().bind(mapping, relational)?
                }
                StorageKind::Aggregate(nested) => {
                    let nested_row = self.read_fields(nested, name, depth + 1)?;
                    self.finish_composite(nested, nested_row)?
                }
                StorageKind::Array(element) => {
                    let items = self.read_collection(element, depth + 1)?;
                    self.expect_close(name)?;
                    items
                }
            };
        }
        self.expect_close(end_tag)?;
        Ok(row)
    }

    fn finish_composite(
        &self,
        schema: &SchemaDescriptor,
        row: Vec<Value>,
    ) -> CodecResult<Value> {
        if self.return_embeddable {
            self.ctx.composite().compose(schema, &row)
        } else {
            Ok(Value::Row(row))
        }
    }

    /// Element text of a scalar; a nested tag here is a type error.
    fn read_scalar(
        &mut self,
        mapping: &ScalarMapping,
    ) -> CodecResult<Value> {
        LiteralFamily::of(mapping.code)?;
        let text = self.read_text()?;
        if !self.rest().starts_with("</") {
            return Err(CodecError::mismatch(format!(
                "starts sub-object for a non-aggregate {} column",
                mapping.code
            )));
        }
        self.ctx.scalars().from_encoded(mapping, &unescape(text)?)
    }

    /// `<Collection>` of `<e>` items; `<Collection/>` is an empty array.
    pub(super) fn read_collection(
        &mut self,
        element: &ElementKind,
        depth: usize,
    ) -> CodecResult<Value> {
        self.enter(depth)?;
        match self.read_open()? {
            Open::Empty(COLLECTION_TAG) => return Ok(Value::Array(Vec::new())),
            Open::Start(COLLECTION_TAG) => {}
            _ => return Err(self.error("expected <Collection>")),
        }
        let mut buffer = GrowableArray::new();
        while !self.at_close() {
            let item = match self.read_open()? {
                Open::Empty(ELEMENT_TAG) => Value::Null,
                Open::Start(ELEMENT_TAG) => match element {
                    ElementKind::Scalar(mapping) => {
                        let item = self.read_scalar(mapping)?;
                        self.expect_close(ELEMENT_TAG)?;
                        item
                    }
                    ElementKind::Composite(schema) => {
                        let row = self.read_fields(schema, ELEMENT_TAG, depth + 1)?;
                        self.finish_composite(schema, row)?
                    }
                },
                _ => return Err(self.error("expected <e> inside <Collection>")),
            };
            buffer.push(item);
        }
        self.expect_close(COLLECTION_TAG)?;
        Ok(buffer.into_value())
    }

    pub(super) fn deserialize_untyped_root(&mut self) -> CodecResult<Option<Value>> {
        let values = match self.read_open()? {
            Open::Empty(ELEMENT_TAG) => None,
            Open::Start(ELEMENT_TAG) => Some(Value::Row(self.read_untyped(ELEMENT_TAG, 1)?)),
            _ => return Err(self.error("document must start with <e>")),
        };
        self.expect_end()?;
        Ok(values)
    }

    /// Schema-less read of the children of `</end_tag>`: text becomes
    /// `Str`, nested elements `Row`s, `<Collection>` an `Array`.
    pub(super) fn read_untyped(
        &mut self,
        end_tag: &str,
        depth: usize,
    ) -> CodecResult<Vec<Value>> {
        self.enter(depth)?;
        let mut values = Vec::new();
        while !self.at_close() {
            let name = match self.read_open()? {
                Open::Empty(COLLECTION_TAG) => {
                    values.push(Value::Array(Vec::new()));
                    continue;
                }
                Open::Empty(_) => {
                    values.push(Value::Null);
                    continue;
                }
                Open::Start(name) => name,
            };
            let start = self.pos;
            self.skip_whitespace();
            if self.rest().starts_with('<') && !self.rest().starts_with("</") {
                let children = self.read_untyped(name, depth + 1)?;
                values.push(if name == COLLECTION_TAG {
                    Value::Array(children)
                } else {
                    Value::Row(children)
                });
            } else {
                self.pos = start;
                let text = self.read_text()?;
                values.push(Value::Str(unescape(text)?.into_owned()));
                self.expect_close(name)?;
            }
        }
        self.expect_close(end_tag)?;
        Ok(values)
    }
}
