use structdoc_error::{CodecError, CodecResult};
use tracing::debug;

use super::super::LiteralFamily;
use crate::{
    codec::{CodecContext, GrowableArray},
    document::{DocumentReader, TokenKind},
    schema::{ElementKind, ScalarMapping, SchemaDescriptor, StorageKind, ValueType},
    value::Value,
};

/// One open object or array of the document being decoded.
pub(super) enum ParseFrame<'s> {
    Composite {
        schema: &'s SchemaDescriptor,
        row: Vec<Value>,
        /// Slot the next value (or the child being parsed) lands in.
        pending: Option<usize>,
    },
    Array {
        element: &'s ElementKind,
        buffer: GrowableArray,
    },
}

impl<'s> ParseFrame<'s> {
    pub(super) fn composite(schema: &'s SchemaDescriptor) -> Self {
        Self::Composite {
            schema,
            row: vec![Value::Null; schema.flat_count()],
            pending: None,
        }
    }

    pub(super) fn array(element: &'s ElementKind) -> Self {
        Self::Array {
            element,
            buffer: GrowableArray::new(),
        }
    }
}

enum Target<'s> {
    Slot(&'s StorageKind),
    Element(&'s ElementKind),
}

/// Push-down decoder over a token stream. The frame stack lives on the
/// heap, so nesting is bounded by `max_depth` only.
pub(super) struct JsonDecoder<'a, 's> {
    ctx: &'a CodecContext,
    stack: Vec<ParseFrame<'s>>,
}

impl<'a, 's> JsonDecoder<'a, 's> {
    pub(super) fn new(ctx: &'a CodecContext) -> Self {
        Self {
            ctx,
            stack: Vec::new(),
        }
    }

    /// Consumes tokens until `root` closes and returns the closed frame.
    ///
    /// Fails if the document ends early or continues after the root.
    pub(super) fn run(
        mut self,
        root: ParseFrame<'s>,
        reader: &mut dyn DocumentReader,
    ) -> CodecResult<ParseFrame<'s>> {
        self.push(root)?;
        loop {
            if !reader.has_next() {
                return Err(malformed("unexpected end of document"));
            }
            let token = reader.next_token()?;
            let closed = match token {
                TokenKind::ValueKey => {
                    self.on_key(reader.key())?;
                    None
                }
                TokenKind::ArrayStart => {
                    self.on_array_start()?;
                    None
                }
                TokenKind::ObjectStart => {
                    self.on_object_start()?;
                    None
                }
                TokenKind::ArrayEnd | TokenKind::ObjectEnd => self.on_end(token)?,
                TokenKind::NullValue
                | TokenKind::BooleanValue
                | TokenKind::NumericValue
                | TokenKind::Value => {
                    self.on_scalar(token, reader)?;
                    None
                }
            };
            if let Some(root) = closed {
                if reader.has_next() {
                    return Err(malformed("content after the closing token"));
                }
                return Ok(root);
            }
        }
    }

    fn push(
        &mut self,
        frame: ParseFrame<'s>,
    ) -> CodecResult<()> {
        let max = self.ctx.options().max_depth;
        if self.stack.len() >= max {
            debug!(max, "document nesting too deep");
            return Err(CodecError::DepthLimit {
                current: self.stack.len() + 1,
                max,
            });
        }
        self.stack.push(frame);
        Ok(())
    }

    /// What the next value or child frame fills.
    fn target(&self) -> CodecResult<Target<'s>> {
        match self.stack.last() {
            Some(ParseFrame::Composite {
                schema, pending, ..
            }) => {
                let schema: &'s SchemaDescriptor = *schema;
                let index = pending.ok_or_else(|| malformed("value without a key"))?;
                Ok(Target::Slot(&schema.selectables()[index].storage))
            }
            Some(ParseFrame::Array { element, .. }) => Ok(Target::Element(*element)),
            None => Err(malformed("token outside of any object or array")),
        }
    }

    fn on_key(
        &mut self,
        key: &str,
    ) -> CodecResult<()> {
        match self.stack.last_mut() {
            Some(ParseFrame::Composite {
                schema, pending, ..
            }) => {
                *pending = Some(schema.resolve(key)?.index);
                Ok(())
            }
            _ => Err(malformed("key outside of an object")),
        }
    }

    fn on_array_start(&mut self) -> CodecResult<()> {
        match self.target()? {
            Target::Slot(StorageKind::Array(element)) => self.push(ParseFrame::array(element)),
            Target::Slot(_) => Err(CodecError::mismatch(
                "array given for an attribute that is not plural",
            )),
            Target::Element(_) => Err(CodecError::mismatch("nested arrays are not supported")),
        }
    }

    fn on_object_start(&mut self) -> CodecResult<()> {
        match self.target()? {
            Target::Slot(StorageKind::Aggregate(schema))
            | Target::Element(ElementKind::Composite(schema)) => {
                self.push(ParseFrame::composite(schema))
            }
            Target::Slot(_) => Err(CodecError::mismatch(
                "object starts a sub-object for a non-aggregate attribute",
            )),
            Target::Element(ElementKind::Scalar(_)) => Err(CodecError::mismatch(
                "object given for an array of scalars",
            )),
        }
    }

    fn on_scalar(
        &mut self,
        token: TokenKind,
        reader: &dyn DocumentReader,
    ) -> CodecResult<()> {
        let value = match self.target()? {
            Target::Slot(StorageKind::Scalar(mapping)) => {
                let relational = self.decode_scalar(mapping, token, reader)?;
                self.ctx.composite().bind(mapping, relational)?
            }
            Target::Element(ElementKind::Scalar(mapping)) => {
                self.decode_scalar(mapping, token, reader)?
            }
            Target::Slot(StorageKind::Aggregate(_) | StorageKind::Array(_))
            | Target::Element(ElementKind::Composite(_)) => {
                if token != TokenKind::NullValue {
                    return Err(CodecError::mismatch(
                        "scalar given for a structured attribute",
                    ));
                }
                Value::Null
            }
        };
        self.deliver(value)
    }

    fn on_end(
        &mut self,
        token: TokenKind,
    ) -> CodecResult<Option<ParseFrame<'s>>> {
        let frame = self
            .stack
            .pop()
            .ok_or_else(|| malformed("closing token without an open frame"))?;
        let balanced = matches!(
            (&frame, token),
            (ParseFrame::Composite { .. }, TokenKind::ObjectEnd)
                | (ParseFrame::Array { .. }, TokenKind::ArrayEnd)
        );
        if !balanced {
            return Err(malformed("unbalanced closing token"));
        }
        if self.stack.is_empty() {
            return Ok(Some(frame));
        }
        let value = match frame {
            ParseFrame::Composite { schema, row, .. } => self.ctx.composite().compose(schema, &row)?,
            ParseFrame::Array { buffer, .. } => buffer.into_value(),
        };
        self.deliver(value)?;
        Ok(None)
    }

    /// Stores a finished value into the parent's pending slot or appends it
    /// to the parent array.
    fn deliver(
        &mut self,
        value: Value,
    ) -> CodecResult<()> {
        match self.stack.last_mut() {
            Some(ParseFrame::Composite { row, pending, .. }) => {
                let index = pending.take().ok_or_else(|| malformed("value without a key"))?;
                row[index] = value;
            }
            Some(ParseFrame::Array { buffer, .. }) => buffer.push(value),
            None => return Err(malformed("value outside of any object or array")),
        }
        Ok(())
    }

    fn decode_scalar(
        &self,
        mapping: &ScalarMapping,
        token: TokenKind,
        reader: &dyn DocumentReader,
    ) -> CodecResult<Value> {
        if token == TokenKind::NullValue {
            return Ok(Value::Null);
        }
        LiteralFamily::of(mapping.code)?;
        let scalars = self.ctx.scalars();
        match token {
            TokenKind::BooleanValue => match mapping.value_type {
                ValueType::Bool => Ok(Value::Bool(reader.boolean_value())),
                _ => {
                    let text = if reader.boolean_value() { "true" } else { "false" };
                    scalars.from_encoded(mapping, text)
                }
            },
            TokenKind::NumericValue => {
                let text = reader.numeric_text();
                match mapping.value_type {
                    ValueType::Int => text
                        .parse()
                        .map(Value::Int)
                        .map_err(|e| CodecError::invalid_literal("integer", text, e)),
                    ValueType::Float => text
                        .parse()
                        .map(Value::Float)
                        .map_err(|e| CodecError::invalid_literal("float", text, e)),
                    _ => scalars.from_encoded(mapping, text),
                }
            }
            _ => scalars.from_encoded(mapping, reader.string_value()),
        }
    }
}

fn malformed(msg: &str) -> CodecError {
    debug!(msg, "malformed JSON structure");
    CodecError::malformed(msg)
}
