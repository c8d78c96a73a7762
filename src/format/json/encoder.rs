use structdoc_error::{CodecError, CodecResult};

use super::super::LiteralFamily;
use crate::{
    codec::CodecContext,
    document::{Dialect, DocumentAppender, DocumentWriter},
    schema::{ElementKind, ScalarMapping, SchemaDescriptor, StorageKind},
    value::Value,
};

pub(super) struct JsonEncoder<'a> {
    ctx: &'a CodecContext,
    out: DocumentAppender,
}

impl<'a> JsonEncoder<'a> {
    pub(super) fn new(ctx: &'a CodecContext) -> Self {
        Self {
            ctx,
            out: DocumentAppender::with_capacity(Dialect::Json, 128),
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

    /// Writes a composite, `Row` or `null`.
    pub(super) fn write_composite(
        &mut self,
        schema: &SchemaDescriptor,
        value: &Value,
        depth: usize,
    ) -> CodecResult<()> {
        if value.is_null() {
            self.out.append_str("null");
            return Ok(());
        }
        self.enter(depth)?;
        let row = self.ctx.composite().decompose(schema, value)?;

        self.out.append_char('{');
        for (i, selectable) in schema.selectables().iter().enumerate() {
            if i > 0 {
                self.out.append_char(',');
            }
            self.write_string(&selectable.name);
            self.out.append_char(':');
            self.write_slot(&selectable.storage, &row[selectable.index], depth)?;
        }
        self.out.append_char('}');
        Ok(())
    }

    fn write_slot(
        &mut self,
        storage: &StorageKind,
        raw: &Value,
        depth: usize,
    ) -> CodecResult<()> {
        match storage {
            StorageKind::Scalar(mapping) => {
                let relational = self.ctx.scalars().from_raw(mapping, raw.clone())?;
                self.write_scalar(mapping, &relational)
            }
            StorageKind::Aggregate(schema) => self.write_composite(schema, raw, depth + 1),
            StorageKind::Array(element) => self.write_array(element, raw, depth + 1),
        }
    }

    /// Writes an array of relational elements, or `null`.
    pub(super) fn write_array(
        &mut self,
        element: &ElementKind,
        value: &Value,
        depth: usize,
    ) -> CodecResult<()> {
        let items = match value {
            Value::Null => {
                self.out.append_str("null");
                return Ok(());
            }
            Value::Array(items) => items,
            other => {
                return Err(CodecError::mismatch(format!(
                    "array slot holds a {} value",
                    other.kind_name()
                )))
            }
        };
        self.enter(depth)?;

        self.out.append_char('[');
        for (i, item) in items.iter().enumerate() {
            if i > 0 {
                self.out.append_char(',');
            }
            match element {
                ElementKind::Scalar(mapping) => self.write_scalar(mapping, item)?,
                ElementKind::Composite(schema) => self.write_composite(schema, item, depth + 1)?,
            }
        }
        self.out.append_char(']');
        Ok(())
    }

    fn write_string(
        &mut self,
        s: &str,
    ) {
        self.out.append_char('"');
        self.out.start_escaping();
        self.out.append_str(s);
        self.out.end_escaping();
        self.out.append_char('"');
    }

    fn write_scalar(
        &mut self,
        mapping: &ScalarMapping,
        value: &Value,
    ) -> CodecResult<()> {
        if value.is_null() {
            self.out.append_str("null");
            return Ok(());
        }
        let scalars = self.ctx.scalars();
        match (LiteralFamily::of(mapping.code)?, value) {
            (LiteralFamily::Integer, Value::Bool(b)) => {
                self.out.append_char(if *b { '1' } else { '0' })
            }
            (LiteralFamily::Integer | LiteralFamily::Native, Value::Float(f)) if !f.is_finite() => {
                self.out.append_char('"');
                scalars.append_encoded(mapping, value, &mut self.out)?;
                self.out.append_char('"');
            }
            (
                LiteralFamily::Integer | LiteralFamily::Native,
                Value::Bool(_) | Value::Int(_) | Value::Float(_) | Value::Decimal(_),
            ) => scalars.append_encoded(mapping, value, &mut self.out)?,
            (LiteralFamily::Integer | LiteralFamily::Native, other) => {
                return Err(CodecError::mismatch(format!(
                    "{} column cannot carry a {} literal",
                    mapping.code,
                    other.kind_name()
                )))
            }
            (LiteralFamily::Character, Value::Bool(b)) => {
                self.out.append_str(if *b { "\"Y\"" } else { "\"N\"" })
            }
            (LiteralFamily::Character | LiteralFamily::Text, _) => {
                self.out.append_char('"');
                self.out.start_escaping();
                let written = scalars.append_encoded(mapping, value, &mut self.out);
                self.out.end_escaping();
                written?;
                self.out.append_char('"');
            }
            (
                LiteralFamily::Decimal
                | LiteralFamily::Uuid
                | LiteralFamily::Temporal
                | LiteralFamily::Binary,
                _,
            ) => {
                self.out.append_char('"');
                scalars.append_encoded(mapping, value, &mut self.out)?;
                self.out.append_char('"');
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::NaiveDate;
    use uuid::Uuid;

    use super::*;
    use crate::{
        schema::{NestedStorage, SqlTypeCode, ValueType},
        value::Composite,
    };

    fn encode(
        schema: &SchemaDescriptor,
        value: &Value,
    ) -> CodecResult<String> {
        let ctx = CodecContext::default();
        let mut enc = JsonEncoder::new(&ctx);
        enc.write_composite(schema, value, 1)?;
        Ok(enc.finish())
    }

    fn single(
        name: &str,
        mapping: ScalarMapping,
    ) -> Arc<SchemaDescriptor> {
        SchemaDescriptor::builder("S").scalar(name, mapping).build().unwrap()
    }

    #[test]
    fn test_literal_forms() {
        let cases = [
            (ScalarMapping::new(SqlTypeCode::Integer, ValueType::Bool), Value::Bool(true), r#"{"v":1}"#),
            (ScalarMapping::of(SqlTypeCode::Boolean), Value::Bool(false), r#"{"v":false}"#),
            (ScalarMapping::new(SqlTypeCode::Char, ValueType::Bool), Value::Bool(true), r#"{"v":"Y"}"#),
            (ScalarMapping::of(SqlTypeCode::VarChar), Value::from("a\"b\n"), r#"{"v":"a\"b\n"}"#),
            (ScalarMapping::of(SqlTypeCode::Double), Value::Float(f64::NAN), r#"{"v":"NaN"}"#),
            (ScalarMapping::of(SqlTypeCode::VarBinary), Value::Bytes(vec![0x0F, 0xA0]), r#"{"v":"0FA0"}"#),
            (
                ScalarMapping::of(SqlTypeCode::Date),
                Value::Date(NaiveDate::from_ymd_opt(2021, 3, 4).unwrap()),
                r#"{"v":"2021-03-04"}"#,
            ),
            (
                ScalarMapping::of(SqlTypeCode::Uuid),
                Value::Uuid(Uuid::nil()),
                r#"{"v":"00000000-0000-0000-0000-000000000000"}"#,
            ),
        ];
        for (mapping, value, expected) in cases {
            let schema = single("v", mapping);
            let doc = encode(&schema, &Composite::new("S", vec![value]).into()).unwrap();
            assert_eq!(doc, expected);
        }
    }

    #[test]
    fn test_unsupported_kind() {
        let schema = single("v", ScalarMapping::new(SqlTypeCode::Interval, ValueType::Str));
        let err = encode(&schema, &Composite::new("S", vec!["P1D".into()]).into()).unwrap_err();
        assert_eq!(err, CodecError::UnsupportedScalarKind("INTERVAL".into()));
    }

    #[test]
    fn test_depth_limit() {
        let mut schema = single("v", ScalarMapping::of(SqlTypeCode::Integer));
        let mut value: Value = Composite::new("S", vec![Value::Int(1)]).into();
        for _ in 0..3 {
            schema = SchemaDescriptor::builder("S")
                .nested("n", schema, NestedStorage::Aggregate)
                .build()
                .unwrap();
            value = Composite::new("S", vec![value]).into();
        }
        let ctx = CodecContext::new(crate::codec::CodecOptions {
            max_depth: 3,
            ..Default::default()
        });
        let mut enc = JsonEncoder::new(&ctx);
        let err = enc.write_composite(&schema, &value, 1).unwrap_err();
        assert_eq!(err, CodecError::DepthLimit { current: 4, max: 3 });
    }
}
