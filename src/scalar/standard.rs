use std::str::FromStr;

use rust_decimal::Decimal;
use structdoc_error::{CodecError, CodecResult};
use tracing::debug;

use super::{encoded, ScalarCodec};
use crate::{
    codec::LobBinding,
    document::DocumentWriter,
    schema::{ScalarMapping, SqlTypeCode, ValueType},
    value::{Lob, Value},
};

/// Built-in [`ScalarCodec`] covering every [`ValueType`].
#[derive(Debug, Default, Clone, Copy)]
pub struct StandardScalarCodec;

impl StandardScalarCodec {
    fn check(
        mapping: &ScalarMapping,
        value: &Value,
    ) -> CodecResult<()> {
        if mapping.value_type.accepts(value) {
            Ok(())
        } else {
            debug!(
                expected = ?mapping.value_type,
                found = value.kind_name(),
                "scalar value does not fit its column"
            );
            Err(CodecError::mismatch(format!(
                "{} column of {:?} cannot hold a {} value",
                mapping.code,
                mapping.value_type,
                value.kind_name()
            )))
        }
    }
}

fn lob_for(
    code: SqlTypeCode,
    value: Value,
) -> Value {
    match (code, value) {
        (c, Value::Bytes(b)) if c.is_binary() => Value::Lob(Lob::Blob(b)),
        (SqlTypeCode::NClob | SqlTypeCode::LongNVarChar, Value::Str(s)) => Value::Lob(Lob::NClob(s)),
        (SqlTypeCode::Clob | SqlTypeCode::LongVarChar, Value::Str(s)) => Value::Lob(Lob::Clob(s)),
        (_, other) => other,
    }
}

impl ScalarCodec for StandardScalarCodec {
    fn to_raw(
        &self,
        mapping: &ScalarMapping,
        relational: Value,
        binding: LobBinding,
    ) -> CodecResult<Value> {
        Self::check(mapping, &relational)?;
        Ok(match binding {
            LobBinding::Native => lob_for(mapping.code, relational),
            LobBinding::Inline => relational,
        })
    }

    fn from_raw(
        &self,
        mapping: &ScalarMapping,
        raw: Value,
    ) -> CodecResult<Value> {
        let value = match raw {
            Value::Lob(Lob::Blob(b)) => Value::Bytes(b),
            Value::Lob(Lob::Clob(s) | Lob::NClob(s)) => Value::Str(s),
            other => other,
        };
        Self::check(mapping, &value)?;
        Ok(value)
    }

    fn append_encoded(
        &self,
        mapping: &ScalarMapping,
        value: &Value,
        out: &mut dyn DocumentWriter,
    ) -> CodecResult<()> {
        match value {
            Value::Bool(b) => out.append_str(if *b { "true" } else { "false" }),
            Value::Int(i) => out.append_str(&i.to_string()),
            Value::Float(f) => out.append_str(&format_float(*f)),
            Value::Decimal(d) => out.append_str(&d.to_string()),
            Value::Str(s) | Value::Lob(Lob::Clob(s) | Lob::NClob(s)) => out.append_str(s),
            Value::Bytes(b) | Value::Lob(Lob::Blob(b)) => out.append_hex(b),
            Value::Uuid(u) => out.append_str(&u.hyphenated().to_string()),
            Value::Date(d) => out.append_str(&encoded::encode_date(d)),
            Value::Time(t) => out.append_str(&encoded::encode_time(t)),
            Value::Timestamp(ts) => out.append_str(&encoded::encode_timestamp(ts)),
            Value::TimestampTz(ts) => out.append_str(&encoded::encode_offset_timestamp(ts)),
            Value::Null
            | Value::Array(_)
            | Value::Composite(_)
            | Value::Reference(_)
            | Value::Row(_) => {
                return Err(CodecError::mismatch(format!(
                    "{} value has no scalar encoding for {}",
                    value.kind_name(),
                    mapping.code
                )))
            }
        }
        Ok(())
    }

    fn from_encoded(
        &self,
        mapping: &ScalarMapping,
        text: &str,
    ) -> CodecResult<Value> {
        let value = match mapping.value_type {
            ValueType::Bool => Value::Bool(parse_bool(text)?),
            ValueType::Int => Value::Int(
                text.parse()
                    .map_err(|e| CodecError::invalid_literal("integer", text, e))?,
            ),
            ValueType::Float => Value::Float(
                text.parse()
                    .map_err(|e| CodecError::invalid_literal("float", text, e))?,
            ),
            ValueType::Decimal => Value::Decimal(
                Decimal::from_str(text)
                    .or_else(|_| Decimal::from_scientific(text))
                    .map_err(|e| CodecError::invalid_literal("decimal", text, e))?,
            ),
            ValueType::Str => Value::Str(text.to_string()),
            ValueType::Bytes => Value::Bytes(encoded::decode_hex(text)?),
            ValueType::Uuid => Value::Uuid(encoded::decode_uuid(text)?),
            ValueType::Date => Value::Date(encoded::decode_date(text)?),
            ValueType::Time => Value::Time(encoded::decode_time(text)?),
            ValueType::Timestamp => Value::Timestamp(encoded::decode_timestamp(text)?),
            ValueType::TimestampTz => Value::TimestampTz(encoded::decode_offset_timestamp(text)?),
        };
        Ok(value)
    }
}

fn parse_bool(text: &str) -> CodecResult<bool> {
    match text {
        "1" | "Y" | "y" | "T" | "t" => Ok(true),
        "0" | "N" | "n" | "F" | "f" => Ok(false),
        _ if text.eq_ignore_ascii_case("true") => Ok(true),
        _ if text.eq_ignore_ascii_case("false") => Ok(false),
        _ => Err(CodecError::invalid_literal(
            "boolean",
            text,
            "expected true/false, 1/0 or Y/N",
        )),
    }
}

/// Shortest round-trip text for a float. Magnitudes outside `[1e-7, 1e21)`
/// switch to exponent form so the text stays a valid JSON number.
fn format_float(f: f64) -> String {
    let magnitude = f.abs();
    if f.is_finite() && magnitude != 0.0 && !(1e-7..1e21).contains(&magnitude) {
        format!("{f:e}")
    } else {
        f.to_string()
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use rstest::rstest;

    use super::*;
    use crate::document::{Dialect, DocumentAppender};

    fn encode(
        mapping: &ScalarMapping,
        value: &Value,
    ) -> String {
        let mut w = DocumentAppender::new(Dialect::Xml);
        StandardScalarCodec
            .append_encoded(mapping, value, &mut w)
            .unwrap();
        w.into_string()
    }

    #[rstest]
    #[case(SqlTypeCode::Integer, Value::Int(-42), "-42")]
    #[case(SqlTypeCode::Double, Value::Float(1.5), "1.5")]
    #[case(SqlTypeCode::Decimal, Value::Decimal(Decimal::new(12345, 2)), "123.45")]
    #[case(SqlTypeCode::Boolean, Value::Bool(true), "true")]
    #[case(SqlTypeCode::VarBinary, Value::Bytes(vec![0xCA, 0xFE]), "CAFE")]
    #[case(
        SqlTypeCode::Date,
        Value::Date(NaiveDate::from_ymd_opt(1999, 12, 31).unwrap()),
        "1999-12-31"
    )]
    fn test_encoded_round_trip(
        #[case] code: SqlTypeCode,
        #[case] value: Value,
        #[case] text: &str,
    ) {
        let mapping = ScalarMapping::of(code);
        assert_eq!(encode(&mapping, &value), text);
        assert_eq!(
            StandardScalarCodec.from_encoded(&mapping, text).unwrap(),
            value
        );
    }

    #[test]
    fn test_native_binding_wraps_lob_columns() {
        let clob = ScalarMapping::of(SqlTypeCode::Clob);
        let raw = StandardScalarCodec
            .to_raw(&clob, Value::from("big"), LobBinding::Native)
            .unwrap();
        assert_eq!(raw, Value::Lob(Lob::Clob("big".into())));
        assert_eq!(
            StandardScalarCodec.from_raw(&clob, raw).unwrap(),
            Value::from("big")
        );

        let varchar = ScalarMapping::of(SqlTypeCode::VarChar);
        let raw = StandardScalarCodec
            .to_raw(&varchar, Value::from("small"), LobBinding::Native)
            .unwrap();
        assert_eq!(raw, Value::from("small"));
    }

    #[test]
    fn test_inline_binding_keeps_plain_bytes() {
        let blob = ScalarMapping::of(SqlTypeCode::LongVarBinary);
        let raw = StandardScalarCodec
            .to_raw(&blob, Value::Bytes(vec![1]), LobBinding::Inline)
            .unwrap();
        assert_eq!(raw, Value::Bytes(vec![1]));
    }

    #[test]
    fn test_to_raw_rejects_wrong_type() {
        let int = ScalarMapping::of(SqlTypeCode::Integer);
        let err = StandardScalarCodec
            .to_raw(&int, Value::from("x"), LobBinding::Inline)
            .unwrap_err();
        assert!(matches!(err, CodecError::TypeMismatch(_)));
    }

    #[test]
    fn test_bool_forms() {
        let m = ScalarMapping::new(SqlTypeCode::Char, ValueType::Bool);
        for (text, expected) in [("Y", true), ("N", false), ("1", true), ("FALSE", false)] {
            assert_eq!(
                StandardScalarCodec.from_encoded(&m, text).unwrap(),
                Value::Bool(expected)
            );
        }
        assert!(StandardScalarCodec.from_encoded(&m, "maybe").is_err());
    }

    #[test]
    fn test_non_finite_float_text() {
        let m = ScalarMapping::of(SqlTypeCode::Double);
        assert_eq!(encode(&m, &Value::Float(f64::INFINITY)), "inf");
        let back = StandardScalarCodec.from_encoded(&m, "NaN").unwrap();
        assert!(matches!(back, Value::Float(f) if f.is_nan()));
    }

    #[test]
    fn test_extreme_float_text() {
        let m = ScalarMapping::of(SqlTypeCode::Double);
        assert_eq!(encode(&m, &Value::Float(f64::MAX)), "1.7976931348623157e308");
        assert_eq!(encode(&m, &Value::Float(1e-8)), "1e-8");
        assert_eq!(encode(&m, &Value::Float(-2.5e21)), "-2.5e21");
        assert_eq!(encode(&m, &Value::Float(123.25)), "123.25");
        assert_eq!(encode(&m, &Value::Float(0.0)), "0");
        for f in [f64::MAX, f64::MIN_POSITIVE, -1e300, 1e-7, 1e21] {
            let text = encode(&m, &Value::Float(f));
            assert_eq!(
                StandardScalarCodec.from_encoded(&m, &text).unwrap(),
                Value::Float(f)
            );
        }
    }

    #[test]
    fn test_decimal_scientific() {
        let m = ScalarMapping::of(SqlTypeCode::Numeric);
        assert_eq!(
            StandardScalarCodec.from_encoded(&m, "1.5e2").unwrap(),
            Value::Decimal(Decimal::new(150, 0))
        );
    }
}
