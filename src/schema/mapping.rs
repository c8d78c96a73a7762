use std::sync::Arc;

use structdoc_error::{CodecError, CodecResult};

use super::SqlTypeCode;
use crate::value::Value;

/// Type of the relational value a scalar column holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueType {
    Bool,
    Int,
    Float,
    Decimal,
    Str,
    Bytes,
    Uuid,
    Date,
    Time,
    Timestamp,
    TimestampTz,
}

impl ValueType {
    /// Natural relational type for a storage classification.
    pub fn for_code(code: SqlTypeCode) -> Self {
        use SqlTypeCode as C;
        match code {
            C::Boolean | C::Bit => Self::Bool,
            C::TinyInt | C::SmallInt | C::Integer | C::BigInt => Self::Int,
            C::Float | C::Real | C::Double => Self::Float,
            C::Numeric | C::Decimal => Self::Decimal,
            C::Binary | C::VarBinary | C::LongVarBinary | C::Blob => Self::Bytes,
            C::Uuid => Self::Uuid,
            C::Date => Self::Date,
            C::Time => Self::Time,
            C::Timestamp => Self::Timestamp,
            C::TimestampWithTimeZone => Self::TimestampTz,
            _ => Self::Str,
        }
    }

    /// Whether `value` is a legal relational value of this type.
    pub fn accepts(
        self,
        value: &Value,
    ) -> bool {
        matches!(
            (self, value),
            (_, Value::Null)
                | (Self::Bool, Value::Bool(_))
                | (Self::Int, Value::Int(_))
                | (Self::Float, Value::Float(_))
                | (Self::Decimal, Value::Decimal(_))
                | (Self::Str, Value::Str(_))
                | (Self::Bytes, Value::Bytes(_))
                | (Self::Uuid, Value::Uuid(_))
                | (Self::Date, Value::Date(_))
                | (Self::Time, Value::Time(_))
                | (Self::Timestamp, Value::Timestamp(_))
                | (Self::TimestampTz, Value::TimestampTz(_))
        )
    }
}

/// Domain ↔ relational conversion attached to a scalar attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValueConverter {
    /// Enum constant (domain `Str`) stored as its ordinal (`Int`).
    EnumOrdinal(Arc<[String]>),
    /// Boolean stored as `"Y"` / `"N"`.
    BooleanYesNo,
    /// Boolean stored as `1` / `0`.
    BooleanNumeric,
}

impl ValueConverter {
    pub fn enum_ordinal<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::EnumOrdinal(names.into_iter().map(Into::into).collect())
    }

    pub fn relational_type(&self) -> ValueType {
        match self {
            Self::EnumOrdinal(_) | Self::BooleanNumeric => ValueType::Int,
            Self::BooleanYesNo => ValueType::Str,
        }
    }

    pub fn to_relational(
        &self,
        value: &Value,
    ) -> CodecResult<Value> {
        match (self, value) {
            (_, Value::Null) => Ok(Value::Null),
            (Self::EnumOrdinal(names), Value::Str(name)) => names
                .iter()
                .position(|n| n == name)
                .map(|i| Value::Int(i as i64))
                .ok_or_else(|| CodecError::invalid_literal("enum", name.as_str(), "unknown constant")),
            (Self::BooleanYesNo, Value::Bool(b)) => {
                Ok(Value::Str(if *b { "Y" } else { "N" }.to_string()))
            }
            (Self::BooleanNumeric, Value::Bool(b)) => Ok(Value::Int(i64::from(*b))),
            (_, other) => Err(CodecError::mismatch(format!(
                "{self:?} cannot convert a {} value",
                other.kind_name()
            ))),
        }
    }

    pub fn to_domain(
        &self,
        value: &Value,
    ) -> CodecResult<Value> {
        match (self, value) {
            (_, Value::Null) => Ok(Value::Null),
            (Self::EnumOrdinal(names), Value::Int(i)) => usize::try_from(*i)
                .ok()
                .and_then(|i| names.get(i))
                .map(|n| Value::Str(n.clone()))
                .ok_or_else(|| {
                    CodecError::invalid_literal("enum", i.to_string(), "ordinal out of range")
                }),
            (Self::BooleanYesNo, Value::Str(s)) => match s.as_str() {
                "Y" | "y" => Ok(Value::Bool(true)),
                "N" | "n" => Ok(Value::Bool(false)),
                _ => Err(CodecError::invalid_literal("boolean", s.as_str(), "expected Y or N")),
            },
            (Self::BooleanNumeric, Value::Int(i)) => Ok(Value::Bool(*i != 0)),
            (_, other) => Err(CodecError::mismatch(format!(
                "{self:?} cannot restore a {} value",
                other.kind_name()
            ))),
        }
    }
}

/// Everything the codec knows about one scalar column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScalarMapping {
    pub code: SqlTypeCode,
    /// Type of the value the converter (if any) hands to storage.
    pub value_type: ValueType,
    pub converter: Option<ValueConverter>,
}

impl ScalarMapping {
    pub fn new(
        code: SqlTypeCode,
        value_type: ValueType,
    ) -> Self {
        Self {
            code,
            value_type,
            converter: None,
        }
    }

    /// Mapping with the natural relational type of `code`.
    pub fn of(code: SqlTypeCode) -> Self {
        Self::new(code, ValueType::for_code(code))
    }

    /// Attaches a converter; the relational type follows the converter.
    pub fn with_converter(
        mut self,
        converter: ValueConverter,
    ) -> Self {
        self.value_type = converter.relational_type();
        self.converter = Some(converter);
        self
    }

    pub fn to_relational(
        &self,
        domain: &Value,
    ) -> CodecResult<Value> {
        match &self.converter {
            Some(c) => c.to_relational(domain),
            None => Ok(domain.clone()),
        }
    }

    pub fn to_domain(
        &self,
        relational: Value,
    ) -> CodecResult<Value> {
        match &self.converter {
            Some(c) => c.to_domain(&relational),
            None => Ok(relational),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enum_ordinal_round_trip() {
        let m = ScalarMapping::of(SqlTypeCode::TinyInt)
            .with_converter(ValueConverter::enum_ordinal(["RED", "GREEN"]));
        let rel = m.to_relational(&Value::from("GREEN")).unwrap();
        assert_eq!(rel, Value::Int(1));
        assert_eq!(m.to_domain(rel).unwrap(), Value::from("GREEN"));
        assert!(m.to_domain(Value::Int(5)).is_err());
    }

    #[test]
    fn test_boolean_yes_no() {
        let m = ScalarMapping::of(SqlTypeCode::Char).with_converter(ValueConverter::BooleanYesNo);
        assert_eq!(m.value_type, ValueType::Str);
        assert_eq!(
            m.to_relational(&Value::Bool(false)).unwrap(),
            Value::Str("N".into())
        );
        assert_eq!(m.to_domain(Value::Str("Y".into())).unwrap(), Value::Bool(true));
    }

    #[test]
    fn test_converter_rejects_wrong_kind() {
        let err = ValueConverter::BooleanNumeric
            .to_relational(&Value::Int(1))
            .unwrap_err();
        assert!(matches!(err, CodecError::TypeMismatch(_)));
    }

    #[test]
    fn test_value_type_accepts_null() {
        assert!(ValueType::Date.accepts(&Value::Null));
        assert!(!ValueType::Date.accepts(&Value::Int(1)));
    }
}
