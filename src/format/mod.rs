//! The two document dialects.
//!
//! Both dialects pick a scalar's literal form from the column's storage
//! classification, grouped here into [`LiteralFamily`].

pub mod json;
pub mod xml;

use structdoc_error::{CodecError, CodecResult};

use crate::schema::SqlTypeCode;

/// Literal encoding family of a storage classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LiteralFamily {
    /// Small integers; booleans as `1`/`0`.
    Integer,
    /// Booleans, big integers and floating point.
    Native,
    Decimal,
    Uuid,
    /// Short character columns; booleans as `Y`/`N`.
    Character,
    /// Long character, CLOB/NCLOB and enum columns.
    Text,
    Temporal,
    Binary,
}

impl LiteralFamily {
    pub fn of(code: SqlTypeCode) -> CodecResult<Self> {
        let family = if code.is_small_integer() {
            Self::Integer
        } else if code.is_native_literal() {
            Self::Native
        } else if code.is_decimal() {
            Self::Decimal
        } else if code == SqlTypeCode::Uuid {
            Self::Uuid
        } else if code.is_character() {
            Self::Character
        } else if code.is_long_character() {
            Self::Text
        } else if code.is_temporal() {
            Self::Temporal
        } else if code.is_binary() {
            Self::Binary
        } else {
            return Err(CodecError::UnsupportedScalarKind(code.to_string()));
        };
        Ok(family)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_families() {
        assert_eq!(LiteralFamily::of(SqlTypeCode::SmallInt).unwrap(), LiteralFamily::Integer);
        assert_eq!(LiteralFamily::of(SqlTypeCode::Bit).unwrap(), LiteralFamily::Native);
        assert_eq!(LiteralFamily::of(SqlTypeCode::Enum).unwrap(), LiteralFamily::Text);
        assert_eq!(LiteralFamily::of(SqlTypeCode::Blob).unwrap(), LiteralFamily::Binary);
        assert_eq!(
            LiteralFamily::of(SqlTypeCode::Interval).unwrap_err(),
            CodecError::UnsupportedScalarKind("INTERVAL".into())
        );
    }
}
