use std::fmt;

/// Storage classification of a scalar column.
///
/// Decides the literal form of a value inside a document and whether the
/// raw value travels as a native large object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SqlTypeCode {
    Boolean,
    Bit,
    TinyInt,
    SmallInt,
    Integer,
    BigInt,
    Float,
    Real,
    Double,
    Numeric,
    Decimal,
    Char,
    NChar,
    VarChar,
    NVarChar,
    LongVarChar,
    LongNVarChar,
    Clob,
    NClob,
    Enum,
    Date,
    Time,
    Timestamp,
    TimestampWithTimeZone,
    Binary,
    VarBinary,
    LongVarBinary,
    Blob,
    Uuid,
    Duration,
    Interval,
    Other,
}

impl SqlTypeCode {
    /// Small integer columns; booleans encode as `1`/`0` here.
    pub fn is_small_integer(self) -> bool {
        matches!(self, Self::TinyInt | Self::SmallInt | Self::Integer)
    }

    /// Columns whose literal is the plain encoded text of the value.
    pub fn is_native_literal(self) -> bool {
        matches!(
            self,
            Self::Boolean | Self::Bit | Self::BigInt | Self::Float | Self::Real | Self::Double
        )
    }

    pub fn is_decimal(self) -> bool {
        matches!(self, Self::Numeric | Self::Decimal)
    }

    /// Short character columns; booleans encode as `Y`/`N` here.
    pub fn is_character(self) -> bool {
        matches!(
            self,
            Self::Char | Self::NChar | Self::VarChar | Self::NVarChar
        )
    }

    pub fn is_long_character(self) -> bool {
        matches!(
            self,
            Self::LongVarChar | Self::LongNVarChar | Self::Clob | Self::NClob | Self::Enum
        )
    }

    pub fn is_binary(self) -> bool {
        matches!(
            self,
            Self::Binary | Self::VarBinary | Self::LongVarBinary | Self::Blob
        )
    }

    pub fn is_temporal(self) -> bool {
        matches!(
            self,
            Self::Date | Self::Time | Self::Timestamp | Self::TimestampWithTimeZone
        )
    }

    /// Large-object kinds always bind through the native wrapper.
    pub fn is_lob(self) -> bool {
        matches!(self, Self::Blob | Self::Clob | Self::NClob)
    }

    /// Kinds with no literal form inside a document.
    pub fn is_unsupported(self) -> bool {
        matches!(self, Self::Duration | Self::Interval | Self::Other)
    }
}

impl fmt::Display for SqlTypeCode {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        write!(f, "{}", format!("{self:?}").to_uppercase())
    }
}
