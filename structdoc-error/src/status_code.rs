use std::fmt;

use num_enum::TryFromPrimitive;
#[cfg(feature = "serde_repr")]
use serde_repr::{Deserialize_repr, Serialize_repr};
#[cfg(feature = "strum")]
use strum_macros::{AsRefStr, EnumIter};

/// Status codes used to categorize codec errors.
///
/// # Ranges:
/// - 0xxx: Success
/// - 1xxx: General errors
/// - 2xxx: Schema (bootstrap and name resolution)
/// - 3xxx: Scalar data
/// - 4xxx: Document structure
/// - 5xxx: Configuration
///
/// `num_enum::TryFromPrimitive` provides `TryFrom<u32>`, which is handy when a
/// code has to cross a process boundary.
#[cfg_attr(feature = "strum", derive(AsRefStr, EnumIter))]
#[cfg_attr(feature = "serde_repr", derive(Serialize_repr, Deserialize_repr))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, TryFromPrimitive)]
#[repr(u32)]
#[non_exhaustive]
pub enum StatusCode {
    // === 0xxx: Success ===
    Success = 0,

    // === 1xxx: General ===
    Unknown = 1000,
    Unsupported = 1001,
    Internal = 1003,
    InvalidArgs = 1004,

    // === 2xxx: Schema ===
    UnknownAttribute = 2000,
    DuplicateSelectable = 2001,
    InvalidSchema = 2002,
    UnresolvedSubtype = 2003,

    // === 3xxx: Scalar data ===
    TypeMismatch = 3000,
    InvalidLiteral = 3001,
    UnsupportedScalarKind = 3002,

    // === 4xxx: Document ===
    MalformedDocument = 4000,
    DepthLimit = 4001,
    InvalidTagName = 4002,

    // === 5xxx: Configuration ===
    ConfigError = 5000,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

////////////////////////////////////////////////////////////////////////////////
// Own methods
////////////////////////////////////////////////////////////////////////////////

impl StatusCode {
    /// Numeric representation of the status code.
    pub const fn code(self) -> u32 {
        self as u32
    }

    /// Tries to map a `u32` back onto a `StatusCode` variant.
    pub fn from_u32(v: u32) -> Option<Self> {
        Self::try_from(v).ok()
    }

    /// Returns `true` if `code` denotes success.
    pub fn is_success(code: u32) -> bool {
        Self::Success as u32 == code
    }

    /// Error raised while building or resolving against a schema (2xxx).
    pub fn is_schema_error(&self) -> bool {
        (2000..=2999).contains(&self.code())
    }

    /// Error caused by the shape of the document itself (4xxx).
    pub fn is_document_error(&self) -> bool {
        (4000..=4999).contains(&self.code())
    }

    /// Recommended log level for the code.
    pub fn log_level(&self) -> LogLevel {
        match self {
            Self::Success => LogLevel::Trace,
            Self::UnknownAttribute
            | Self::TypeMismatch
            | Self::InvalidLiteral
            | Self::MalformedDocument
            | Self::DepthLimit => LogLevel::Debug,
            Self::InvalidArgs | Self::InvalidTagName => LogLevel::Info,
            Self::Internal | Self::Unknown => LogLevel::Error,
            _ => LogLevel::Warn,
        }
    }
}

////////////////////////////////////////////////////////////////////////////////
// Trait implementations
////////////////////////////////////////////////////////////////////////////////

impl From<StatusCode> for u32 {
    fn from(c: StatusCode) -> Self {
        c.code()
    }
}

impl fmt::Display for StatusCode {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        #[cfg(feature = "strum")]
        {
            write!(f, "{} ({})", self.as_ref(), self.code())
        }
        #[cfg(not(feature = "strum"))]
        {
            write!(f, "{:?} ({})", self, self.code())
        }
    }
}

////////////////////////////////////////////////////////////////////////////////
// Tests
////////////////////////////////////////////////////////////////////////////////
