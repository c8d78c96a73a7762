use std::any::Any;

use thiserror::Error;

use crate::{ErrorExt, StatusCode};

/// Bootstrap failure while building a schema descriptor.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SchemaError {
    #[error("Duplicate selectable name: {0}")]
    DuplicateSelectable(String),

    #[error("Duplicate discriminator value `{value}` in `{schema}`")]
    DuplicateDiscriminator { schema: String, value: String },

    /// A polymorphic composite cannot serve as an association key.
    #[error("Polymorphic composite `{0}` cannot be used as a key")]
    PolymorphicKey(String),

    #[error("Invalid schema: {0}")]
    Invalid(String),
}

impl ErrorExt for SchemaError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::DuplicateSelectable(_) => StatusCode::DuplicateSelectable,
            Self::DuplicateDiscriminator { .. } | Self::PolymorphicKey(_) | Self::Invalid(_) => {
                StatusCode::InvalidSchema
            }
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_error_codes() {
        assert_eq!(
            SchemaError::PolymorphicKey("Shape".into()).status_code(),
            StatusCode::InvalidSchema
        );
        assert!(SchemaError::Invalid("x".into())
            .status_code()
            .is_schema_error());
    }
}
