use std::any::Any;

use thiserror::Error;

use crate::{ErrorExt, SchemaError, StatusCode};

/// Failure of a single serialize/deserialize/compose call.
///
/// Every variant is terminal: the call that produced it returns no partial
/// result.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CodecError {
    /// A document key or tag does not name a selectable of the current schema.
    #[error("Unknown attribute `{name}` for composite `{schema}`")]
    UnknownAttribute { schema: String, name: String },

    /// The document shape disagrees with the schema at this position.
    #[error("Type mismatch: {0}")]
    TypeMismatch(String),

    #[error("Malformed document: {0}")]
    MalformedDocument(String),

    #[error("Unsupported scalar kind nested in struct: {0}")]
    UnsupportedScalarKind(String),

    /// Polymorphic composite whose discriminator (or concrete type) has no
    /// registered subtype.
    #[error("Unresolved subtype for `{schema}`: {detail}")]
    UnresolvedSubtype { schema: String, detail: String },

    #[error("Invalid {kind} literal `{literal}`: {reason}")]
    InvalidLiteral {
        kind: String,
        literal: String,
        reason: String,
    },

    #[error("Depth limit exceeded: {current} > {max}")]
    DepthLimit { current: usize, max: usize },

    #[error("Invalid XML tag name: `{0}`")]
    InvalidTagName(String),

    #[error(transparent)]
    Schema(#[from] SchemaError),
}

impl CodecError {
    pub fn unknown_attribute(
        schema: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self::UnknownAttribute {
            schema: schema.into(),
            name: name.into(),
        }
    }

    pub fn mismatch(msg: impl Into<String>) -> Self {
        Self::TypeMismatch(msg.into())
    }

    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::MalformedDocument(msg.into())
    }

    pub fn unresolved(
        schema: impl Into<String>,
        detail: impl Into<String>,
    ) -> Self {
        Self::UnresolvedSubtype {
            schema: schema.into(),
            detail: detail.into(),
        }
    }

    pub fn invalid_literal(
        kind: impl Into<String>,
        literal: impl Into<String>,
        reason: impl ToString,
    ) -> Self {
        Self::InvalidLiteral {
            kind: kind.into(),
            literal: literal.into(),
            reason: reason.to_string(),
        }
    }
}

impl ErrorExt for CodecError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::UnknownAttribute { .. } => StatusCode::UnknownAttribute,
            Self::TypeMismatch(_) => StatusCode::TypeMismatch,
            Self::MalformedDocument(_) => StatusCode::MalformedDocument,
            Self::UnsupportedScalarKind(_) => StatusCode::UnsupportedScalarKind,
            Self::UnresolvedSubtype { .. } => StatusCode::UnresolvedSubtype,
            Self::InvalidLiteral { .. } => StatusCode::InvalidLiteral,
            Self::DepthLimit { .. } => StatusCode::DepthLimit,
            Self::InvalidTagName(_) => StatusCode::InvalidTagName,
            Self::Schema(e) => e.status_code(),
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn client_message(&self) -> String {
        match self {
            Self::MalformedDocument(_) => "Malformed structured document".to_string(),
            Self::DepthLimit { .. } => "Document too deeply nested".to_string(),
            Self::InvalidLiteral { kind, .. } => format!("Invalid {kind} literal"),
            _ => self.to_string(),
        }
    }

    fn metrics_tags(&self) -> Vec<(&'static str, String)> {
        let mut tags = vec![
            ("error_type", "codec".to_string()),
            ("status_code", self.status_code().to_string()),
        ];

        if let Self::InvalidLiteral { kind, .. } = self {
            tags.push(("scalar_kind", kind.clone()));
        }

        tags
    }
}
