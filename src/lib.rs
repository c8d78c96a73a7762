//! Schema-driven codec between composite values and the JSON or XML
//! documents that store them in a single column.
//!
//! ```
//! use structdoc::{
//!     CodecContext, Composite, JsonTranscoder, ScalarMapping, SchemaDescriptor, SqlTypeCode, Value,
//!     XmlTranscoder,
//! };
//!
//! let schema = SchemaDescriptor::builder("Point")
//!     .scalar("x", ScalarMapping::of(SqlTypeCode::Integer))
//!     .scalar("y", ScalarMapping::of(SqlTypeCode::VarChar))
//!     .build()?;
//! let value: Value = Composite::new("Point", vec![Value::Int(1), "ab".into()]).into();
//!
//! let ctx = CodecContext::default();
//! let json = JsonTranscoder::new(&ctx).serialize(&schema, &value)?;
//! assert_eq!(json, r#"{"x":1,"y":"ab"}"#);
//! let xml = XmlTranscoder::new(&ctx).serialize(&schema, &value)?;
//! assert_eq!(xml, "<e><x>1</x><y>ab</y></e>");
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

/// Composite flattening and the per-call codec context.
pub mod codec;
/// Layered settings loading.
pub mod config;
/// Token reader and escaping writer shared by the dialects.
pub mod document;
/// Error types and status codes.
pub mod error;
/// JSON and XML dialects.
pub mod format;
/// Subscriber setup for `tracing`.
pub mod logging;
/// Scalar literal and storage conversions.
pub mod scalar;
/// Composite type descriptors.
pub mod schema;
/// The value model.
pub mod value;

// -----------------------------------------------------------------------------
//  Frequently used public types
// -----------------------------------------------------------------------------

pub use codec::{CodecContext, CodecOptions, CompositeCodec, LobBinding};
pub use self::config::Settings;
pub use error::{CodecError, CodecResult, ConfigError, ErrorExt, SchemaError, StatusCode};
pub use format::{json::JsonTranscoder, xml::XmlTranscoder};
pub use logging::{init_logging, LoggingConfig};
pub use scalar::{ScalarCodec, StandardScalarCodec};
pub use schema::{
    AssociationKey, AssociationSide, ElementKind, NestedStorage, ScalarMapping, SchemaDescriptor,
    SqlTypeCode, ValueConverter, ValueType,
};
pub use value::{Composite, Lob, Reference, Value};
