//! Per-scalar encode/decode primitives.
//!
//! A [`ScalarCodec`] moves one atomic value between its relational form,
//! its raw storage form and its literal text inside a document. The
//! transcoders never interpret scalar text themselves.

pub mod encoded;
pub mod standard;

pub use standard::StandardScalarCodec;
use structdoc_error::CodecResult;

use crate::{codec::LobBinding, document::DocumentWriter, schema::ScalarMapping, value::Value};

pub trait ScalarCodec: Send + Sync {
    /// Relational value to the raw value bound to storage.
    fn to_raw(
        &self,
        mapping: &ScalarMapping,
        relational: Value,
        binding: LobBinding,
    ) -> CodecResult<Value>;

    /// Raw storage value back to its relational form.
    fn from_raw(
        &self,
        mapping: &ScalarMapping,
        raw: Value,
    ) -> CodecResult<Value>;

    /// Appends the encoded text of a non-null relational value.
    ///
    /// Escaping is controlled by the caller through the writer.
    fn append_encoded(
        &self,
        mapping: &ScalarMapping,
        value: &Value,
        out: &mut dyn DocumentWriter,
    ) -> CodecResult<()>;

    /// Parses encoded text into a relational value of `mapping.value_type`.
    fn from_encoded(
        &self,
        mapping: &ScalarMapping,
        text: &str,
    ) -> CodecResult<Value>;
}
