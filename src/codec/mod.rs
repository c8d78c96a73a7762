//! Schema-driven flattening of composite values and the per-call context
//! shared by both document dialects.

pub mod array;
pub mod composite;
pub mod options;

use std::{fmt, sync::Arc};

pub use array::GrowableArray;
pub use composite::CompositeCodec;
pub use options::{CodecOptions, LobBinding};

use crate::scalar::{ScalarCodec, StandardScalarCodec};

/// Everything an encode or decode call needs besides the schema.
///
/// Cheap to clone; the scalar codec is shared.
#[derive(Clone)]
pub struct CodecContext {
    scalars: Arc<dyn ScalarCodec>,
    options: CodecOptions,
}

impl CodecContext {
    pub fn new(options: CodecOptions) -> Self {
        Self {
            scalars: Arc::new(StandardScalarCodec),
            options,
        }
    }

    /// Replaces the scalar codec, e.g. with one that understands
    /// vendor-specific column types.
    pub fn with_scalar_codec(
        mut self,
        scalars: Arc<dyn ScalarCodec>,
    ) -> Self {
        self.scalars = scalars;
        self
    }

    pub fn scalars(&self) -> &dyn ScalarCodec {
        self.scalars.as_ref()
    }

    pub fn options(&self) -> &CodecOptions {
        &self.options
    }

    pub fn composite(&self) -> CompositeCodec<'_> {
        CompositeCodec::new(self)
    }
}

impl Default for CodecContext {
    fn default() -> Self {
        Self::new(CodecOptions::default())
    }
}

impl fmt::Debug for CodecContext {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.debug_struct("CodecContext")
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}
