use serde::{Deserialize, Serialize};

/// How large-object columns are bound when a value is decomposed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LobBinding {
    /// Wrap the content in [`crate::value::Lob`].
    Native,
    /// Bind plain bytes or text.
    #[default]
    Inline,
}

/// Per-call codec settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CodecOptions {
    /// Default binding for long binary and long character columns. BLOB,
    /// CLOB and NCLOB columns always bind natively.
    pub lob_binding: LobBinding,
    /// Deepest composite/array nesting a document may have.
    pub max_depth: usize,
}

impl CodecOptions {
    pub const DEFAULT_MAX_DEPTH: usize = 64;
}

impl Default for CodecOptions {
    fn default() -> Self {
        Self {
            lob_binding: LobBinding::default(),
            max_depth: Self::DEFAULT_MAX_DEPTH,
        }
    }
}
