//! Token-level document I/O shared by the transcoders.

pub mod reader;
pub mod writer;

pub use reader::{DocumentReader, JsonDocumentReader, TokenKind};
pub use writer::{Dialect, DocumentAppender, DocumentWriter};
