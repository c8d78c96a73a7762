//! Error types of the crate.
//!
//! Codec and schema failures live in `structdoc-error` and are re-exported
//! here; configuration loading adds [`ConfigError`].

use std::any::Any;

pub use structdoc_error::{
    CodecError, CodecResult, ErrorExt, LogLevel, SchemaError, StatusCode,
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

impl ErrorExt for ConfigError {
    fn status_code(&self) -> StatusCode {
        StatusCode::ConfigError
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
