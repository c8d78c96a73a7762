use std::{any::Any, error::Error};

use crate::StatusCode;

/// Extension for the library's error types (object-safe).
///
/// Provides helpers for:
/// - extracting the status code,
/// - a message safe to show to callers,
/// - a detailed message for logs.
pub trait ErrorExt: Error + Send + Sync + 'static {
    /// Status of the failure. Defaults to [`StatusCode::Internal`].
    fn status_code(&self) -> StatusCode {
        StatusCode::Internal
    }

    /// Returns the error as [`Any`] so it can be downcast to a concrete type.
    fn as_any(&self) -> &dyn Any;

    /// Message safe to surface outside the codec.
    ///
    /// Internal failures never leak their details.
    fn client_message(&self) -> String {
        match self.status_code() {
            StatusCode::Unknown | StatusCode::Internal => "Internal codec error".to_string(),
            _ => self.to_string(),
        }
    }

    /// Detailed message for logs. May include document fragments.
    fn log_message(&self) -> String {
        format!("{self:?}")
    }

    /// Key/value tags describing the error.
    fn metrics_tags(&self) -> Vec<(&'static str, String)> {
        vec![
            ("error_type", self.type_name()),
            ("status_code", self.status_code().to_string()),
        ]
    }

    /// Short type name of the error.
    fn type_name(&self) -> String {
        std::any::type_name::<Self>()
            .split("::")
            .last()
            .unwrap_or("Unknown")
            .to_string()
    }
}
