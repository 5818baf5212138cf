//! Error types for the formatting pipeline.

use thiserror::Error;

use crate::css::CssError;

/// Result type for fallible pipeline stages.
pub type Result<T> = std::result::Result<T, FormatError>;

/// Anything that can go wrong inside a formatter. Callers of
/// [`PayloadFormatter::format`](crate::PayloadFormatter::format) never see
/// these: the fail-open envelope reports them and returns the input.
#[derive(Error, Debug)]
pub enum FormatError {
    /// Malformed stylesheet or declaration block.
    #[error("invalid CSS: {0}")]
    Css(#[from] CssError),

    /// Malformed JSON payload.
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Malformed XML payload.
    #[error("invalid XML: {0}")]
    Xml(#[from] roxmltree::Error),

    /// Writing the formatted text failed.
    #[error("serialization failed: {0}")]
    Serialize(#[from] std::fmt::Error),

    /// A serializer produced bytes that are not UTF-8.
    #[error("formatted output is not UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    /// A formatter panicked.
    #[error("formatter panicked: {0}")]
    Panic(String),
}
