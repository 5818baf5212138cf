//! Pretty-printing for inspected payloads (HTML, CSS, JSON, XML).
//!
//! Every formatter is fail-open: when a payload cannot be formatted the input
//! is returned byte-for-byte and the failure goes to a [`FailureReporter`].

pub mod css;
pub mod diagnostics;
mod dispatch;
mod envelope;
pub mod error;
mod json;
mod kind;
pub mod markup;
mod options;
mod report;

pub use css::CssFormatter;
pub use dispatch::{Dispatcher, format};
pub use error::{FormatError, Result};
pub use json::JsonFormatter;
pub use kind::{FormatKind, UnknownKind};
pub use markup::{MarkupFormatter, XmlFormatter};
pub use options::FormatOptions;
pub use report::{FailureReporter, TracingReporter};
pub use rune_config::LineEnding;

/// A formatter for one payload kind. Never fails; see the crate docs.
pub trait PayloadFormatter: Send + Sync {
    fn format(&self, source: &str) -> String;
}
