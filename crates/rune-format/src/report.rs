use tracing::warn;

use crate::error::FormatError;
use crate::kind::FormatKind;

/// Sink for formatting failures. Invoked once per failed call with the error
/// that made the formatter fall back to the unformatted input.
pub trait FailureReporter: Send + Sync {
    fn report(&self, kind: FormatKind, message: &str, error: &FormatError);
}

/// Default sink: a `tracing` warning carrying the error as a structured field.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingReporter;

impl FailureReporter for TracingReporter {
    fn report(&self, kind: FormatKind, message: &str, error: &FormatError) {
        warn!(kind = %kind, error = %error, "{}", message);
    }
}
