use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use crate::error::{FormatError, Result};
use crate::kind::FormatKind;
use crate::report::FailureReporter;

/// Run one formatting pipeline so that it cannot fail: errors and panics are
/// reported once and the untouched `source` is returned instead.
pub(crate) fn fail_open<F>(
    reporter: &dyn FailureReporter,
    kind: FormatKind,
    source: &str,
    run: F,
) -> String
where
    F: FnOnce(&str) -> Result<String>,
{
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| run(source)))
        .unwrap_or_else(|payload| Err(FormatError::Panic(panic_message(payload.as_ref()))));

    match outcome {
        Ok(formatted) => formatted,
        Err(err) => {
            let message = format!("failed to format {} payload, returning it unchanged", kind);
            reporter.report(kind, &message, &err);
            source.to_string()
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(text) = payload.downcast_ref::<&str>() {
        text.to_string()
    } else if let Some(text) = payload.downcast_ref::<String>() {
        text.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::css::CssError;
    use crate::testing::RecordingReporter;

    #[test]
    fn success_passes_output_through() {
        let reporter = RecordingReporter::default();
        let out = fail_open(&reporter, FormatKind::Html, "<p>", |s| Ok(s.to_uppercase()));
        assert_eq!(out, "<P>");
        assert!(reporter.messages().is_empty());
    }

    #[test]
    fn error_returns_input_and_reports_once() {
        let reporter = RecordingReporter::default();
        let out = fail_open(&reporter, FormatKind::Css, "a {", |_| {
            Err(CssError::UnclosedBlock("a".into()).into())
        });
        assert_eq!(out, "a {");
        let messages = reporter.messages();
        assert_eq!(messages.len(), 1);
        assert!(messages[0].contains("invalid CSS"));
    }

    #[test]
    fn panic_is_contained() {
        let reporter = RecordingReporter::default();
        let out = fail_open(&reporter, FormatKind::Json, "{}", |_| panic!("boom"));
        assert_eq!(out, "{}");
        let messages = reporter.messages();
        assert_eq!(messages.len(), 1);
        assert!(messages[0].contains("formatter panicked: boom"));
    }
}
