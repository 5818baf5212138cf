use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use serde_json::ser::{PrettyFormatter, Serializer};

use crate::PayloadFormatter;
use crate::envelope::fail_open;
use crate::error::Result;
use crate::kind::FormatKind;
use crate::options::FormatOptions;
use crate::report::{FailureReporter, TracingReporter};

/// Re-indents JSON payloads. Key order and number spelling are kept as written.
pub struct JsonFormatter {
    options: FormatOptions,
    reporter: Arc<dyn FailureReporter>,
}

impl JsonFormatter {
    pub fn new(options: FormatOptions) -> Self {
        Self::with_reporter(options, Arc::new(TracingReporter))
    }

    pub fn with_reporter(options: FormatOptions, reporter: Arc<dyn FailureReporter>) -> Self {
        Self { options, reporter }
    }

    pub fn try_format(&self, source: &str) -> Result<String> {
        let value: Value = serde_json::from_str(source)?;

        let mut buf = Vec::new();
        let formatter = PrettyFormatter::with_indent(self.options.indent.as_bytes());
        let mut ser = Serializer::with_formatter(&mut buf, formatter);
        value.serialize(&mut ser)?;

        // String content never holds a raw line feed, so every '\n' is structural.
        Ok(String::from_utf8(buf)?.replace('\n', self.options.newline()))
    }
}

impl PayloadFormatter for JsonFormatter {
    fn format(&self, source: &str) -> String {
        fail_open(self.reporter.as_ref(), FormatKind::Json, source, |s| {
            self.try_format(s)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::RecordingReporter;
    use rune_config::LineEnding;

    fn lf() -> FormatOptions {
        FormatOptions::default().with_line_ending(LineEnding::Lf)
    }

    #[test]
    fn keeps_key_order_and_number_spelling() {
        let out = JsonFormatter::new(lf()).format(r#"{"z":1.50,"a":[1,{"b":null}],"m":{}}"#);
        assert_eq!(
            out,
            "{\n  \"z\": 1.50,\n  \"a\": [\n    1,\n    {\n      \"b\": null\n    }\n  ],\n  \"m\": {}\n}"
        );
    }

    #[test]
    fn honors_indent_and_terminator() {
        let options = FormatOptions::default()
            .with_indent("\t")
            .with_line_ending(LineEnding::Crlf);
        let out = JsonFormatter::new(options).format(r#"{"s":"a\nb"}"#);
        assert_eq!(out, "{\r\n\t\"s\": \"a\\nb\"\r\n}");
    }

    #[test]
    fn invalid_json_is_returned_unchanged() {
        let reporter = Arc::new(RecordingReporter::default());
        let formatter = JsonFormatter::with_reporter(lf(), reporter.clone());
        assert_eq!(formatter.format("{\"a\":"), "{\"a\":");
        let messages = reporter.messages();
        assert_eq!(messages.len(), 1);
        assert!(messages[0].contains("invalid JSON"));
    }
}
