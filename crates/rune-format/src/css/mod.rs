//! CSS parsing and pretty-printing.

mod parser;
mod printer;
mod types;

use std::sync::Arc;

pub use parser::{CssError, parse_declarations, parse_stylesheet};
pub use printer::CssPrinter;
pub use types::{AtRule, BlockItem, CssRule, Declaration, StyleRule, Stylesheet};

use crate::envelope::fail_open;
use crate::error::Result;
use crate::kind::FormatKind;
use crate::options::FormatOptions;
use crate::report::{FailureReporter, TracingReporter};
use crate::PayloadFormatter;

/// Formats a plain stylesheet payload (`text/css`).
pub struct CssFormatter {
    options: FormatOptions,
    reporter: Arc<dyn FailureReporter>,
}

impl CssFormatter {
    pub fn new(options: FormatOptions) -> Self {
        Self::with_reporter(options, Arc::new(TracingReporter))
    }

    pub fn with_reporter(options: FormatOptions, reporter: Arc<dyn FailureReporter>) -> Self {
        Self { options, reporter }
    }

    pub fn try_format(&self, source: &str) -> Result<String> {
        let normalized = source.replace('\r', "");
        let sheet = parse_stylesheet(&normalized)?;
        let printed = CssPrinter::new(self.options.indent.clone()).pretty(&sheet);
        Ok(printed.replace('\n', self.options.newline()))
    }
}

impl PayloadFormatter for CssFormatter {
    fn format(&self, source: &str) -> String {
        fail_open(self.reporter.as_ref(), FormatKind::Css, source, |s| {
            self.try_format(s)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::RecordingReporter;
    use rune_config::LineEnding;

    #[test]
    fn formats_stylesheet_payload() {
        let formatter = CssFormatter::new(
            FormatOptions::default().with_line_ending(LineEnding::Crlf),
        );
        let out = formatter.format("a{color:red}\r\nb{margin:0 auto}");
        assert_eq!(
            out,
            "a {\r\n  color: red;\r\n}\r\nb {\r\n  margin: 0 auto;\r\n}"
        );
    }

    #[test]
    fn malformed_stylesheet_is_returned_unchanged() {
        let reporter = Arc::new(RecordingReporter::default());
        let formatter = CssFormatter::with_reporter(FormatOptions::default(), reporter.clone());
        let source = "a { color: red;";
        assert_eq!(formatter.format(source), source);
        assert_eq!(reporter.messages().len(), 1);
    }
}
