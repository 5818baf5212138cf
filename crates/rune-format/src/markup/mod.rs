//! HTML parsing, style re-indentation and depth-aware serialization.

mod parse;
mod passes;
mod serialize;
mod tree;
mod xml;

use std::sync::Arc;

use tracing::{debug, info};

pub use parse::parse_html;
pub use passes::{normalize_inline_styles, reindent_style_blocks};
pub use serialize::MarkupSerializer;
pub use tree::{Flavor, MarkupDocument, MarkupElement, MarkupNode};
pub use xml::{XmlFormatter, parse_xml};

use crate::PayloadFormatter;
use crate::css::CssPrinter;
use crate::diagnostics::diagnostics_enabled;
use crate::envelope::fail_open;
use crate::error::Result;
use crate::kind::FormatKind;
use crate::options::FormatOptions;
use crate::report::{FailureReporter, TracingReporter};

/// Pretty-prints HTML payloads: every element on its own line indented by
/// depth, `<style>` blocks re-indented to match, inline styles compacted.
pub struct MarkupFormatter {
    options: FormatOptions,
    reporter: Arc<dyn FailureReporter>,
}

impl MarkupFormatter {
    pub fn new(options: FormatOptions) -> Self {
        Self::with_reporter(options, Arc::new(TracingReporter))
    }

    pub fn with_reporter(options: FormatOptions, reporter: Arc<dyn FailureReporter>) -> Self {
        Self { options, reporter }
    }

    pub fn options(&self) -> &FormatOptions {
        &self.options
    }

    /// The pipeline without the fail-open envelope.
    pub fn try_format(&self, source: &str) -> Result<String> {
        let normalized = source.replace('\r', "");
        let mut doc = parse_html(&normalized);

        let printer = CssPrinter::new(self.options.indent.clone());
        let blocks = reindent_style_blocks(&mut doc, &printer, &self.options.indent)?;
        let inline = normalize_inline_styles(&mut doc, &printer)?;
        debug!(
            input_len = source.len(),
            style_blocks = blocks,
            inline_styles = inline,
            "markup passes complete"
        );
        if diagnostics_enabled("format") {
            info!(
                style_blocks = blocks,
                inline_styles = inline,
                nodes = doc.tree().nodes().count(),
                "[format] markup document"
            );
        }

        Ok(MarkupSerializer::new(&self.options).serialize(&doc)?)
    }
}

impl PayloadFormatter for MarkupFormatter {
    fn format(&self, source: &str) -> String {
        fail_open(self.reporter.as_ref(), FormatKind::Html, source, |s| {
            self.try_format(s)
        })
    }
}
