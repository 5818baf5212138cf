use rune_config::{LineEnding, RuneConfig};

/// Knobs shared by every formatter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatOptions {
    /// String written once per nesting level.
    pub indent: String,
    /// Terminator written for every structural line break.
    pub line_ending: LineEnding,
    /// Render `<p>text</p>` on one line when the text is a single line.
    pub inline_single_text: bool,
}

impl Default for FormatOptions {
    fn default() -> Self {
        Self {
            indent: "  ".to_string(),
            line_ending: LineEnding::Native,
            inline_single_text: true,
        }
    }
}

impl FormatOptions {
    pub fn from_config(config: &RuneConfig) -> Self {
        Self {
            indent: config.format.indent_unit(),
            line_ending: config.format.line_ending,
            inline_single_text: config.format.inline_single_text,
        }
    }

    pub fn with_indent(mut self, indent: impl Into<String>) -> Self {
        self.indent = indent.into();
        self
    }

    pub fn with_line_ending(mut self, line_ending: LineEnding) -> Self {
        self.line_ending = line_ending;
        self
    }

    pub fn with_inline_single_text(mut self, enabled: bool) -> Self {
        self.inline_single_text = enabled;
        self
    }

    pub fn newline(&self) -> &'static str {
        self.line_ending.as_str()
    }
}
