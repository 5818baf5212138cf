use crate::css::types::{AtRule, BlockItem, CssRule, Declaration, StyleRule, Stylesheet};

/// Renders the stylesheet model back to text.
///
/// Two modes: [`CssPrinter::pretty`] writes one declaration per line with nested
/// blocks indented by the configured unit; [`CssPrinter::compact_declarations`]
/// writes a declaration list on one line for `style` attributes. Order is never
/// changed.
#[derive(Debug, Clone)]
pub struct CssPrinter {
    indent: String,
}

impl Default for CssPrinter {
    fn default() -> Self {
        Self::new("  ")
    }
}

impl CssPrinter {
    pub fn new(indent: impl Into<String>) -> Self {
        Self {
            indent: indent.into(),
        }
    }

    /// Multi-line rendering, lines separated by `\n`, no trailing newline.
    pub fn pretty(&self, sheet: &Stylesheet) -> String {
        let mut lines = Vec::new();
        for rule in &sheet.rules {
            self.push_rule(rule, 0, &mut lines);
        }
        lines.join("\n")
    }

    /// `property: value; property: value` with no trailing semicolon.
    pub fn compact_declarations(&self, declarations: &[Declaration]) -> String {
        declarations
            .iter()
            .map(declaration_text)
            .collect::<Vec<_>>()
            .join("; ")
    }

    fn push_rule(&self, rule: &CssRule, level: usize, lines: &mut Vec<String>) {
        match rule {
            CssRule::Style(StyleRule { selectors, body }) => {
                self.push_block(&selectors.join(", "), body, level, lines);
            }
            CssRule::At(AtRule {
                name,
                prelude,
                body,
            }) => {
                let mut head = format!("@{}", name);
                if !prelude.is_empty() {
                    head.push(' ');
                    head.push_str(prelude);
                }
                match body {
                    Some(body) => self.push_block(&head, body, level, lines),
                    None => lines.push(format!("{}{};", self.pad(level), head)),
                }
            }
        }
    }

    fn push_block(&self, head: &str, body: &[BlockItem], level: usize, lines: &mut Vec<String>) {
        let pad = self.pad(level);
        if body.is_empty() {
            lines.push(format!("{}{} {{}}", pad, head));
            return;
        }

        lines.push(format!("{}{} {{", pad, head));
        for item in body {
            match item {
                BlockItem::Declaration(decl) => {
                    lines.push(format!("{}{};", self.pad(level + 1), declaration_text(decl)));
                }
                BlockItem::Rule(rule) => self.push_rule(rule, level + 1, lines),
            }
        }
        lines.push(format!("{}}}", pad));
    }

    fn pad(&self, level: usize) -> String {
        self.indent.repeat(level)
    }
}

fn declaration_text(decl: &Declaration) -> String {
    let mut out = format!("{}:", decl.property);
    if !decl.value.is_empty() {
        out.push(' ');
        out.push_str(&decl.value);
    }
    if decl.important {
        out.push_str(" !important");
    }
    out
}
