use std::fmt::{self, Write};

use ego_tree::NodeRef;
use ego_tree::iter::Edge;

use crate::markup::tree::{Flavor, MarkupDocument, MarkupElement, MarkupNode, node_depth};
use crate::options::FormatOptions;

/// HTML elements that never have a closing tag.
pub(crate) const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source",
    "track", "wbr", "param", "keygen", "basefont", "bgsound", "frame",
];

/// HTML elements whose content is written exactly as parsed.
const PREFORMATTED_ELEMENTS: &[&str] = &[
    "pre", "textarea", "listing", "script", "xmp", "plaintext", "iframe", "noembed",
    "noframes", "noscript",
];

// html5ever drops one newline right after these start tags.
const LEADING_NEWLINE_ELEMENTS: &[&str] = &["pre", "textarea", "listing"];

const HTML_WHITESPACE: &[char] = &[' ', '\t', '\n', '\x0C', '\r'];

enum Layout<'a> {
    Void,
    SelfClosing,
    Verbatim,
    StyleLiteral,
    Empty,
    SingleLine(&'a str),
    Block,
}

/// Writes a [`MarkupDocument`] with every structural node on its own line,
/// indented by its depth below the document root.
#[derive(Debug, Clone)]
pub struct MarkupSerializer {
    indent: String,
    newline: &'static str,
    inline_single_text: bool,
}

impl MarkupSerializer {
    pub fn new(options: &FormatOptions) -> Self {
        Self {
            indent: options.indent.clone(),
            newline: options.newline(),
            inline_single_text: options.inline_single_text,
        }
    }

    pub fn serialize(&self, doc: &MarkupDocument) -> Result<String, fmt::Error> {
        let flavor = doc.flavor();
        let mut out = String::new();
        // Subtree already written in full by its Open edge.
        let mut skip_until = None;

        for edge in doc.root().traverse() {
            match edge {
                Edge::Open(node) => {
                    if skip_until.is_some() {
                        continue;
                    }
                    if self.open(&mut out, flavor, node)? {
                        skip_until = Some(node.id());
                    }
                }
                Edge::Close(node) => {
                    if let Some(id) = skip_until {
                        if id == node.id() {
                            skip_until = None;
                        }
                        continue;
                    }
                    if let MarkupNode::Element(el) = node.value() {
                        self.start_line(&mut out, node_depth(node));
                        write_close_tag(&mut out, el)?;
                    }
                }
            }
        }

        Ok(out)
    }

    /// Returns true when the node's whole subtree has been written.
    fn open(
        &self,
        out: &mut String,
        flavor: Flavor,
        node: NodeRef<'_, MarkupNode>,
    ) -> Result<bool, fmt::Error> {
        let depth = node_depth(node);
        match node.value() {
            MarkupNode::Document => return Ok(false),
            MarkupNode::Element(el) => return self.open_element(out, flavor, node, el),
            MarkupNode::Doctype(doctype) => {
                self.start_line(out, depth);
                write!(out, "<!DOCTYPE {}>", doctype)?;
            }
            MarkupNode::Comment(comment) => {
                self.start_line(out, depth);
                write!(out, "<!--{}-->", comment)?;
            }
            MarkupNode::ProcessingInstruction { target, data } => {
                self.start_line(out, depth);
                write_processing_instruction(out, flavor, target, data)?;
            }
            MarkupNode::Text(text) => {
                for segment in segments(text) {
                    self.start_line(out, depth);
                    escape_text(out, flavor, segment);
                }
            }
            MarkupNode::Data(text) | MarkupNode::Css(text) => {
                for segment in segments(text) {
                    self.start_line(out, depth);
                    out.push_str(segment);
                }
            }
        }
        Ok(true)
    }

    fn open_element(
        &self,
        out: &mut String,
        flavor: Flavor,
        node: NodeRef<'_, MarkupNode>,
        el: &MarkupElement,
    ) -> Result<bool, fmt::Error> {
        let depth = node_depth(node);
        self.start_line(out, depth);

        match self.layout(flavor, node, el) {
            Layout::Void => write_open_tag(out, flavor, el, false)?,
            Layout::SelfClosing => write_open_tag(out, flavor, el, true)?,
            Layout::Verbatim => {
                write_open_tag(out, flavor, el, false)?;
                let leading_newline = flavor == Flavor::Html
                    && LEADING_NEWLINE_ELEMENTS.contains(&el.name.as_str())
                    && node
                        .first_child()
                        .and_then(|child| child.value().text())
                        .is_some_and(|text| text.starts_with('\n'));
                if leading_newline {
                    out.push('\n');
                }
                for child in node.children() {
                    write_inline(out, flavor, child)?;
                }
                write_close_tag(out, el)?;
            }
            Layout::StyleLiteral => {
                write_open_tag(out, flavor, el, false)?;
                let literal: String = node
                    .children()
                    .filter_map(|child| child.value().text())
                    .collect::<String>()
                    .replace('\r', "");
                let literal = literal.trim_end();
                if !literal.is_empty() {
                    out.push_str(&literal.replace('\n', self.newline));
                    self.start_line(out, depth);
                }
                write_close_tag(out, el)?;
            }
            Layout::Empty => {
                write_open_tag(out, flavor, el, false)?;
                write_close_tag(out, el)?;
            }
            Layout::SingleLine(text) => {
                write_open_tag(out, flavor, el, false)?;
                escape_text(out, flavor, text);
                write_close_tag(out, el)?;
            }
            Layout::Block => {
                write_open_tag(out, flavor, el, false)?;
                return Ok(false);
            }
        }
        Ok(true)
    }

    fn layout<'a>(
        &self,
        flavor: Flavor,
        node: NodeRef<'a, MarkupNode>,
        el: &MarkupElement,
    ) -> Layout<'a> {
        let html = flavor == Flavor::Html;
        if html && VOID_ELEMENTS.contains(&el.name.as_str()) {
            return Layout::Void;
        }
        if is_preformatted(flavor, el) {
            return Layout::Verbatim;
        }
        if html && el.name.eq_ignore_ascii_case("style") {
            return Layout::StyleLiteral;
        }

        let mut significant = node.children().filter(|child| !is_blank(child.value()));
        let Some(first) = significant.next() else {
            return if html { Layout::Empty } else { Layout::SelfClosing };
        };
        if self.inline_single_text && significant.next().is_none() {
            if let MarkupNode::Text(text) = first.value() {
                let mut parts = segments(text);
                if let (Some(only), None) = (parts.next(), parts.next()) {
                    return Layout::SingleLine(only);
                }
            }
        }
        Layout::Block
    }

    fn start_line(&self, out: &mut String, depth: usize) {
        if !out.is_empty() {
            out.push_str(self.newline);
        }
        for _ in 0..depth {
            out.push_str(&self.indent);
        }
    }
}

fn is_preformatted(flavor: Flavor, el: &MarkupElement) -> bool {
    match flavor {
        Flavor::Html => PREFORMATTED_ELEMENTS.contains(&el.name.as_str()),
        Flavor::Xml => el.attr("xml:space") == Some("preserve"),
    }
}

/// Whitespace-only character data. In indented contexts these nodes are not
/// written: the generated line breaks and indentation take their place.
fn is_blank(node: &MarkupNode) -> bool {
    match node {
        MarkupNode::Text(text) | MarkupNode::Data(text) => {
            text.trim_matches(HTML_WHITESPACE).is_empty()
        }
        _ => false,
    }
}

/// Non-empty, whitespace-trimmed lines of a text node.
fn segments(text: &str) -> impl Iterator<Item = &str> {
    text.split('\n')
        .map(|line| line.trim_matches(HTML_WHITESPACE))
        .filter(|line| !line.is_empty())
}

/// Writes a subtree exactly as parsed, with no added whitespace.
fn write_inline(
    out: &mut String,
    flavor: Flavor,
    node: NodeRef<'_, MarkupNode>,
) -> Result<(), fmt::Error> {
    for edge in node.traverse() {
        match edge {
            Edge::Open(node) => match node.value() {
                MarkupNode::Element(el) => {
                    let self_close = flavor == Flavor::Xml && !node.has_children();
                    write_open_tag(out, flavor, el, self_close)?;
                }
                MarkupNode::Text(text) => escape_text(out, flavor, text),
                MarkupNode::Data(text) | MarkupNode::Css(text) => out.push_str(text),
                MarkupNode::Comment(comment) => write!(out, "<!--{}-->", comment)?,
                MarkupNode::ProcessingInstruction { target, data } => {
                    write_processing_instruction(out, flavor, target, data)?
                }
                MarkupNode::Doctype(doctype) => write!(out, "<!DOCTYPE {}>", doctype)?,
                MarkupNode::Document => {}
            },
            Edge::Close(node) => {
                let MarkupNode::Element(el) = node.value() else {
                    continue;
                };
                let no_close = match flavor {
                    Flavor::Html => VOID_ELEMENTS.contains(&el.name.as_str()),
                    Flavor::Xml => !node.has_children(),
                };
                if !no_close {
                    write_close_tag(out, el)?;
                }
            }
        }
    }
    Ok(())
}

fn write_open_tag(
    out: &mut String,
    flavor: Flavor,
    el: &MarkupElement,
    self_close: bool,
) -> fmt::Result {
    write!(out, "<{}", el.name)?;
    for (name, value) in &el.attrs {
        if flavor == Flavor::Html && value.is_empty() {
            write!(out, " {}", name)?;
            continue;
        }
        write!(out, " {}=\"", name)?;
        escape_attr(out, flavor, value);
        out.push('"');
    }
    out.push_str(if self_close { "/>" } else { ">" });
    Ok(())
}

fn write_close_tag(out: &mut String, el: &MarkupElement) -> fmt::Result {
    write!(out, "</{}>", el.name)
}

fn write_processing_instruction(
    out: &mut String,
    flavor: Flavor,
    target: &str,
    data: &str,
) -> fmt::Result {
    write!(out, "<?{}", target)?;
    if !data.is_empty() {
        write!(out, " {}", data)?;
    }
    out.push_str(match flavor {
        Flavor::Html => ">",
        Flavor::Xml => "?>",
    });
    Ok(())
}

fn escape_text(out: &mut String, flavor: Flavor, text: &str) {
    for ch in text.chars() {
        match (ch, flavor) {
            ('&', _) => out.push_str("&amp;"),
            ('<', _) => out.push_str("&lt;"),
            ('>', _) => out.push_str("&gt;"),
            ('\u{a0}', Flavor::Html) => out.push_str("&nbsp;"),
            _ => out.push(ch),
        }
    }
}

fn escape_attr(out: &mut String, flavor: Flavor, value: &str) {
    for ch in value.chars() {
        match (ch, flavor) {
            ('&', _) => out.push_str("&amp;"),
            ('"', _) => out.push_str("&quot;"),
            ('\u{a0}', Flavor::Html) => out.push_str("&nbsp;"),
            ('<', Flavor::Xml) => out.push_str("&lt;"),
            ('\n', Flavor::Xml) => out.push_str("&#10;"),
            ('\t', Flavor::Xml) => out.push_str("&#9;"),
            ('\r', Flavor::Xml) => out.push_str("&#13;"),
            _ => out.push(ch),
        }
    }
}
