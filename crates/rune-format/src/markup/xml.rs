use std::sync::Arc;

use ego_tree::NodeId;
use roxmltree::{NodeType, ParsingOptions};
use tracing::debug;

use crate::PayloadFormatter;
use crate::envelope::fail_open;
use crate::error::Result;
use crate::kind::FormatKind;
use crate::markup::serialize::MarkupSerializer;
use crate::markup::tree::{Flavor, MarkupDocument, MarkupElement, MarkupNode};
use crate::options::FormatOptions;
use crate::report::{FailureReporter, TracingReporter};

/// Pretty-prints XML payloads with the same layout rules as markup.
pub struct XmlFormatter {
    options: FormatOptions,
    reporter: Arc<dyn FailureReporter>,
}

impl XmlFormatter {
    pub fn new(options: FormatOptions) -> Self {
        Self::with_reporter(options, Arc::new(TracingReporter))
    }

    pub fn with_reporter(options: FormatOptions, reporter: Arc<dyn FailureReporter>) -> Self {
        Self { options, reporter }
    }

    pub fn try_format(&self, source: &str) -> Result<String> {
        let normalized = source.replace('\r', "");
        let doc = parse_xml(&normalized)?;
        debug!(nodes = doc.tree().nodes().count(), "parsed xml payload");
        Ok(MarkupSerializer::new(&self.options).serialize(&doc)?)
    }
}

impl PayloadFormatter for XmlFormatter {
    fn format(&self, source: &str) -> String {
        fail_open(self.reporter.as_ref(), FormatKind::Xml, source, |s| {
            self.try_format(s)
        })
    }
}

/// Parse well-formed XML into an XML-flavored [`MarkupDocument`].
///
/// Prefixes and `xmlns` declarations are restored from the resolved names. The
/// XML declaration and doctype, which `roxmltree` does not keep as nodes, are
/// recovered from the prolog text.
pub fn parse_xml(source: &str) -> std::result::Result<MarkupDocument, roxmltree::Error> {
    let mut options = ParsingOptions::default();
    options.allow_dtd = true;
    let parsed = roxmltree::Document::parse_with_options(source, options)?;

    let mut doc = MarkupDocument::new(Flavor::Xml);
    let root = doc.root().id();

    if let Some(data) = xml_declaration(source) {
        doc.append(
            root,
            MarkupNode::ProcessingInstruction {
                target: "xml".to_string(),
                data: data.to_string(),
            },
        );
    }

    let root_start = parsed.root_element().range().start;
    let mut pending_doctype = doctype(&source[..root_start]);

    let mut pending = Vec::new();
    for child in parsed.root().children() {
        if let Some((at, text)) = pending_doctype {
            if child.range().start > at {
                doc.append(root, MarkupNode::Doctype(text.to_string()));
                pending_doctype = None;
            }
        }
        if let Some(id) = convert(child).and_then(|value| doc.append(root, value)) {
            pending.push((child, id));
        }
    }

    while let Some((src, dst)) = pending.pop() {
        copy_children(&mut doc, src, dst, &mut pending);
    }

    Ok(doc)
}

fn copy_children<'a, 'input>(
    doc: &mut MarkupDocument,
    src: roxmltree::Node<'a, 'input>,
    dst: NodeId,
    pending: &mut Vec<(roxmltree::Node<'a, 'input>, NodeId)>,
) {
    for child in src.children() {
        if let Some(id) = convert(child).and_then(|value| doc.append(dst, value)) {
            pending.push((child, id));
        }
    }
}

fn convert(node: roxmltree::Node<'_, '_>) -> Option<MarkupNode> {
    let value = match node.node_type() {
        NodeType::Root => return None,
        NodeType::Element => MarkupNode::Element(MarkupElement {
            name: qualified(node, node.tag_name().namespace(), node.tag_name().name()),
            attrs: namespace_declarations(node)
                .into_iter()
                .chain(node.attributes().map(|attr| {
                    (
                        qualified(node, attr.namespace(), attr.name()),
                        attr.value().to_string(),
                    )
                }))
                .collect(),
        }),
        NodeType::Text => MarkupNode::Text(node.text().unwrap_or_default().to_string()),
        NodeType::Comment => MarkupNode::Comment(node.text().unwrap_or_default().to_string()),
        NodeType::PI => {
            let pi = node.pi()?;
            MarkupNode::ProcessingInstruction {
                target: pi.target.to_string(),
                data: pi.value.unwrap_or_default().to_string(),
            }
        }
    };
    Some(value)
}

fn qualified(node: roxmltree::Node<'_, '_>, namespace: Option<&str>, local: &str) -> String {
    let prefix = match namespace {
        Some(roxmltree::NS_XML_URI) => Some("xml"),
        Some(uri) => node.lookup_prefix(uri),
        None => None,
    };
    match prefix {
        Some(prefix) if !prefix.is_empty() => format!("{}:{}", prefix, local),
        _ => local.to_string(),
    }
}

/// `xmlns` attributes for the namespaces that come into scope at `node`.
fn namespace_declarations(node: roxmltree::Node<'_, '_>) -> Vec<(String, String)> {
    let inherited: Vec<(Option<&str>, &str)> = node
        .parent_element()
        .map(|parent| parent.namespaces().map(|ns| (ns.name(), ns.uri())).collect())
        .unwrap_or_default();

    node.namespaces()
        .filter(|ns| ns.name() != Some("xml"))
        .filter(|ns| !inherited.contains(&(ns.name(), ns.uri())))
        .map(|ns| {
            let key = match ns.name() {
                Some(prefix) => format!("xmlns:{}", prefix),
                None => "xmlns".to_string(),
            };
            (key, ns.uri().to_string())
        })
        .collect()
}

fn xml_declaration(source: &str) -> Option<&str> {
    let rest = source.trim_start_matches('\u{feff}').strip_prefix("<?xml")?;
    if !rest.starts_with(|c: char| c.is_ascii_whitespace()) {
        return None;
    }
    let end = rest.find("?>")?;
    Some(rest[..end].trim())
}

/// Offset and body of the `<!DOCTYPE ...>` in the prolog, internal subset included.
fn doctype(prolog: &str) -> Option<(usize, &str)> {
    let start = prolog.find("<!DOCTYPE")?;
    let body_start = start + "<!DOCTYPE".len();
    let mut depth = 0_usize;
    let mut quote = None;
    for (offset, ch) in prolog[body_start..].char_indices() {
        match (quote, ch) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') => quote = Some(ch),
            (None, '[') => depth += 1,
            (None, ']') => depth = depth.saturating_sub(1),
            (None, '>') if depth == 0 => {
                return Some((start, prolog[body_start..body_start + offset].trim()));
            }
            _ => {}
        }
    }
    None
}
