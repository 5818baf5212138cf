use ego_tree::{NodeId, NodeRef};
use scraper::{Html, Node};

use crate::markup::tree::{Flavor, MarkupDocument, MarkupElement, MarkupNode};

/// Elements whose text children the HTML parser keeps raw (never
/// entity-decoded, never escaped on output).
pub(crate) const RAW_TEXT_ELEMENTS: &[&str] = &[
    "style", "script", "xmp", "iframe", "noembed", "noframes", "plaintext", "noscript",
];

/// Parse HTML leniently. Whole documents go through the document parser; anything
/// else is parsed as a body fragment so no `html`/`head`/`body` wrapper appears.
pub fn parse_html(source: &str) -> MarkupDocument {
    let mut doc = MarkupDocument::new(Flavor::Html);
    let root = doc.root().id();

    if looks_like_document(source) {
        let html = Html::parse_document(source);
        copy_children(&mut doc, root, html.tree.root());
    } else {
        let html = Html::parse_fragment(source);
        // Fragment content sits under a synthetic <html> context element.
        if let Some(context) = html.tree.root().children().find(|n| n.value().is_element()) {
            copy_children(&mut doc, root, context);
        }
    }

    doc
}

const DOCUMENT_MARKERS: &[&[u8]] = &[b"<html", b"<head", b"<body"];

/// A document starts with a doctype or an `html`/`head`/`body` tag once leading
/// whitespace and comments are skipped. Markers further in (script text,
/// attribute values, comments) do not count.
fn looks_like_document(source: &str) -> bool {
    let bytes = source.trim_start_matches('\u{feff}').as_bytes();
    let mut idx = 0;
    loop {
        while bytes.get(idx).is_some_and(|b| b.is_ascii_whitespace()) {
            idx += 1;
        }
        let rest = &bytes[idx..];
        if rest.starts_with(b"<!--") {
            match find_ignore_ascii_case(bytes, b"-->", idx + 4) {
                Some(end) => {
                    idx = end + 3;
                    continue;
                }
                None => return false,
            }
        }
        if starts_with_ignore_ascii_case(rest, b"<!doctype") {
            return true;
        }
        return DOCUMENT_MARKERS.iter().any(|marker| {
            starts_with_ignore_ascii_case(rest, marker)
                && tag_name_boundary(bytes, idx + marker.len())
        });
    }
}

fn starts_with_ignore_ascii_case(bytes: &[u8], prefix: &[u8]) -> bool {
    bytes
        .get(..prefix.len())
        .is_some_and(|head| head.eq_ignore_ascii_case(prefix))
}

// Copies with an explicit work list so deeply nested input cannot exhaust the stack.
fn copy_children(doc: &mut MarkupDocument, dst: NodeId, src: NodeRef<'_, Node>) {
    let mut pending = vec![(src, dst)];
    while let Some((src, dst)) = pending.pop() {
        let raw_parent = src
            .value()
            .as_element()
            .is_some_and(|el| RAW_TEXT_ELEMENTS.contains(&el.name()));

        for child in src.children() {
            let Some(value) = convert(child.value(), raw_parent) else {
                continue;
            };
            if let Some(id) = doc.append(dst, value) {
                pending.push((child, id));
            }
        }
    }
}

fn convert(node: &Node, raw_parent: bool) -> Option<MarkupNode> {
    let converted = match node {
        Node::Element(el) => MarkupNode::Element(MarkupElement {
            name: el.name().to_string(),
            attrs: el
                .attrs
                .iter()
                .map(|(name, value)| {
                    let key = match &name.prefix {
                        Some(prefix) => format!("{}:{}", prefix, &*name.local),
                        None => name.local.to_string(),
                    };
                    (key, value.to_string())
                })
                .collect(),
        }),
        Node::Text(text) if raw_parent => MarkupNode::Data(text.to_string()),
        Node::Text(text) => MarkupNode::Text(text.to_string()),
        Node::Comment(comment) => MarkupNode::Comment(comment.to_string()),
        Node::Doctype(doctype) => MarkupNode::Doctype(doctype_text(
            doctype.name(),
            doctype.public_id(),
            doctype.system_id(),
        )),
        Node::ProcessingInstruction(pi) => MarkupNode::ProcessingInstruction {
            target: pi.target.to_string(),
            data: pi.data.to_string(),
        },
        Node::Document | Node::Fragment => return None,
    };
    Some(converted)
}

fn doctype_text(name: &str, public_id: &str, system_id: &str) -> String {
    let mut out = name.to_string();
    if !public_id.is_empty() {
        out.push_str(&format!(" PUBLIC \"{}\"", public_id));
        if !system_id.is_empty() {
            out.push_str(&format!(" \"{}\"", system_id));
        }
    } else if !system_id.is_empty() {
        out.push_str(&format!(" SYSTEM \"{}\"", system_id));
    }
    out
}

fn find_ignore_ascii_case(bytes: &[u8], needle: &[u8], from: usize) -> Option<usize> {
    if from >= bytes.len() || needle.len() > bytes.len() - from {
        return None;
    }
    bytes[from..]
        .windows(needle.len())
        .position(|window| window.eq_ignore_ascii_case(needle))
        .map(|offset| from + offset)
}

fn tag_name_boundary(bytes: &[u8], idx: usize) -> bool {
    match bytes.get(idx).copied() {
        None => true,
        Some(byte) => byte.is_ascii_whitespace() || byte == b'>' || byte == b'/',
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn element_names(doc: &MarkupDocument) -> Vec<String> {
        doc.root()
            .descendants()
            .filter_map(|n| n.value().as_element().map(|el| el.name.clone()))
            .collect()
    }

    #[test]
    fn fragments_are_not_wrapped() {
        let doc = parse_html("<div><p>x</p></div>");
        assert_eq!(element_names(&doc), vec!["div", "p"]);
    }

    #[test]
    fn documents_get_full_structure() {
        let doc = parse_html("<!DOCTYPE html><title>t</title><p>x</p>");
        let names = element_names(&doc);
        assert_eq!(names, vec!["html", "head", "title", "body", "p"]);
        let first = doc.root().first_child().unwrap();
        assert_eq!(first.value(), &MarkupNode::Doctype("html".into()));
    }

    #[test]
    fn header_tag_does_not_look_like_a_document() {
        assert!(!looks_like_document("<header>x</header>"));
        assert!(looks_like_document("<HTML lang=en>"));
        assert!(looks_like_document("<body>"));
        assert!(looks_like_document("\n  <!-- lead --> <!doctype html><p>x"));
        assert!(!looks_like_document("<!-- open <html>"));
    }

    #[test]
    fn markers_past_the_first_tag_stay_fragments() {
        for source in [
            r#"<div><script>var s = "<html>";</script></div>"#,
            r#"<p title="<body>">x</p>"#,
            "<div><!-- <head> --><p>x</p></div>",
        ] {
            let doc = parse_html(source);
            let names = element_names(&doc);
            assert!(
                !names.iter().any(|n| n == "html" || n == "head" || n == "body"),
                "{:?} gained a wrapper: {:?}",
                source,
                names
            );
        }
    }

    #[test]
    fn raw_text_children_become_data() {
        let doc = parse_html("<style>a > b { }</style><p>a &amp; b</p>");
        let texts: Vec<_> = doc
            .root()
            .descendants()
            .filter(|n| n.value().text().is_some())
            .map(|n| n.value().clone())
            .collect();
        assert_eq!(
            texts,
            vec![
                MarkupNode::Data("a > b { }".into()),
                MarkupNode::Text("a & b".into()),
            ]
        );
    }

    #[test]
    fn attributes_keep_source_order() {
        let doc = parse_html("<a id=x href=y class=z>t</a>");
        let a = doc
            .root()
            .descendants()
            .find_map(|n| n.value().as_element().cloned())
            .unwrap();
        let keys: Vec<_> = a.attrs.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["id", "href", "class"]);
    }
}
