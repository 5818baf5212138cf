use tracing::debug;

use crate::css::{CssError, CssPrinter, parse_declarations, parse_stylesheet};
use crate::markup::tree::{MarkupDocument, MarkupNode};

/// Re-render every `<style>` element's stylesheet so that its lines sit one
/// indentation level below the tag, wherever the tag is in the tree.
///
/// Returns the number of style elements rewritten.
pub fn reindent_style_blocks(
    doc: &mut MarkupDocument,
    printer: &CssPrinter,
    indent: &str,
) -> Result<usize, CssError> {
    let targets = doc.elements_where(|el| el.name.eq_ignore_ascii_case("style"));

    for &id in &targets {
        let padding = indent.repeat(doc.depth(id) + 1);
        let sheet = parse_stylesheet(&doc.child_text(id))?;
        let rendered = printer.pretty(&sheet);

        let block = if rendered.is_empty() {
            String::new()
        } else {
            let padded = rendered
                .lines()
                .map(|line| {
                    if line.is_empty() {
                        String::new()
                    } else {
                        format!("{}{}", padding, line)
                    }
                })
                .collect::<Vec<_>>()
                .join("\n");
            format!("\n{}\n", padded)
        };
        doc.replace_children(id, MarkupNode::Css(block));
    }

    debug!(count = targets.len(), "reindented style blocks");
    Ok(targets.len())
}

/// Rewrite every `style` attribute as a compact, single-line declaration list.
///
/// Returns the number of attributes rewritten.
pub fn normalize_inline_styles(
    doc: &mut MarkupDocument,
    printer: &CssPrinter,
) -> Result<usize, CssError> {
    let targets = doc.elements_where(|el| el.attr("style").is_some());

    for &id in &targets {
        let Some(raw) = doc
            .tree()
            .get(id)
            .and_then(|node| node.value().as_element())
            .and_then(|el| el.attr("style"))
            .map(str::to_owned)
        else {
            continue;
        };
        let declarations = parse_declarations(&raw)?;
        doc.set_attr(id, "style", printer.compact_declarations(&declarations));
    }

    debug!(count = targets.len(), "normalized inline styles");
    Ok(targets.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markup::parse::parse_html;

    #[test]
    fn style_block_is_padded_one_level_below_its_depth() {
        let mut doc = parse_html("<div><div><style>a{color:red}</style></div></div>");
        let count = reindent_style_blocks(&mut doc, &CssPrinter::new("  "), "  ").unwrap();
        assert_eq!(count, 1);

        let style = doc.elements_where(|el| el.name == "style")[0];
        assert_eq!(doc.depth(style), 2);
        assert_eq!(
            doc.child_text(style),
            "\n      a {\n        color: red;\n      }\n"
        );
    }

    #[test]
    fn empty_style_block_becomes_empty_literal() {
        let mut doc = parse_html("<style> /* nothing */ </style>");
        reindent_style_blocks(&mut doc, &CssPrinter::default(), "  ").unwrap();
        let style = doc.elements_where(|el| el.name == "style")[0];
        assert_eq!(doc.child_text(style), "");
    }

    #[test]
    fn malformed_style_block_is_an_error() {
        let mut doc = parse_html("<style>a { color: red;</style>");
        assert!(reindent_style_blocks(&mut doc, &CssPrinter::default(), "  ").is_err());
    }

    #[test]
    fn inline_styles_are_compacted_in_place() {
        let mut doc = parse_html(r#"<p id="a" style="color:red;   background:  blue;">x</p>"#);
        let count = normalize_inline_styles(&mut doc, &CssPrinter::default()).unwrap();
        assert_eq!(count, 1);

        let p = doc.elements_where(|el| el.name == "p")[0];
        let el = doc.tree().get(p).unwrap().value().as_element().unwrap().clone();
        assert_eq!(
            el.attrs,
            vec![
                ("id".to_string(), "a".to_string()),
                ("style".to_string(), "color: red; background: blue".to_string()),
            ]
        );
    }
}
