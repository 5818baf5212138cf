use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use rune_format::css::{CssPrinter, parse_declarations, parse_stylesheet};
use rune_format::markup::{MarkupNode, parse_html};
use rune_format::{
    FailureReporter, FormatError, FormatKind, FormatOptions, LineEnding, MarkupFormatter,
    PayloadFormatter,
};

#[derive(Default)]
struct CountingReporter {
    calls: AtomicUsize,
}

impl FailureReporter for CountingReporter {
    fn report(&self, kind: FormatKind, _message: &str, _error: &FormatError) {
        assert_eq!(kind, FormatKind::Html);
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

fn formatter() -> MarkupFormatter {
    MarkupFormatter::new(FormatOptions::default().with_line_ending(LineEnding::Lf))
}

/// Elements with their attributes, trimmed non-blank text and stylesheet
/// content, in document order. Style attributes and `<style>` bodies are
/// compared after a parse and re-print so only their tokens matter.
fn outline(source: &str) -> Vec<String> {
    let printer = CssPrinter::default();
    let doc = parse_html(source);
    let outline = doc
        .root()
        .descendants()
        .filter_map(|node| match node.value() {
            MarkupNode::Element(el) => {
                let attrs = el
                    .attrs
                    .iter()
                    .map(|(name, value)| {
                        let value = if name == "style" {
                            parse_declarations(value)
                                .map(|decls| printer.compact_declarations(&decls))
                                .unwrap_or_else(|_| value.clone())
                        } else {
                            value.clone()
                        };
                        format!(" {}={:?}", name, value)
                    })
                    .collect::<String>();
                Some(format!("<{}{}>", el.name, attrs))
            }
            MarkupNode::Data(text) | MarkupNode::Css(text)
                if node
                    .parent()
                    .and_then(|parent| parent.value().as_element())
                    .is_some_and(|el| el.name == "style") =>
            {
                let sheet = parse_stylesheet(text).map(|sheet| printer.pretty(&sheet));
                Some(format!("css:{}", sheet.unwrap_or_else(|_| text.clone())))
            }
            MarkupNode::Text(text) | MarkupNode::Data(text) | MarkupNode::Css(text) => {
                let words = text.split_whitespace().collect::<Vec<_>>().join(" ");
                (!words.is_empty()).then_some(words)
            }
            _ => None,
        })
        .collect();
    outline
}

const SAMPLES: &[&str] = &[
    "<div><p>Hello <b>big</b> world</p><ul><li>a</li><li>b</li></ul></div>",
    "<!DOCTYPE html><html><head><style>body{color:red}h1{margin:0}</style></head>\
     <body><h1 style=\"color:blue;font-weight:bold\">T</h1></body></html>",
    "<div><pre>  keep\n  this</pre><br><img src=\"a.png\" alt=\"\"></div>",
    "<section>\n\n   <p>\n  loose   text\n</p>\n<!-- note -->\n</section>",
    "<nav><a href=\"/x?a=1&amp;b=2\" class=\"btn\" style=\"margin:0 auto;color:red\">go</a></nav>",
];

#[test]
fn formatting_is_idempotent() {
    let formatter = formatter();
    for sample in SAMPLES {
        let once = formatter.format(sample);
        let twice = formatter.format(&once);
        assert_eq!(once, twice, "second pass changed output for {:?}", sample);
    }
}

#[test]
fn formatting_keeps_structure_and_text() {
    let formatter = formatter();
    for sample in SAMPLES {
        let formatted = formatter.format(sample);
        assert_eq!(outline(sample), outline(&formatted), "for {:?}", sample);
    }
}

#[test]
fn indentation_grows_with_depth() {
    let out = formatter().format("<div><section><article><p>deep</p></article></section></div>");
    let lines: Vec<_> = out.lines().collect();
    assert_eq!(
        lines,
        vec![
            "<div>",
            "  <section>",
            "    <article>",
            "      <p>deep</p>",
            "    </article>",
            "  </section>",
            "</div>",
        ]
    );
}

#[test]
fn style_block_sits_one_level_below_its_tag() {
    let out = formatter().format("<div><div><style>body{color:red}</style></div></div>");
    assert!(
        out.contains("    <style>\n      body {\n        color: red;\n      }\n    </style>"),
        "unexpected output:\n{}",
        out
    );
}

#[test]
fn inline_style_is_normalized() {
    let out = formatter().format(r#"<span style="color:red;   background:  blue">x</span>"#);
    assert_eq!(out, r#"<span style="color: red; background: blue">x</span>"#);
}

#[test]
fn crlf_terminates_structural_lines_only() {
    let formatter =
        MarkupFormatter::new(FormatOptions::default().with_line_ending(LineEnding::Crlf));
    let out = formatter.format("<div><p>a</p><textarea>x\ny</textarea></div>");
    assert_eq!(
        out,
        "<div>\r\n  <p>a</p>\r\n  <textarea>x\ny</textarea>\r\n</div>"
    );
}

#[test]
fn tab_indentation() {
    let formatter = MarkupFormatter::new(
        FormatOptions::default()
            .with_indent("\t")
            .with_line_ending(LineEnding::Lf),
    );
    assert_eq!(
        formatter.format("<ul><li>a</li></ul>"),
        "<ul>\n\t<li>a</li>\n</ul>"
    );
}

#[test]
fn failures_return_input_and_report_once() {
    for source in [
        "<style>body { color: red;</style>",
        r#"<div style="color red">x</div>"#,
        "<div><style>}</style></div>",
    ] {
        let reporter = Arc::new(CountingReporter::default());
        let formatter = MarkupFormatter::with_reporter(FormatOptions::default(), reporter.clone());
        assert_eq!(formatter.format(source), source);
        assert_eq!(reporter.calls.load(Ordering::SeqCst), 1, "for {:?}", source);
    }
}

#[test]
fn formatter_is_shareable_across_threads() {
    let formatter = Arc::new(formatter());
    let handles: Vec<_> = (0..4)
        .map(|i| {
            let formatter = Arc::clone(&formatter);
            std::thread::spawn(move || formatter.format(&format!("<div><p>{}</p></div>", i)))
        })
        .collect();
    for (i, handle) in handles.into_iter().enumerate() {
        let out = handle.join().expect("worker panicked");
        assert_eq!(out, format!("<div>\n  <p>{}</p>\n</div>", i));
    }
}
