#[cfg(feature = "strict-css")]
use lightningcss::stylesheet::{ParserOptions, StyleSheet as LStyleSheet};
use thiserror::Error;

use crate::css::types::{AtRule, BlockItem, CssRule, Declaration, StyleRule, Stylesheet};

/// Structural faults found while parsing CSS.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CssError {
    #[error("unterminated comment")]
    UnterminatedComment,
    #[error("unterminated string near `{0}`")]
    UnterminatedString(String),
    #[error("unclosed block after `{0}`")]
    UnclosedBlock(String),
    #[error("unexpected `}}` near `{0}`")]
    UnexpectedCloseBrace(String),
    #[error("block without selector near `{0}`")]
    MissingSelector(String),
    #[error("declaration without `:` in `{0}`")]
    MissingColon(String),
    #[error("declaration with empty property name in `{0}`")]
    EmptyProperty(String),
    #[error("declaration outside of any rule: `{0}`")]
    StrayDeclaration(String),
    #[error("rejected by lightningcss: {0}")]
    Rejected(String),
}

/// Parse a full stylesheet (the content of a `<style>` element or a CSS payload).
pub fn parse_stylesheet(source: &str) -> Result<Stylesheet, CssError> {
    validate_with_lightningcss(source)?;
    let sanitized = strip_comments(source)?;
    let rules = parse_block_items(&sanitized, true)?
        .into_iter()
        .filter_map(|item| match item {
            BlockItem::Rule(rule) => Some(rule),
            BlockItem::Declaration(_) => None,
        })
        .collect();
    Ok(Stylesheet { rules })
}

/// Parse a standalone declaration block such as a `style` attribute value.
pub fn parse_declarations(source: &str) -> Result<Vec<Declaration>, CssError> {
    validate_with_lightningcss(&format!("rune-inline{{{}}}", source))?;
    let sanitized = strip_comments(source)?;
    let mut out = Vec::new();
    for part in split_top_level(&sanitized, b';') {
        if part.trim().is_empty() {
            continue;
        }
        out.push(parse_declaration(part)?);
    }
    Ok(out)
}

// Lightningcss is stricter than the structural parser below; when the feature is
// on, anything it refuses is treated as malformed.
#[cfg(feature = "strict-css")]
fn validate_with_lightningcss(css: &str) -> Result<(), CssError> {
    LStyleSheet::parse(css, ParserOptions::default())
        .map(|_| ())
        .map_err(|err| CssError::Rejected(err.to_string()))
}

#[cfg(not(feature = "strict-css"))]
fn validate_with_lightningcss(_css: &str) -> Result<(), CssError> {
    Ok(())
}

fn parse_block_items(input: &str, top_level: bool) -> Result<Vec<BlockItem>, CssError> {
    let mut items = Vec::new();
    let mut cursor = 0_usize;

    loop {
        cursor = skip_separators(input, cursor, top_level);
        if cursor >= input.len() {
            break;
        }

        match find_top_level(input, cursor, b"{;}") {
            Some((idx, b'}')) => {
                return Err(CssError::UnexpectedCloseBrace(snippet(&input[cursor..=idx])));
            }
            Some((open, b'{')) => {
                let close = find_matching_brace(input, open)
                    .ok_or_else(|| CssError::UnclosedBlock(snippet(&input[cursor..open])))?;
                let rule = parse_block_rule(&input[cursor..open], &input[open + 1..close])?;
                items.push(BlockItem::Rule(rule));
                cursor = close + 1;
            }
            Some((end, _)) => {
                items.push(parse_statement(&input[cursor..end], top_level)?);
                cursor = end + 1;
            }
            None => {
                items.push(parse_statement(&input[cursor..], top_level)?);
                cursor = input.len();
            }
        }
    }

    Ok(items)
}

fn parse_block_rule(prelude: &str, body: &str) -> Result<CssRule, CssError> {
    let prelude = normalize_value(prelude);
    if prelude.is_empty() {
        return Err(CssError::MissingSelector(snippet(body)));
    }

    if let Some(rest) = prelude.strip_prefix('@') {
        let (name, at_prelude) = split_at_rule_name(rest);
        if name.is_empty() {
            return Err(CssError::MissingSelector(snippet(&prelude)));
        }
        return Ok(CssRule::At(AtRule {
            name: name.to_string(),
            prelude: at_prelude.to_string(),
            body: Some(parse_block_items(body, false)?),
        }));
    }

    let mut selectors = Vec::new();
    for selector in split_top_level(&prelude, b',') {
        let selector = selector.trim();
        if selector.is_empty() {
            return Err(CssError::MissingSelector(snippet(&prelude)));
        }
        selectors.push(selector.to_string());
    }

    Ok(CssRule::Style(StyleRule {
        selectors,
        body: parse_block_items(body, false)?,
    }))
}

fn parse_statement(text: &str, top_level: bool) -> Result<BlockItem, CssError> {
    let text = text.trim();
    if let Some(rest) = text.strip_prefix('@') {
        let normalized = normalize_value(rest);
        let (name, prelude) = split_at_rule_name(&normalized);
        if !name.is_empty() {
            return Ok(BlockItem::Rule(CssRule::At(AtRule {
                name: name.to_string(),
                prelude: prelude.to_string(),
                body: None,
            })));
        }
    }

    if top_level {
        return Err(CssError::StrayDeclaration(snippet(text)));
    }

    Ok(BlockItem::Declaration(parse_declaration(text)?))
}

fn parse_declaration(text: &str) -> Result<Declaration, CssError> {
    let text = text.trim();
    let Some((colon, _)) = find_top_level(text, 0, b":") else {
        return Err(CssError::MissingColon(snippet(text)));
    };

    let property = normalize_value(&text[..colon]);
    if property.is_empty() {
        return Err(CssError::EmptyProperty(snippet(text)));
    }

    let (value, important) = split_important(&normalize_value(&text[colon + 1..]));
    Ok(Declaration {
        property,
        value,
        important,
    })
}

fn split_at_rule_name(rest: &str) -> (&str, &str) {
    let end = rest
        .char_indices()
        .find(|(_, ch)| !(ch.is_alphanumeric() || *ch == '-' || *ch == '_'))
        .map(|(idx, _)| idx)
        .unwrap_or(rest.len());
    (&rest[..end], rest[end..].trim())
}

fn split_important(value: &str) -> (String, bool) {
    let trimmed = value.trim_end();
    // ASCII lowering keeps byte offsets aligned with `trimmed`.
    let lower = trimmed.to_ascii_lowercase();
    if let Some(head) = lower.strip_suffix("important") {
        let head = head.trim_end();
        if let Some(without_bang) = head.strip_suffix('!') {
            let cut = without_bang.len();
            return (trimmed[..cut].trim_end().to_string(), true);
        }
    }
    (trimmed.to_string(), false)
}

fn skip_separators(input: &str, mut idx: usize, top_level: bool) -> usize {
    let bytes = input.as_bytes();
    while idx < bytes.len() {
        let byte = bytes[idx];
        if byte.is_ascii_whitespace() || byte == b';' {
            idx += 1;
            continue;
        }
        // CDO/CDC survive from the days of hiding stylesheets in HTML comments.
        if top_level && input[idx..].starts_with("<!--") {
            idx += 4;
            continue;
        }
        if top_level && input[idx..].starts_with("-->") {
            idx += 3;
            continue;
        }
        break;
    }
    idx
}

/// First byte out of `stops` that sits outside strings, parentheses and brackets.
fn find_top_level(input: &str, from: usize, stops: &[u8]) -> Option<(usize, u8)> {
    let bytes = input.as_bytes();
    let mut idx = from;
    let mut quote: Option<u8> = None;
    let mut paren_depth = 0_u32;
    let mut bracket_depth = 0_u32;

    while idx < bytes.len() {
        let byte = bytes[idx];

        if let Some(q) = quote {
            if byte == b'\\' {
                idx += 2;
                continue;
            }
            if byte == q {
                quote = None;
            }
            idx += 1;
            continue;
        }

        match byte {
            b'\'' | b'"' => quote = Some(byte),
            b'\\' => {
                idx += 2;
                continue;
            }
            b'(' => paren_depth += 1,
            b')' => paren_depth = paren_depth.saturating_sub(1),
            b'[' => bracket_depth += 1,
            b']' => bracket_depth = bracket_depth.saturating_sub(1),
            _ if paren_depth == 0 && bracket_depth == 0 && stops.contains(&byte) => {
                return Some((idx, byte));
            }
            _ => {}
        }

        idx += 1;
    }

    None
}

fn find_matching_brace(input: &str, open_brace: usize) -> Option<usize> {
    let bytes = input.as_bytes();
    let mut idx = open_brace + 1;
    let mut quote: Option<u8> = None;
    let mut depth = 1_u32;

    while idx < bytes.len() {
        let byte = bytes[idx];

        if let Some(q) = quote {
            if byte == b'\\' {
                idx += 2;
                continue;
            }
            if byte == q {
                quote = None;
            }
            idx += 1;
            continue;
        }

        match byte {
            b'\'' | b'"' => quote = Some(byte),
            b'\\' => {
                idx += 2;
                continue;
            }
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(idx);
                }
            }
            _ => {}
        }

        idx += 1;
    }

    None
}

fn split_top_level(input: &str, delimiter: u8) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut start = 0_usize;
    while let Some((idx, _)) = find_top_level(input, start, &[delimiter]) {
        parts.push(&input[start..idx]);
        start = idx + 1;
    }
    parts.push(&input[start..]);
    parts
}

/// Remove comments, keeping string contents intact and rejecting unterminated
/// strings and comments.
fn strip_comments(input: &str) -> Result<String, CssError> {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.char_indices().peekable();
    let mut quote: Option<(char, usize)> = None;

    while let Some((idx, ch)) = chars.next() {
        if let Some((q, start)) = quote {
            out.push(ch);
            match ch {
                '\\' => {
                    if let Some((_, escaped)) = chars.next() {
                        out.push(escaped);
                    }
                }
                '\n' => return Err(CssError::UnterminatedString(snippet(&input[start..]))),
                c if c == q => quote = None,
                _ => {}
            }
            continue;
        }

        match ch {
            '"' | '\'' => {
                quote = Some((ch, idx));
                out.push(ch);
            }
            '/' if chars.peek().map(|&(_, next)| next) == Some('*') => {
                chars.next();
                let mut prev = '\0';
                let mut closed = false;
                for (_, c) in chars.by_ref() {
                    if prev == '*' && c == '/' {
                        closed = true;
                        break;
                    }
                    prev = c;
                }
                if !closed {
                    return Err(CssError::UnterminatedComment);
                }
                // Keep two identifiers from fusing into one.
                let next = chars.peek().map(|&(_, c)| c);
                if out.chars().last().is_some_and(is_name_char) && next.is_some_and(is_name_char) {
                    out.push(' ');
                }
            }
            _ => out.push(ch),
        }
    }

    if let Some((_, start)) = quote {
        return Err(CssError::UnterminatedString(snippet(&input[start..])));
    }

    Ok(out)
}

fn is_name_char(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '-' || ch == '_'
}

/// Collapse whitespace runs outside of strings to a single space and trim.
fn normalize_value(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut quote: Option<char> = None;
    let mut escape = false;
    let mut last_was_space = false;

    for ch in input.chars() {
        if let Some(q) = quote {
            out.push(ch);
            if escape {
                escape = false;
            } else if ch == '\\' {
                escape = true;
            } else if ch == q {
                quote = None;
            }
            continue;
        }

        if ch == '\'' || ch == '"' {
            quote = Some(ch);
            last_was_space = false;
            out.push(ch);
            continue;
        }

        if ch.is_whitespace() {
            if !last_was_space {
                out.push(' ');
                last_was_space = true;
            }
            continue;
        }

        last_was_space = false;
        out.push(ch);
    }

    out.trim().to_owned()
}

fn snippet(text: &str) -> String {
    const MAX: usize = 40;
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    match collapsed.char_indices().nth(MAX) {
        Some((cut, _)) => format!("{}...", &collapsed[..cut]),
        None => collapsed,
    }
}
