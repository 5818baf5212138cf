/// A parsed stylesheet: rules in source order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Stylesheet {
    pub rules: Vec<CssRule>,
}

impl Stylesheet {
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CssRule {
    Style(StyleRule),
    At(AtRule),
}

/// `selector, selector { ... }`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyleRule {
    /// Comma-separated selectors, whitespace-collapsed, in source order.
    pub selectors: Vec<String>,
    pub body: Vec<BlockItem>,
}

/// `@name prelude;` or `@name prelude { ... }`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AtRule {
    /// Name without the leading `@`.
    pub name: String,
    pub prelude: String,
    /// `None` for statement at-rules such as `@import`.
    pub body: Option<Vec<BlockItem>>,
}

/// Entry of a block body. Style rules nest (`&:hover { ... }`) and grouping
/// at-rules hold rules, so bodies mix both.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockItem {
    Declaration(Declaration),
    Rule(CssRule),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
    pub property: String,
    /// Opaque value text, whitespace-collapsed outside strings, without `!important`.
    pub value: String,
    pub important: bool,
}

impl Declaration {
    pub fn new(property: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            property: property.into(),
            value: value.into(),
            important: false,
        }
    }
}
