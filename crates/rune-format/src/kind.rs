use std::fmt;
use std::str::FromStr;

/// Declared kind of a payload. The set is closed: every kind except `None`
/// has a formatter registered by [`Dispatcher::with_defaults`](crate::Dispatcher::with_defaults).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FormatKind {
    /// No formatting; payloads pass through untouched.
    #[default]
    None,
    Json,
    Xml,
    Html,
    Css,
}

impl FormatKind {
    pub const ALL: [FormatKind; 5] = [
        FormatKind::None,
        FormatKind::Json,
        FormatKind::Xml,
        FormatKind::Html,
        FormatKind::Css,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            FormatKind::None => "none",
            FormatKind::Json => "json",
            FormatKind::Xml => "xml",
            FormatKind::Html => "html",
            FormatKind::Css => "css",
        }
    }

    /// Map an HTTP `Content-Type` value to a kind. Parameters such as
    /// `charset` are ignored and structured-syntax suffixes (`+json`, `+xml`)
    /// are honored.
    pub fn from_content_type(content_type: &str) -> FormatKind {
        let essence = content_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();

        match essence.as_str() {
            "text/html" => FormatKind::Html,
            "text/css" => FormatKind::Css,
            "application/json" | "text/json" => FormatKind::Json,
            "application/xml" | "text/xml" => FormatKind::Xml,
            _ if essence.ends_with("+json") => FormatKind::Json,
            _ if essence.ends_with("+xml") => FormatKind::Xml,
            _ => FormatKind::None,
        }
    }

    /// Map a file extension (without the dot) to a kind.
    pub fn from_extension(extension: &str) -> FormatKind {
        match extension.to_ascii_lowercase().as_str() {
            "html" | "htm" | "xhtml" => FormatKind::Html,
            "css" => FormatKind::Css,
            "json" => FormatKind::Json,
            "xml" | "svg" | "xsd" | "xsl" | "xslt" => FormatKind::Xml,
            _ => FormatKind::None,
        }
    }
}

impl fmt::Display for FormatKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown payload kind `{0}`")]
pub struct UnknownKind(pub String);

impl FromStr for FormatKind {
    type Err = UnknownKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FormatKind::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownKind(s.to_string()))
    }
}
