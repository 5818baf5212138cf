//! Rune payload formatter configuration
//!
//! This crate provides centralized configuration management for the payload
//! pretty-printer, loading settings from `rune.toml` with environment variable
//! overrides.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct RuneConfig {
    /// Pretty-printing settings shared by every payload kind
    pub format: FormatConfig,
}

/// Pretty-printing configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FormatConfig {
    /// Number of spaces per indentation level (ignored when `use_tabs` is set)
    pub indent_width: usize,
    /// Indent with one tab per level instead of spaces
    pub use_tabs: bool,
    /// Line terminator written between formatted lines
    pub line_ending: LineEnding,
    /// Keep an element on one line when its only content is a single line of text
    pub inline_single_text: bool,
}

/// Line terminator used for structural line breaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LineEnding {
    /// `\r\n` on Windows, `\n` elsewhere
    #[default]
    Native,
    Lf,
    Crlf,
}

impl LineEnding {
    pub fn as_str(self) -> &'static str {
        match self {
            LineEnding::Native => {
                if cfg!(windows) {
                    "\r\n"
                } else {
                    "\n"
                }
            }
            LineEnding::Lf => "\n",
            LineEnding::Crlf => "\r\n",
        }
    }

    /// Parse the names accepted in `rune.toml` and `RUNE_LINE_ENDING`.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "native" => Some(LineEnding::Native),
            "lf" | "unix" => Some(LineEnding::Lf),
            "crlf" | "windows" => Some(LineEnding::Crlf),
            _ => None,
        }
    }
}

impl Default for FormatConfig {
    fn default() -> Self {
        Self {
            indent_width: 2,
            use_tabs: false,
            line_ending: LineEnding::Native,
            inline_single_text: true,
        }
    }
}

impl FormatConfig {
    /// The string written once per indentation level.
    pub fn indent_unit(&self) -> String {
        if self.use_tabs {
            "\t".to_string()
        } else {
            " ".repeat(self.indent_width)
        }
    }
}

impl RuneConfig {
    /// Load configuration from a TOML file
    ///
    /// # Arguments
    /// * `path` - Path to the rune.toml configuration file
    ///
    /// # Returns
    /// * `Ok(RuneConfig)` - Successfully loaded configuration
    /// * `Err(String)` - Error message if loading failed
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, String> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| format!("Failed to read config file: {}", e))?;

        toml::from_str(&content).map_err(|e| format!("Failed to parse config file: {}", e))
    }

    /// Load configuration from the default location (rune.toml in the current directory)
    /// or return default configuration if file doesn't exist
    pub fn load_or_default() -> Self {
        Self::load_from_file("rune.toml").unwrap_or_default()
    }

    /// Merge configuration with environment variables
    ///
    /// Environment variables take precedence over configuration file values.
    pub fn merge_with_env(&mut self) {
        if let Ok(val) = std::env::var("RUNE_INDENT_WIDTH") {
            if let Ok(width) = val.trim().parse::<usize>() {
                self.format.indent_width = width;
            }
        }
        if let Ok(val) = std::env::var("RUNE_USE_TABS") {
            self.format.use_tabs = val == "1" || val.eq_ignore_ascii_case("true");
        }
        if let Ok(val) = std::env::var("RUNE_LINE_ENDING") {
            if let Some(ending) = LineEnding::parse(&val) {
                self.format.line_ending = ending;
            }
        }
        if let Ok(val) = std::env::var("RUNE_INLINE_TEXT") {
            self.format.inline_single_text = val == "1" || val.eq_ignore_ascii_case("true");
        }
    }

    /// Load configuration with environment variable overrides
    ///
    /// 1. Load from rune.toml (or use defaults if not found)
    /// 2. Override with environment variables if present
    pub fn load() -> Self {
        let mut config = Self::load_or_default();
        config.merge_with_env();
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = RuneConfig::default();
        assert_eq!(config.format.indent_width, 2);
        assert!(!config.format.use_tabs);
        assert_eq!(config.format.line_ending, LineEnding::Native);
        assert!(config.format.inline_single_text);
        assert_eq!(config.format.indent_unit(), "  ");
    }

    #[test]
    fn test_toml_serialization() {
        let mut config = RuneConfig::default();
        config.format.line_ending = LineEnding::Crlf;
        let toml_str = toml::to_string_pretty(&config).unwrap();
        assert!(toml_str.contains("line_ending = \"crlf\""));
        let parsed: RuneConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.format.line_ending, LineEnding::Crlf);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rune.toml");
        std::fs::write(&path, "[format]\nuse_tabs = true\n").unwrap();

        let config = RuneConfig::load_from_file(&path).unwrap();
        assert!(config.format.use_tabs);
        assert_eq!(config.format.indent_width, 2);
        assert_eq!(config.format.indent_unit(), "\t");
    }

    #[test]
    fn test_load_from_missing_file_reports_error() {
        let err = RuneConfig::load_from_file("/definitely/not/here/rune.toml").unwrap_err();
        assert!(err.starts_with("Failed to read config file"));
    }

    #[test]
    fn test_line_ending_names() {
        assert_eq!(LineEnding::parse("LF"), Some(LineEnding::Lf));
        assert_eq!(LineEnding::parse(" crlf "), Some(LineEnding::Crlf));
        assert_eq!(LineEnding::parse("mac"), None);
        assert_eq!(LineEnding::Crlf.as_str(), "\r\n");
    }

    #[test]
    fn test_merge_with_env() {
        unsafe {
            std::env::set_var("RUNE_INDENT_WIDTH", "4");
            std::env::set_var("RUNE_LINE_ENDING", "crlf");
        }

        let mut config = RuneConfig::default();
        config.merge_with_env();

        assert_eq!(config.format.indent_width, 4);
        assert_eq!(config.format.line_ending, LineEnding::Crlf);

        unsafe {
            std::env::remove_var("RUNE_INDENT_WIDTH");
            std::env::remove_var("RUNE_LINE_ENDING");
        }
    }
}
