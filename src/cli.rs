use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use rune_config::{LineEnding, RuneConfig};
use rune_format::FormatKind;

pub const USAGE: &str = "Usage: rune-pretty [--kind <html|css|json|xml|none>] [--config <file>] \
[--indent <n>] [--tabs] [--crlf|--lf] [<file>|-]";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Stdin,
    File(PathBuf),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CliArgs {
    pub kind: Option<FormatKind>,
    pub config: Option<PathBuf>,
    pub indent: Option<usize>,
    pub tabs: bool,
    pub line_ending: Option<LineEnding>,
    pub input: Input,
    pub help: bool,
}

impl CliArgs {
    /// Explicit `--kind`, else the input file's extension, else HTML.
    pub fn resolve_kind(&self) -> FormatKind {
        if let Some(kind) = self.kind {
            return kind;
        }
        match &self.input {
            Input::File(path) => kind_from_path(path).unwrap_or(FormatKind::Html),
            Input::Stdin => FormatKind::Html,
        }
    }

    /// Command-line flags win over file and environment settings.
    pub fn apply_to(&self, config: &mut RuneConfig) {
        if let Some(width) = self.indent {
            config.format.indent_width = width;
        }
        if self.tabs {
            config.format.use_tabs = true;
        }
        if let Some(line_ending) = self.line_ending {
            config.format.line_ending = line_ending;
        }
    }
}

fn kind_from_path(path: &Path) -> Option<FormatKind> {
    let ext = path.extension()?.to_str()?;
    match FormatKind::from_extension(ext) {
        FormatKind::None => None,
        kind => Some(kind),
    }
}

pub fn parse_args<I>(args: I) -> Result<CliArgs>
where
    I: IntoIterator<Item = String>,
{
    let args = args.into_iter().collect::<Vec<_>>();
    let mut parsed = CliArgs {
        kind: None,
        config: None,
        indent: None,
        tabs: false,
        line_ending: None,
        input: Input::Stdin,
        help: false,
    };
    let mut input = None;

    let mut i = 0usize;
    while i < args.len() {
        match args[i].as_str() {
            "--kind" => {
                let value = flag_value(&args, i, "--kind")?;
                parsed.kind = Some(value.parse()?);
                i += 2;
            }
            "--config" => {
                parsed.config = Some(PathBuf::from(flag_value(&args, i, "--config")?));
                i += 2;
            }
            "--indent" => {
                let value = flag_value(&args, i, "--indent")?;
                let width = value
                    .parse::<usize>()
                    .with_context(|| format!("--indent expects a number, got `{}`", value))?;
                parsed.indent = Some(width);
                i += 2;
            }
            "--tabs" => {
                parsed.tabs = true;
                i += 1;
            }
            "--crlf" => {
                parsed.line_ending = Some(LineEnding::Crlf);
                i += 1;
            }
            "--lf" => {
                parsed.line_ending = Some(LineEnding::Lf);
                i += 1;
            }
            "-h" | "--help" => {
                parsed.help = true;
                i += 1;
            }
            flag if flag.starts_with("--") => bail!("unknown flag `{}`", flag),
            value => {
                if input.is_some() {
                    bail!("more than one input given (extra `{}`)", value);
                }
                input = Some(if value == "-" {
                    Input::Stdin
                } else {
                    Input::File(PathBuf::from(value))
                });
                i += 1;
            }
        }
    }

    if let Some(input) = input {
        parsed.input = input;
    }
    Ok(parsed)
}

fn flag_value<'a>(args: &'a [String], i: usize, flag: &str) -> Result<&'a str> {
    match args.get(i + 1) {
        Some(value) => Ok(value.as_str()),
        None => bail!("{} expects a value", flag),
    }
}
