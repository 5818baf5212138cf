mod cli;

use std::env;
use std::fs;
use std::io::{self, Read, Write};
use std::sync::Arc;

use anyhow::{Context, Result, anyhow};
use rune_config::RuneConfig;
use rune_format::{Dispatcher, FormatOptions, TracingReporter};

use crate::cli::{Input, USAGE, parse_args};

fn main() -> Result<()> {
    let _ = env_logger::try_init();

    let args = parse_args(env::args().skip(1))?;
    if args.help {
        println!("{}", USAGE);
        return Ok(());
    }

    let mut config = match &args.config {
        Some(path) => RuneConfig::load_from_file(path).map_err(|e| anyhow!(e))?,
        None => RuneConfig::load_or_default(),
    };
    config.merge_with_env();
    args.apply_to(&mut config);

    let source = match &args.input {
        Input::Stdin => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("failed to read stdin")?;
            buf
        }
        Input::File(path) => fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?,
    };

    let kind = args.resolve_kind();
    log::debug!("formatting {} bytes as {}", source.len(), kind);

    let dispatcher =
        Dispatcher::with_defaults(FormatOptions::from_config(&config), Arc::new(TracingReporter));
    let formatted = dispatcher.format(kind, &source);

    let mut stdout = io::stdout().lock();
    stdout
        .write_all(formatted.as_bytes())
        .context("failed to write output")?;
    stdout.flush().context("failed to flush output")?;
    Ok(())
}
