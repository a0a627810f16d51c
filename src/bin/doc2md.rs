//! doc2md: render a JSON documentation tree as Markdown.
//!
//! `py2doc mod.py | doc2md -l 2 -u 'https://example.com/{path}#L{line}'`

use anyhow::{Context, Result};
use clap::Parser;
use microdoc::render::markdown::{self, Options};
use microdoc::{files, Document};
use std::io::Write;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "doc2md", version, about = "Generate markdown documentation from JSON")]
struct Cli {
    /// Input file. If not specified, the input is read from stdin
    #[arg(short = 'i', long)]
    input: Option<PathBuf>,

    /// Output file. If not specified, the output is written to stdout
    #[arg(short = 'o', long)]
    output: Option<PathBuf>,

    /// Start level for the headers
    #[arg(short = 'l', long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
    level: u32,

    /// URL template for the links, with {path} and {line} placeholders
    #[arg(short = 'u', long)]
    url: Option<String>,
}

fn main() -> Result<()> {
    microdoc::init_logging();
    let cli = Cli::parse();

    let input = files::read(cli.input.as_deref())?;
    let doc = Document::from_json(&input).with_context(|| match &cli.input {
        Some(path) => format!("failed to load {}", path.display()),
        None => "failed to load the documentation tree from stdin".to_string(),
    })?;

    let options = Options {
        level: cli.level as usize,
        url: cli.url,
    };
    let mut out = files::writer(cli.output.as_deref())?;
    for line in markdown::lines(&doc, &options) {
        writeln!(out, "{}", line).context("failed to write markdown")?;
    }
    out.flush().context("failed to write markdown")?;
    Ok(())
}
