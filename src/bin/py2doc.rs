//! py2doc: extract the docstrings of Python files into a JSON
//! documentation tree, one module node per input.
//!
//! `py2doc -o doc.json src/pkg/__init__.py:pkg src/pkg/tools.py`

use anyhow::{Context, Result};
use clap::Parser;
use encoding_rs::Encoding;
use microdoc::parser;
use microdoc::{files, Document};
use std::io::Write;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "py2doc", version, about = "Extract docstrings from Python")]
struct Cli {
    /// Input file. If the input is followed by a colon, the text after the
    /// colon is used as the module name. Glob patterns are expanded.
    #[arg(value_name = "INPUT[:NAME]", required = true)]
    inputs: Vec<String>,

    /// Output file. If not specified, the output is written to stdout
    #[arg(short = 'o', long)]
    output: Option<PathBuf>,

    /// Encoding of the input files
    #[arg(short = 'e', long, default_value = "utf-8", value_parser = parse_encoding)]
    encoding: &'static Encoding,
}

fn parse_encoding(label: &str) -> std::result::Result<&'static Encoding, String> {
    files::encoding(label).map_err(|e| e.to_string())
}

fn main() -> Result<()> {
    microdoc::init_logging();
    let cli = Cli::parse();

    let mut doc = Document::new();
    for input in parser::resolve_inputs(&cli.inputs)? {
        let node = parser::parse_input(&input, cli.encoding)
            .with_context(|| format!("failed to document {}", input.path.display()))?;
        doc.content.push(node);
    }

    let json = doc.to_json()?;
    let mut out = files::writer(cli.output.as_deref())?;
    writeln!(out, "{}", json).context("failed to write the documentation tree")?;
    out.flush().context("failed to write the documentation tree")?;
    Ok(())
}
