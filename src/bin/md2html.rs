//! md2html: convert Markdown to a standalone HTML page using the GitHub
//! Markdown API.
//!
//! The output file is only written once the API has answered successfully.

use anyhow::{Context, Result};
use clap::Parser;
use microdoc::files;
use microdoc::github::{self, Client};
use microdoc::render::html;
use std::fs;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "md2html", version, about = "Render markdown to html using the GitHub API")]
struct Cli {
    /// Input Markdown file
    #[arg(value_name = "INPUT_FILE.md")]
    input: PathBuf,

    /// Output HTML file
    #[arg(value_name = "OUTPUT_FILE.html")]
    output: PathBuf,

    /// Markdown rendering endpoint
    #[arg(long, env = "MICRODOC_API_URL", default_value = github::MARKDOWN_API)]
    api_url: String,

    /// API token, sent as a bearer token when given
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    token: Option<String>,
}

fn main() -> Result<()> {
    microdoc::init_logging();
    let cli = Cli::parse();

    let markdown = files::read(Some(cli.input.as_path()))?;
    let fragment = Client::new(cli.api_url, cli.token)
        .render(&markdown)
        .with_context(|| format!("failed to render {}", cli.input.display()))?;

    let page = html::page(&cli.output.display().to_string(), &fragment);
    fs::write(&cli.output, page)
        .with_context(|| format!("failed to write {}", cli.output.display()))?;
    Ok(())
}
