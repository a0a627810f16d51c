//! Input resolution and dispatch by file extension.

pub mod doctest;
pub mod python;

use crate::error::{Error, Result};
use crate::model::DocNode;
use encoding_rs::Encoding;
use log::debug;
use std::path::PathBuf;

/// A module to document: the file and the name its tree is rooted at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Input {
    pub path: PathBuf,
    pub name: String,
}

impl Input {
    /// `path` names the module after the file stem, `path:name` explicitly.
    pub fn new(arg: &str) -> Self {
        match arg.split_once(':') {
            Some((path, name)) => Self {
                path: PathBuf::from(path),
                name: name.to_string(),
            },
            None => Self::from_path(PathBuf::from(arg)),
        }
    }

    fn from_path(path: PathBuf) -> Self {
        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default();
        Self { path, name }
    }
}

/// Resolve `INPUT[:NAME]` arguments in order. Inputs without an explicit
/// name that are not files are treated as glob patterns; each pattern's
/// matches are sorted for deterministic output, and a pattern matching no
/// file is an error.
pub fn resolve_inputs(args: &[String]) -> Result<Vec<Input>> {
    let mut inputs = Vec::new();
    for arg in args {
        let input = Input::new(arg);
        if arg.contains(':') || input.path.is_file() || !is_pattern(arg) {
            inputs.push(input);
            continue;
        }

        let mut matches: Vec<PathBuf> = glob::glob(arg)
            .map_err(|e| Error::Pattern {
                pattern: arg.clone(),
                reason: e.to_string(),
            })?
            .filter_map(|r| r.ok())
            .filter(|p| p.is_file())
            .collect();
        if matches.is_empty() {
            return Err(Error::NoMatch(arg.clone()));
        }
        matches.sort();
        debug!("{}: {} file(s)", arg, matches.len());
        inputs.extend(matches.into_iter().map(Input::from_path));
    }
    Ok(inputs)
}

fn is_pattern(arg: &str) -> bool {
    arg.contains(['*', '?', '['])
}

/// Parse a source file into a documentation tree based on its extension.
pub fn parse_file(input: &Input, content: &str) -> Result<DocNode> {
    match input.path.extension().and_then(|e| e.to_str()) {
        Some("py" | "pyi") => python::parse(content, &input.path, &input.name),
        _ => Err(Error::UnsupportedFile(input.path.clone())),
    }
}

/// Read one input in `encoding` and parse it.
pub fn parse_input(input: &Input, encoding: &'static Encoding) -> Result<DocNode> {
    let content = crate::files::read_encoded(&input.path, encoding)?;
    parse_file(input, &content)
}
