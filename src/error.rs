//! Error type shared by the extractor, the formatter and the HTML converter.

use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    /// A docstring that is present but segments into no chunks at all.
    #[error("docstring of {kind} `{name}` produced no documentation chunks")]
    EmptyDocumentation { kind: String, name: String },

    /// The documented source does not parse.
    #[error("syntax error in {} at line {line}", .path.display())]
    Syntax { path: PathBuf, line: usize },

    /// An interactive example that cannot be split into source and output.
    #[error("line {line} of the docstring {reason}")]
    MalformedExample { line: usize, reason: String },

    #[error("invalid glob pattern {pattern}: {reason}")]
    Pattern { pattern: String, reason: String },

    #[error("no files matched: {0}")]
    NoMatch(String),

    #[error("unknown encoding: {0}")]
    UnknownEncoding(String),

    /// File bytes that are not valid in the requested encoding.
    #[error("failed to decode {} as {encoding}", .path.display())]
    Decode { path: PathBuf, encoding: &'static str },

    #[error("unsupported file type: {}", .0.display())]
    UnsupportedFile(PathBuf),

    #[error("failed to load the python grammar: {0}")]
    Grammar(String),

    /// Intermediate file written by an incompatible version of the extractor.
    #[error("unsupported document version {found} (expected {expected}.x)")]
    UnsupportedVersion { found: String, expected: String },

    #[error("malformed documentation file: {0}")]
    Json(#[from] serde_json::Error),

    #[error("failed to access {}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The markdown API answered with a non-success status.
    #[error("markdown API returned status {status}:\n{body}")]
    Http { status: u16, body: String },

    #[error("markdown API request failed: {0}")]
    Transport(String),
}
