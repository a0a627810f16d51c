//! Documentation tree shared by the extractor and the formatter.
//!
//! The tree is serialized as the intermediate JSON file:
//!
//! ```json
//! {"version": "0.3.0", "content": [
//!   {"type": "Module", "name": "m", "location": ["m.py", 1],
//!    "text": [[null, "Hello.\n"]], "content": []}
//! ]}
//! ```

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Version stamped into every document this crate writes.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Language tag of interactive examples and synthesized signatures.
pub const PYTHON: &str = "python";

/// A whole intermediate file: one module node per input file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub version: String,
    pub content: Vec<DocNode>,
}

/// One documented declaration and its subtree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocNode {
    #[serde(rename = "type")]
    pub kind: NodeKind,
    pub name: String,
    pub location: Location,
    /// Empty when the declaration has no docstring.
    pub text: Vec<Chunk>,
    pub content: Vec<DocNode>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeKind {
    Module,
    Class,
    Function,
}

/// Where a declaration starts. Serialized as `[path, line]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "(String, usize)", into = "(String, usize)")]
pub struct Location {
    pub path: String,
    /// 1-based
    pub line: usize,
}

/// A span of documentation: narrative text when `lang` is `None`, otherwise
/// code in that language. Serialized as `[lang, text]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "(Option<String>, String)", into = "(Option<String>, String)")]
pub struct Chunk {
    pub lang: Option<String>,
    pub text: String,
}

impl Document {
    pub fn new() -> Self {
        Self {
            version: VERSION.to_string(),
            content: Vec::new(),
        }
    }

    /// Decode an intermediate file, refusing documents written by an
    /// incompatible extractor before looking at the tree.
    pub fn from_json(input: &str) -> Result<Self> {
        #[derive(Deserialize)]
        struct Header {
            version: String,
        }

        let header: Header = serde_json::from_str(input)?;
        check_version(&header.version)?;
        Ok(serde_json::from_str(input)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

/// Versions are compatible when major and minor match; before 1.0 every
/// minor release may change the layout.
fn check_version(found: &str) -> Result<()> {
    let expected = series(VERSION);
    if series(found) == expected {
        Ok(())
    } else {
        Err(Error::UnsupportedVersion {
            found: found.to_string(),
            expected,
        })
    }
}

fn series(version: &str) -> String {
    version.split('.').take(2).collect::<Vec<_>>().join(".")
}

impl DocNode {
    pub fn new(kind: NodeKind, name: impl Into<String>, location: Location) -> Self {
        Self {
            kind,
            name: name.into(),
            location,
            text: Vec::new(),
            content: Vec::new(),
        }
    }

    pub fn is_documented(&self) -> bool {
        !self.text.is_empty()
    }
}

impl NodeKind {
    pub fn as_str(self) -> &'static str {
        match self {
            NodeKind::Module => "Module",
            NodeKind::Class => "Class",
            NodeKind::Function => "Function",
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Location {
    pub fn new(path: impl Into<String>, line: usize) -> Self {
        Self {
            path: path.into(),
            line,
        }
    }
}

impl From<(String, usize)> for Location {
    fn from((path, line): (String, usize)) -> Self {
        Self { path, line }
    }
}

impl From<Location> for (String, usize) {
    fn from(location: Location) -> Self {
        (location.path, location.line)
    }
}

impl Chunk {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            lang: None,
            text: text.into(),
        }
    }

    pub fn code(lang: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            lang: Some(lang.into()),
            text: text.into(),
        }
    }

    /// Chunks of the same kind are merged by the coalesce pass.
    pub fn same_kind(&self, other: &Chunk) -> bool {
        self.lang == other.lang
    }
}

impl From<(Option<String>, String)> for Chunk {
    fn from((lang, text): (Option<String>, String)) -> Self {
        Self { lang, text }
    }
}

impl From<Chunk> for (Option<String>, String) {
    fn from(chunk: Chunk) -> Self {
        (chunk.lang, chunk.text)
    }
}
