//! microdoc: document Python modules as Markdown.
//!
//! The toolchain has three steps, each exposed as a binary:
//!
//! - `py2doc` extracts docstrings into a JSON documentation tree
//!   ([`parser`], [`model`]);
//! - `doc2md` renders that tree as Markdown with reference links
//!   ([`render::markdown`], [`refs`]);
//! - `md2html` converts Markdown to a standalone HTML page through the
//!   GitHub API ([`github`], [`render::html`]).

pub mod error;
pub mod files;
pub mod github;
pub mod model;
pub mod parser;
pub mod refs;
pub mod render;

pub use error::{Error, Result};
pub use model::{Chunk, DocNode, Document, Location, NodeKind};

/// Log to stderr at `warn` unless `RUST_LOG` says otherwise.
pub fn init_logging() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
}
