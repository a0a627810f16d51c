//! Renderers: documentation tree to markdown, markdown API output to HTML.

pub mod html;
pub mod markdown;
