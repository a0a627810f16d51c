//! GitHub-flavored markdown renderer.
//!
//! Produces the document line by line: one header per documented node,
//! its chunks verbatim (code chunks fenced with their language), a blank
//! separator, and finally the block of reference link definitions.

use crate::model::{DocNode, Document, Location};
use crate::refs;
use std::collections::VecDeque;

#[derive(Debug, Clone)]
pub struct Options {
    /// Header level of top-level nodes. Deeper nodes add one per level
    /// without any upper bound.
    pub level: usize,
    /// Link target for header ids, with `{path}` and `{line}` placeholders.
    pub url: Option<String>,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            level: 1,
            url: None,
        }
    }
}

/// Lazily render a document. The iterator yields lines without their
/// trailing newline and can only be consumed once.
pub fn lines<'a>(doc: &'a Document, options: &'a Options) -> Lines<'a> {
    let stack = doc
        .content
        .iter()
        .rev()
        .map(|node| Frame {
            node,
            depth: 0,
            prefix: String::new(),
        })
        .collect();
    Lines {
        doc,
        options,
        stack,
        pending: VecDeque::new(),
        finished: false,
    }
}

/// Render a whole document into a string.
pub fn render(doc: &Document, options: &Options) -> String {
    lines(doc, options).fold(String::new(), |mut out, line| {
        out.push_str(&line);
        out.push('\n');
        out
    })
}

pub struct Lines<'a> {
    doc: &'a Document,
    options: &'a Options,
    /// Nodes still to visit; the next one is on top.
    stack: Vec<Frame<'a>>,
    pending: VecDeque<String>,
    finished: bool,
}

struct Frame<'a> {
    node: &'a DocNode,
    depth: usize,
    /// Escaped id of the parent followed by a dot.
    prefix: String,
}

impl<'a> Iterator for Lines<'a> {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        loop {
            if let Some(line) = self.pending.pop_front() {
                return Some(line);
            }
            if let Some(frame) = self.stack.pop() {
                self.visit(frame);
                continue;
            }
            if self.finished {
                return None;
            }
            self.finished = true;
            self.pending
                .extend(refs::block(&refs::collect(self.doc)));
        }
    }
}

impl<'a> Lines<'a> {
    fn visit(&mut self, frame: Frame<'a>) {
        let id = format!("{}{}", frame.prefix, escape(&frame.node.name));

        if frame.node.is_documented() {
            self.emit(frame.node, frame.depth, &id);
        }

        // Undocumented nodes still lead to their children.
        let prefix = format!("{}.", id);
        for child in frame.node.content.iter().rev() {
            self.stack.push(Frame {
                node: child,
                depth: frame.depth + 1,
                prefix: prefix.clone(),
            });
        }
    }

    fn emit(&mut self, node: &DocNode, depth: usize, id: &str) {
        let label = match &self.options.url {
            Some(template) => format!("[{}]({})", id, link(template, &node.location)),
            None => id.to_string(),
        };
        self.pending.push_back(format!(
            "{} {} {}",
            "#".repeat(self.options.level + depth),
            node.kind,
            label
        ));

        for chunk in &node.text {
            match &chunk.lang {
                Some(lang) => {
                    self.pending.push_back(format!("```{}", lang));
                    self.pending.extend(chunk.text.lines().map(str::to_string));
                    self.pending.push_back("```".to_string());
                }
                None => self.pending.extend(chunk.text.lines().map(str::to_string)),
            }
        }
        self.pending.push_back(String::new());
    }
}

/// Backslash-escape characters that would start emphasis or code spans.
pub fn escape(text: &str) -> String {
    text.replace('_', "\\_")
        .replace('*', "\\*")
        .replace('`', "\\`")
}

fn link(template: &str, location: &Location) -> String {
    template
        .replace("{path}", &location.path)
        .replace("{line}", &location.line.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Chunk, NodeKind, PYTHON};

    fn two_levels() -> Document {
        let mut f = DocNode::new(NodeKind::Function, "f", Location::new("m.py", 3));
        f.text = vec![
            Chunk::code(PYTHON, "def f(): ..."),
            Chunk::text("Does nothing.\n"),
        ];
        let mut m = DocNode::new(NodeKind::Module, "m", Location::new("m.py", 1));
        m.text = vec![Chunk::text("Hello.\n")];
        m.content.push(f);
        Document {
            content: vec![m],
            ..Document::new()
        }
    }

    #[test]
    fn two_level_tree() {
        let doc = two_levels();
        let out: Vec<String> = lines(&doc, &Options::default()).collect();
        assert_eq!(
            out,
            [
                "# Module m",
                "Hello.",
                "",
                "## Function m.f",
                "```python",
                "def f(): ...",
                "```",
                "Does nothing.",
                "",
                "<!-- references -->",
                "[m]: #module-m \"Module m\"",
                "[`m`]: #module-m \"Module m\"",
                "[m.f]: #function-m-f \"Function f\"",
                "[`m.f`]: #function-m-f \"Function f\"",
            ]
        );
    }

    #[test]
    fn url_template_links_headers() {
        let doc = two_levels();
        let options = Options {
            level: 2,
            url: Some("https://example.com/blob/main/{path}#L{line}".to_string()),
        };
        let out = render(&doc, &options);
        assert!(out.starts_with("## Module [m](https://example.com/blob/main/m.py#L1)\n"));
        assert!(out.contains("\n### Function [m.f](https://example.com/blob/main/m.py#L3)\n"));
    }

    #[test]
    fn undocumented_parent_still_renders_children() {
        let mut doc = two_levels();
        doc.content[0].text.clear();
        let out: Vec<String> = lines(&doc, &Options::default()).collect();
        assert_eq!(out[0], "## Function m.f");
        assert!(out.contains(&"[m]: #module-m \"Module m\"".to_string()));
    }

    #[test]
    fn names_are_escaped_in_headers_only() {
        let mut node = DocNode::new(NodeKind::Function, "_do*it`", Location::new("m.py", 1));
        node.text.push(Chunk::text("Docs."));
        let doc = Document {
            content: vec![node],
            ..Document::new()
        };
        let out = render(&doc, &Options::default());
        assert!(out.starts_with("# Function \\_do\\*it\\`\n"));
        assert!(out.contains("[_do*it`]: #function-_do*it` \"Function _do*it`\""));
    }

    #[test]
    fn header_level_is_not_clamped() {
        let mut node = DocNode::new(NodeKind::Module, "deep", Location::new("d.py", 1));
        node.text.push(Chunk::text("Deep."));
        for depth in 0..8 {
            let mut child = DocNode::new(NodeKind::Class, format!("c{depth}"), Location::new("d.py", 1));
            child.text.push(Chunk::text("C."));
            child.content.push(node);
            node = child;
        }
        let doc = Document {
            content: vec![node],
            ..Document::new()
        };
        let options = Options {
            level: 3,
            url: None,
        };
        let headers: Vec<String> = lines(&doc, &options)
            .filter(|l| l.starts_with('#'))
            .collect();
        assert_eq!(headers.len(), 9);
        assert!(headers[8].starts_with(&format!("{} Module ", "#".repeat(11))));
    }

    #[test]
    fn empty_document_has_only_the_marker() {
        let out: Vec<String> = lines(&Document::new(), &Options::default()).collect();
        assert_eq!(out, [refs::MARKER]);
    }
}
