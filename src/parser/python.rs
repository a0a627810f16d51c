//! Python docstring extractor.
//!
//! Walks the tree-sitter syntax tree of a module and produces one node per
//! module, class and function (sync or async, decorated or not). Only the
//! direct body of each declaration is visited, so functions defined inside
//! `if` blocks or loops are not documented. A function's documentation starts
//! with its signature reduced to one line.

use crate::error::{Error, Result};
use crate::model::{Chunk, DocNode, Location, NodeKind, PYTHON};
use crate::parser::doctest;
use log::debug;
use std::path::Path;
use tree_sitter::{Node, Parser};

/// Parse a Python module into a documentation tree rooted at a module node
/// called `name`.
pub fn parse(source: &str, path: &Path, name: &str) -> Result<DocNode> {
    let source = source.replace("\r\n", "\n");

    let mut parser = Parser::new();
    parser
        .set_language(&tree_sitter_python::LANGUAGE.into())
        .map_err(|e| Error::Grammar(e.to_string()))?;
    let syntax_error = |line| Error::Syntax {
        path: path.to_path_buf(),
        line,
    };
    let tree = parser.parse(&source, None).ok_or_else(|| syntax_error(1))?;

    let root = tree.root_node();
    if root.has_error() {
        let line = first_error(root).map_or(1, |node| node.start_position().row + 1);
        return Err(syntax_error(line));
    }

    let extractor = Extractor {
        source: &source,
        path: path.to_string_lossy().replace('\\', "/"),
    };
    extractor.assemble(NodeKind::Module, name.to_string(), root, root)
}

struct Extractor<'a> {
    source: &'a str,
    /// Forward slashes on every platform.
    path: String,
}

impl<'a> Extractor<'a> {
    fn text(&self, node: Node) -> &'a str {
        node.utf8_text(self.source.as_bytes()).unwrap_or_default()
    }

    /// Node for a body statement, if it declares something documentable.
    fn declaration(&self, node: Node) -> Result<Option<DocNode>> {
        let kind = match node.kind() {
            "function_definition" => NodeKind::Function,
            "class_definition" => NodeKind::Class,
            "decorated_definition" => {
                return match node.child_by_field_name("definition") {
                    Some(definition) => self.declaration(definition),
                    None => Ok(None),
                }
            }
            other => {
                debug!("skipping {} at line {}", other, node.start_position().row + 1);
                return Ok(None);
            }
        };
        let name = node
            .child_by_field_name("name")
            .map(|n| self.text(n))
            .unwrap_or_default()
            .to_string();
        match node.child_by_field_name("body") {
            Some(body) => self.assemble(kind, name, node, body).map(Some),
            None => Ok(Some(DocNode::new(kind, name, self.location(node)))),
        }
    }

    /// Build a node from its declaration and the block holding its
    /// statements (the same node for modules).
    fn assemble(&self, kind: NodeKind, name: String, decl: Node, body: Node) -> Result<DocNode> {
        let location = match kind {
            NodeKind::Module => Location::new(self.path.clone(), 1),
            _ => self.location(decl),
        };
        let mut doc = DocNode::new(kind, name, location);
        if let Some(docstring) = self.docstring(body) {
            doc.text = self.documentation(&doc, decl, &docstring)?;
        }
        debug!(
            "{} {} at {}:{}: {} chunk(s)",
            doc.kind, doc.name, doc.location.path, doc.location.line, doc.text.len()
        );

        let mut cursor = body.walk();
        for statement in body.named_children(&mut cursor) {
            if let Some(child) = self.declaration(statement)? {
                doc.content.push(child);
            }
        }
        Ok(doc)
    }

    fn location(&self, node: Node) -> Location {
        Location::new(self.path.clone(), node.start_position().row + 1)
    }

    /// Segment a docstring, prefixing functions with their signature.
    fn documentation(&self, doc: &DocNode, decl: Node, docstring: &str) -> Result<Vec<Chunk>> {
        let cleaned = cleandoc(docstring);
        if cleaned.is_empty() {
            return Ok(Vec::new());
        }
        let mut chunks = doctest::segment(&cleaned)?;
        if chunks.is_empty() {
            return Err(Error::EmptyDocumentation {
                kind: doc.kind.to_string(),
                name: doc.name.clone(),
            });
        }
        if doc.kind == NodeKind::Function {
            let signature = flatten(&doctest::compose_definition(self.text(decl)));
            chunks.insert(0, Chunk::code(PYTHON, format!("{signature}\n")));
        }
        Ok(chunks)
    }

    /// The string literal opening a body, evaluated.
    fn docstring(&self, body: Node) -> Option<String> {
        let mut cursor = body.walk();
        let first = body
            .named_children(&mut cursor)
            .find(|n| n.kind() != "comment")?;
        if first.kind() != "expression_statement" {
            return None;
        }

        let mut cursor = first.walk();
        let exprs: Vec<Node> = first.named_children(&mut cursor).collect();
        let [expr] = exprs.as_slice() else {
            return None;
        };
        match expr.kind() {
            "string" => evaluate_string(self.text(*expr)),
            "concatenated_string" => {
                let mut cursor = expr.walk();
                let parts: Vec<Node> = expr
                    .named_children(&mut cursor)
                    .filter(|n| n.kind() == "string")
                    .collect();
                parts
                    .into_iter()
                    .map(|part| evaluate_string(self.text(part)))
                    .collect::<Option<String>>()
            }
            _ => None,
        }
    }
}

/// First error or missing node, in source order.
fn first_error(node: Node) -> Option<Node> {
    if node.is_error() || node.is_missing() {
        return Some(node);
    }
    let mut cursor = node.walk();
    let children: Vec<Node> = node.children(&mut cursor).collect();
    children
        .into_iter()
        .filter(|child| child.has_error())
        .find_map(first_error)
}

/// Evaluate a string literal. Byte strings and f-strings are not
/// docstrings and yield `None`.
fn evaluate_string(literal: &str) -> Option<String> {
    let start = literal.find(['"', '\''])?;
    let prefix = literal[..start].to_ascii_lowercase();
    if prefix.contains(['b', 'f', 't']) {
        return None;
    }

    let quoted = &literal[start..];
    let quote = if quoted.starts_with("\"\"\"") || quoted.starts_with("'''") {
        &quoted[..3]
    } else {
        &quoted[..1]
    };
    let body = quoted.strip_prefix(quote)?.strip_suffix(quote)?;

    if prefix.contains('r') {
        Some(body.to_string())
    } else {
        Some(unescape(body))
    }
}

fn unescape(body: &str) -> String {
    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        let Some(next) = chars.next() else {
            out.push('\\');
            break;
        };
        match next {
            '\n' => {}
            '\\' | '\'' | '"' => out.push(next),
            'a' => out.push('\x07'),
            'b' => out.push('\x08'),
            'f' => out.push('\x0c'),
            'n' => out.push('\n'),
            'r' => out.push('\r'),
            't' => out.push('\t'),
            'v' => out.push('\x0b'),
            '0'..='7' => {
                let mut digits = String::from(next);
                while digits.len() < 3 {
                    match chars.peek() {
                        Some(d @ '0'..='7') => {
                            digits.push(*d);
                            chars.next();
                        }
                        _ => break,
                    }
                }
                match u32::from_str_radix(&digits, 8).ok().and_then(char::from_u32) {
                    Some(decoded) => out.push(decoded),
                    None => {
                        out.push('\\');
                        out.push_str(&digits);
                    }
                }
            }
            'x' | 'u' | 'U' => {
                let width = match next {
                    'x' => 2,
                    'u' => 4,
                    _ => 8,
                };
                let digits: String = chars.by_ref().take(width).collect();
                let decoded = (digits.len() == width)
                    .then(|| u32::from_str_radix(&digits, 16).ok())
                    .flatten()
                    .and_then(char::from_u32);
                match decoded {
                    Some(decoded) => out.push(decoded),
                    None => {
                        out.push('\\');
                        out.push(next);
                        out.push_str(&digits);
                    }
                }
            }
            // \N{...} and unknown escapes are kept as written.
            other => {
                out.push('\\');
                out.push(other);
            }
        }
    }
    out
}

/// Clean a docstring: expand tabs, strip the first line, remove the common
/// margin of the other lines and drop leading and trailing empty lines.
pub fn cleandoc(docstring: &str) -> String {
    let expanded = doctest::expand_tabs(docstring);
    let mut lines: Vec<&str> = expanded.split('\n').collect();

    let margin = lines
        .iter()
        .skip(1)
        .filter_map(|line| {
            let content = line.trim_start().chars().count();
            (content > 0).then(|| line.chars().count() - content)
        })
        .min();

    if let Some(first) = lines.first_mut() {
        *first = first.trim_start();
    }
    if let Some(margin) = margin {
        for line in lines.iter_mut().skip(1) {
            *line = match line.char_indices().nth(margin) {
                Some((i, _)) => &line[i..],
                None => "",
            };
        }
    }

    while lines.last().is_some_and(|line| line.is_empty()) {
        lines.pop();
    }
    let leading = lines.iter().take_while(|line| line.is_empty()).count();
    lines[leading..].join("\n")
}

/// Put a multi-line signature on one line, dropping comments and the
/// padding inside brackets.
fn flatten(signature: &str) -> String {
    if !signature.contains('\n') {
        return signature.to_string();
    }
    let joined = signature
        .lines()
        .map(strip_comment)
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ");
    joined
        .replace("( ", "(")
        .replace("[ ", "[")
        .replace(" )", ")")
        .replace(" ]", "]")
        .replace(",)", ")")
}

fn strip_comment(line: &str) -> &str {
    let mut quote: Option<char> = None;
    for (i, c) in line.char_indices() {
        match (quote, c) {
            (None, '#') => return &line[..i],
            (None, '\'' | '"') => quote = Some(c),
            (Some(q), _) if c == q => quote = None,
            _ => {}
        }
    }
    line
}
