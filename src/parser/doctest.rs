//! Docstring segmentation.
//!
//! A docstring is split into narrative text and interactive examples
//! (`>>>` prompts, `...` continuations and the expected output that follows
//! them). Examples become `python` chunks, everything else untagged chunks,
//! and a final coalesce pass merges neighbours of the same kind.

use crate::error::{Error, Result};
use crate::model::{Chunk, PYTHON};
use regex::Regex;
use std::sync::LazyLock;

const TAB_SIZE: usize = 8;

// --- Line patterns (lines carry no trailing newline) ---

/// `>>>` prompt, capturing its indentation.
static RE_PROMPT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^( *)>>>").unwrap());

static RE_CONTINUATION: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^ *\.\.\.").unwrap());

/// Lines that end expected output: blank, a new prompt or a Markdown fence.
static RE_WANT_END: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^ *(>>>|```|~~~|$)").unwrap());

/// Example source with nothing to run. One trailing newline is allowed.
static RE_BLANK_OR_COMMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^ *(#[^\n]*)?\n?$").unwrap());

/// An interactive example after the prompts have been stripped.
#[derive(Debug, PartialEq)]
struct Example {
    /// Always ends with a newline.
    source: String,
    /// Empty, or ends with a newline.
    want: String,
}

#[derive(Debug)]
enum Piece {
    Text(String),
    Example(Example),
}

/// Split a cleaned docstring into coalesced chunks.
///
/// Returns an empty list only when nothing survives parsing, e.g. a
/// docstring made of a bare `>>>` prompt; callers treat that as an error.
pub fn segment(docstring: &str) -> Result<Vec<Chunk>> {
    let chunks = parse(docstring)?
        .into_iter()
        .filter_map(|piece| match piece {
            Piece::Text(text) if text.is_empty() => None,
            Piece::Text(text) => Some(Chunk::text(text)),
            Piece::Example(example) => Some(Chunk::code(PYTHON, example.render())),
        })
        .collect();
    Ok(coalesce(chunks))
}

/// Merge adjacent chunks of the same kind. Runs after all chunks exist
/// because an example's kind is only known once it is fully parsed.
pub fn coalesce(chunks: Vec<Chunk>) -> Vec<Chunk> {
    let mut merged: Vec<Chunk> = Vec::with_capacity(chunks.len());
    for chunk in chunks {
        match merged.last_mut() {
            Some(last) if last.same_kind(&chunk) => last.text.push_str(&chunk.text),
            _ => merged.push(chunk),
        }
    }
    merged
}

/// Reduce a function definition to its one-line signature followed by an
/// elision marker.
///
/// `def foo(a, b): return a + b` becomes `def foo(a, b): ...`. The colon
/// ending the signature is searched after the parameter list, so return
/// annotations survive.
pub fn compose_definition(code: &str) -> String {
    let head = match signature_end(code) {
        Some(end) => &code[..end],
        None => code.lines().next().unwrap_or(code),
    };
    format!("{} ...", head.trim_end())
}

/// Byte offset just past the colon that closes the signature.
fn signature_end(code: &str) -> Option<usize> {
    let open = code.find('(')?;
    let close = scan(code, open, |depth, c| depth == 0 && c == ')')?;
    scan(code, close + 1, |depth, c| depth == 0 && c == ':').map(|colon| colon + 1)
}

/// Find the first byte matching `stop` at the bracket depth it is seen at,
/// ignoring anything inside string literals.
fn scan(code: &str, from: usize, stop: impl Fn(usize, char) -> bool) -> Option<usize> {
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut escaped = false;
    for (i, c) in code[from..].char_indices() {
        if let Some(q) = quote {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == q {
                quote = None;
            }
            continue;
        }
        match c {
            '\'' | '"' => quote = Some(c),
            '(' | '[' | '{' => depth += 1,
            ')' | ']' | '}' => {
                depth = depth.saturating_sub(1);
                if stop(depth, c) {
                    return Some(from + i);
                }
            }
            _ if stop(depth, c) => return Some(from + i),
            _ => {}
        }
    }
    None
}

impl Example {
    /// Prompts are restored so the chunk reads as a valid session inside a
    /// fenced block.
    fn render(&self) -> String {
        format!(
            ">>> {}\n{}",
            self.source.trim_end().replace('\n', "\n... "),
            self.want
        )
    }
}

fn parse(docstring: &str) -> Result<Vec<Piece>> {
    let expanded = expand_tabs(docstring);
    let margin = min_indent(&expanded);
    let text = if margin > 0 {
        expanded
            .split('\n')
            .map(|line| skip_columns(line, margin))
            .collect::<Vec<_>>()
            .join("\n")
    } else {
        expanded
    };

    let lines: Vec<&str> = text.split_inclusive('\n').collect();
    let mut pieces = Vec::new();
    let mut narrative = String::new();
    let mut i = 0;
    while i < lines.len() {
        let Some(indent) = prompt_indent(content(lines[i])) else {
            narrative.push_str(lines[i]);
            i += 1;
            continue;
        };

        let start = i;
        i += 1;
        while i < lines.len() && is_continuation(content(lines[i])) {
            i += 1;
        }
        let source_end = i;
        while i < lines.len() && is_want(content(lines[i])) {
            i += 1;
        }

        let example = example(&lines[start..source_end], &lines[source_end..i], indent, start)?;
        pieces.push(Piece::Text(std::mem::take(&mut narrative)));
        if let Some(example) = example {
            pieces.push(Piece::Example(example));
        }
    }
    pieces.push(Piece::Text(narrative));
    Ok(pieces)
}

/// Build an example from its source and want lines. `first` is the 0-based
/// docstring line of the prompt. Blank or comment-only sources yield `None`.
fn example(source: &[&str], want: &[&str], indent: usize, first: usize) -> Result<Option<Example>> {
    let source: Vec<&str> = source.iter().map(|line| content(line)).collect();
    let want: Vec<&str> = want.iter().map(|line| content(line)).collect();

    for (n, line) in source.iter().enumerate() {
        if line.len() >= indent + 4 && line.as_bytes()[indent + 3] != b' ' {
            return Err(Error::MalformedExample {
                line: first + n + 1,
                reason: format!(
                    "lacks blank after {}: {:?}",
                    line.get(indent..indent + 3).unwrap_or(">>>"),
                    line
                ),
            });
        }
    }
    check_prefix(&source[1..], &format!("{}.", " ".repeat(indent)), first + 1)?;
    check_prefix(&want, &" ".repeat(indent), first + source.len())?;

    let mut code = source
        .iter()
        .map(|line| line.get(indent + 4..).unwrap_or(""))
        .collect::<Vec<_>>()
        .join("\n");
    if RE_BLANK_OR_COMMENT.is_match(&code) {
        return Ok(None);
    }
    code.push('\n');

    let want = want
        .iter()
        .map(|line| format!("{}\n", &line[indent..]))
        .collect::<String>();

    Ok(Some(Example { source: code, want }))
}

fn check_prefix(lines: &[&str], prefix: &str, first: usize) -> Result<()> {
    match lines
        .iter()
        .position(|line| !line.is_empty() && !line.starts_with(prefix))
    {
        Some(n) => Err(Error::MalformedExample {
            line: first + n + 1,
            reason: format!("has inconsistent leading whitespace: {:?}", lines[n]),
        }),
        None => Ok(()),
    }
}

fn content(line: &str) -> &str {
    line.strip_suffix('\n').unwrap_or(line)
}

fn leading_spaces(line: &str) -> usize {
    line.len() - line.trim_start_matches(' ').len()
}

/// Indentation of a `>>>` prompt line.
fn prompt_indent(line: &str) -> Option<usize> {
    RE_PROMPT.captures(line).map(|caps| caps[1].len())
}

fn is_continuation(line: &str) -> bool {
    RE_CONTINUATION.is_match(line)
}

fn is_want(line: &str) -> bool {
    !RE_WANT_END.is_match(line)
}

/// Smallest indentation among lines that have visible content.
fn min_indent(text: &str) -> usize {
    text.split('\n')
        .filter_map(|line| {
            let indent = leading_spaces(line);
            line[indent..]
                .chars()
                .next()
                .filter(|c| !c.is_whitespace())
                .map(|_| indent)
        })
        .min()
        .unwrap_or(0)
}

fn skip_columns(line: &str, columns: usize) -> &str {
    match line.char_indices().nth(columns) {
        Some((i, _)) => &line[i..],
        None => "",
    }
}

pub(crate) fn expand_tabs(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut column = 0;
    for c in text.chars() {
        match c {
            '\t' => {
                let width = TAB_SIZE - column % TAB_SIZE;
                out.extend(std::iter::repeat(' ').take(width));
                column += width;
            }
            '\n' | '\r' => {
                out.push(c);
                column = 0;
            }
            _ => {
                out.push(c);
                column += 1;
            }
        }
    }
    out
}
