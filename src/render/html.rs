//! HTML page assembly around markdown rendered by the GitHub API.
//!
//! The API output is post-processed so in-document links work: headings
//! get `id` attributes, and `<<name>>` markers inside code comments become
//! links to the matching heading.

use regex::{Captures, Regex};
use std::sync::LazyLock;

static RE_HEADING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<h(.)>(.*)</h.>").unwrap());

static RE_COMMENT_REF: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"<span class="pl-c">(.*)&lt;&lt;(.+)&gt;&gt;</span>"#).unwrap()
});

static RE_NON_ALNUM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-zA-Z0-9]+").unwrap());

/// Heading anchor: lowercase, every run of non-alphanumerics collapsed to
/// a single hyphen.
pub fn anchor(text: &str) -> String {
    RE_NON_ALNUM
        .replace_all(&text.to_lowercase(), "-")
        .into_owned()
}

/// Add heading ids and turn `<<name>>` comment markers into links.
pub fn fix_refs(html: &str) -> String {
    let html = RE_HEADING.replace_all(html, |caps: &Captures| {
        format!(
            "<h{level} id=\"{}\">{}</h{level}>",
            anchor(caps[2].trim()),
            &caps[2],
            level = &caps[1]
        )
    });
    RE_COMMENT_REF
        .replace_all(&html, |caps: &Captures| {
            format!(
                "<a href=\"#{}\">{}«{}»</a>",
                anchor(caps[2].trim()),
                &caps[1],
                &caps[2]
            )
        })
        .into_owned()
}

/// Standalone page: Primer styles, GitHub light syntax colors and KaTeX
/// auto-rendering of `$...$` and `$$...$$`.
pub fn page(title: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<title>{title}</title>
<meta charset="UTF-8">
<meta name="viewport" content="width=device-width, initial-scale=1.0">
<meta http-equiv="X-UA-Compatible" content="ie=edge">
<link href="https://unpkg.com/@primer/css/dist/primer.css" rel="stylesheet" />
<link href="https://unpkg.com/github-syntax-light/lib/github-light.css" rel="stylesheet" />
<link rel="stylesheet" href="https://cdn.jsdelivr.net/npm/katex/dist/katex.min.css">
<script defer src="https://cdn.jsdelivr.net/npm/katex/dist/katex.min.js"></script>
<script defer src="https://cdn.jsdelivr.net/npm/katex/dist/contrib/auto-render.min.js" onload="renderMathInElement(document.body, {{
    delimiters: [
        {{left: '$$', right: '$$', display: true}},
        {{left: '$', right: '$', display: false}},
    ],
}});"></script>
</head>
<body>
<div id="content" class="container-xl px-2 px-md-4 py-4 py-md-8 markdown-body">
{body}
</div>
</body>
</html>
"#,
        title = html_escape(title),
        body = fix_refs(body)
    )
}

fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
