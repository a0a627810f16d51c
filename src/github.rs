//! Client for the GitHub Markdown rendering API.
//!
//! One blocking request per document; failures are reported as they come,
//! without retries.

use crate::error::{Error, Result};
use log::debug;
use serde::Serialize;

pub const MARKDOWN_API: &str = "https://api.github.com/markdown";

#[derive(Debug, Clone)]
pub struct Client {
    api_url: String,
    token: Option<String>,
}

#[derive(Serialize)]
struct RenderRequest<'a> {
    text: &'a str,
    mode: &'a str,
}

impl Client {
    pub fn new(api_url: impl Into<String>, token: Option<String>) -> Self {
        Self {
            api_url: api_url.into(),
            token,
        }
    }

    /// Render GitHub-flavored markdown to an HTML fragment.
    pub fn render(&self, markdown: &str) -> Result<String> {
        debug!("POST {} ({} bytes)", self.api_url, markdown.len());
        let mut request = ureq::post(&self.api_url)
            .set("Accept", "application/vnd.github+json");
        if let Some(token) = &self.token {
            request = request.set("Authorization", &format!("Bearer {}", token));
        }

        let body = RenderRequest {
            text: markdown,
            mode: "gfm",
        };
        match request.send_json(body) {
            Ok(response) => response
                .into_string()
                .map_err(|e| Error::Transport(e.to_string())),
            Err(ureq::Error::Status(status, response)) => Err(Error::Http {
                status,
                body: response.into_string().unwrap_or_default(),
            }),
            Err(e) => Err(Error::Transport(e.to_string())),
        }
    }
}

impl Default for Client {
    fn default() -> Self {
        Self::new(MARKDOWN_API, None)
    }
}
