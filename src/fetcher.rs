//! HTTP fetcher for downloading blocklist sources.

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, info};

use crate::config::{FetchConfig, Source};
use crate::error::FetchError;

/// Retrieves the raw lines of one source.
///
/// No retries happen at this layer: a failure is reported once and the
/// caller decides what to do with it.
#[async_trait]
pub trait SourceFetcher: Send + Sync {
    async fn fetch(&self, source: &Source) -> Result<Vec<String>, FetchError>;
}

/// HTTP(S) fetcher backed by a shared reqwest client
pub struct HttpFetcher {
    client: Client,
    max_size: usize,
}

impl HttpFetcher {
    /// Create a fetcher with the configured timeout and user agent
    pub fn new(config: &FetchConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.clone())
            .build()
            .context("Failed to create HTTP client")?;
        Ok(Self {
            client,
            max_size: config.max_size_bytes,
        })
    }
}

#[async_trait]
impl SourceFetcher for HttpFetcher {
    async fn fetch(&self, source: &Source) -> Result<Vec<String>, FetchError> {
        info!("Downloading {} from {}", source.name, source.url);

        let response = self
            .client
            .get(&source.url)
            .send()
            .await
            .map_err(|e| request_error(source, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                name: source.name.clone(),
                status: status.as_u16(),
            });
        }

        if let Some(content_length) = response.content_length() {
            let size = usize::try_from(content_length).unwrap_or(usize::MAX);
            if size > self.max_size {
                return Err(FetchError::TooLarge {
                    name: source.name.clone(),
                    size,
                    limit: self.max_size,
                });
            }
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| request_error(source, e))?;

        if body.len() > self.max_size {
            return Err(FetchError::TooLarge {
                name: source.name.clone(),
                size: body.len(),
                limit: self.max_size,
            });
        }

        let lines = decode_lines(&body);
        debug!("{}: {} bytes", source.name, body.len());
        info!("Downloaded {}: {} lines", source.name, lines.len());

        Ok(lines)
    }
}

fn request_error(source: &Source, err: reqwest::Error) -> FetchError {
    // A builder error means the request never left (malformed URL)
    if err.is_builder() {
        FetchError::Unexpected {
            name: source.name.clone(),
            cause: err.to_string(),
        }
    } else {
        FetchError::Network {
            name: source.name.clone(),
            cause: err.to_string(),
        }
    }
}

/// Decode a response body into lines.
///
/// Invalid UTF-8 bytes are dropped rather than failing the whole source, so
/// `1.2.3.4\xff` still yields `1.2.3.4`. Every Unicode line boundary ends a
/// line, including a bare `\r`.
pub fn decode_lines(body: &[u8]) -> Vec<String> {
    let text: String = body.utf8_chunks().map(|chunk| chunk.valid()).collect();
    split_lines(text.trim_start_matches('\u{feff}'))
}

fn is_line_break(c: char) -> bool {
    matches!(
        c,
        '\n' | '\r' | '\x0b' | '\x0c' | '\x1c' | '\x1d' | '\x1e' | '\u{85}' | '\u{2028}' | '\u{2029}'
    )
}

/// Split on line boundaries; `\r\n` counts once and a trailing break adds no empty line.
fn split_lines(text: &str) -> Vec<String> {
    let mut lines = Vec::new();
    let mut rest = text;

    while !rest.is_empty() {
        let Some(idx) = rest.find(is_line_break) else {
            lines.push(rest.to_string());
            break;
        };
        lines.push(rest[..idx].to_string());

        let tail = &rest[idx..];
        let width = if tail.starts_with("\r\n") {
            2
        } else {
            tail.chars().next().map_or(1, char::len_utf8)
        };
        rest = &tail[width..];
    }

    lines
}
