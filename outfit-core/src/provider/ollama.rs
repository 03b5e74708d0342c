//! Client for a local Ollama `/api/generate` endpoint.
//!
//! Ollama streams its answer as newline-delimited JSON records of the form
//! `{"response": "...", "done": false}`. The fragments are concatenated in arrival
//! order until a record with `done: true` shows up or the body ends.

use async_trait::async_trait;
use futures::{Stream, StreamExt};
use reqwest::Client;
use serde::Serialize;
use tracing::{debug, trace};

use crate::{error::GenerationError, model::GenerationChunk, provider::truncate_body};

use super::TextGenerator;

/// Model requested from the generation service.
pub const MODEL: &str = "llama3.2";

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    prompt: &'a str,
    model: &'a str,
}

#[derive(Debug, Clone)]
pub struct OllamaGenerator {
    endpoint: String,
    http: Client,
}

impl OllamaGenerator {
    pub fn new(endpoint: impl Into<String>, http: Client) -> Self {
        Self {
            endpoint: endpoint.into(),
            http,
        }
    }
}

#[async_trait]
impl TextGenerator for OllamaGenerator {
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        debug!(endpoint = %self.endpoint, model = MODEL, "sending prompt");

        let res = self
            .http
            .post(&self.endpoint)
            .json(&GenerateRequest {
                prompt,
                model: MODEL,
            })
            .send()
            .await
            .map_err(GenerationError::Transport)?;

        let status = res.status();
        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            return Err(GenerationError::Status {
                status: status.as_u16(),
                body: truncate_body(&body),
            });
        }

        let text = aggregate_stream(res.bytes_stream()).await?;
        debug!(chars = text.chars().count(), "generation complete");
        Ok(text)
    }
}

/// Concatenates the fragments of a newline-delimited [`GenerationChunk`] stream.
///
/// Lines that do not decode are skipped. A read error ends consumption and is
/// reported together with the text gathered so far.
pub async fn aggregate_stream<S, B, E>(stream: S) -> Result<String, GenerationError>
where
    S: Stream<Item = Result<B, E>>,
    B: AsRef<[u8]>,
    E: std::error::Error + Send + Sync + 'static,
{
    let mut stream = std::pin::pin!(stream);
    let mut pending: Vec<u8> = Vec::new();
    let mut text = String::new();

    while let Some(item) = stream.next().await {
        let bytes = match item {
            Ok(bytes) => bytes,
            Err(err) => {
                return Err(GenerationError::Interrupted {
                    partial: text,
                    source: Box::new(err),
                });
            }
        };
        pending.extend_from_slice(bytes.as_ref());

        while let Some(pos) = pending.iter().position(|b| *b == b'\n') {
            let line: Vec<u8> = pending.drain(..=pos).collect();
            if append_line(&line[..pos], &mut text) {
                return Ok(text);
            }
        }
    }

    // Last record may lack a trailing newline.
    if !pending.is_empty() {
        append_line(&pending, &mut text);
    }

    Ok(text)
}

/// Appends the fragment carried by `line`; returns `true` once the final record is seen.
fn append_line(line: &[u8], text: &mut String) -> bool {
    let line = line.strip_suffix(b"\r").unwrap_or(line);

    match serde_json::from_slice::<GenerationChunk>(line) {
        Ok(chunk) => {
            text.push_str(&chunk.fragment);
            chunk.is_final
        }
        Err(err) => {
            trace!(%err, "skipping undecodable stream line");
            false
        }
    }
}
