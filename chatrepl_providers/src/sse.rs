//! Incremental decoder for OpenAI-style Server-Sent Events.
//!
//! Network chunks do not line up with event boundaries, so bytes are held
//! until a full line is available.

use serde::Deserialize;
use tracing::debug;

const DONE_SENTINEL: &str = "[DONE]";

#[derive(Debug, Deserialize)]
struct StreamChunk {
    #[serde(default)]
    choices: Vec<StreamChoice>,
    error: Option<StreamError>,
}

#[derive(Debug, Deserialize)]
struct StreamChoice {
    #[serde(default)]
    delta: Delta,
}

#[derive(Debug, Default, Deserialize)]
struct Delta {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct StreamError {
    message: String,
}

#[derive(Debug, Default)]
pub struct SseDecoder {
    pending: Vec<u8>,
    done: bool,
}

impl SseDecoder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed raw bytes, returning the text fragments completed by them.
    pub fn feed(&mut self, bytes: &[u8]) -> anyhow::Result<Vec<String>> {
        self.pending.extend_from_slice(bytes);

        let mut fragments = Vec::new();
        while let Some(newline) = self.pending.iter().position(|&b| b == b'\n') {
            let line: Vec<u8> = self.pending.drain(..=newline).collect();
            if let Some(fragment) = self.decode_line(&line)? {
                fragments.push(fragment);
            }
        }
        Ok(fragments)
    }

    /// Flush a trailing line that arrived without a newline.
    pub fn finish(&mut self) -> anyhow::Result<Vec<String>> {
        let line = std::mem::take(&mut self.pending);
        let fragment = self.decode_line(&line)?;
        self.done = true;
        Ok(fragment.into_iter().collect())
    }

    /// True once `[DONE]` was seen or the input was finished.
    #[must_use]
    pub const fn is_done(&self) -> bool {
        self.done
    }

    fn decode_line(&mut self, line: &[u8]) -> anyhow::Result<Option<String>> {
        if self.done {
            return Ok(None);
        }

        let line = std::str::from_utf8(line)
            .map_err(|e| anyhow::anyhow!("Invalid UTF-8 in stream: {e}"))?
            .trim_end_matches(['\r', '\n']);

        let Some(data) = line.strip_prefix("data:") else {
            return Ok(None);
        };
        let data = data.trim_start();

        if data == DONE_SENTINEL {
            debug!("Stream finished");
            self.done = true;
            return Ok(None);
        }

        let chunk: StreamChunk = serde_json::from_str(data)
            .map_err(|e| anyhow::anyhow!("Failed to parse stream chunk: {e}"))?;

        if let Some(error) = chunk.error {
            anyhow::bail!("Provider reported an error mid-stream: {}", error.message);
        }

        Ok(chunk
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.delta.content)
            .filter(|content| !content.is_empty()))
    }
}
