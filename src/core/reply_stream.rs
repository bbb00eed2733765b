//! Accumulation of streamed send-message replies.
//!
//! The send endpoint answers with a sequence of lines, usually `data: {...}`,
//! where every JSON body that carries `messageText` holds the *whole* reply so
//! far. Later updates replace earlier ones; nothing is appended.

use memchr::memchr;
use serde::Deserialize;
use tracing::debug;

/// Observer for progressive reply states; receives the full text so far.
pub type ProgressFn<'a> = &'a (dyn Fn(&str) + Send + Sync);

#[derive(Deserialize)]
struct ReplyUpdate {
    #[serde(rename = "messageText")]
    message_text: Option<String>,
}

fn extract_data_payload(line: &str) -> &str {
    line.strip_prefix("data:").map(str::trim_start).unwrap_or(line)
}

/// Parse one stream line, returning the reply text it carries, if any.
///
/// Lines that are blank, not JSON objects, or lack a string `messageText`
/// yield `None`.
pub fn parse_update_line(line: &str) -> Option<String> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }
    let payload = extract_data_payload(line);
    match serde_json::from_str::<ReplyUpdate>(payload) {
        Ok(update) => update.message_text,
        Err(err) => {
            debug!(error = %err, "skipping unparseable reply line");
            None
        }
    }
}

/// Byte-oriented accumulator fed with raw response chunks.
#[derive(Debug, Default)]
pub struct ReplyAccumulator {
    buffer: Vec<u8>,
    latest: String,
    updates: usize,
}

impl ReplyAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed a chunk of the response body. Returns `true` when at least one
    /// complete line in it updated the reply text.
    pub fn push(&mut self, chunk: &[u8]) -> bool {
        self.buffer.extend_from_slice(chunk);
        let mut changed = false;
        while let Some(newline_pos) = memchr(b'\n', &self.buffer) {
            changed |= self.consume_line(newline_pos);
            self.buffer.drain(..=newline_pos);
        }
        changed
    }

    /// Latest full reply text seen so far.
    pub fn latest(&self) -> &str {
        &self.latest
    }

    /// Number of lines that carried reply text.
    pub fn update_count(&self) -> usize {
        self.updates
    }

    /// Flush a trailing line without newline and return the reply.
    ///
    /// A stream with no usable lines produces an empty string.
    pub fn finish(mut self) -> String {
        if !self.buffer.is_empty() {
            let end = self.buffer.len();
            self.consume_line(end);
            self.buffer.clear();
        }
        self.latest
    }

    fn consume_line(&mut self, end: usize) -> bool {
        let line = match std::str::from_utf8(&self.buffer[..end]) {
            Ok(line) => line,
            Err(err) => {
                debug!(error = %err, "skipping reply line with invalid UTF-8");
                return false;
            }
        };
        match parse_update_line(line) {
            Some(text) => {
                self.latest = text;
                self.updates += 1;
                true
            }
            None => false,
        }
    }
}

fn extract_error_summary(value: &serde_json::Value) -> Option<String> {
    let summary = value
        .pointer("/error/message")
        .and_then(|v| v.as_str())
        .map(str::to_owned)
        .or_else(|| {
            value
                .get("error")
                .and_then(|v| v.as_str())
                .map(str::to_owned)
        })
        .or_else(|| {
            value
                .get("message")
                .and_then(|v| v.as_str().map(str::to_owned))
        });

    summary.map(|text| text.split_whitespace().collect::<Vec<_>>().join(" "))
}

/// Render an error body from the API for display.
///
/// JSON bodies are summarised by their `error`/`message` field and
/// pretty-printed; anything else is shown verbatim.
pub fn format_api_error(error_text: &str) -> String {
    let trimmed = error_text.trim();

    if trimmed.is_empty() {
        return "<empty body>".to_string();
    }

    if let Ok(json_value) = serde_json::from_str::<serde_json::Value>(trimmed) {
        if let Ok(pretty_json) = serde_json::to_string_pretty(&json_value) {
            return match extract_error_summary(&json_value) {
                Some(summary) if !summary.is_empty() => format!("{summary}\n{pretty_json}"),
                _ => pretty_json,
            };
        }
    }

    trimmed.to_string()
}
