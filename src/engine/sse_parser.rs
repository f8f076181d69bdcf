//! Server-Sent Events (SSE) parser for OpenAI-compatible streaming responses.

use bytes::Bytes;
use futures_util::Stream;
use serde::Deserialize;

use crate::error::TranslateError;

#[derive(Debug, Deserialize)]
struct StreamResponse {
    choices: Vec<StreamChoice>,
}

#[derive(Debug, Deserialize)]
struct StreamChoice {
    delta: Delta,
}

#[derive(Debug, Deserialize)]
struct Delta {
    content: Option<String>,
}

/// Converts a raw SSE byte stream into a stream of text deltas.
///
/// Lines may be split across network chunks; they are buffered until the
/// newline arrives. The stream ends at `data: [DONE]` or when the body ends.
pub fn sse_to_text_stream(
    byte_stream: impl Stream<Item = reqwest::Result<Bytes>> + Send + 'static,
) -> impl Stream<Item = Result<String, TranslateError>> + Send {
    async_stream::stream! {
        use futures_util::StreamExt;

        let mut byte_stream = std::pin::pin!(byte_stream);
        let mut buffer = String::new();

        while let Some(chunk_result) = byte_stream.next().await {
            let chunk = match chunk_result {
                Ok(c) => c,
                Err(e) => {
                    yield Err(TranslateError::Network(format!("Stream error: {e}")));
                    return;
                }
            };

            buffer.push_str(&String::from_utf8_lossy(&chunk));

            while let Some(line_end) = buffer.find('\n') {
                let line: String = buffer.drain(..=line_end).collect();
                let line = line.trim();

                if line == "data: [DONE]" {
                    return;
                }
                if let Some(content) = parse_sse_line(line) {
                    yield Ok(content);
                }
            }
        }

        if let Some(content) = parse_sse_line(buffer.trim()) {
            yield Ok(content);
        }
    }
}

/// Extracts the text content of one `data:` line.
///
/// Returns `None` for comments, keep-alives, `[DONE]`, empty deltas and
/// malformed JSON.
fn parse_sse_line(line: &str) -> Option<String> {
    let json_str = line.strip_prefix("data:")?.trim_start();

    let response = serde_json::from_str::<StreamResponse>(json_str).ok()?;

    let content: String = response
        .choices
        .into_iter()
        .filter_map(|c| c.delta.content)
        .collect();

    if content.is_empty() {
        None
    } else {
        Some(content)
    }
}
