//! Incremental consumer for `data: <json>` reply streams.
//!
//! The server sends newline-delimited frames:
//!
//! ```text
//! data: {"chunk": "Hello"}
//!
//! data: {"chunk": " world"}
//!
//! data: [DONE]
//! ```
//!
//! Network reads do not respect frame boundaries, so [`SseDecoder`] keeps the
//! trailing partial line between reads. Bytes are buffered rather than text so
//! a multi-byte character split across two reads decodes intact.

use futures::Stream;
use futures_util::{pin_mut, StreamExt};
use serde_json::Value;

use agentchat_logging::log_stream_chunk;

use crate::ApiError;

const DATA_PREFIX: &str = "data: ";
const DONE_SENTINEL: &str = "[DONE]";

/// One interpreted `data:` line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamEvent {
    /// Non-empty text fragment to append
    Chunk(String),
    /// `[DONE]` sentinel; nothing after it is read
    Done,
    /// `{"error": ...}` frame reported by the server
    Error(String),
    /// Payload that is not JSON; holds the raw payload
    Malformed(String),
    /// Valid JSON carrying neither text nor an error (empty chunk, metadata)
    Ignored,
}

/// Line splitter that carries partial lines across reads
#[derive(Debug, Default)]
pub struct SseDecoder {
    buffer: Vec<u8>,
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `bytes` and return every line completed by them.
    ///
    /// The bytes after the last `\n` stay buffered for the next call.
    pub fn push(&mut self, bytes: &[u8]) -> Vec<String> {
        self.buffer.extend_from_slice(bytes);

        let Some(last_newline) = self.buffer.iter().rposition(|&b| b == b'\n') else {
            return Vec::new();
        };

        let rest = self.buffer.split_off(last_newline + 1);
        let complete = std::mem::replace(&mut self.buffer, rest);

        // the final byte is the newline that closed the last complete line
        complete[..complete.len() - 1]
            .split(|&b| b == b'\n')
            .map(decode_line)
            .collect()
    }

    /// Flush the buffered tail once the stream has ended.
    ///
    /// Returns the unterminated last line, if any bytes were left over.
    pub fn finish(&mut self) -> Option<String> {
        if self.buffer.is_empty() {
            return None;
        }
        let tail = std::mem::take(&mut self.buffer);
        Some(decode_line(&tail))
    }

    /// Bytes currently held back waiting for a newline
    pub fn pending(&self) -> usize {
        self.buffer.len()
    }
}

fn decode_line(bytes: &[u8]) -> String {
    let line = String::from_utf8_lossy(bytes);
    line.strip_suffix('\r').unwrap_or(&line).to_string()
}

/// Interpret one complete line.
///
/// Returns `None` for lines without the `data: ` prefix (blank separators,
/// comments, keep-alives).
pub fn parse_line(line: &str) -> Option<StreamEvent> {
    let payload = line.strip_prefix(DATA_PREFIX)?.trim();

    if payload == DONE_SENTINEL {
        return Some(StreamEvent::Done);
    }

    let value: Value = match serde_json::from_str(payload) {
        Ok(value) => value,
        Err(_) => return Some(StreamEvent::Malformed(payload.to_string())),
    };

    if let Some(chunk) = value.get("chunk").and_then(Value::as_str) {
        if !chunk.is_empty() {
            return Some(StreamEvent::Chunk(chunk.to_string()));
        }
    }

    match value.get("error") {
        None | Some(Value::Null) | Some(Value::Bool(false)) => Some(StreamEvent::Ignored),
        Some(Value::String(msg)) if msg.is_empty() => Some(StreamEvent::Ignored),
        Some(Value::String(msg)) => Some(StreamEvent::Error(msg.clone())),
        Some(other) => Some(StreamEvent::Error(other.to_string())),
    }
}

/// Turn a byte stream into interpreted events.
///
/// The stream ends after `Done` or `Error` without reading further. When the
/// source ends first, a buffered unterminated line is still interpreted.
pub fn events<S, B, E>(stream: S, verbose: bool) -> impl Stream<Item = Result<StreamEvent, ApiError>>
where
    S: Stream<Item = Result<B, E>>,
    B: AsRef<[u8]>,
    E: std::fmt::Display,
{
    async_stream::try_stream! {
        pin_mut!(stream);
        let mut decoder = SseDecoder::new();
        let mut frame_counter = 0usize;
        let mut finished = false;

        while !finished {
            let lines = match stream.next().await {
                Some(read) => {
                    let bytes = read.map_err(|e| ApiError::StreamRead(e.to_string()))?;
                    decoder.push(bytes.as_ref())
                }
                None => {
                    finished = true;
                    decoder.finish().into_iter().collect()
                }
            };

            for line in lines {
                let Some(event) = parse_line(&line) else {
                    continue;
                };

                frame_counter += 1;
                log_stream_chunk(frame_counter, &line[DATA_PREFIX.len()..], verbose);

                let terminal = matches!(event, StreamEvent::Done | StreamEvent::Error(_));
                yield event;
                if terminal {
                    finished = true;
                    break;
                }
            }
        }
    }
}

/// Callbacks fired while a reply streams in
pub trait StreamObserver {
    /// Called once, before the first non-empty chunk is delivered
    fn on_first_chunk(&mut self) {}

    /// Called for every non-empty chunk with the text accumulated so far
    fn on_chunk(&mut self, delta: &str, full_text: &str);
}

impl<F> StreamObserver for F
where
    F: FnMut(&str, &str),
{
    fn on_chunk(&mut self, delta: &str, full_text: &str) {
        self(delta, full_text)
    }
}

/// Result of a stream that completed normally
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StreamOutcome {
    pub text: String,
    pub chunks: usize,
    pub skipped_frames: usize,
    /// False when the source ended without a `[DONE]` frame
    pub finished_with_done: bool,
}

/// Read a reply stream to completion, feeding `observer` as text arrives.
///
/// An error frame aborts with [`ApiError::Server`] and the text gathered so
/// far is dropped. Malformed frames are skipped and counted.
pub async fn consume_stream<S, B, E, O>(
    stream: S,
    observer: &mut O,
    verbose: bool,
) -> Result<StreamOutcome, ApiError>
where
    S: Stream<Item = Result<B, E>>,
    B: AsRef<[u8]>,
    E: std::fmt::Display,
    O: StreamObserver + ?Sized,
{
    let events = events(stream, verbose);
    pin_mut!(events);

    let mut outcome = StreamOutcome::default();

    while let Some(event) = events.next().await {
        match event? {
            StreamEvent::Chunk(delta) => {
                if outcome.chunks == 0 {
                    observer.on_first_chunk();
                }
                outcome.chunks += 1;
                outcome.text.push_str(&delta);
                observer.on_chunk(&delta, &outcome.text);
            }
            StreamEvent::Done => {
                outcome.finished_with_done = true;
            }
            StreamEvent::Error(message) => {
                log::warn!("Server reported a stream error: {}", message);
                return Err(ApiError::Server(message));
            }
            StreamEvent::Malformed(payload) => {
                outcome.skipped_frames += 1;
                log::debug!("Skipping malformed stream frame: {}", payload);
            }
            StreamEvent::Ignored => {}
        }
    }

    if !outcome.finished_with_done {
        log::debug!("Reply stream ended without [DONE] after {} chunks", outcome.chunks);
    }

    Ok(outcome)
}
