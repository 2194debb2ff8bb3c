//! Incremental decoding of the chat-completions event stream.
//!
//! The body arrives in arbitrary chunks. A chunk may end in the middle of a
//! UTF-8 character, in the middle of a line, or in the middle of a JSON
//! payload, so every layer here carries its unfinished tail into the next
//! chunk:
//!
//! ```text
//! bytes ──utf8 tail──▶ text ──line tail──▶ lines ──JSON carry──▶ records
//! ```
//!
//! The wire format is:
//!
//! ```text
//! data: {"choices":[{"delta":{"content":"Hel"}}]}
//!
//! data: {"choices":[{"delta":{"content":"lo"}}]}
//!
//! data: [DONE]
//! ```
//!
//! Some failures are not streamed at all: the server answers with one plain
//! JSON object such as `{"error":{"message":"..."}}`. The decoder watches
//! for that envelope before splitting lines.

use serde_json::Value;

/// Prefix of every data line.
pub(crate) const DATA_MARKER: &str = "data:";

/// Payload of the end-of-stream sentinel line.
pub(crate) const DONE_PAYLOAD: &str = "[DONE]";

/// Stop looking for a plain JSON error envelope after this much body.
const MAX_ENVELOPE_BYTES: usize = 64 * 1024;

/// A logical record decoded from the body.
#[derive(Debug, Clone, PartialEq)]
pub enum Record {
    /// The sentinel line: the server finished on purpose.
    Done,
    /// A complete JSON payload, from a data line or an error envelope.
    Payload(Value),
}

/// Result of feeding a fragment to [`JsonCarry`].
#[derive(Debug)]
pub enum Parse {
    /// A complete JSON value.
    Complete(Value),
    /// The JSON ended early. The text is held for the next fragment.
    Incomplete,
    /// The text is not JSON and never will be.
    Invalid(serde_json::Error),
}

/// Reassembles JSON payloads split across records.
///
/// "Incomplete" and "invalid" are kept apart: the first means wait for more
/// data, the second means drop it.
#[derive(Debug, Default)]
pub struct JsonCarry {
    pending: String,
}

impl JsonCarry {
    /// Append `fragment` to any held text and try to parse the result.
    ///
    /// When the combined text is invalid but held text existed, the held
    /// text is discarded and `fragment` is parsed on its own.
    pub fn feed(&mut self, fragment: &str) -> Parse {
        if self.pending.is_empty() {
            return self.try_parse(fragment.to_owned());
        }

        let mut candidate = std::mem::take(&mut self.pending);
        candidate.push_str(fragment);
        match self.try_parse(candidate) {
            Parse::Invalid(err) => {
                tracing::debug!(error = %err, "discarding held partial payload");
                self.try_parse(fragment.to_owned())
            }
            other => other,
        }
    }

    /// Append `fragment` to held text, keeping the held text if the
    /// combination is invalid.
    ///
    /// Used for lines that may or may not continue the payload, such as
    /// `: keep-alive` comments.
    pub fn extend(&mut self, fragment: &str) -> Parse {
        let held = self.pending.clone();
        let mut candidate = std::mem::take(&mut self.pending);
        candidate.push_str(fragment);
        match self.try_parse(candidate) {
            Parse::Invalid(err) => {
                self.pending = held;
                Parse::Invalid(err)
            }
            other => other,
        }
    }

    /// Whether a partial payload is being held.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        !self.pending.trim().is_empty()
    }

    /// Remove and return the held text.
    pub fn take_pending(&mut self) -> Option<String> {
        let pending = std::mem::take(&mut self.pending);
        (!pending.trim().is_empty()).then_some(pending)
    }

    fn try_parse(&mut self, candidate: String) -> Parse {
        match serde_json::from_str(&candidate) {
            Ok(value) => Parse::Complete(value),
            Err(err) if err.is_eof() => {
                self.pending = candidate;
                Parse::Incomplete
            }
            Err(err) => Parse::Invalid(err),
        }
    }
}

/// Whether a payload carries a non-null `error` field.
pub(crate) fn reports_error(value: &Value) -> bool {
    value.get("error").is_some_and(|error| !error.is_null())
}

/// Classification of one non-blank line.
#[derive(Debug, PartialEq, Eq)]
enum Line<'a> {
    Done,
    Data(&'a str),
    Other(&'a str),
}

fn classify(line: &str) -> Line<'_> {
    match line.strip_prefix(DATA_MARKER) {
        Some(rest) => {
            let payload = rest.strip_prefix(' ').unwrap_or(rest);
            if payload.trim() == DONE_PAYLOAD {
                Line::Done
            } else {
                Line::Data(payload)
            }
        }
        None => Line::Other(line),
    }
}

/// Number of trailing bytes that start a UTF-8 character the slice cuts off.
fn incomplete_suffix_len(bytes: &[u8]) -> usize {
    for back in 1..=bytes.len().min(3) {
        let byte = bytes[bytes.len() - back];
        if byte & 0b1100_0000 == 0b1000_0000 {
            // continuation byte, keep looking for the lead byte
            continue;
        }
        let width = match byte {
            0xF0..=0xFF => 4,
            0xE0..=0xEF => 3,
            0xC0..=0xDF => 2,
            _ => 1,
        };
        return if width > back { back } else { 0 };
    }
    0
}

/// Turns body chunks into [`Record`]s.
///
/// One decoder per response; it is the decode buffer for that response.
#[derive(Debug)]
pub struct ChunkDecoder {
    utf8_tail: Vec<u8>,
    line_tail: String,
    json: JsonCarry,
    /// Body seen so far, kept while it could still be a plain JSON envelope.
    envelope: Option<String>,
}

impl Default for ChunkDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl ChunkDecoder {
    /// Create a decoder for a fresh response body.
    #[must_use]
    pub fn new() -> Self {
        Self {
            utf8_tail: Vec::new(),
            line_tail: String::new(),
            json: JsonCarry::default(),
            envelope: Some(String::new()),
        }
    }

    /// Decode one chunk.
    ///
    /// Returns the records completed by this chunk, in body order. An error
    /// envelope is returned alone and skips line parsing.
    pub fn decode(&mut self, chunk: &[u8]) -> Vec<Record> {
        let text = self.decode_utf8(chunk);

        if let Some(envelope) = self.error_envelope(&text) {
            return vec![Record::Payload(envelope)];
        }

        self.line_tail.push_str(&text);

        let mut records = Vec::new();
        while let Some(newline) = self.line_tail.find('\n') {
            let line: String = self.line_tail.drain(..=newline).collect();
            self.process_line(line.trim_end_matches(['\n', '\r']), &mut records);
        }

        if !records.is_empty() {
            tracing::debug!(records = records.len(), "decoded chunk");
        }
        records
    }

    /// Flush everything held back once the body has ended.
    ///
    /// A final line without a newline is processed; a JSON payload that
    /// never completed is dropped.
    pub fn finish(&mut self) -> Vec<Record> {
        let mut records = Vec::new();

        if !self.utf8_tail.is_empty() {
            let tail = std::mem::take(&mut self.utf8_tail);
            self.line_tail.push_str(&String::from_utf8_lossy(&tail));
        }

        let line = std::mem::take(&mut self.line_tail);
        self.process_line(line.trim_end_matches('\r'), &mut records);

        if let Some(pending) = self.json.take_pending() {
            tracing::debug!(bytes = pending.len(), "body ended inside a JSON payload");
        }
        records
    }

    fn decode_utf8(&mut self, chunk: &[u8]) -> String {
        let mut bytes = std::mem::take(&mut self.utf8_tail);
        bytes.extend_from_slice(chunk);

        let split = bytes.len() - incomplete_suffix_len(&bytes);
        self.utf8_tail = bytes.split_off(split);
        String::from_utf8_lossy(&bytes).into_owned()
    }

    /// Check whether the body is a plain JSON error object rather than an
    /// event stream.
    ///
    /// Until the first recognized record, the whole body received so far is
    /// the candidate, so an envelope split over several chunks is still
    /// found. Afterwards a chunk is only a candidate when it starts on a line
    /// boundary with no payload held.
    fn error_envelope(&mut self, text: &str) -> Option<Value> {
        let candidate = match self.envelope.as_mut() {
            Some(body) => {
                body.push_str(text);
                let start = body.trim_start();
                if body.len() > MAX_ENVELOPE_BYTES
                    || (!start.is_empty() && !start.starts_with('{'))
                {
                    self.envelope = None;
                    return None;
                }
                body.as_str()
            }
            None if self.line_tail.is_empty() && !self.json.is_pending() => text,
            None => return None,
        };

        if !candidate.trim_start().starts_with('{') {
            return None;
        }

        let value: Value = serde_json::from_str(candidate.trim()).ok()?;
        if reports_error(&value) {
            self.envelope = None;
            Some(value)
        } else {
            None
        }
    }

    fn process_line(&mut self, line: &str, out: &mut Vec<Record>) {
        if line.trim().is_empty() {
            return;
        }

        match classify(line) {
            Line::Done => {
                self.envelope = None;
                if let Some(pending) = self.json.take_pending() {
                    tracing::debug!(bytes = pending.len(), "sentinel arrived inside a JSON payload");
                }
                out.push(Record::Done);
            }
            Line::Data(payload) => {
                self.envelope = None;
                self.feed(payload, out);
            }
            Line::Other(text) if self.json.is_pending() => match self.json.extend(text) {
                Parse::Complete(value) => out.push(Record::Payload(value)),
                Parse::Incomplete => tracing::trace!("holding incomplete payload"),
                Parse::Invalid(_) => tracing::trace!(line = text, "ignoring line inside payload"),
            },
            Line::Other(text) => {
                tracing::trace!(line = text, "ignoring unrecognized line");
            }
        }
    }

    fn feed(&mut self, fragment: &str, out: &mut Vec<Record>) {
        match self.json.feed(fragment) {
            Parse::Complete(value) => out.push(Record::Payload(value)),
            Parse::Incomplete => tracing::trace!("holding incomplete payload"),
            Parse::Invalid(err) => tracing::debug!(error = %err, "dropping unparseable payload"),
        }
    }
}
